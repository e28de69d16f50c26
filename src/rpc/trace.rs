// Stream tracer
//
// Walks a record-marked ONC RPC stream, dissects every call and pairs each
// reply with its call by xid, since a reply alone does not say which
// procedure it answers.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use bytes::Bytes;
use tokio::io::AsyncRead;
use tracing::{debug, info, warn};

use super::header::RpcHeader;
use super::record::{RecordError, RecordReader};
use crate::dispatch::{Direction, Dissection, Registry};
use crate::protocol::error::DecodeError;

/// Calls waiting for a reply past this many evict the oldest
const MAX_PENDING: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingCall {
    program: u32,
    version: u32,
    procedure: u32,
}

#[derive(Debug)]
pub enum Outcome {
    Dissected(Dissection),
    /// Reply carries no procedure result (denied or not executed)
    NoResult,
    /// Reply whose call was not seen
    Unmatched,
    Failed(DecodeError),
}

#[derive(Debug)]
pub struct TraceEntry {
    pub index: usize,
    /// `None` when the record header itself did not parse
    pub header: Option<RpcHeader>,
    pub outcome: Outcome,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TraceStats {
    pub records: usize,
    pub calls: usize,
    pub replies: usize,
    pub unmatched: usize,
    pub malformed: usize,
}

pub struct Tracer {
    registry: Arc<Registry>,
    pending: HashMap<u32, PendingCall>,
    /// pending xids, oldest first
    order: VecDeque<u32>,
    stats: TraceStats,
}

impl Tracer {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            registry,
            pending: HashMap::new(),
            order: VecDeque::new(),
            stats: TraceStats::default(),
        }
    }

    pub fn stats(&self) -> TraceStats {
        self.stats
    }

    fn remember(&mut self, xid: u32, call: PendingCall) {
        // a retransmitted xid moves to the back
        if self.take(xid).is_none() && self.pending.len() >= MAX_PENDING {
            if let Some(oldest) = self.order.pop_front() {
                warn!("{} calls without reply, forgetting xid={}", MAX_PENDING, oldest);
                self.pending.remove(&oldest);
            }
        }
        self.pending.insert(xid, call);
        self.order.push_back(xid);
    }

    fn take(&mut self, xid: u32) -> Option<PendingCall> {
        let call = self.pending.remove(&xid)?;
        if let Some(pos) = self.order.iter().position(|x| *x == xid) {
            self.order.remove(pos);
        }
        Some(call)
    }

    /// Dissect one complete record
    pub fn process(&mut self, record: &Bytes) -> TraceEntry {
        let index = self.stats.records;
        self.stats.records += 1;

        let (header, body) = match RpcHeader::parse(record) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Record {}: {}", index, e);
                self.stats.malformed += 1;
                return TraceEntry {
                    index,
                    header: None,
                    outcome: Outcome::Failed(e),
                };
            }
        };

        let outcome = match &header {
            RpcHeader::Call(call) => {
                self.stats.calls += 1;
                debug!(
                    "RPC call: xid={}, prog={}, vers={}, proc={}",
                    call.xid, call.program, call.version, call.procedure
                );
                self.remember(
                    call.xid,
                    PendingCall {
                        program: call.program,
                        version: call.version,
                        procedure: call.procedure,
                    },
                );
                self.dissect(
                    record,
                    body,
                    call.program,
                    call.version,
                    call.procedure,
                    Direction::Call,
                )
            }
            RpcHeader::Reply(reply) => {
                self.stats.replies += 1;
                match self.take(reply.xid) {
                    None => {
                        debug!("Reply xid={} has no matching call", reply.xid);
                        self.stats.unmatched += 1;
                        Outcome::Unmatched
                    }
                    Some(_) if !reply.has_result() => Outcome::NoResult,
                    Some(call) => self.dissect_reply(record, body, call),
                }
            }
        };

        TraceEntry {
            index,
            header: Some(header),
            outcome,
        }
    }

    fn dissect(
        &mut self,
        record: &Bytes,
        body: usize,
        program: u32,
        version: u32,
        procedure: u32,
        direction: Direction,
    ) -> Outcome {
        match self
            .registry
            .dissect(record, body, program, version, procedure, direction)
        {
            Ok(dis) => Outcome::Dissected(dis),
            Err(e) => {
                self.stats.malformed += 1;
                Outcome::Failed(e)
            }
        }
    }

    // A failed procedure may answer with the bare error layout instead of
    // its full reply.
    fn dissect_reply(&mut self, record: &Bytes, body: usize, call: PendingCall) -> Outcome {
        let PendingCall {
            program,
            version,
            procedure,
        } = call;
        match self
            .registry
            .dissect(record, body, program, version, procedure, Direction::Reply)
        {
            Ok(dis) => Outcome::Dissected(dis),
            Err(e) => {
                let fallback = self.registry.dissect(
                    record,
                    body,
                    program,
                    version,
                    procedure,
                    Direction::ErrorReply,
                );
                match fallback {
                    Ok(dis) if dis.trailing == 0 && is_failure(&dis) => {
                        debug!("Reply decoded as error reply after: {}", e);
                        Outcome::Dissected(dis)
                    }
                    _ => {
                        self.stats.malformed += 1;
                        Outcome::Failed(e)
                    }
                }
            }
        }
    }

    /// Dissect every record of a stream, handing each entry to `sink`
    pub async fn run<R, F>(
        &mut self,
        reader: &mut RecordReader<R>,
        mut sink: F,
    ) -> Result<TraceStats, RecordError>
    where
        R: AsyncRead + Unpin,
        F: FnMut(&TraceEntry),
    {
        while let Some(record) = reader.next_record().await? {
            let entry = self.process(&record);
            sink(&entry);
        }
        info!(
            "Trace done: {} records, {} calls, {} replies, {} unmatched, {} malformed",
            self.stats.records,
            self.stats.calls,
            self.stats.replies,
            self.stats.unmatched,
            self.stats.malformed
        );
        Ok(self.stats)
    }
}

fn is_failure(dis: &Dissection) -> bool {
    dis.find("gluster.op_ret").and_then(|f| f.as_i64()) == Some(-1)
}
