// ONC RPC message headers (RFC 5531)
//
// Just enough of the call and reply headers to find the payload and to
// know which procedure it belongs to. Parsing goes through xdr-codec's
// `Unpack`; the payload itself is left to the dissectors.

use std::io::Cursor;

use xdr_codec::{Pack, Unpack, pack_opaque_flex, unpack_opaque_flex};

use crate::protocol::error::{DecodeError, DecodeResult};

pub const RPC_VERSION: u32 = 2;
/// Credential and verifier bodies are at most this long
pub const MAX_AUTH_BYTES: usize = 400;

const CALL: u32 = 0;
const REPLY: u32 = 1;
const MSG_ACCEPTED: u32 = 0;
const MSG_DENIED: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpaqueAuth {
    pub flavor: u32,
    pub body: Vec<u8>,
}

impl OpaqueAuth {
    pub fn flavor_name(&self) -> &'static str {
        match self.flavor {
            0 => "AUTH_NULL",
            1 => "AUTH_UNIX",
            2 => "AUTH_SHORT",
            3 => "AUTH_DES",
            6 => "RPCSEC_GSS",
            // GlusterFS' own credential flavors
            390025 => "AUTH_GLUSTERFS",
            390039 => "AUTH_GLUSTERFS_v2",
            _ => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallHeader {
    pub xid: u32,
    pub rpcvers: u32,
    pub program: u32,
    pub version: u32,
    pub procedure: u32,
    pub cred: OpaqueAuth,
    pub verf: OpaqueAuth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptStat {
    Success,
    ProgUnavail,
    ProgMismatch { low: u32, high: u32 },
    ProcUnavail,
    GarbageArgs,
    SystemErr,
    Other(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectStat {
    RpcMismatch { low: u32, high: u32 },
    AuthError(u32),
    Other(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyStatus {
    Accepted { verf: OpaqueAuth, stat: AcceptStat },
    Denied(RejectStat),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyHeader {
    pub xid: u32,
    pub status: ReplyStatus,
}

impl ReplyHeader {
    /// Accepted and executed, so a procedure result follows
    pub fn has_result(&self) -> bool {
        matches!(
            self.status,
            ReplyStatus::Accepted {
                stat: AcceptStat::Success,
                ..
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcHeader {
    Call(CallHeader),
    Reply(ReplyHeader),
}

impl RpcHeader {
    pub fn xid(&self) -> u32 {
        match self {
            RpcHeader::Call(c) => c.xid,
            RpcHeader::Reply(r) => r.xid,
        }
    }

    /// Parse the header at the start of `data`; returns it with the offset
    /// of the procedure payload.
    pub fn parse(data: &[u8]) -> DecodeResult<(Self, usize)> {
        let mut r = Reader {
            cur: Cursor::new(data),
        };
        let xid = r.u32("xid")?;
        let header = match r.u32("msg_type")? {
            CALL => {
                let rpcvers = r.u32("rpcvers")?;
                if rpcvers != RPC_VERSION {
                    return Err(r.error(format!("unsupported RPC version {rpcvers}")));
                }
                RpcHeader::Call(CallHeader {
                    xid,
                    rpcvers,
                    program: r.u32("prog")?,
                    version: r.u32("vers")?,
                    procedure: r.u32("proc")?,
                    cred: r.auth("cred")?,
                    verf: r.auth("verf")?,
                })
            }
            REPLY => {
                let status = match r.u32("reply_stat")? {
                    MSG_ACCEPTED => {
                        let verf = r.auth("verf")?;
                        let stat = match r.u32("accept_stat")? {
                            0 => AcceptStat::Success,
                            1 => AcceptStat::ProgUnavail,
                            2 => AcceptStat::ProgMismatch {
                                low: r.u32("mismatch.low")?,
                                high: r.u32("mismatch.high")?,
                            },
                            3 => AcceptStat::ProcUnavail,
                            4 => AcceptStat::GarbageArgs,
                            5 => AcceptStat::SystemErr,
                            other => AcceptStat::Other(other),
                        };
                        ReplyStatus::Accepted { verf, stat }
                    }
                    MSG_DENIED => ReplyStatus::Denied(match r.u32("reject_stat")? {
                        0 => RejectStat::RpcMismatch {
                            low: r.u32("mismatch.low")?,
                            high: r.u32("mismatch.high")?,
                        },
                        1 => RejectStat::AuthError(r.u32("auth_stat")?),
                        other => RejectStat::Other(other),
                    }),
                    other => return Err(r.error(format!("bad reply_stat {other}"))),
                };
                RpcHeader::Reply(ReplyHeader { xid, status })
            }
            other => return Err(r.error(format!("bad msg_type {other}"))),
        };
        Ok((header, r.offset()))
    }
}

struct Reader<'a> {
    cur: Cursor<&'a [u8]>,
}

impl Reader<'_> {
    fn offset(&self) -> usize {
        self.cur.position() as usize
    }

    fn error(&self, reason: String) -> DecodeError {
        DecodeError::Rpc {
            offset: self.offset(),
            reason,
        }
    }

    fn u32(&mut self, what: &str) -> DecodeResult<u32> {
        let at = self.offset();
        match u32::unpack(&mut self.cur) {
            Ok((v, _)) => Ok(v),
            Err(e) => Err(DecodeError::Rpc {
                offset: at,
                reason: format!("{what}: {e}"),
            }),
        }
    }

    fn auth(&mut self, what: &str) -> DecodeResult<OpaqueAuth> {
        let flavor = self.u32(what)?;
        let at = self.offset();
        match unpack_opaque_flex(&mut self.cur, Some(MAX_AUTH_BYTES)) {
            Ok((body, _)) => Ok(OpaqueAuth { flavor, body }),
            Err(e) => Err(DecodeError::Rpc {
                offset: at,
                reason: format!("{what} body: {e}"),
            }),
        }
    }
}

fn pack_auth(auth: &OpaqueAuth, out: &mut Vec<u8>) -> anyhow::Result<()> {
    auth.flavor
        .pack(out)
        .map_err(|e| anyhow::anyhow!("Failed to pack auth flavor: {e}"))?;
    pack_opaque_flex(&auth.body, Some(MAX_AUTH_BYTES), out)
        .map_err(|e| anyhow::anyhow!("Failed to pack auth body: {e}"))?;
    Ok(())
}

fn pack_words(words: &[u32], out: &mut Vec<u8>) -> anyhow::Result<()> {
    for w in words {
        w.pack(out)
            .map_err(|e| anyhow::anyhow!("Failed to pack header word: {e}"))?;
    }
    Ok(())
}

impl CallHeader {
    pub fn new(xid: u32, program: u32, version: u32, procedure: u32) -> Self {
        Self {
            xid,
            rpcvers: RPC_VERSION,
            program,
            version,
            procedure,
            cred: OpaqueAuth::default(),
            verf: OpaqueAuth::default(),
        }
    }

    /// Serialize the header, e.g. to build captures
    pub fn encode(&self, out: &mut Vec<u8>) -> anyhow::Result<()> {
        pack_words(
            &[
                self.xid,
                CALL,
                self.rpcvers,
                self.program,
                self.version,
                self.procedure,
            ],
            out,
        )?;
        pack_auth(&self.cred, out)?;
        pack_auth(&self.verf, out)
    }
}

impl ReplyHeader {
    pub fn success(xid: u32) -> Self {
        Self {
            xid,
            status: ReplyStatus::Accepted {
                verf: OpaqueAuth::default(),
                stat: AcceptStat::Success,
            },
        }
    }

    pub fn encode(&self, out: &mut Vec<u8>) -> anyhow::Result<()> {
        pack_words(&[self.xid, REPLY], out)?;
        match &self.status {
            ReplyStatus::Accepted { verf, stat } => {
                pack_words(&[MSG_ACCEPTED], out)?;
                pack_auth(verf, out)?;
                match *stat {
                    AcceptStat::Success => pack_words(&[0], out),
                    AcceptStat::ProgUnavail => pack_words(&[1], out),
                    AcceptStat::ProgMismatch { low, high } => pack_words(&[2, low, high], out),
                    AcceptStat::ProcUnavail => pack_words(&[3], out),
                    AcceptStat::GarbageArgs => pack_words(&[4], out),
                    AcceptStat::SystemErr => pack_words(&[5], out),
                    AcceptStat::Other(v) => pack_words(&[v], out),
                }
            }
            ReplyStatus::Denied(reject) => {
                pack_words(&[MSG_DENIED], out)?;
                match *reject {
                    RejectStat::RpcMismatch { low, high } => pack_words(&[0, low, high], out),
                    RejectStat::AuthError(stat) => pack_words(&[1, stat], out),
                    RejectStat::Other(v) => pack_words(&[v], out),
                }
            }
        }
    }
}
