// Gluster RPC programs
//
// One static `ProgramTable` per (program, version). Several versions of a
// program coexist and the brick program reuses the number of the old
// GlusterFS mops program, so lookups always key on both numbers.

pub mod cli;
pub mod dump;
pub mod fops;
pub mod glusterd;
pub mod hndsk;
pub mod pmap;

use crate::dissector::Dissector;
use crate::protocol::error::DecodeResult;
use crate::protocol::structs::common_reply;

pub const GD_MGMT_PROGRAM: u32 = 1238433;
pub const GD_FRIEND_PROGRAM: u32 = 1238437;
pub const GLUSTER_CLI_PROGRAM: u32 = 1238463;
pub const GLUSTERD1_MGMT_PROGRAM: u32 = 1298433;
pub const GLUSTER3_1_FOP_PROGRAM: u32 = 1298437;
pub const GLUSTERFS_PROGRAM: u32 = 4867634;
pub const GD_BRICK_PROGRAM: u32 = 4867634;
pub const GLUSTER_HNDSK_PROGRAM: u32 = 14398633;
pub const GLUSTER_PMAP_PROGRAM: u32 = 34123456;
pub const GLUSTER_CBK_PROGRAM: u32 = 52743234;
pub const GLUSTER_DUMP_PROGRAM: u32 = 123451501;

/// glusterd listens here for management and portmap traffic
pub const GLUSTER_PORT: u16 = 24007;

pub type DecodeFn = fn(&mut Dissector<'_>) -> DecodeResult<()>;

#[derive(Clone, Copy)]
pub enum ProcedureDecoder {
    Implemented(DecodeFn),
    /// Known procedure without a payload grammar
    NotImplemented,
}

impl ProcedureDecoder {
    pub fn is_implemented(&self) -> bool {
        matches!(self, ProcedureDecoder::Implemented(_))
    }
}

impl std::fmt::Debug for ProcedureDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcedureDecoder::Implemented(_) => f.write_str("Implemented"),
            ProcedureDecoder::NotImplemented => f.write_str("NotImplemented"),
        }
    }
}

#[derive(Debug)]
pub struct ProcedureDescriptor {
    pub number: u32,
    pub name: &'static str,
    pub call: ProcedureDecoder,
    pub reply: ProcedureDecoder,
}

impl ProcedureDescriptor {
    pub const fn new(number: u32, name: &'static str, call: DecodeFn, reply: DecodeFn) -> Self {
        Self {
            number,
            name,
            call: ProcedureDecoder::Implemented(call),
            reply: ProcedureDecoder::Implemented(reply),
        }
    }

    /// Reply has a grammar, the call does not
    pub const fn reply_only(number: u32, name: &'static str, reply: DecodeFn) -> Self {
        Self {
            number,
            name,
            call: ProcedureDecoder::NotImplemented,
            reply: ProcedureDecoder::Implemented(reply),
        }
    }

    pub const fn opaque(number: u32, name: &'static str) -> Self {
        Self {
            number,
            name,
            call: ProcedureDecoder::NotImplemented,
            reply: ProcedureDecoder::NotImplemented,
        }
    }

    /// Procedure 0: no arguments, no results
    pub const fn null() -> Self {
        Self::new(0, "NULL", empty, empty)
    }
}

pub struct ProgramTable {
    pub name: &'static str,
    pub program: u32,
    pub version: u32,
    pub procedures: &'static [ProcedureDescriptor],
    /// Decoder for a reply rejected before reaching the procedure
    pub error_reply: DecodeFn,
}

impl ProgramTable {
    pub const fn new(
        name: &'static str,
        program: u32,
        version: u32,
        procedures: &'static [ProcedureDescriptor],
    ) -> Self {
        Self {
            name,
            program,
            version,
            procedures,
            error_reply: common_reply_only,
        }
    }

    pub const fn with_error_reply(self, error_reply: DecodeFn) -> Self {
        Self {
            error_reply,
            ..self
        }
    }

    pub fn procedure(&self, number: u32) -> Option<&'static ProcedureDescriptor> {
        self.procedures.iter().find(|p| p.number == number)
    }
}

impl std::fmt::Debug for ProgramTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramTable")
            .field("name", &self.name)
            .field("program", &self.program)
            .field("version", &self.version)
            .field("procedures", &self.procedures.len())
            .finish()
    }
}

/// Every built-in table
pub static TABLES: &[&ProgramTable] = &[
    &glusterd::GD_MGMT_V1,
    &glusterd::GD_MGMT_V2,
    &glusterd::GD_FRIEND_V2,
    &glusterd::GD_BRICK_V2,
    &glusterd::GLUSTERD1_MGMT_V1,
    &glusterd::GLUSTERFS_MOPS_V1,
    &cli::GLUSTER_CLI_V1,
    &fops::GLUSTER3_1_FOP_V310,
    &fops::GLUSTER3_3_FOP_V330,
    &hndsk::GLUSTER_HNDSK_V1,
    &hndsk::GLUSTER_HNDSK_V2,
    &hndsk::GLUSTER_CBK_V1,
    &pmap::GLUSTER_PMAP_V1,
    &dump::GLUSTER_DUMP_V1,
];

fn empty(_d: &mut Dissector<'_>) -> DecodeResult<()> {
    Ok(())
}

fn common_reply_only(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d).map(|_| ())
}
