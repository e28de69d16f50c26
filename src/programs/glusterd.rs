// glusterd peer, cluster and brick management programs

use crate::dissector::Dissector;
use crate::protocol::error::DecodeResult;
use crate::protocol::fields::*;
use crate::protocol::structs::common_reply;

use super::{
    GD_BRICK_PROGRAM, GD_FRIEND_PROGRAM, GD_MGMT_PROGRAM, GLUSTERD1_MGMT_PROGRAM,
    GLUSTERFS_PROGRAM, ProcedureDescriptor as P, ProgramTable,
};

// PROBE_QUERY
fn probe_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.uuid(&UUID)?;
    d.string(&HOSTNAME)?;
    d.int32(&PORT)?;
    Ok(())
}

fn probe_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.uuid(&UUID)?;
    d.string(&HOSTNAME)?;
    d.int32(&PORT)?;
    common_reply(d)?;
    Ok(())
}

// FRIEND_ADD
fn friend_add_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.uuid(&UUID)?;
    d.string(&HOSTNAME)?;
    d.int32(&PORT)?;
    d.dict(&VOLS)
}

fn friend_add_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.uuid(&UUID)?;
    d.string(&HOSTNAME)?;
    common_reply(d)?;
    d.int32(&PORT)?;
    Ok(())
}

// CLUSTER_LOCK and CLUSTER_UNLOCK
fn cluster_lock_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.uuid(&UUID)
}

fn cluster_lock_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.uuid(&UUID)?;
    common_reply(d)?;
    Ok(())
}

// STAGE_OP
fn stage_op_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.uuid(&UUID)?;
    d.uint32(&OP)?;
    d.dict(&DICT)
}

fn stage_op_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.uuid(&UUID)?;
    common_reply(d)?;
    d.string(&OP_ERRSTR)?;
    d.dict(&DICT)
}

fn stage_op_reply_v2(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.uuid(&UUID)?;
    d.uint32(&OP)?;
    common_reply(d)?;
    d.string(&OP_ERRSTR)?;
    d.dict(&DICT)
}

// COMMIT_OP
fn commit_op_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.uuid(&UUID)?;
    d.uint32(&OP)?;
    d.dict(&BUF)
}

fn commit_op_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.uuid(&UUID)?;
    common_reply(d)?;
    d.dict(&BUF)?;
    d.string(&OP_ERRSTR)?;
    Ok(())
}

// FRIEND_UPDATE
fn friend_update_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.uuid(&UUID)?;
    d.dict(&VOLS)?;
    d.int32(&PORT)?;
    Ok(())
}

fn friend_update_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.uuid(&UUID)?;
    d.uint32(&OP)?;
    common_reply(d)?;
    Ok(())
}

// brick operations, all procedures share one layout
fn brick_op_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.string(&NAME)?;
    d.uint32(&OP)?;
    d.dict(&DICT)
}

fn brick_op_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    d.string(&OP_ERRSTR)?;
    d.dict(&DICT)
}

pub static GD_MGMT_V1: ProgramTable = ProgramTable::new(
    "GlusterD Management",
    GD_MGMT_PROGRAM,
    1,
    &[
        P::null(),
        P::new(1, "PROBE_QUERY", probe_call, probe_reply),
        P::new(2, "FRIEND_ADD", friend_add_call, friend_add_reply),
        P::new(3, "CLUSTER_LOCK", cluster_lock_call, cluster_lock_reply),
        P::new(4, "CLUSTER_UNLOCK", cluster_lock_call, cluster_lock_reply),
        P::new(5, "STAGE_OP", stage_op_call, stage_op_reply),
        P::new(6, "COMMIT_OP", commit_op_call, commit_op_reply),
        P::opaque(7, "FRIEND_REMOVE"),
        P::new(8, "FRIEND_UPDATE", friend_update_call, friend_update_reply),
        P::opaque(9, "CLI_PROBE"),
        P::opaque(10, "CLI_DEPROBE"),
        P::opaque(11, "CLI_LIST_FRIENDS"),
        P::opaque(12, "CLI_CREATE_VOLUME"),
        P::opaque(13, "CLI_GET_VOLUME"),
        P::opaque(14, "CLI_DELETE_VOLUME"),
        P::opaque(15, "CLI_START_VOLUME"),
        P::opaque(16, "CLI_STOP_VOLUME"),
        P::opaque(17, "CLI_RENAME_VOLUME"),
        P::opaque(18, "CLI_DEFRAG_VOLUME"),
        P::opaque(19, "CLI_SET_VOLUME"),
        P::opaque(20, "CLI_ADD_BRICK"),
        P::opaque(21, "CLI_REMOVE_BRICK"),
        P::opaque(22, "CLI_REPLACE_BRICK"),
        P::opaque(23, "CLI_LOG_FILENAME"),
        P::opaque(24, "CLI_LOG_LOCATE"),
        P::opaque(25, "CLI_LOG_ROTATE"),
        P::opaque(26, "CLI_SYNC_VOLUME"),
        P::opaque(27, "CLI_RESET_VOLUME"),
        P::opaque(28, "CLI_FSM_LOG"),
        P::opaque(29, "CLI_GSYNC_SET"),
        P::opaque(30, "CLI_PROFILE_VOLUME"),
        P::opaque(31, "BRICK_OP"),
        P::opaque(32, "CLI_LOG_LEVEL"),
        P::opaque(33, "CLI_STATUS_VOLUME"),
    ],
);

pub static GD_MGMT_V2: ProgramTable = ProgramTable::new(
    "GlusterD Management",
    GD_MGMT_PROGRAM,
    2,
    &[
        P::null(),
        P::new(1, "CLUSTER_LOCK", cluster_lock_call, cluster_lock_reply),
        P::new(2, "CLUSTER_UNLOCK", cluster_lock_call, cluster_lock_reply),
        P::new(3, "STAGE_OP", stage_op_call, stage_op_reply_v2),
        P::new(4, "COMMIT_OP", commit_op_call, commit_op_reply),
    ],
);

pub static GD_FRIEND_V2: ProgramTable = ProgramTable::new(
    "GlusterD Friend",
    GD_FRIEND_PROGRAM,
    2,
    &[
        P::null(),
        P::opaque(1, "PROBE_QUERY"),
        P::opaque(2, "FRIEND_ADD"),
        P::opaque(3, "FRIEND_REMOVE"),
        P::opaque(4, "FRIEND_UPDATE"),
    ],
);

pub static GD_BRICK_V2: ProgramTable = ProgramTable::new(
    "GlusterD Brick Operations",
    GD_BRICK_PROGRAM,
    2,
    &[
        P::null(),
        P::new(1, "TERMINATE", brick_op_call, brick_op_reply),
        P::new(2, "XLATOR_INFO", brick_op_call, brick_op_reply),
        P::new(3, "XLATOR_OP", brick_op_call, brick_op_reply),
        P::new(4, "STATUS", brick_op_call, brick_op_reply),
        P::new(5, "OP", brick_op_call, brick_op_reply),
        P::new(6, "XLATOR_DEFRAG", brick_op_call, brick_op_reply),
        P::new(7, "NODE_PROFILE", brick_op_call, brick_op_reply),
        P::new(8, "NODE_STATUS", brick_op_call, brick_op_reply),
    ],
);

pub static GLUSTERD1_MGMT_V1: ProgramTable = ProgramTable::new(
    "Gluster Management",
    GLUSTERD1_MGMT_PROGRAM,
    1,
    &[
        P::null(),
        P::opaque(1, "PROBE_QUERY"),
        P::opaque(2, "FRIEND_ADD"),
        P::opaque(3, "CLUSTER_LOCK"),
        P::opaque(4, "CLUSTER_UNLOCK"),
        P::opaque(5, "STAGE_OP"),
        P::opaque(6, "COMMIT_OP"),
        P::opaque(7, "FRIEND_REMOVE"),
        P::opaque(8, "FRIEND_UPDATE"),
    ],
);

pub static GLUSTERFS_MOPS_V1: ProgramTable = ProgramTable::new(
    "GlusterFS Mops",
    GLUSTERFS_PROGRAM,
    1,
    &[
        P::null(),
        P::opaque(1, "TERMINATE"),
        P::opaque(2, "TRANSLATOR INFO"),
        P::opaque(31, "BRICK_OP"),
    ],
);
