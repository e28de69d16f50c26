// GlusterFS file operations
//
// Two generations of the same program number: 3.1 (version 310) and 3.3
// (version 330). 3.3 appends an xdata dictionary to every request and to
// nearly every reply, and drops the path strings 3.1 carried alongside
// each GFID.

use crate::dissector::Dissector;
use crate::protocol::error::DecodeResult;
use crate::protocol::fields::*;
use crate::protocol::structs::{
    common_reply, common_reply_xdata, dirent, errno_text, flock, iatt, statfs,
};

use super::{GLUSTER3_1_FOP_PROGRAM, ProcedureDescriptor as P, ProgramTable};

/// Procedure names, indexed by number
pub const GFS3_OP_NAMES: [&str; 43] = [
    "NULL", "STAT", "READLINK", "MKNOD", "MKDIR", "UNLINK", "RMDIR", "SYMLINK", "RENAME",
    "LINK", "TRUNCATE", "OPEN", "READ", "WRITE", "STATFS", "FLUSH", "FSYNC", "SETXATTR",
    "GETXATTR", "REMOVEXATTR", "OPENDIR", "FSYNCDIR", "ACCESS", "CREATE", "FTRUNCATE",
    "FSTAT", "LK", "LOOKUP", "READDIR", "INODELK", "FINODELK", "ENTRYLK", "FENTRYLK",
    "XATTROP", "FXATTROP", "FGETXATTR", "FSETXATTR", "RCHECKSUM", "SETATTR", "FSETATTR",
    "READDIRP", "RELEASE", "RELEASEDIR",
];

const fn op(number: u32, call: super::DecodeFn, reply: super::DecodeFn) -> P {
    P::new(number, GFS3_OP_NAMES[number as usize], call, reply)
}

const fn opaque(number: u32) -> P {
    P::opaque(number, GFS3_OP_NAMES[number as usize])
}

// READDIRP replies stream in several messages; op_errno says whether
// another one follows.
fn readdirp_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.int32(&ENTRIES)?;
    let errno = d.int32(&OP_ERRNO)?;
    match errno {
        0 => d.note("More READDIRP replies follow"),
        libc::ENOENT => d.note("Last READDIRP reply"),
        other => d.note(errno_text(other)),
    }
    d.list(&ENTRY_LIST, &ENTRY, dirent)?;
    Ok(())
}

// ---- 3.1 ----

fn unlink_call_310(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&PARGFID)?;
    d.string(&PATH)?;
    d.string(&BNAME)?;
    Ok(())
}

fn unlink_reply_310(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    iatt(d, &PREPARENT)?;
    iatt(d, &POSTPARENT)
}

fn gfid_path_call_310(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.string(&PATH)?;
    Ok(())
}

fn statfs_reply_310(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    statfs(d)
}

fn flush_call_310(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint64(&FD)?;
    Ok(())
}

fn common_reply_310(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d).map(|_| ())
}

fn setxattr_call_310(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint32(&FLAGS)?;
    d.dict(&DICT)?;
    d.string(&PATH)?;
    Ok(())
}

fn opendir_reply_310(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    d.uint64(&FD)?;
    Ok(())
}

fn create_call_310(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&PARGFID)?;
    d.uint32(&FLAGS)?;
    d.uint32(&MODE)?;
    d.string(&PATH)?;
    d.string(&BNAME)?;
    d.dict(&DICT)
}

fn create_reply_310(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    iatt(d, &STAT)?;
    d.uint64(&FD)?;
    iatt(d, &PREPARENT)?;
    iatt(d, &POSTPARENT)
}

fn lookup_call_310(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.gfid(&PARGFID)?;
    d.uint32(&FLAGS)?;
    d.string(&PATH)?;
    d.string(&BNAME)?;
    d.dict(&DICT)
}

fn lookup_reply_310(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    iatt(d, &STAT)?;
    iatt(d, &POSTPARENT)?;
    d.dict(&DICT)
}

fn inodelk_call_310(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.int32(&CMD)?;
    d.int32(&TYPE)?;
    flock(d)?;
    d.string(&PATH)?;
    d.string(&VOLUME)?;
    Ok(())
}

fn setattr_call_310(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    iatt(d, &STBUF)?;
    d.uint32(&SETATTR_VALID)?;
    d.string(&PATH)?;
    Ok(())
}

fn setattr_reply_310(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    iatt(d, &STATPRE)?;
    iatt(d, &STATPOST)
}

fn readdirp_call_310(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint64(&FD)?;
    d.uint64(&OFFSET)?;
    d.uint32(&SIZE)?;
    Ok(())
}

pub static GLUSTER3_1_FOP_V310: ProgramTable = ProgramTable::new(
    "GlusterFS 3.1",
    GLUSTER3_1_FOP_PROGRAM,
    310,
    &[
        P::null(),
        opaque(1),
        opaque(2),
        opaque(3),
        opaque(4),
        op(5, unlink_call_310, unlink_reply_310),
        opaque(6),
        opaque(7),
        opaque(8),
        opaque(9),
        opaque(10),
        opaque(11),
        opaque(12),
        opaque(13),
        op(14, gfid_path_call_310, statfs_reply_310),
        op(15, flush_call_310, common_reply_310),
        opaque(16),
        op(17, setxattr_call_310, common_reply_310),
        opaque(18),
        opaque(19),
        op(20, gfid_path_call_310, opendir_reply_310),
        opaque(21),
        opaque(22),
        op(23, create_call_310, create_reply_310),
        opaque(24),
        opaque(25),
        opaque(26),
        op(27, lookup_call_310, lookup_reply_310),
        opaque(28),
        op(29, inodelk_call_310, common_reply_310),
        opaque(30),
        opaque(31),
        opaque(32),
        opaque(33),
        opaque(34),
        opaque(35),
        opaque(36),
        opaque(37),
        op(38, setattr_call_310, setattr_reply_310),
        op(39, setattr_call_310, setattr_reply_310),
        op(40, readdirp_call_310, readdirp_reply),
        opaque(41),
        opaque(42),
    ],
);

// ---- 3.3 ----

// shared reply layouts

/// STAT, FSTAT
fn stat_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    iatt(d, &STAT)?;
    d.dict(&XDATA)
}

/// MKNOD, MKDIR, SYMLINK, LINK
fn entry_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    iatt(d, &STAT)?;
    iatt(d, &PREPARENT)?;
    iatt(d, &POSTPARENT)?;
    d.dict(&XDATA)
}

/// UNLINK, RMDIR
fn parent_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    iatt(d, &PREPARENT)?;
    iatt(d, &POSTPARENT)?;
    d.dict(&XDATA)
}

/// TRUNCATE, FTRUNCATE, WRITE, FSYNC
fn prepost_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    iatt(d, &PRESTAT)?;
    iatt(d, &POSTSTAT)?;
    d.dict(&XDATA)
}

/// OPEN, OPENDIR
fn fd_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    d.uint64(&FD)?;
    d.dict(&XDATA)
}

/// GETXATTR, FGETXATTR, XATTROP, FXATTROP
fn dict_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    d.dict(&DICT)?;
    d.dict(&XDATA)
}

/// FLUSH, SETXATTR, REMOVEXATTR, ... every reply with no payload
fn common_reply_330(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply_xdata(d)
}

// shared call layouts

/// STAT, OPENDIR
fn gfid_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.dict(&XDATA)
}

/// FSTAT, FLUSH, FSYNC, RELEASE, RELEASEDIR
fn gfid_fd_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint64(&FD)?;
    d.dict(&XDATA)
}

/// READ, WRITE
fn io_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint64(&FD)?;
    d.uint64(&OFFSET)?;
    d.uint32(&SIZE)?;
    d.uint32(&FLAGS)?;
    d.dict(&XDATA)
}

/// READDIR, READDIRP
fn readdir_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint64(&FD)?;
    d.uint64(&OFFSET)?;
    d.uint32(&SIZE)?;
    d.dict(&XDATA)
}

/// SETATTR, FSETATTR
fn setattr_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    iatt(d, &STBUF)?;
    d.uint32(&SETATTR_VALID)?;
    d.dict(&XDATA)
}

fn setattr_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    iatt(d, &STATPRE)?;
    iatt(d, &STATPOST)?;
    d.dict(&XDATA)
}

fn readlink_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint32(&SIZE)?;
    d.dict(&XDATA)
}

fn readlink_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    iatt(d, &BUF_IATT)?;
    d.string(&PATH)?;
    d.dict(&XDATA)
}

fn mknod_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&PARGFID)?;
    d.uint64(&DEV)?;
    d.uint32(&MODE)?;
    d.uint32(&UMASK)?;
    d.string(&BNAME)?;
    d.dict(&XDATA)
}

fn mkdir_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&PARGFID)?;
    d.uint32(&MODE)?;
    d.uint32(&UMASK)?;
    d.string(&BNAME)?;
    d.dict(&XDATA)
}

fn unlink_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&PARGFID)?;
    d.string(&BNAME)?;
    d.uint32(&XFLAGS)?;
    d.dict(&XDATA)
}

fn rmdir_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&PARGFID)?;
    d.uint32(&XFLAGS)?;
    d.string(&BNAME)?;
    d.dict(&XDATA)
}

fn symlink_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&PARGFID)?;
    d.string(&BNAME)?;
    d.uint32(&UMASK)?;
    d.string(&LINKNAME)?;
    d.dict(&XDATA)
}

fn rename_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&OLDGFID)?;
    d.gfid(&NEWGFID)?;
    d.string(&OLDBNAME)?;
    d.string(&NEWBNAME)?;
    d.dict(&XDATA)
}

fn rename_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    iatt(d, &STAT)?;
    iatt(d, &PREOLDPARENT)?;
    iatt(d, &POSTOLDPARENT)?;
    iatt(d, &PRENEWPARENT)?;
    iatt(d, &POSTNEWPARENT)?;
    d.dict(&XDATA)
}

fn link_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&OLDGFID)?;
    d.gfid(&NEWGFID)?;
    d.string(&NEWBNAME)?;
    d.dict(&XDATA)
}

fn truncate_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint64(&OFFSET)?;
    d.dict(&XDATA)
}

fn open_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint32(&FLAGS)?;
    d.dict(&XDATA)
}

fn read_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    iatt(d, &STAT)?;
    d.uint32(&SIZE)?;
    d.dict(&XDATA)
}

fn statfs_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    statfs(d)?;
    d.dict(&XDATA)
}

fn setxattr_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint32(&FLAGS)?;
    d.dict(&DICT)?;
    d.dict(&XDATA)
}

fn getxattr_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint32(&NAMELEN)?;
    d.string(&NAME)?;
    d.dict(&XDATA)
}

fn removexattr_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.string(&NAME)?;
    d.dict(&XDATA)
}

fn fsyncdir_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint64(&FD)?;
    d.int32(&FSYNCDIR_DATA)?;
    d.dict(&XDATA)
}

fn access_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint32(&MASK)?;
    d.dict(&XDATA)
}

fn create_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&PARGFID)?;
    d.uint32(&FLAGS)?;
    d.uint32(&MODE)?;
    d.uint32(&UMASK)?;
    d.string(&BNAME)?;
    d.dict(&XDATA)
}

fn create_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    iatt(d, &STAT)?;
    d.uint64(&FD)?;
    iatt(d, &PREPARENT)?;
    iatt(d, &POSTPARENT)?;
    d.dict(&XDATA)
}

fn ftruncate_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint64(&FD)?;
    d.uint64(&OFFSET)?;
    d.dict(&XDATA)
}

fn lk_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint64(&FD)?;
    d.int32(&CMD)?;
    d.int32(&TYPE)?;
    flock(d)?;
    d.dict(&XDATA)
}

fn lk_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    flock(d)?;
    d.dict(&XDATA)
}

fn lookup_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.gfid(&PARGFID)?;
    d.uint32(&FLAGS)?;
    d.string(&BNAME)?;
    d.dict(&XDATA)
}

fn lookup_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    iatt(d, &STAT)?;
    iatt(d, &POSTPARENT)?;
    d.dict(&XDATA)
}

fn inodelk_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.int32(&CMD)?;
    d.int32(&TYPE)?;
    flock(d)?;
    d.string(&VOLUME)?;
    d.dict(&XDATA)
}

fn finodelk_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint64(&FD)?;
    d.int32(&CMD)?;
    d.int32(&TYPE)?;
    flock(d)?;
    d.string(&VOLUME)?;
    d.dict(&XDATA)
}

fn entrylk_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.int32(&CMD)?;
    d.int32(&TYPE)?;
    d.uint64(&ENTRYLK_NAMELEN)?;
    d.string(&NAME)?;
    d.string(&VOLUME)?;
    d.dict(&XDATA)
}

fn fentrylk_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint64(&FD)?;
    d.int32(&CMD)?;
    d.int32(&TYPE)?;
    d.uint64(&ENTRYLK_NAMELEN)?;
    d.string(&NAME)?;
    d.string(&VOLUME)?;
    d.dict(&XDATA)
}

fn xattrop_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint32(&FLAGS)?;
    d.dict(&DICT)?;
    d.dict(&XDATA)
}

fn fxattrop_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint32(&FLAGS)?;
    d.uint64(&FD)?;
    d.dict(&DICT)?;
    d.dict(&XDATA)
}

fn fgetxattr_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint64(&FD)?;
    d.uint32(&NAMELEN)?;
    d.string(&NAME)?;
    d.dict(&XDATA)
}

fn fsetxattr_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.gfid(&GFID)?;
    d.uint64(&FD)?;
    d.uint32(&FLAGS)?;
    d.dict(&DICT)?;
    d.dict(&XDATA)
}

pub static GLUSTER3_3_FOP_V330: ProgramTable = ProgramTable::new(
    "GlusterFS 3.3",
    GLUSTER3_1_FOP_PROGRAM,
    330,
    &[
        P::null(),
        op(1, gfid_call, stat_reply),
        op(2, readlink_call, readlink_reply),
        op(3, mknod_call, entry_reply),
        op(4, mkdir_call, entry_reply),
        op(5, unlink_call, parent_reply),
        op(6, rmdir_call, parent_reply),
        op(7, symlink_call, entry_reply),
        op(8, rename_call, rename_reply),
        op(9, link_call, entry_reply),
        op(10, truncate_call, prepost_reply),
        op(11, open_call, fd_reply),
        op(12, io_call, read_reply),
        op(13, io_call, prepost_reply),
        op(14, gfid_call, statfs_reply),
        op(15, gfid_fd_call, common_reply_330),
        op(16, gfid_fd_call, prepost_reply),
        op(17, setxattr_call, common_reply_330),
        op(18, getxattr_call, dict_reply),
        op(19, removexattr_call, common_reply_330),
        op(20, gfid_call, fd_reply),
        op(21, fsyncdir_call, common_reply_330),
        op(22, access_call, common_reply_330),
        op(23, create_call, create_reply),
        op(24, ftruncate_call, prepost_reply),
        op(25, gfid_fd_call, stat_reply),
        op(26, lk_call, lk_reply),
        op(27, lookup_call, lookup_reply),
        op(28, readdir_call, common_reply_330),
        op(29, inodelk_call, common_reply_330),
        op(30, finodelk_call, common_reply_330),
        op(31, entrylk_call, common_reply_330),
        op(32, fentrylk_call, common_reply_330),
        op(33, xattrop_call, dict_reply),
        op(34, fxattrop_call, dict_reply),
        op(35, fgetxattr_call, dict_reply),
        op(36, fsetxattr_call, common_reply_330),
        opaque(37),
        op(38, setattr_call, setattr_reply),
        op(39, setattr_call, setattr_reply),
        op(40, readdir_call, readdirp_reply),
        op(41, gfid_fd_call, common_reply_330),
        op(42, gfid_fd_call, common_reply_330),
    ],
)
.with_error_reply(common_reply_330);
