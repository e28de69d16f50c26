// Header field definitions
//
// Every decoded item is tagged with one of these descriptors. They are
// plain statics; `FieldRegistry` indexes them by abbreviation once at
// startup and checks that no two share an abbreviation.

use std::collections::BTreeMap;

/// How a field is read off the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U32,
    I32,
    U64,
    /// 16 opaque bytes
    Gfid,
    /// 64 bytes read as 16 big-endian words
    Uuid,
    /// Length-prefixed, padded string
    Str,
    /// Serialized `dict_t`
    Dict,
    /// Composite structure
    Tree,
    /// Repeated optional-data items
    List,
}

/// Display base for integer fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    None,
    Dec,
    Hex,
    Oct,
}

pub type ValueStrings = &'static [(u32, &'static str)];

#[derive(Debug, PartialEq, Eq)]
pub struct HeaderField {
    pub name: &'static str,
    pub abbrev: &'static str,
    pub kind: FieldKind,
    pub base: Base,
    pub strings: Option<ValueStrings>,
}

impl HeaderField {
    pub const fn new(name: &'static str, abbrev: &'static str, kind: FieldKind) -> Self {
        let base = match kind {
            FieldKind::U32 | FieldKind::I32 | FieldKind::U64 => Base::Dec,
            _ => Base::None,
        };
        Self {
            name,
            abbrev,
            kind,
            base,
            strings: None,
        }
    }

    pub const fn hex(self) -> Self {
        Self {
            base: Base::Hex,
            ..self
        }
    }

    pub const fn oct(self) -> Self {
        Self {
            base: Base::Oct,
            ..self
        }
    }

    pub const fn vals(self, strings: ValueStrings) -> Self {
        Self {
            strings: Some(strings),
            ..self
        }
    }

    /// Symbolic name for an integer value, if this field has a table
    pub fn lookup(&self, value: u32) -> Option<&'static str> {
        self.strings?
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, s)| *s)
    }
}

/// glusterd operations (`glusterd_op_t`)
pub const GD_OP_VALS: ValueStrings = &[
    (0, "NONE"),
    (1, "CREATE_VOLUME"),
    (2, "START_BRICK"),
    (3, "STOP_BRICK"),
    (4, "DELETE_VOLUME"),
    (5, "START_VOLUME"),
    (6, "STOP_VOLUME"),
    (7, "DEFRAG_VOLUME"),
    (8, "ADD_BRICK"),
    (9, "REMOVE_BRICK"),
    (10, "REPLACE_BRICK"),
    (11, "SET_VOLUME"),
    (12, "RESET_VOLUME"),
    (13, "SYNC_VOLUME"),
    (14, "LOG_ROTATE"),
    (15, "GSYNC_SET"),
    (16, "PROFILE_VOLUME"),
    (17, "QUOTA"),
    (18, "STATUS_VOLUME"),
    (19, "REBALANCE"),
    (20, "HEAL_VOLUME"),
    (21, "STATEDUMP_VOLUME"),
    (22, "LIST_VOLUME"),
    (23, "CLEARLOCKS_VOLUME"),
    (24, "DEFRAG_BRICK_VOLUME"),
];

/// `d_type` of a directory entry
pub const DT_VALS: ValueStrings = &[
    (0, "DT_UNKNOWN"),
    (1, "DT_FIFO"),
    (2, "DT_CHR"),
    (4, "DT_DIR"),
    (6, "DT_BLK"),
    (8, "DT_REG"),
    (10, "DT_LNK"),
    (12, "DT_SOCK"),
    (14, "DT_WHT"),
];

pub const LK_CMD_VALS: ValueStrings = &[
    (0, "GF_LK_GETLK"),
    (1, "GF_LK_SETLK"),
    (2, "GF_LK_SETLKW"),
    (3, "GF_LK_RESLK_LCK"),
    (4, "GF_LK_RESLK_LCKW"),
    (5, "GF_LK_RESLK_UNLCK"),
    (6, "GF_LK_GETLK_FD"),
];

pub const LK_TYPE_VALS: ValueStrings = &[
    (0, "GF_LK_F_RDLCK"),
    (1, "GF_LK_F_WRLCK"),
    (2, "GF_LK_F_UNLCK"),
    (3, "GF_LK_EOL"),
];

use FieldKind::*;

// identifiers
pub static GFID: HeaderField = HeaderField::new("GFID", "gluster.gfid", Gfid);
pub static PARGFID: HeaderField = HeaderField::new("Parent GFID", "gluster.pargfid", Gfid);
pub static OLDGFID: HeaderField = HeaderField::new("Old GFID", "gluster.oldgfid", Gfid);
pub static NEWGFID: HeaderField = HeaderField::new("New GFID", "gluster.newgfid", Gfid);
pub static UUID: HeaderField = HeaderField::new("UUID", "gluster.uuid", Uuid);

// reply header
pub static OP_RET: HeaderField = HeaderField::new("Return value", "gluster.op_ret", I32);
pub static OP_ERRNO: HeaderField = HeaderField::new("Errno", "gluster.op_errno", I32);
pub static OP_ERRSTR: HeaderField = HeaderField::new("Error String", "gluster.op_errstr", Str);

// dictionaries
pub static DICT: HeaderField = HeaderField::new("Dict", "gluster.dict", Dict);
pub static XDATA: HeaderField = HeaderField::new("Extra Data", "gluster.xdata", Dict);
pub static VOLS: HeaderField = HeaderField::new("Volumes", "gluster.vols", Dict);
pub static BUF: HeaderField = HeaderField::new("Buffer", "gluster.buffer", Dict);

// peer management
pub static HOSTNAME: HeaderField = HeaderField::new("Hostname", "gluster.hostname", Str);
pub static PORT: HeaderField = HeaderField::new("Port", "gluster.port", I32);
pub static OP: HeaderField = HeaderField::new("Operation", "gluster.op", U32).vals(GD_OP_VALS);

// handshake and callbacks
pub static KEY: HeaderField = HeaderField::new("Key", "gluster.key", Str);
pub static SPEC: HeaderField = HeaderField::new("Spec", "gluster.spec", Str);
pub static UID: HeaderField = HeaderField::new("Lock Owner", "gluster.uid", Str);
pub static LK_VER: HeaderField = HeaderField::new("Lock Version", "gluster.lk_ver", U32);
pub static EVENT_OP: HeaderField = HeaderField::new("Event Op", "gluster.event_notify_op", U32);

// portmap
pub static BRICK: HeaderField = HeaderField::new("Brick", "gluster.brick", Str);
pub static BRICK_STATUS: HeaderField = HeaderField::new("Status", "gluster.brick.status", I32);
pub static BRICK_PORT: HeaderField = HeaderField::new("Port", "gluster.brick.port", I32);

// dump
pub static GFSID: HeaderField = HeaderField::new("GFS ID", "gluster.gfsid", U64).hex();
pub static PROGRAMS: HeaderField = HeaderField::new("Programs", "gluster.dump.programs", List);
pub static PROGRAM: HeaderField = HeaderField::new("Program", "gluster.dump.program", Tree);
pub static PROGNAME: HeaderField = HeaderField::new("Program Name", "gluster.dump.progname", Str);
pub static PROGNUM: HeaderField = HeaderField::new("Program Number", "gluster.dump.prognum", U64);
pub static PROGVER: HeaderField = HeaderField::new("Program Version", "gluster.dump.progver", U64);

// file operation arguments
pub static PATH: HeaderField = HeaderField::new("Path", "gluster.path", Str);
pub static BNAME: HeaderField = HeaderField::new("Basename", "gluster.bname", Str);
pub static OLDBNAME: HeaderField = HeaderField::new("Old Basename", "gluster.oldbname", Str);
pub static NEWBNAME: HeaderField = HeaderField::new("New Basename", "gluster.newbname", Str);
pub static LINKNAME: HeaderField = HeaderField::new("Linkname", "gluster.linkname", Str);
pub static NAME: HeaderField = HeaderField::new("Name", "gluster.name", Str);
pub static NAMELEN: HeaderField = HeaderField::new("Name Length", "gluster.namelen", U32);
pub static ENTRYLK_NAMELEN: HeaderField =
    HeaderField::new("Name Length", "gluster.entrylk.namelen", U64);
pub static VOLUME: HeaderField = HeaderField::new("Volume", "gluster.volume", Str);
pub static FD: HeaderField = HeaderField::new("File Descriptor", "gluster.fd", U64);
pub static OFFSET: HeaderField = HeaderField::new("Offset", "gluster.offset", U64);
pub static DEV: HeaderField = HeaderField::new("Device", "gluster.dev", U64).hex();
pub static SIZE: HeaderField = HeaderField::new("Size", "gluster.size", U32);
pub static FLAGS: HeaderField = HeaderField::new("Flags", "gluster.flags", U32).oct();
pub static XFLAGS: HeaderField = HeaderField::new("XFlags", "gluster.xflags", U32).oct();
pub static MODE: HeaderField = HeaderField::new("Mode", "gluster.mode", U32).oct();
pub static UMASK: HeaderField = HeaderField::new("Umask", "gluster.umask", U32).oct();
pub static MASK: HeaderField = HeaderField::new("Mask", "gluster.mask", U32).oct();
pub static CMD: HeaderField = HeaderField::new("Command", "gluster.cmd", I32).vals(LK_CMD_VALS);
pub static TYPE: HeaderField = HeaderField::new("Type", "gluster.type", I32).vals(LK_TYPE_VALS);
pub static ENTRIES: HeaderField = HeaderField::new("Entries returned", "gluster.entries", I32);
pub static FSYNCDIR_DATA: HeaderField = HeaderField::new("Data", "gluster.fsyncdir.data", I32);
pub static SETATTR_VALID: HeaderField =
    HeaderField::new("Valid", "gluster.setattr.valid", U32).hex();

// iatt
pub static IA_INO: HeaderField = HeaderField::new("ia_ino", "gluster.ia_ino", U64);
pub static IA_DEV: HeaderField = HeaderField::new("ia_dev", "gluster.ia_dev", U64).hex();
pub static IA_MODE: HeaderField = HeaderField::new("ia_mode", "gluster.ia_mode", U32).oct();
pub static IA_NLINK: HeaderField = HeaderField::new("ia_nlink", "gluster.ia_nlink", U32);
pub static IA_UID: HeaderField = HeaderField::new("ia_uid", "gluster.ia_uid", U32);
pub static IA_GID: HeaderField = HeaderField::new("ia_gid", "gluster.ia_gid", U32);
pub static IA_RDEV: HeaderField = HeaderField::new("ia_rdev", "gluster.ia_rdev", U64).hex();
pub static IA_SIZE: HeaderField = HeaderField::new("ia_size", "gluster.ia_size", U64);
pub static IA_BLKSIZE: HeaderField = HeaderField::new("ia_blksize", "gluster.ia_blksize", U32);
pub static IA_BLOCKS: HeaderField = HeaderField::new("ia_blocks", "gluster.ia_blocks", U64);
pub static IA_ATIME: HeaderField = HeaderField::new("ia_atime", "gluster.ia_atime", U32);
pub static IA_ATIME_NSEC: HeaderField =
    HeaderField::new("ia_atime_nsec", "gluster.ia_atime_nsec", U32);
pub static IA_MTIME: HeaderField = HeaderField::new("ia_mtime", "gluster.ia_mtime", U32);
pub static IA_MTIME_NSEC: HeaderField =
    HeaderField::new("ia_mtime_nsec", "gluster.ia_mtime_nsec", U32);
pub static IA_CTIME: HeaderField = HeaderField::new("ia_ctime", "gluster.ia_ctime", U32);
pub static IA_CTIME_NSEC: HeaderField =
    HeaderField::new("ia_ctime_nsec", "gluster.ia_ctime_nsec", U32);

// iatt placements
pub static STAT: HeaderField = HeaderField::new("Stat IATT", "gluster.stat", Tree);
pub static BUF_IATT: HeaderField = HeaderField::new("Buf IATT", "gluster.buf", Tree);
pub static STBUF: HeaderField = HeaderField::new("Stbuf IATT", "gluster.stbuf", Tree);
pub static PRESTAT: HeaderField = HeaderField::new("PreStat IATT", "gluster.prestat", Tree);
pub static POSTSTAT: HeaderField = HeaderField::new("PostStat IATT", "gluster.poststat", Tree);
pub static STATPRE: HeaderField = HeaderField::new("StatPre IATT", "gluster.statpre", Tree);
pub static STATPOST: HeaderField = HeaderField::new("StatPost IATT", "gluster.statpost", Tree);
pub static PREPARENT: HeaderField =
    HeaderField::new("PreParent IATT", "gluster.preparent", Tree);
pub static POSTPARENT: HeaderField =
    HeaderField::new("PostParent IATT", "gluster.postparent", Tree);
pub static PREOLDPARENT: HeaderField =
    HeaderField::new("PreOldParent IATT", "gluster.preoldparent", Tree);
pub static POSTOLDPARENT: HeaderField =
    HeaderField::new("PostOldParent IATT", "gluster.postoldparent", Tree);
pub static PRENEWPARENT: HeaderField =
    HeaderField::new("PreNewParent IATT", "gluster.prenewparent", Tree);
pub static POSTNEWPARENT: HeaderField =
    HeaderField::new("PostNewParent IATT", "gluster.postnewparent", Tree);

// flock
pub static FLOCK: HeaderField = HeaderField::new("Flock", "gluster.flock", Tree);
pub static FLOCK_TYPE: HeaderField =
    HeaderField::new("Type", "gluster.flock.type", U32).vals(LK_TYPE_VALS);
pub static FLOCK_WHENCE: HeaderField = HeaderField::new("Whence", "gluster.flock.whence", U32);
pub static FLOCK_START: HeaderField = HeaderField::new("Start", "gluster.flock.start", U64);
pub static FLOCK_LEN: HeaderField = HeaderField::new("Length", "gluster.flock.len", U64);
pub static FLOCK_PID: HeaderField = HeaderField::new("Pid", "gluster.flock.pid", I32);
pub static FLOCK_OWNER: HeaderField =
    HeaderField::new("Owner", "gluster.flock.owner", U64).hex();

// statfs
pub static STATFS: HeaderField = HeaderField::new("Statfs", "gluster.statfs", Tree);
pub static STATFS_BSIZE: HeaderField = HeaderField::new("bsize", "gluster.statfs.bsize", U64);
pub static STATFS_FRSIZE: HeaderField = HeaderField::new("frsize", "gluster.statfs.frsize", U64);
pub static STATFS_BLOCKS: HeaderField = HeaderField::new("blocks", "gluster.statfs.blocks", U64);
pub static STATFS_BFREE: HeaderField = HeaderField::new("bfree", "gluster.statfs.bfree", U64);
pub static STATFS_BAVAIL: HeaderField = HeaderField::new("bavail", "gluster.statfs.bavail", U64);
pub static STATFS_FILES: HeaderField = HeaderField::new("files", "gluster.statfs.files", U64);
pub static STATFS_FFREE: HeaderField = HeaderField::new("ffree", "gluster.statfs.ffree", U64);
pub static STATFS_FAVAIL: HeaderField = HeaderField::new("favail", "gluster.statfs.favail", U64);
pub static STATFS_FSID: HeaderField = HeaderField::new("fsid", "gluster.statfs.fsid", U64).hex();
pub static STATFS_FLAG: HeaderField = HeaderField::new("flag", "gluster.statfs.flag", U64).hex();
pub static STATFS_NAMEMAX: HeaderField =
    HeaderField::new("namemax", "gluster.statfs.namemax", U64);

// directory entries
pub static ENTRY_LIST: HeaderField = HeaderField::new("Entries", "gluster.entry_list", List);
pub static ENTRY: HeaderField = HeaderField::new("Entry", "gluster.entry", Tree);
pub static ENTRY_INO: HeaderField = HeaderField::new("Inode", "gluster.entry.ino", U64);
pub static ENTRY_OFF: HeaderField = HeaderField::new("Offset", "gluster.entry.d_off", U64);
pub static ENTRY_LEN: HeaderField = HeaderField::new("Path length", "gluster.entry.len", U32);
pub static ENTRY_TYPE: HeaderField =
    HeaderField::new("Type", "gluster.entry.d_type", U32).vals(DT_VALS);
pub static ENTRY_PATH: HeaderField = HeaderField::new("Path", "gluster.entry.path", Str);

/// Every field a decoder may emit
pub static ALL: &[&HeaderField] = &[
    &GFID, &PARGFID, &OLDGFID, &NEWGFID, &UUID,
    &OP_RET, &OP_ERRNO, &OP_ERRSTR,
    &DICT, &XDATA, &VOLS, &BUF,
    &HOSTNAME, &PORT, &OP,
    &KEY, &SPEC, &UID, &LK_VER, &EVENT_OP,
    &BRICK, &BRICK_STATUS, &BRICK_PORT,
    &GFSID, &PROGRAMS, &PROGRAM, &PROGNAME, &PROGNUM, &PROGVER,
    &PATH, &BNAME, &OLDBNAME, &NEWBNAME, &LINKNAME, &NAME, &NAMELEN, &ENTRYLK_NAMELEN,
    &VOLUME, &FD, &OFFSET, &DEV, &SIZE, &FLAGS, &XFLAGS, &MODE, &UMASK, &MASK,
    &CMD, &TYPE, &ENTRIES, &FSYNCDIR_DATA, &SETATTR_VALID,
    &IA_INO, &IA_DEV, &IA_MODE, &IA_NLINK, &IA_UID, &IA_GID, &IA_RDEV, &IA_SIZE,
    &IA_BLKSIZE, &IA_BLOCKS, &IA_ATIME, &IA_ATIME_NSEC, &IA_MTIME, &IA_MTIME_NSEC,
    &IA_CTIME, &IA_CTIME_NSEC,
    &STAT, &BUF_IATT, &STBUF, &PRESTAT, &POSTSTAT, &STATPRE, &STATPOST,
    &PREPARENT, &POSTPARENT, &PREOLDPARENT, &POSTOLDPARENT, &PRENEWPARENT, &POSTNEWPARENT,
    &FLOCK, &FLOCK_TYPE, &FLOCK_WHENCE, &FLOCK_START, &FLOCK_LEN, &FLOCK_PID, &FLOCK_OWNER,
    &STATFS, &STATFS_BSIZE, &STATFS_FRSIZE, &STATFS_BLOCKS, &STATFS_BFREE, &STATFS_BAVAIL,
    &STATFS_FILES, &STATFS_FFREE, &STATFS_FAVAIL, &STATFS_FSID, &STATFS_FLAG,
    &STATFS_NAMEMAX,
    &ENTRY_LIST, &ENTRY, &ENTRY_INO, &ENTRY_OFF, &ENTRY_LEN, &ENTRY_TYPE, &ENTRY_PATH,
];

/// Duplicate abbreviation found while indexing fields
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("field abbreviation {0} registered twice")]
pub struct DuplicateField(pub &'static str);

/// Abbreviation index over the field statics
#[derive(Debug)]
pub struct FieldRegistry {
    by_abbrev: BTreeMap<&'static str, &'static HeaderField>,
}

impl FieldRegistry {
    pub fn build(fields: &[&'static HeaderField]) -> Result<Self, DuplicateField> {
        let mut by_abbrev = BTreeMap::new();
        for field in fields {
            if by_abbrev.insert(field.abbrev, *field).is_some() {
                return Err(DuplicateField(field.abbrev));
            }
        }
        Ok(Self { by_abbrev })
    }

    pub fn get(&self, abbrev: &str) -> Option<&'static HeaderField> {
        self.by_abbrev.get(abbrev).copied()
    }

    pub fn len(&self) -> usize {
        self.by_abbrev.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_abbrev.is_empty()
    }

    /// Fields in abbreviation order
    pub fn iter(&self) -> impl Iterator<Item = &'static HeaderField> + '_ {
        self.by_abbrev.values().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_fields_are_unique() {
        let registry = FieldRegistry::build(ALL).unwrap();
        assert_eq!(registry.len(), ALL.len());
        assert_eq!(registry.get("gluster.uuid").unwrap().kind, FieldKind::Uuid);
        assert!(registry.get("gluster.nope").is_none());
    }

    #[test]
    fn test_duplicate_abbrev_rejected() {
        static DUP: HeaderField = HeaderField::new("Again", "gluster.gfid", FieldKind::Gfid);
        let err = FieldRegistry::build(&[&GFID, &DUP]).unwrap_err();
        assert_eq!(err, DuplicateField("gluster.gfid"));
    }

    #[test]
    fn test_lookup_value_strings() {
        assert_eq!(OP.lookup(3), Some("STOP_BRICK"));
        assert_eq!(ENTRY_TYPE.lookup(4), Some("DT_DIR"));
        assert_eq!(ENTRY_TYPE.lookup(3), None);
        assert_eq!(PATH.lookup(0), None);
    }

    #[test]
    fn test_default_bases() {
        assert_eq!(SIZE.base, Base::Dec);
        assert_eq!(FLAGS.base, Base::Oct);
        assert_eq!(IA_DEV.base, Base::Hex);
        assert_eq!(PATH.base, Base::None);
    }
}
