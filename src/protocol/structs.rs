// Shared composite structures
//
// One decoder per structure; procedures pick the label (`hf`) that says
// where the structure sits in their reply.

use crate::dissector::Dissector;
use crate::protocol::error::DecodeResult;
use crate::protocol::fields::*;

/// Fixed wire size of a gf_iatt
pub const IATT_LEN: usize = 100;
/// Fixed wire size of a gf_flock
pub const FLOCK_LEN_BYTES: usize = 36;
/// Fixed wire size of a gf_statfs
pub const STATFS_LEN: usize = 88;

/// strerror text without the " (os error N)" suffix
pub fn errno_text(errno: i32) -> String {
    let text = std::io::Error::from_raw_os_error(errno).to_string();
    match text.rfind(" (os error") {
        Some(cut) => text[..cut].to_string(),
        None => text,
    }
}

/// op_ret, op_errno
pub fn common_reply(d: &mut Dissector<'_>) -> DecodeResult<i32> {
    d.int32(&OP_RET)?;
    let errno = d.int32(&OP_ERRNO)?;
    d.note(errno_text(errno));
    Ok(errno)
}

/// Common reply header followed by the xdata dictionary
pub fn common_reply_xdata(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    d.dict(&XDATA)
}

pub fn iatt(d: &mut Dissector<'_>, hf: &'static HeaderField) -> DecodeResult<()> {
    d.subtree(hf, |d| {
        d.gfid(&GFID)?;
        d.uint64(&IA_INO)?;
        d.uint64(&IA_DEV)?;
        d.uint32(&IA_MODE)?;
        d.uint32(&IA_NLINK)?;
        d.uint32(&IA_UID)?;
        d.uint32(&IA_GID)?;
        d.uint64(&IA_RDEV)?;
        d.uint64(&IA_SIZE)?;
        d.uint32(&IA_BLKSIZE)?;
        d.uint64(&IA_BLOCKS)?;
        d.uint32(&IA_ATIME)?;
        d.uint32(&IA_ATIME_NSEC)?;
        d.uint32(&IA_MTIME)?;
        d.uint32(&IA_MTIME_NSEC)?;
        d.uint32(&IA_CTIME)?;
        d.uint32(&IA_CTIME_NSEC)?;
        Ok(())
    })
}

pub fn flock(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.subtree(&FLOCK, |d| {
        d.uint32(&FLOCK_TYPE)?;
        d.uint32(&FLOCK_WHENCE)?;
        d.uint64(&FLOCK_START)?;
        d.uint64(&FLOCK_LEN)?;
        d.int32(&FLOCK_PID)?;
        d.uint64(&FLOCK_OWNER)?;
        Ok(())
    })
}

pub fn statfs(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.subtree(&STATFS, |d| {
        d.uint64(&STATFS_BSIZE)?;
        d.uint64(&STATFS_FRSIZE)?;
        d.uint64(&STATFS_BLOCKS)?;
        d.uint64(&STATFS_BFREE)?;
        d.uint64(&STATFS_BAVAIL)?;
        d.uint64(&STATFS_FILES)?;
        d.uint64(&STATFS_FFREE)?;
        d.uint64(&STATFS_FAVAIL)?;
        d.uint64(&STATFS_FSID)?;
        d.uint64(&STATFS_FLAG)?;
        d.uint64(&STATFS_NAMEMAX)?;
        Ok(())
    })
}

/// One readdirp entry: dirent header, name, then its attributes
pub fn dirent(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.uint64(&ENTRY_INO)?;
    d.uint64(&ENTRY_OFF)?;
    d.uint32(&ENTRY_LEN)?;
    d.uint32(&ENTRY_TYPE)?;
    d.string(&ENTRY_PATH)?;
    iatt(d, &STAT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dissector::DecodeOptions;
    use crate::protocol::cursor::ByteCursor;
    use crate::protocol::encode::WireWriter;
    use crate::protocol::value::{Value, find};
    use bytes::Bytes;

    fn run<F>(bytes: Bytes, f: F) -> (DecodeResult<()>, usize, Vec<crate::protocol::value::Field>)
    where
        F: FnOnce(&mut Dissector<'_>) -> DecodeResult<()>,
    {
        let options = DecodeOptions::default();
        let mut d = Dissector::new(ByteCursor::new(bytes), &options);
        let res = f(&mut d);
        let offset = d.offset();
        (res, offset, d.into_fields())
    }

    #[test]
    fn test_iatt_is_fixed_length() {
        for fill in [0x00u8, 0xff] {
            let bytes = Bytes::from(vec![fill; IATT_LEN + 8]);
            let (res, offset, fields) = run(bytes, |d| iatt(d, &STAT));
            res.unwrap();
            assert_eq!(offset, IATT_LEN);
            assert_eq!(fields[0].len, IATT_LEN);
            assert_eq!(fields[0].children().len(), 17);
        }
    }

    #[test]
    fn test_iatt_field_order() {
        let mut w = WireWriter::new();
        w.gfid(&[0xaa; 16]).unwrap();
        w.u64(42).unwrap(); // ino
        w.u64(0x803).unwrap(); // dev
        w.u32(0o100644).unwrap(); // mode
        w.u32(1).unwrap(); // nlink
        w.u32(1000).unwrap(); // uid
        w.u32(1001).unwrap(); // gid
        w.u64(0).unwrap(); // rdev
        w.u64(4096).unwrap(); // size
        w.u32(4096).unwrap(); // blksize
        w.u64(8).unwrap(); // blocks
        for t in 1..=6 {
            w.u32(t).unwrap();
        }
        let (res, offset, fields) = run(w.into_bytes(), |d| iatt(d, &PREPARENT));
        res.unwrap();
        assert_eq!(offset, IATT_LEN);
        assert_eq!(fields[0].abbrev(), "gluster.preparent");
        assert_eq!(find(&fields, "gluster.ia_ino").unwrap().value, Value::U64(42));
        assert_eq!(find(&fields, "gluster.ia_mode").unwrap().value, Value::U32(0o100644));
        assert_eq!(find(&fields, "gluster.ia_gid").unwrap().value, Value::U32(1001));
        assert_eq!(find(&fields, "gluster.ia_blocks").unwrap().value, Value::U64(8));
        assert_eq!(find(&fields, "gluster.ia_ctime_nsec").unwrap().value, Value::U32(6));
    }

    #[test]
    fn test_flock_and_statfs_lengths() {
        let (res, offset, _) = run(Bytes::from(vec![1; 64]), flock);
        res.unwrap();
        assert_eq!(offset, FLOCK_LEN_BYTES);

        let (res, offset, fields) = run(Bytes::from(vec![0; 100]), statfs);
        res.unwrap();
        assert_eq!(offset, STATFS_LEN);
        assert_eq!(fields[0].children().len(), 11);
    }

    #[test]
    fn test_common_reply_errno_text() {
        let mut w = WireWriter::new();
        w.common(-1, libc::ENOENT).unwrap();
        let (res, offset, fields) = run(w.into_bytes(), |d| common_reply(d).map(|_| ()));
        res.unwrap();
        assert_eq!(offset, 8);
        assert_eq!(fields[0].value, Value::I32(-1));
        assert_eq!(fields[1].value, Value::I32(libc::ENOENT));
        assert_eq!(fields[1].note.as_deref(), Some("No such file or directory"));
    }

    #[test]
    fn test_dirent() {
        let mut w = WireWriter::new();
        w.u64(11).unwrap().u64(22).unwrap().u32(4).unwrap().u32(8).unwrap();
        w.string("file").unwrap();
        w.raw(&[0; IATT_LEN]).unwrap();
        let (res, offset, fields) = run(w.into_bytes(), dirent);
        res.unwrap();
        assert_eq!(offset, 8 + 8 + 4 + 4 + 8 + IATT_LEN);
        assert_eq!(find(&fields, "gluster.entry.path").unwrap().as_str(), Some("file"));
        assert_eq!(fields.last().unwrap().abbrev(), "gluster.stat");
    }

    #[test]
    fn test_truncated_iatt() {
        let (res, _, fields) = run(Bytes::from(vec![0; IATT_LEN - 1]), |d| iatt(d, &STAT));
        let err = res.unwrap_err();
        assert_eq!(err.field(), "gluster.ia_ctime_nsec");
        assert!(fields.is_empty());
    }
}
