// Handshake and callback programs
//
// Clients use the handshake program to attach to a brick volume, fetch
// volfiles and keep the connection alive. The callback program is the
// server pushing volfile changes back to clients.

use crate::dissector::Dissector;
use crate::protocol::error::DecodeResult;
use crate::protocol::fields::*;
use crate::protocol::structs::common_reply;

use super::{GLUSTER_CBK_PROGRAM, GLUSTER_HNDSK_PROGRAM, ProcedureDescriptor as P, ProgramTable};

// SETVOLUME
fn setvolume_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.dict(&DICT)
}

fn setvolume_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    d.dict(&DICT)
}

// GETSPEC
fn getspec_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.uint32(&FLAGS)?;
    d.string(&KEY)?;
    d.dict(&DICT)
}

fn getspec_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    d.string(&SPEC)?;
    d.dict(&DICT)
}

// PING
fn ping_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d).map(|_| ())
}

// SET_LK_VER
fn set_lk_ver_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.string(&UID)?;
    d.uint32(&LK_VER)?;
    Ok(())
}

fn set_lk_ver_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    d.uint32(&LK_VER)?;
    Ok(())
}

// EVENT_NOTIFY
fn event_notify_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.uint32(&EVENT_OP)?;
    d.dict(&DICT)
}

fn event_notify_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    d.dict(&DICT)
}

// FETCHSPEC callback, the request reuses the op_ret slot
fn fetchspec_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.int32(&OP_RET)?;
    d.string(&KEY)?;
    Ok(())
}

fn fetchspec_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    d.string(&SPEC)?;
    Ok(())
}

pub static GLUSTER_HNDSK_V1: ProgramTable = ProgramTable::new(
    "Gluster Handshake",
    GLUSTER_HNDSK_PROGRAM,
    1,
    &[
        P::null(),
        P::new(1, "SETVOLUME", setvolume_call, setvolume_reply),
        P::opaque(2, "GETSPEC"),
        P::reply_only(3, "PING", ping_reply),
    ],
);

pub static GLUSTER_HNDSK_V2: ProgramTable = ProgramTable::new(
    "Gluster Handshake",
    GLUSTER_HNDSK_PROGRAM,
    2,
    &[
        P::null(),
        P::new(1, "SETVOLUME", setvolume_call, setvolume_reply),
        P::new(2, "GETSPEC", getspec_call, getspec_reply),
        P::reply_only(3, "PING", ping_reply),
        P::new(4, "SET_LK_VER", set_lk_ver_call, set_lk_ver_reply),
        P::new(5, "EVENT_NOTIFY", event_notify_call, event_notify_reply),
    ],
);

pub static GLUSTER_CBK_V1: ProgramTable = ProgramTable::new(
    "GlusterFS Callback",
    GLUSTER_CBK_PROGRAM,
    1,
    &[
        P::null(),
        P::new(1, "FETCHSPEC", fetchspec_call, fetchspec_reply),
        P::opaque(2, "INO_FLUSH"),
    ],
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Direction, Gap, Registry};
    use crate::protocol::encode::WireWriter;
    use crate::protocol::value::Value;

    #[test]
    fn test_setvolume_roundtrip() {
        let mut w = WireWriter::new();
        w.dict(&[
            ("process-uuid", b"client-1\0".as_slice()),
            ("remote-subvolume", b"/bricks/b1\0".as_slice()),
        ])
        .unwrap();
        let buf = w.into_bytes();
        let reg = Registry::builtin().unwrap();
        for version in [1, 2] {
            let dis = reg
                .dissect(&buf, 0, GLUSTER_HNDSK_PROGRAM, version, 1, Direction::Call)
                .unwrap();
            assert_eq!(dis.end, buf.len());
            let dict = dis.find("gluster.dict").unwrap().as_dict().unwrap();
            assert_eq!(dict.len(), 2);
            assert_eq!(dict.get("remote-subvolume").unwrap().as_ref(), b"/bricks/b1\0");
        }
    }

    #[test]
    fn test_getspec_only_in_v2() {
        let mut w = WireWriter::new();
        w.u32(0).unwrap().string("gv0").unwrap().dict(&[]).unwrap();
        let buf = w.into_bytes();
        let reg = Registry::builtin().unwrap();

        let v2 = reg
            .dissect(&buf, 0, GLUSTER_HNDSK_PROGRAM, 2, 2, Direction::Call)
            .unwrap();
        assert_eq!(v2.end, buf.len());
        assert_eq!(v2.find("gluster.key").unwrap().as_str(), Some("gv0"));

        let v1 = reg
            .dissect(&buf, 0, GLUSTER_HNDSK_PROGRAM, 1, 2, Direction::Call)
            .unwrap();
        assert!(matches!(v1.gap, Some(Gap::NotImplemented { .. })));
    }

    #[test]
    fn test_ping_has_no_call_grammar() {
        let mut w = WireWriter::new();
        w.common(0, 0).unwrap();
        let buf = w.into_bytes();
        let reg = Registry::builtin().unwrap();
        let reply = reg
            .dissect(&buf, 0, GLUSTER_HNDSK_PROGRAM, 2, 3, Direction::Reply)
            .unwrap();
        assert_eq!(reply.end, 8);
        let call = reg
            .dissect(&buf, 0, GLUSTER_HNDSK_PROGRAM, 2, 3, Direction::Call)
            .unwrap();
        assert!(call.gap.is_some());
    }

    #[test]
    fn test_set_lk_ver() {
        let mut w = WireWriter::new();
        w.string("host-1234-2012/06/27-12:00:00:000000-gv0-client-0").unwrap();
        w.u32(3).unwrap();
        let buf = w.into_bytes();
        let dis = Registry::builtin()
            .unwrap()
            .dissect(&buf, 0, GLUSTER_HNDSK_PROGRAM, 2, 4, Direction::Call)
            .unwrap();
        assert_eq!(dis.end, buf.len());
        assert_eq!(dis.find("gluster.lk_ver").unwrap().value, Value::U32(3));
    }

    #[test]
    fn test_fetchspec_callback() {
        let mut w = WireWriter::new();
        w.common(0, 0).unwrap().string("volume gv0-client-0\n").unwrap();
        let buf = w.into_bytes();
        let dis = Registry::builtin()
            .unwrap()
            .dissect(&buf, 0, GLUSTER_CBK_PROGRAM, 1, 1, Direction::Reply)
            .unwrap();
        assert_eq!(dis.end, buf.len());
        assert_eq!(
            dis.find("gluster.spec").unwrap().as_str(),
            Some("volume gv0-client-0\n")
        );
    }
}
