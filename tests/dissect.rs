// End-to-end dissections through the public API

use bytes::Bytes;
use gluster_dissect::programs::{GD_BRICK_PROGRAM, GD_MGMT_PROGRAM, GLUSTER3_1_FOP_PROGRAM};
use gluster_dissect::protocol::encode::WireWriter;
use gluster_dissect::protocol::structs::IATT_LEN;
use gluster_dissect::protocol::value::Value;
use gluster_dissect::render::format_uuid;
use gluster_dissect::{Direction, Registry};

#[test]
fn probe_query_call() {
    let mut raw = Vec::new();
    for i in 0..16u32 {
        raw.extend_from_slice(&(0xa0 + i).to_be_bytes());
    }
    raw.extend_from_slice(&9u32.to_be_bytes());
    raw.extend_from_slice(b"hostname1\0\0\0");
    raw.extend_from_slice(&24007u32.to_be_bytes());
    let buf = Bytes::from(raw);

    let reg = Registry::builtin().unwrap();
    let dis = reg.dissect(&buf, 0, GD_MGMT_PROGRAM, 1, 1, Direction::Call).unwrap();
    assert_eq!(dis.consumed(), 84);
    assert_eq!(dis.find("gluster.hostname").unwrap().as_str(), Some("hostname1"));
    assert_eq!(dis.find("gluster.port").unwrap().value, Value::I32(24007));
    let Value::Uuid(words) = &dis.find("gluster.uuid").unwrap().value else {
        panic!("uuid not decoded");
    };
    assert_eq!(
        format_uuid(words),
        "a0a1a2a3-a4a5-a6a7-a8a9-aaabacadaeaf"
    );
}

#[test]
fn same_procedure_number_differs_by_version() {
    let mut w = WireWriter::new();
    w.uuid(&[2; 16]).unwrap();
    w.u32(1).unwrap();
    w.dict(&[("volname", b"gv0\0".as_slice())]).unwrap();
    let buf = w.into_bytes();
    let reg = Registry::builtin().unwrap();

    // procedure 3 is CLUSTER_LOCK in v1 and STAGE_OP in v2
    let v1 = reg.dissect(&buf, 0, GD_MGMT_PROGRAM, 1, 3, Direction::Call).unwrap();
    assert_eq!(v1.procedure_name, Some("CLUSTER_LOCK"));
    assert_eq!(v1.end, 64);
    assert!(v1.trailing > 0);

    let v2 = reg.dissect(&buf, 0, GD_MGMT_PROGRAM, 2, 3, Direction::Call).unwrap();
    assert_eq!(v2.procedure_name, Some("STAGE_OP"));
    assert_eq!(v2.end, buf.len());
    assert!(v2.find("gluster.dict").is_some());
}

#[test]
fn brick_and_mops_share_program_number() {
    let reg = Registry::builtin().unwrap();
    assert_eq!(reg.table(GD_BRICK_PROGRAM, 1).unwrap().name, "GlusterFS Mops");
    assert_eq!(
        reg.table(GD_BRICK_PROGRAM, 2).unwrap().name,
        "GlusterD Brick Operations"
    );
}

#[test]
fn iatt_is_always_one_hundred_bytes() {
    let reg = Registry::builtin().unwrap();
    for fill in [0x00u8, 0xff] {
        let mut w = WireWriter::new();
        w.common(0, 0).unwrap();
        w.raw(&[fill; IATT_LEN]).unwrap();
        w.dict(&[]).unwrap();
        let buf = w.into_bytes();
        // FSTAT reply: common, stat, xdata
        let dis = reg
            .dissect(&buf, 0, GLUSTER3_1_FOP_PROGRAM, 330, 25, Direction::Reply)
            .unwrap();
        let stat = dis.find("gluster.stat").unwrap();
        assert_eq!(stat.len, IATT_LEN);
        assert_eq!(stat.children().len(), 17);
        assert_eq!(dis.end, buf.len());
    }
}

#[test]
fn dictionary_padding_follows_total_size() {
    // 13 bytes of body: count, value length, "kk\0", 2 value bytes
    let mut raw = Vec::new();
    raw.extend_from_slice(&13u32.to_be_bytes());
    raw.extend_from_slice(&1u32.to_be_bytes());
    raw.extend_from_slice(&2u32.to_be_bytes());
    raw.extend_from_slice(b"kk\0");
    raw.extend_from_slice(b"vv");
    raw.extend_from_slice(&[0, 0, 0]);
    raw.extend_from_slice(&[0xaa; 4]);
    let buf = Bytes::from(raw);

    let reg = Registry::builtin().unwrap();
    // handshake SETVOLUME call is a single dictionary
    let dis = reg.dissect(&buf, 0, 14398633, 2, 1, Direction::Call).unwrap();
    assert_eq!(dis.end, 4 + 13 + 3);
    assert_eq!(dis.trailing, 4);
    let dict = dis.find("gluster.dict").unwrap().as_dict().unwrap();
    assert_eq!(dict.get("kk").unwrap().as_ref(), b"vv");
}

#[test]
fn dictionary_overrunning_total_size_fails_the_message() {
    // total 8, but the single item needs 13 bytes after the size word
    let mut raw = Vec::new();
    raw.extend_from_slice(&8u32.to_be_bytes());
    raw.extend_from_slice(&1u32.to_be_bytes());
    raw.extend_from_slice(&3u32.to_be_bytes());
    raw.extend_from_slice(b"k\0abc");
    raw.extend_from_slice(&[0, 0, 0]);
    let buf = Bytes::from(raw);

    let reg = Registry::builtin().unwrap();
    let err = reg.dissect(&buf, 0, 14398633, 2, 1, Direction::Call).unwrap_err();
    assert_eq!(err.offset(), 4);
    assert_eq!(err.field(), "gluster.dict");
}
