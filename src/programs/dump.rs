// Program list query
//
// Clients ask a server which (program, version) pairs it serves before
// choosing a protocol generation.

use crate::dissector::Dissector;
use crate::protocol::error::DecodeResult;
use crate::protocol::fields::*;
use crate::protocol::structs::common_reply;

use super::{GLUSTER_DUMP_PROGRAM, ProcedureDescriptor as P, ProgramTable};

fn dump_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.uint64(&GFSID)?;
    Ok(())
}

fn program_detail(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.string(&PROGNAME)?;
    d.uint64(&PROGNUM)?;
    d.uint64(&PROGVER)?;
    Ok(())
}

fn dump_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.uint64(&GFSID)?;
    common_reply(d)?;
    d.list(&PROGRAMS, &PROGRAM, program_detail)?;
    Ok(())
}

pub static GLUSTER_DUMP_V1: ProgramTable = ProgramTable::new(
    "Gluster Dump",
    GLUSTER_DUMP_PROGRAM,
    1,
    &[P::null(), P::new(1, "DUMP", dump_call, dump_reply)],
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Direction, Registry};
    use crate::protocol::encode::WireWriter;
    use crate::protocol::value::{Value, find_all};

    #[test]
    fn test_dump_reply_lists_programs() {
        let mut w = WireWriter::new();
        w.u64(0x1).unwrap().common(0, 0).unwrap();
        for (name, num, ver) in [
            ("GlusterFS 3.3", 1298437u64, 330u64),
            ("GlusterFS Handshake", 14398633, 2),
        ] {
            w.follows(true).unwrap();
            w.string(name).unwrap().u64(num).unwrap().u64(ver).unwrap();
        }
        w.follows(false).unwrap();
        let buf = w.into_bytes();

        let dis = Registry::builtin()
            .unwrap()
            .dissect(&buf, 0, GLUSTER_DUMP_PROGRAM, 1, 1, Direction::Reply)
            .unwrap();
        assert_eq!(dis.end, buf.len());
        let programs = dis.find("gluster.dump.programs").unwrap();
        assert_eq!(programs.children().len(), 2);
        let nums: Vec<_> = find_all(&dis.fields, "gluster.dump.prognum")
            .iter()
            .map(|f| f.value.clone())
            .collect();
        assert_eq!(nums, vec![Value::U64(1298437), Value::U64(14398633)]);
    }

    #[test]
    fn test_dump_call() {
        let mut w = WireWriter::new();
        w.u64(0xdead_beef).unwrap();
        let buf = w.into_bytes();
        let dis = Registry::builtin()
            .unwrap()
            .dissect(&buf, 0, GLUSTER_DUMP_PROGRAM, 1, 1, Direction::Call)
            .unwrap();
        assert_eq!(dis.end, 8);
        assert_eq!(dis.find("gluster.gfsid").unwrap().value, Value::U64(0xdead_beef));
    }
}
