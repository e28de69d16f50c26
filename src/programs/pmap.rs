// glusterd portmapper: brick name <-> port

use crate::dissector::Dissector;
use crate::protocol::error::DecodeResult;
use crate::protocol::fields::*;
use crate::protocol::structs::common_reply;

use super::{GLUSTER_PMAP_PROGRAM, ProcedureDescriptor as P, ProgramTable};

fn portbybrick_call(d: &mut Dissector<'_>) -> DecodeResult<()> {
    d.string(&BRICK)?;
    Ok(())
}

fn portbybrick_reply(d: &mut Dissector<'_>) -> DecodeResult<()> {
    common_reply(d)?;
    d.int32(&BRICK_STATUS)?;
    d.int32(&BRICK_PORT)?;
    Ok(())
}

pub static GLUSTER_PMAP_V1: ProgramTable = ProgramTable::new(
    "Gluster Portmap",
    GLUSTER_PMAP_PROGRAM,
    1,
    &[
        P::null(),
        P::new(1, "PORTBYBRICK", portbybrick_call, portbybrick_reply),
        P::opaque(2, "BRICKBYPORT"),
        P::opaque(3, "SIGNUP"),
        P::opaque(4, "SIGNIN"),
        P::opaque(5, "SIGNOUT"),
    ],
);
