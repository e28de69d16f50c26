// gluster CLI <-> glusterd program
//
// Requests and responses are opaque serialized dictionaries whose layout
// depends on the command, so only procedure names are known here.

use super::{GLUSTER_CLI_PROGRAM, ProcedureDescriptor as P, ProgramTable};

pub static GLUSTER_CLI_V1: ProgramTable = ProgramTable::new(
    "Gluster CLI",
    GLUSTER_CLI_PROGRAM,
    1,
    &[
        P::null(),
        P::opaque(1, "PROBE"),
        P::opaque(2, "DEPROBE"),
        P::opaque(3, "LIST_FRIENDS"),
        P::opaque(4, "CREATE_VOLUME"),
        P::opaque(5, "GET_VOLUME"),
        P::opaque(6, "GET_NEXT_VOLUME"),
        P::opaque(7, "DELETE_VOLUME"),
        P::opaque(8, "START_VOLUME"),
        P::opaque(9, "STOP_VOLUME"),
        P::opaque(10, "RENAME_VOLUME"),
        P::opaque(11, "DEFRAG_VOLUME"),
        P::opaque(12, "SET_VOLUME"),
        P::opaque(13, "ADD_BRICK"),
        P::opaque(14, "REMOVE_BRICK"),
        P::opaque(15, "REPLACE_BRICK"),
        P::opaque(16, "LOG_FILENAME"),
        P::opaque(17, "LOG_LOCATE"),
        P::opaque(18, "LOG_ROTATE"),
        P::opaque(19, "GETSPEC"),
        P::opaque(20, "PMAP_PORTBYBRICK"),
        P::opaque(21, "SYNC_VOLUME"),
        P::opaque(22, "RESET_VOLUME"),
        P::opaque(23, "FSM_LOG"),
        P::opaque(24, "GSYNC_SET"),
        P::opaque(25, "PROFILE_VOLUME"),
        P::opaque(26, "QUOTA"),
        P::opaque(27, "TOP_VOLUME"),
        P::opaque(28, "GETWD"),
        P::opaque(29, "LOG_LEVEL"),
        P::opaque(30, "STATUS_VOLUME"),
        P::opaque(31, "MOUNT"),
        P::opaque(32, "UMOUNT"),
        P::opaque(33, "HEAL_VOLUME"),
        P::opaque(34, "STATEDUMP_VOLUME"),
    ],
);
