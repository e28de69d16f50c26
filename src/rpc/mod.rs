// ONC RPC framing around Gluster payloads
//
// Record marking, call/reply headers and a tracer that ties them to the
// procedure dissectors.

pub mod header;
pub mod record;
pub mod trace;
