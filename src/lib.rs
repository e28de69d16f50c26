// GlusterFS RPC payload dissector
//
// Decodes the bodies of GlusterFS ONC RPC messages into typed field trees.
// `dispatch::Registry` is the entry point; `rpc` adds the record-marking
// and header layers needed to walk a captured TCP stream.

#[cfg(not(target_os = "linux"))]
compile_error!("gluster-dissect only supports Linux");

pub mod config;
pub mod dispatch;
pub mod dissector;
pub mod programs;
pub mod protocol;
pub mod render;
pub mod rpc;

pub use dispatch::{Direction, Dissection, Gap, Registry};
