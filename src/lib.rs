//! Inter-process bridge exposing a single-thread-affinity telephony control
//! object over line-delimited JSON-RPC 2.0 on stdin/stdout.
//!
//! The hard constraint is the concurrency contract, not the encoding: the
//! guarded resource may only be touched from the thread that created it,
//! while requests arrive on a background reader thread. The crate splits
//! into:
//!
//! - [`rpc`]: wire protocol codec, single-writer output emitter, handler
//!   registry, and the stdin request server loop
//! - [`dispatch`]: the affinity dispatcher marshaling closures onto the
//!   resource-owning thread (`post` fire-and-continue, `send` blocking)
//!
//! Diagnostic output never shares the protocol stream; see [`logging`] and
//! [`telemetry`].

pub mod config;
pub mod dispatch;
mod lock;
pub mod logging;
pub mod rpc;
pub mod telemetry;

pub(crate) use lock::lock_or_recover;

pub use dispatch::{DispatchError, DispatchHandle, Dispatcher};
pub use logging::{init_logging, log_debug, log_debug_content, log_file_path, log_panic};
pub use rpc::{HandlerError, HandlerRegistry, OutputEmitter, ServerLoop};
