//! Line-delimited JSON-RPC 2.0 over stdin/stdout.
//!
//! This module is the bridge's wire surface so external frontends can drive
//! the telephony control object without linking against it.
//!
//! Architecture:
//! - Stdin reader thread: reads request lines, decodes, posts handler
//!   invocations onto the affinity dispatcher
//! - Owning thread: executes handlers against the guarded resource, one at a
//!   time, and emits the owed response
//! - Output emitter: the only sanctioned writer of the protocol stream,
//!   one exclusive critical section per line, flushed immediately
//!
//! Protocol:
//! - Each line is one JSON object
//! - Requests (client → bridge): `{"jsonrpc":"2.0","id":1,"method":"...","params":...}`
//! - Responses (bridge → client): result or error, echoing the request id
//! - Events (bridge → client): method + params, no id, never answered

mod emitter;
mod handlers;
mod protocol;
mod server;


pub use emitter::OutputEmitter;
pub use handlers::{HandlerError, HandlerRegistry, HandlerResult};
pub use protocol::{
    decode, DecodeError, ErrorCode, RpcErrorObject, RpcEvent, RpcRequest, RpcResponse,
    PROTOCOL_VERSION,
};
pub use server::{ServerLoop, DEFAULT_MAX_LINE_BYTES};
