//! Single-writer protocol output.

use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use super::protocol::{ErrorCode, RpcEvent, RpcResponse};
use crate::{lock_or_recover, log_debug};

/// The only sanctioned path to the protocol output stream.
///
/// Encode, write, and flush happen under one lock acquisition so concurrent
/// emitters can never interleave characters of two lines, and every message
/// is flushed immediately for the line-by-line consumer on the other side.
/// Diagnostic output must go elsewhere ([`crate::logging`]); anything else on
/// this stream corrupts the consumer's parser.
///
/// Cheap to clone; clones share the same sink and lock.
#[derive(Clone)]
pub struct OutputEmitter {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl OutputEmitter {
    /// Emitter over process stdout, the production wiring.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Emitter over an arbitrary writer (tests, alternate transports).
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn emit_event(&self, method: &str, params: Option<Value>) {
        self.write_message(&RpcEvent::new(method, params));
    }

    pub fn emit_result(&self, id: i64, result: Option<Value>) {
        self.write_message(&RpcResponse::result(id, result));
    }

    pub fn emit_error(&self, id: i64, code: ErrorCode, message: impl Into<String>) {
        self.write_message(&RpcResponse::error(id, code, message));
    }

    /// Write failures are logged and swallowed; the peer owns transport
    /// health and implements its own timeout.
    fn write_message<T: Serialize>(&self, message: &T) {
        let json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(err) => {
                log_debug(&format!("emitter: encode failed: {err}"));
                return;
            }
        };
        let mut sink = lock_or_recover(&self.sink, "protocol output sink");
        if let Err(err) = writeln!(sink, "{json}").and_then(|()| sink.flush()) {
            log_debug(&format!("emitter: write failed: {err}"));
        }
    }
}
