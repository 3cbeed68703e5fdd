use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use thiserror::Error;

use super::emitter::OutputEmitter;
use super::protocol::{ErrorCode, RpcRequest};
use crate::log_debug;

/// Failure raised by a method handler, carrying the wire error code it maps
/// to. Handlers run on the owning thread; this is the only way they report
/// failure across the dispatch boundary.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    InvalidParams(String),
    #[error("{0}")]
    NotConnected(String),
    #[error("{0}")]
    Device(String),
    #[error("{0}")]
    Internal(String),
}

impl HandlerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            HandlerError::InvalidParams(_) => ErrorCode::InvalidParams,
            HandlerError::NotConnected(_) => ErrorCode::NotConnected,
            HandlerError::Device(_) => ErrorCode::DeviceOperation,
            HandlerError::Internal(_) => ErrorCode::Internal,
        }
    }
}

impl From<anyhow::Error> for HandlerError {
    fn from(err: anyhow::Error) -> Self {
        HandlerError::Internal(format!("{err:#}"))
    }
}

pub type HandlerResult = Result<Option<Value>, HandlerError>;

type Handler<R> = Box<dyn Fn(&mut R, Option<Value>) -> HandlerResult + Send + Sync>;

/// Method name → handler mapping. Handlers always execute on the owning
/// thread with exclusive access to the guarded resource.
pub struct HandlerRegistry<R> {
    handlers: HashMap<String, Handler<R>>,
}

impl<R> Default for HandlerRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> HandlerRegistry<R> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers `handler` for `method`, replacing any previous registration.
    pub fn register<F>(&mut self, method: impl Into<String>, handler: F)
    where
        F: Fn(&mut R, Option<Value>) -> HandlerResult + Send + Sync + 'static,
    {
        self.handlers.insert(method.into(), Box::new(handler));
    }

    /// Registered method names, sorted for stable advertisement.
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The dispatch boundary: runs the handler for one decoded request and
    /// settles its wire obligation.
    ///
    /// A request with an id gets exactly one response line, result or error.
    /// A request without an id gets none regardless of outcome; failures are
    /// only logged. Handler panics are caught here and converted like any
    /// other internal failure so they never unwind into the owning thread's
    /// queue loop.
    pub fn handle_request(&self, resource: &mut R, request: RpcRequest, emitter: &OutputEmitter) {
        let RpcRequest {
            id, method, params, ..
        } = request;

        let Some(handler) = self.handlers.get(&method) else {
            match id {
                Some(id) => {
                    emitter.emit_error(id, ErrorCode::MethodNotFound, format!("method not found: {method}"));
                }
                None => log_debug(&format!(
                    "dispatch: dropping notification for unknown method {method}"
                )),
            }
            return;
        };

        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(resource, params)));
        tracing::debug!(
            method = %method,
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = matches!(outcome, Ok(Ok(_))),
            "handler finished"
        );

        match (outcome, id) {
            (Ok(Ok(result)), Some(id)) => emitter.emit_result(id, result),
            (Ok(Ok(_)), None) => {}
            (Ok(Err(err)), Some(id)) => emitter.emit_error(id, err.code(), err.to_string()),
            (Ok(Err(err)), None) => {
                log_debug(&format!("dispatch: notification handler {method} failed: {err}"));
            }
            (Err(payload), Some(id)) => {
                emitter.emit_error(id, ErrorCode::Internal, panic_message(&payload));
            }
            (Err(payload), None) => log_debug(&format!(
                "dispatch: notification handler {method} panicked: {}",
                panic_message(&payload)
            )),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "handler panicked".to_string()
    }
}
