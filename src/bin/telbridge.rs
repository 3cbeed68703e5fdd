//! Bridge entrypoint: line-delimited JSON-RPC 2.0 over stdio, fronting the
//! single-thread-affinity telephony control state.
//!
//! # Architecture
//!
//! - Reader thread: reads stdin line by line, decodes, posts to the dispatcher
//! - Owning thread (main): drains the dispatch queue, runs every handler
//! - Emitter: single-writer stdout, one flushed JSON line per message
//!
//! Stdout carries protocol traffic only; diagnostics go to the temp-file log.

use anyhow::Result;
use serde_json::{json, Value};
use std::panic;
use std::process;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use telbridge::config::AppConfig;
use telbridge::telemetry;
use telbridge::{
    init_logging, log_debug, log_file_path, log_panic, DispatchHandle, Dispatcher, HandlerError,
    HandlerRegistry, OutputEmitter, ServerLoop,
};

/// Methods the shipped binary answers, advertised through `describe`.
const BRIDGE_METHODS: [&str; 4] = ["describe", "lineStatus", "ping", "shutdown"];

/// The guarded resource: created on the owning thread, never leaves it.
struct BridgeState {
    session_id: String,
    started_at: Instant,
    device_connected: bool,
}

impl BridgeState {
    fn new(session_id: String) -> Self {
        Self {
            session_id,
            started_at: Instant::now(),
            device_connected: false,
        }
    }

    fn describe(&self) -> Value {
        json!({
            "sessionId": self.session_id,
            "version": env!("CARGO_PKG_VERSION"),
            "pid": process::id(),
            "uptimeMs": self.started_at.elapsed().as_millis() as u64,
            "methods": BRIDGE_METHODS,
        })
    }
}

fn generated_session_id() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    format!("{millis:x}")
}

fn build_registry(handle: DispatchHandle<BridgeState>) -> HandlerRegistry<BridgeState> {
    let mut registry = HandlerRegistry::new();

    registry.register("ping", |_state: &mut BridgeState, _params| {
        Ok(Some(json!("pong")))
    });

    registry.register("describe", |state: &mut BridgeState, _params| {
        Ok(Some(state.describe()))
    });

    registry.register("lineStatus", |state: &mut BridgeState, _params| {
        if !state.device_connected {
            return Err(HandlerError::NotConnected(
                "no telephony device attached".to_string(),
            ));
        }
        Ok(Some(json!({ "connected": true })))
    });

    // The exit task is posted, not executed inline, so it queues behind the
    // response this request is owed.
    registry.register("shutdown", move |_state: &mut BridgeState, _params| {
        handle.post(|_state| {
            log_debug("bridge: shutdown requested, exiting");
            process::exit(0);
        });
        Ok(None)
    });

    registry
}

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    init_logging(&config);
    telemetry::init_tracing(&config);
    panic::set_hook(Box::new(|info| log_panic(info)));

    log_debug("=== telbridge started ===");
    log_debug(&format!("log file: {:?}", log_file_path()));

    run_bridge(&config)
}

fn run_bridge(config: &AppConfig) -> Result<()> {
    let session_id = config
        .session_id
        .clone()
        .unwrap_or_else(generated_session_id);
    let emitter = OutputEmitter::stdout();

    let dispatcher = Dispatcher::new(BridgeState::new(session_id));
    let handle = dispatcher.handle();
    let registry = Arc::new(build_registry(handle.clone()));

    // Advertise the surface once on startup so the consumer can gate on it.
    {
        let emitter = emitter.clone();
        handle.post(move |state| emitter.emit_event("describe", Some(state.describe())));
    }

    let server = ServerLoop::spawn_stdin(handle, registry, emitter, config.max_line_bytes);
    dispatcher.run()?;
    server.join();
    log_debug("=== telbridge exiting ===");
    Ok(())
}
