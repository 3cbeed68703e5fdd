//! Request server loop on a dedicated reader thread.
//!
//! The loop has three logical states: Running, StopRequested, Terminated. It
//! starts Running, and terminates on end-of-stream, on an unrecoverable read
//! fault, or when [`ServerLoop::stop`] has been called and the next
//! flag check observes it. The flag check sits at the top of the loop, so a
//! stop request only takes effect once a blocked read returns; callers
//! wanting prompt shutdown should close the input source as well.
//!
//! Reading never blocks the owning thread. Only the *posting* of decoded
//! requests crosses into the owning thread's domain.

use std::io::{self, BufRead, ErrorKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::emitter::OutputEmitter;
use super::handlers::HandlerRegistry;
use super::protocol::{self, DecodeError};
use crate::dispatch::DispatchHandle;
use crate::{log_debug, log_debug_content};

/// Default cap on an accepted request line. Oversized lines are logged and
/// dropped without terminating the loop.
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// Handle to the reader thread running the request server loop.
pub struct ServerLoop {
    stop: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

impl ServerLoop {
    /// Spawns the loop over an arbitrary buffered reader (tests, sockets).
    pub fn spawn<R, I>(
        input: I,
        dispatch: DispatchHandle<R>,
        registry: Arc<HandlerRegistry<R>>,
        emitter: OutputEmitter,
        max_line_bytes: usize,
    ) -> Self
    where
        I: BufRead + Send + 'static,
        R: 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let reader = thread::spawn(move || {
            read_loop(input, &dispatch, &registry, &emitter, max_line_bytes, &flag);
        });
        Self {
            stop,
            reader: Some(reader),
        }
    }

    /// Spawns the loop over process stdin. The stdin lock is taken inside the
    /// reader thread because the guard cannot cross threads.
    pub fn spawn_stdin<R: 'static>(
        dispatch: DispatchHandle<R>,
        registry: Arc<HandlerRegistry<R>>,
        emitter: OutputEmitter,
        max_line_bytes: usize,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let reader = thread::spawn(move || {
            let stdin = io::stdin();
            read_loop(
                stdin.lock(),
                &dispatch,
                &registry,
                &emitter,
                max_line_bytes,
                &flag,
            );
        });
        Self {
            stop,
            reader: Some(reader),
        }
    }

    /// Requests cooperative termination. Does not interrupt a blocked read;
    /// the loop exits after the read in progress returns.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Waits for the reader thread to terminate.
    pub fn join(mut self) {
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
    }
}

fn read_loop<R, I>(
    mut input: I,
    dispatch: &DispatchHandle<R>,
    registry: &Arc<HandlerRegistry<R>>,
    emitter: &OutputEmitter,
    max_line_bytes: usize,
    stop: &AtomicBool,
) where
    I: BufRead,
    R: 'static,
{
    let mut line = String::new();
    loop {
        if stop.load(Ordering::Relaxed) {
            log_debug("request server: stop requested, terminating");
            break;
        }
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) => {
                log_debug("request server: end of stream");
                break;
            }
            Ok(n) if n > max_line_bytes => {
                log_debug(&format!("request server: dropping oversized line ({n} bytes)"));
            }
            Ok(_) => dispatch_line(&line, dispatch, registry, emitter),
            Err(err) if err.kind() == ErrorKind::Interrupted => {}
            Err(err) => {
                // Unexpected fault; the supervisor restarts the process.
                log_debug(&format!("request server: unrecoverable read fault: {err}"));
                break;
            }
        }
    }
}

/// Decodes one raw line and posts the handler invocation onto the owning
/// thread. Decode failures are logged and dropped: without a reliably known
/// id there is nothing to answer, and the loop keeps reading.
fn dispatch_line<R: 'static>(
    line: &str,
    dispatch: &DispatchHandle<R>,
    registry: &Arc<HandlerRegistry<R>>,
    emitter: &OutputEmitter,
) {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return;
    }

    match protocol::decode(trimmed) {
        Ok(request) => {
            log_debug_content(&format!("request server: dispatching {}", request.method));
            let registry = Arc::clone(registry);
            let emitter = emitter.clone();
            dispatch.post(move |resource| registry.handle_request(resource, request, &emitter));
        }
        Err(DecodeError::Malformed(err)) => {
            log_debug(&format!("request server: discarding malformed line: {err}"));
        }
        Err(DecodeError::MissingMethod) => {
            log_debug("request server: discarding request without a method");
        }
    }
}
