//! Cross-thread marshaling onto the single thread that owns the guarded
//! resource.
//!
//! The telephony control object is non-reentrant and bound to the thread
//! that created it. [`Dispatcher`] pairs that resource with a task queue;
//! the constructing thread becomes the owning thread and drains the queue
//! with [`Dispatcher::run`]. Every other thread submits work through a
//! [`DispatchHandle`]:
//!
//! - [`DispatchHandle::post`] enqueues and returns immediately. Nothing the
//!   action does propagates back to the caller, so errors inside a posted
//!   action must self-report (emit an error response, log, or similar).
//! - [`DispatchHandle::send`] blocks until the action has fully executed on
//!   the owning thread and returns its value. There is no timeout. Calling
//!   `send` from the owning thread would deadlock the queue against itself;
//!   it is detected by thread id and rejected with
//!   [`DispatchError::WrongThread`] instead.
//!
//! Actions submitted from one thread run in submission order. Actions from
//! different threads are only guaranteed to never run concurrently: the
//! owning thread finishes one action before starting the next. The queue is
//! unbounded; a slow owning thread grows it rather than blocking or dropping
//! submitters.

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, ThreadId};
use thiserror::Error;

use crate::log_debug;

type Task<R> = Box<dyn FnOnce(&mut R) + Send + 'static>;

/// Configuration and lifecycle errors from the dispatcher. Both variants are
/// programmer contract violations or shutdown races, never wire conditions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("dispatcher must run on the thread that constructed it")]
    WrongThread,
    #[error("dispatcher is no longer draining its queue")]
    Disconnected,
}

/// Owner side of the affinity queue. Construct it on the thread that owns the
/// guarded resource, hand out [`DispatchHandle`]s, then call [`run`].
///
/// [`run`]: Dispatcher::run
pub struct Dispatcher<R> {
    queue: Receiver<Task<R>>,
    submit: Sender<Task<R>>,
    resource: R,
    owner: ThreadId,
}

impl<R> Dispatcher<R> {
    /// Captures the calling thread as the owning thread. The resource never
    /// leaves that thread afterwards.
    pub fn new(resource: R) -> Self {
        let (submit, queue) = unbounded();
        Self {
            queue,
            submit,
            resource,
            owner: thread::current().id(),
        }
    }

    /// A cloneable, `Send` handle for submitting work from other threads.
    pub fn handle(&self) -> DispatchHandle<R> {
        DispatchHandle {
            submit: self.submit.clone(),
            owner: self.owner,
        }
    }

    /// Drains the queue on the owning thread, running one action to
    /// completion before the next. Returns the resource once every
    /// [`DispatchHandle`] has been dropped, or
    /// [`DispatchError::WrongThread`] immediately when invoked anywhere but
    /// the constructing thread.
    pub fn run(self) -> Result<R, DispatchError> {
        if thread::current().id() != self.owner {
            return Err(DispatchError::WrongThread);
        }
        let Dispatcher {
            queue,
            submit,
            mut resource,
            ..
        } = self;
        drop(submit);
        while let Ok(task) = queue.recv() {
            task(&mut resource);
        }
        log_debug("dispatch: queue disconnected, owning thread done");
        Ok(resource)
    }
}

/// Submission side of the affinity queue; safe to clone and move across
/// threads.
pub struct DispatchHandle<R> {
    submit: Sender<Task<R>>,
    owner: ThreadId,
}

impl<R> Clone for DispatchHandle<R> {
    fn clone(&self) -> Self {
        Self {
            submit: self.submit.clone(),
            owner: self.owner,
        }
    }
}

impl<R> DispatchHandle<R> {
    /// Enqueues `action` to run on the owning thread and returns immediately.
    ///
    /// The caller has already moved on by the time the action runs, so no
    /// result or failure propagates back; the action must handle its own
    /// errors. A post after the owning thread has exited is logged and
    /// dropped.
    pub fn post<F>(&self, action: F)
    where
        F: FnOnce(&mut R) + Send + 'static,
    {
        if self.submit.send(Box::new(action)).is_err() {
            log_debug("dispatch: post dropped, owning thread has exited");
        }
    }

    /// Enqueues `action` and blocks until it has fully executed on the owning
    /// thread, then returns its value. A panic inside the action is resumed
    /// on the calling thread.
    ///
    /// Never call this from the owning thread: the queue cannot drain while
    /// its only consumer is blocked waiting on itself. The misuse is caught
    /// by thread id and returned as [`DispatchError::WrongThread`] rather
    /// than deadlocking. There is no timeout otherwise.
    pub fn send<T, F>(&self, action: F) -> Result<T, DispatchError>
    where
        F: FnOnce(&mut R) -> T + Send + 'static,
        T: Send + 'static,
    {
        if thread::current().id() == self.owner {
            return Err(DispatchError::WrongThread);
        }
        let (done_tx, done_rx) = bounded::<Result<T, Box<dyn Any + Send>>>(1);
        let task: Task<R> = Box::new(move |resource| {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| action(resource)));
            let _ = done_tx.send(outcome);
        });
        if self.submit.send(task).is_err() {
            return Err(DispatchError::Disconnected);
        }
        match done_rx.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => panic::resume_unwind(payload),
            Err(_) => Err(DispatchError::Disconnected),
        }
    }
}
