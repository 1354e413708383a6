//! The dispatch engine.
//!
//! A [`Dispatcher`] owns the registry of sinks and their enabled flags,
//! builds a [`LogEntry`] for each log call and hands it to every enabled
//! sink, in registration order, on the calling thread.

use std::any::{Any, TypeId};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Local;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::caller::CallerContext;
use crate::error::{LogError, Result};
use crate::sink::Sink;
use crate::types::{LogEntry, LogSeverity, LogType};

static GLOBAL: OnceCell<Dispatcher> = OnceCell::new();

/// Initializes the process-wide dispatcher and returns it.
///
/// Calling this more than once returns the same instance. The dispatcher
/// starts out globally disabled; call [`Dispatcher::enable`] once sinks
/// are registered.
pub fn init() -> &'static Dispatcher {
    GLOBAL.get_or_init(Dispatcher::new)
}

/// Returns the process-wide dispatcher, if [`init`] has been called.
#[must_use]
pub fn global() -> Option<&'static Dispatcher> {
    GLOBAL.get()
}

/// Identity of a registered sink instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SinkId(usize);

impl SinkId {
    /// Returns the identity of the given sink instance.
    ///
    /// Identity is the address of the sink itself, so a shared handle must
    /// be dereferenced first. Passing the `Arc` is rejected:
    ///
    /// ```compile_fail
    /// use std::sync::Arc;
    /// use claw_logs::{ConsoleSink, Dispatcher};
    ///
    /// let dispatcher = Dispatcher::new();
    /// let sink = Arc::new(ConsoleSink);
    /// dispatcher.add_sink(Arc::clone(&sink));
    /// dispatcher.disable_sink(&sink);
    /// ```
    ///
    /// ```
    /// use std::sync::Arc;
    /// use claw_logs::{ConsoleSink, Dispatcher};
    ///
    /// let dispatcher = Dispatcher::new();
    /// let sink = Arc::new(ConsoleSink);
    /// dispatcher.add_sink(Arc::clone(&sink));
    /// assert!(dispatcher.disable_sink(&*sink));
    /// ```
    #[must_use]
    pub fn of<S: Sink + ?Sized>(sink: &S) -> Self {
        Self(std::ptr::from_ref(sink).cast::<()>().addr())
    }
}

#[derive(Clone)]
struct Registration {
    id: SinkId,
    type_id: TypeId,
    type_name: &'static str,
    sink: Arc<dyn Sink>,
    instance: Arc<dyn Any + Send + Sync>,
    enabled: Arc<AtomicBool>,
}

impl Registration {
    fn new<S: Sink + 'static>(sink: Arc<S>) -> Self {
        Self {
            id: SinkId::of(sink.as_ref()),
            type_id: TypeId::of::<S>(),
            type_name: std::any::type_name::<S>(),
            instance: Arc::clone(&sink) as Arc<dyn Any + Send + Sync>,
            sink,
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }
}

/// Registry of sinks and the fan-out of log entries to them.
pub struct Dispatcher {
    enabled: AtomicBool,
    sinks: RwLock<Vec<Registration>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sinks = self.sinks.read();
        f.debug_struct("Dispatcher")
            .field("enabled", &self.is_enabled())
            .field(
                "sinks",
                &sinks.iter().map(|r| r.type_name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Dispatcher {
    /// Creates an empty, globally disabled dispatcher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
            sinks: RwLock::new(Vec::new()),
        }
    }

    /// Registers a sink instance, enabled.
    ///
    /// Returns false if this exact instance is already registered.
    pub fn add_sink<S: Sink + 'static>(&self, sink: Arc<S>) -> bool {
        let id = SinkId::of(sink.as_ref());
        let mut sinks = self.sinks.write();
        if sinks.iter().any(|r| r.id == id) {
            return false;
        }
        sinks.push(Registration::new(sink));
        true
    }

    /// Constructs and registers a sink of type `T`.
    ///
    /// Meant for singleton-style sinks; use [`add_sink`](Self::add_sink) to
    /// register several sinks of the same type.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::DuplicateSinkType`] if a sink of type `T` is
    /// already registered.
    pub fn add_typed_sink<T: Sink + Default + 'static>(&self) -> Result<Arc<T>> {
        let sink = Arc::new(T::default());
        let mut sinks = self.sinks.write();
        if sinks.iter().any(|r| r.type_id == TypeId::of::<T>()) {
            return Err(LogError::DuplicateSinkType {
                type_name: std::any::type_name::<T>(),
            });
        }
        sinks.push(Registration::new(Arc::clone(&sink)));
        Ok(sink)
    }

    /// Returns the first registered sink of type `T`.
    #[must_use]
    pub fn sink<T: Sink + 'static>(&self) -> Option<Arc<T>> {
        let sinks = self.sinks.read();
        sinks
            .iter()
            .find(|r| r.type_id == TypeId::of::<T>())
            .and_then(|r| Arc::clone(&r.instance).downcast::<T>().ok())
    }

    /// Unregisters a sink instance. Returns false if it was not registered.
    pub fn remove_sink<S: Sink + ?Sized>(&self, sink: &S) -> bool {
        let id = SinkId::of(sink);
        self.remove_where(|r| r.id == id)
    }

    /// Unregisters the first sink of type `T`. Returns false if there is none.
    pub fn remove_sink_of<T: Sink + 'static>(&self) -> bool {
        self.remove_where(|r| r.type_id == TypeId::of::<T>())
    }

    fn remove_where(&self, predicate: impl Fn(&Registration) -> bool) -> bool {
        let mut sinks = self.sinks.write();
        match sinks.iter().position(predicate) {
            Some(idx) => {
                sinks.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Returns the number of registered sinks.
    #[must_use]
    pub fn sink_count(&self) -> usize {
        self.sinks.read().len()
    }

    /// Turns the dispatcher on. Returns false if it was already on.
    pub fn enable(&self) -> bool {
        self.enabled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Turns the dispatcher off. Returns false if it was already off.
    pub fn disable(&self) -> bool {
        self.enabled
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Returns true if log calls are currently delivered to sinks.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Enables a registered sink.
    ///
    /// Returns false if the sink is unknown or already enabled.
    pub fn enable_sink<S: Sink + ?Sized>(&self, sink: &S) -> bool {
        self.set_sink_enabled(SinkId::of(sink), true)
    }

    /// Disables a registered sink.
    ///
    /// Returns false if the sink is unknown or already disabled.
    pub fn disable_sink<S: Sink + ?Sized>(&self, sink: &S) -> bool {
        self.set_sink_enabled(SinkId::of(sink), false)
    }

    /// Returns whether a sink is enabled, or `None` if it is not registered.
    #[must_use]
    pub fn is_sink_enabled<S: Sink + ?Sized>(&self, sink: &S) -> Option<bool> {
        let id = SinkId::of(sink);
        self.sinks
            .read()
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.enabled.load(Ordering::SeqCst))
    }

    fn set_sink_enabled(&self, id: SinkId, enabled: bool) -> bool {
        let sinks = self.sinks.read();
        sinks.iter().find(|r| r.id == id).is_some_and(|r| {
            r.enabled
                .compare_exchange(!enabled, enabled, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
        })
    }

    /// Disables a sink until the returned guard is dropped.
    ///
    /// Used by sinks that report their own failures through the dispatcher,
    /// so that the report is not delivered back to the failing sink. The sink
    /// is re-enabled when the guard drops, on every exit path.
    #[must_use = "the sink is re-enabled as soon as the guard is dropped"]
    pub fn suspend<S: Sink + ?Sized>(&self, sink: &S) -> SinkSuspension<'_> {
        let id = SinkId::of(sink);
        self.set_sink_enabled(id, false);
        SinkSuspension {
            dispatcher: self,
            id,
        }
    }

    /// Builds a log entry and delivers it to every enabled sink.
    ///
    /// If the caller cannot be resolved, a diagnostic is emitted through
    /// `tracing` and [`LogEntry::empty`] is returned without touching any
    /// sink. Otherwise the constructed entry is returned whatever the sinks
    /// do with it; while the dispatcher is globally disabled the entry is
    /// built but not delivered.
    pub fn log(
        &self,
        message: impl Into<String>,
        severity: LogSeverity,
        kind: LogType,
        caller: &CallerContext,
    ) -> LogEntry {
        let message = message.into();
        let timestamp = Local::now().naive_local();

        let Some(source) = caller.resolve() else {
            tracing::warn!(
                target: "claw_logs",
                %message,
                "cannot resolve the caller of a log call; message dropped"
            );
            return LogEntry::empty();
        };

        let entry = LogEntry::new(message, severity, kind, timestamp, source);
        if !self.is_enabled() {
            return entry;
        }

        // Snapshot so sinks may touch the registry while handling the entry.
        let snapshot = self.sinks.read().clone();
        for registration in &snapshot {
            if registration.enabled.load(Ordering::SeqCst) {
                registration.sink.handle(&entry, self);
            }
        }

        entry
    }

    /// Logs an error and its source chain with type [`LogType::Error`].
    pub fn log_failure<E: StdError + 'static>(
        &self,
        error: &E,
        severity: LogSeverity,
        caller: &CallerContext,
    ) -> LogEntry {
        self.log(format_error(error), severity, LogType::Error, caller)
    }

    /// Logs `message` followed by the rendered error and its source chain.
    pub fn log_failure_with<E: StdError + 'static>(
        &self,
        message: impl AsRef<str>,
        error: &E,
        severity: LogSeverity,
        caller: &CallerContext,
    ) -> LogEntry {
        let message = format!("{}\n{}", message.as_ref(), format_error(error));
        self.log(message, severity, LogType::Error, caller)
    }
}

/// Renders an error as `Type : "message"` followed by its causes.
#[must_use]
pub fn format_error<E: StdError + 'static>(error: &E) -> String {
    let full_name = std::any::type_name::<E>();
    let type_name = full_name.rsplit("::").next().unwrap_or(full_name);

    let mut rendered = format!("{type_name} : \"{error}\"");
    let mut cause = error.source();
    while let Some(err) = cause {
        rendered.push_str(&format!("\n  caused by: {err}"));
        cause = err.source();
    }
    rendered
}

/// Guard returned by [`Dispatcher::suspend`].
#[derive(Debug)]
pub struct SinkSuspension<'a> {
    dispatcher: &'a Dispatcher,
    id: SinkId,
}

impl Drop for SinkSuspension<'_> {
    fn drop(&mut self) {
        self.dispatcher.set_sink_enabled(self.id, true);
    }
}
