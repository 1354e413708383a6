//! Call-site capture for log calls.
//!
//! Every public logging entry point is a macro, so the caller's module,
//! file, function and line are known at compile time and no stack walking
//! is needed at runtime.

use crate::types::Source;

/// The originating location of a log call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallerContext {
    /// Full module path of the caller (`module_path!()`).
    pub module_path: &'static str,
    /// Source file of the caller (`file!()`).
    pub file: &'static str,
    /// Name of the calling function.
    pub member: &'static str,
    /// Line of the call (`line!()`).
    pub line: u32,
}

impl CallerContext {
    /// A caller that could not be determined.
    pub const UNKNOWN: Self = Self {
        module_path: "",
        file: "",
        member: "",
        line: 0,
    };

    /// Creates a caller context from its parts.
    #[must_use]
    pub const fn new(
        module_path: &'static str,
        file: &'static str,
        member: &'static str,
        line: u32,
    ) -> Self {
        Self {
            module_path,
            file,
            member,
            line,
        }
    }

    /// Returns the name of the crate the caller belongs to.
    #[must_use]
    pub fn module(&self) -> &'static str {
        let path: &'static str = self.module_path;
        path.split("::").next().unwrap_or(path).trim()
    }

    /// Resolves this context into a [`Source`].
    ///
    /// Returns `None` when the originating module is unknown.
    #[must_use]
    pub fn resolve(&self) -> Option<Source> {
        let module = self.module();
        if module.is_empty() {
            return None;
        }
        Some(Source {
            module: module.to_string(),
            file: self.file.to_string(),
            member: self.member.to_string(),
            line: Some(self.line),
        })
    }
}

/// Extracts the function name from the type name of a marker item declared
/// inside it.
#[doc(hidden)]
#[must_use]
pub fn member_name(marker_type_name: &'static str) -> &'static str {
    let mut path = marker_type_name
        .strip_suffix("::__caller_marker")
        .unwrap_or(marker_type_name);
    while let Some(outer) = path.strip_suffix("::{{closure}}") {
        path = outer;
    }
    path.rsplit("::").next().unwrap_or(path)
}

/// Captures the [`CallerContext`] of the current call site.
#[macro_export]
macro_rules! caller {
    () => {
        $crate::CallerContext::new(
            ::std::module_path!(),
            ::std::file!(),
            {
                fn __caller_marker() {}
                $crate::caller::member_name(::std::any::type_name_of_val(&__caller_marker))
            },
            ::std::line!(),
        )
    };
}

/// Logs a formatted message with an explicit severity and type.
///
/// ```
/// use claw_logs::{log, Dispatcher, LogSeverity, LogType};
///
/// let dispatcher = Dispatcher::new();
/// let entry = log!(dispatcher, LogSeverity::Important, LogType::Warning, "disk at {}%", 91);
/// assert_eq!(entry.message, "disk at 91%");
/// ```
#[macro_export]
macro_rules! log {
    ($dispatcher:expr, $severity:expr, $kind:expr, $($arg:tt)+) => {
        $dispatcher.log(
            ::std::format!($($arg)+),
            $severity,
            $kind,
            &$crate::caller!(),
        )
    };
}

/// Logs a formatted informational message at normal severity.
#[macro_export]
macro_rules! log_info {
    ($dispatcher:expr, $($arg:tt)+) => {
        $crate::log!($dispatcher, $crate::LogSeverity::Normal, $crate::LogType::Info, $($arg)+)
    };
}

/// Logs a formatted warning at normal severity.
#[macro_export]
macro_rules! log_warn {
    ($dispatcher:expr, $($arg:tt)+) => {
        $crate::log!($dispatcher, $crate::LogSeverity::Normal, $crate::LogType::Warning, $($arg)+)
    };
}

/// Logs a formatted error at normal severity.
#[macro_export]
macro_rules! log_error {
    ($dispatcher:expr, $($arg:tt)+) => {
        $crate::log!($dispatcher, $crate::LogSeverity::Normal, $crate::LogType::Error, $($arg)+)
    };
}

/// Logs a formatted informational message at verbose severity.
#[macro_export]
macro_rules! log_verbose {
    ($dispatcher:expr, $($arg:tt)+) => {
        $crate::log!($dispatcher, $crate::LogSeverity::Verbose, $crate::LogType::Info, $($arg)+)
    };
}
