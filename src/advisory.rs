//! Human-readable advisories for the surrounding workflow.

use std::fmt;

/// How serious an advisory is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn level(self) -> log::Level {
        match self {
            Self::Info => log::Level::Info,
            Self::Warning => log::Level::Warn,
            Self::Error => log::Level::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Sink for advisories, injected into whatever needs to report them.
pub trait Advisor {
    fn advise(&self, message: &str, severity: Severity);
}

/// Forwards advisories to the `log` facade.
pub struct LogAdvisor;

impl Advisor for LogAdvisor {
    fn advise(&self, message: &str, severity: Severity) {
        log::log!(target: "rebinner::advisory", severity.level(), "advisory: {message}");
    }
}

#[cfg(test)]
pub mod testing {
    use super::{Advisor, Severity};
    use std::cell::RefCell;

    /// Keeps every advisory it receives.
    #[derive(Default)]
    pub struct RecordingAdvisor {
        pub records: RefCell<Vec<(String, Severity)>>,
    }

    impl Advisor for RecordingAdvisor {
        fn advise(&self, message: &str, severity: Severity) {
            self.records
                .borrow_mut()
                .push((message.to_string(), severity));
        }
    }
}
