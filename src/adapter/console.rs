// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::Adapter;
use crate::Append;
use crate::AtomicLevel;
use crate::Error;
use crate::Failure;
use crate::Level;
use crate::adapter::LOG_MARK;
use crate::adapter::Mode;
use crate::append::Stderr;
use crate::pipeline;
use crate::record::Record;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

/// An adapter that writes `mm:ss.SSS L/[L]tag message` lines, to stderr by default.
///
/// The threshold defaults to [`Level::WARN`] and the escalation mode to [`Mode::from_build`].
/// Escalations are ignored entirely while [`Level::ERROR`] is not loggable.
///
/// # Examples
///
/// ```
/// use tagforth::Level;
/// use tagforth::adapter::ConsoleAdapter;
/// use tagforth::adapter::Mode;
/// use tagforth::append::Stdout;
///
/// let adapter = ConsoleAdapter::default()
///     .with_threshold(Level::INFO)
///     .with_mode(Mode::Lenient)
///     .with_append(Stdout::default());
/// ```
#[derive(Debug)]
pub struct ConsoleAdapter {
    threshold: AtomicLevel,
    mode: Mode,
    append: Box<dyn Append>,
    trap: Box<dyn Trap>,
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self {
            threshold: AtomicLevel::new(Level::WARN),
            mode: Mode::from_build(),
            append: Box::new(Stderr::default()),
            trap: Box::new(DefaultTrap::default()),
        }
    }
}

impl ConsoleAdapter {
    /// Set the threshold.
    pub fn with_threshold(self, threshold: Level) -> Self {
        self.threshold.store(threshold);
        self
    }

    /// Set the escalation mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the appender lines are written to.
    ///
    /// Default to [`Stderr`].
    pub fn with_append(mut self, append: impl Into<Box<dyn Append>>) -> Self {
        self.append = append.into();
        self
    }

    /// Set the trap for write failures and raised escalations that cannot reach a caller.
    ///
    /// Default to [`DefaultTrap`].
    pub fn with_trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }
}

impl Adapter for ConsoleAdapter {
    fn threshold(&self) -> Level {
        self.threshold.load()
    }

    fn set_threshold(&self, threshold: Level) {
        self.threshold.store(threshold);
    }

    fn deliver(&self, tag: &str, level: Level, message: Option<&str>, error: Option<&Failure>) {
        if self.is_not_loggable(level) {
            return;
        }

        let message = match (message, error) {
            (Some(message), _) => message,
            (None, Some(_)) => "",
            (None, None) => return,
        };

        let tag = format!("{LOG_MARK}{tag}");
        let payload = pipeline::render(message, error);
        if let Err(err) = self.append.append(&Record::new(level, &tag, &payload)) {
            self.trap.trap(&err);
        }
    }

    fn escalate(
        &self,
        tag: &str,
        message: Option<&str>,
        error: Option<&Failure>,
    ) -> Result<(), Failure> {
        if self.is_not_loggable(Level::ERROR) {
            return Ok(());
        }
        pipeline::escalate(self, self.mode, tag, message, error)
    }

    fn trap(&self, err: &Error) {
        self.trap.trap(err);
    }

    fn flush(&self) {
        if let Err(err) = self.append.flush() {
            self.trap.trap(&err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::append::Capture;

    fn adapter(mode: Mode) -> (ConsoleAdapter, Capture) {
        let capture = Capture::default();
        let adapter = ConsoleAdapter::default()
            .with_mode(mode)
            .with_append(capture.clone());
        (adapter, capture)
    }

    #[test]
    fn test_default_threshold_is_warn() {
        let (adapter, capture) = adapter(Mode::Strict);
        assert_eq!(adapter.threshold(), Level::WARN);

        adapter.deliver("Billing", Level::INFO, Some("ignored"), None);
        adapter.deliver("Billing", Level::WARN, Some("low funds"), None);

        let records = capture.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tag, "[L]Billing");
        assert_eq!(records[0].level, Level::WARN);
        assert_eq!(records[0].payload, "low funds");
    }

    #[test]
    fn test_nothing_to_say_is_dropped() {
        let (adapter, capture) = adapter(Mode::Strict);
        adapter.deliver("Billing", Level::ERROR, None, None);
        assert!(capture.is_empty());
    }

    #[test]
    fn test_trace_follows_message() {
        let (adapter, capture) = adapter(Mode::Strict);
        let failure = Failure::bare("declined").with_kind("CardError");

        adapter.deliver("Billing", Level::ERROR, Some("payment failed"), Some(&failure));
        adapter.deliver("Billing", Level::ERROR, None, Some(&failure));

        assert_eq!(
            capture.payloads(),
            ["payment failed\nCardError: declined", "CardError: declined"]
        );
    }

    #[test]
    fn test_escalate_strict() {
        let (adapter, capture) = adapter(Mode::Strict);
        let err = adapter.escalate("X", Some("bad state"), None).unwrap_err();
        assert_eq!(err.message(), Some("X Error: bad state"));
        assert!(capture.is_empty());
    }

    #[test]
    fn test_escalate_lenient() {
        let (adapter, capture) = adapter(Mode::Lenient);
        adapter.escalate("X", Some("bad state"), None).unwrap();

        let records = capture.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::ERROR);
        assert_eq!(records[0].payload, "bad state");
    }

    #[test]
    fn test_escalate_ignored_below_threshold() {
        let (adapter, capture) = adapter(Mode::Strict);
        adapter.set_threshold(Level::OFF);
        assert!(adapter.escalate("X", Some("bad state"), None).is_ok());
        assert!(capture.is_empty());
    }
}
