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

use std::fmt;

use crate::Adapter;
use crate::AtomicLevel;
use crate::Error;
use crate::Failure;
use crate::Level;
use crate::adapter::Mode;
use crate::pipeline;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

/// An adapter that forwards events to another [`log::Log`] implementation.
///
/// The tag becomes the record's target and the level is mapped onto the five `log` levels by
/// range. An attached error is forwarded as the `error` key-value, holding the rendered trace.
///
/// Unless a mode is configured, escalations are raised while [`Level::VERBOSE`] is loggable and
/// delivered at [`Level::ERROR`] otherwise.
///
/// Do not forward to the logger installed by [`LoggerBuilder::apply`](crate::LoggerBuilder::apply)
/// itself, which would feed every event back into this adapter.
pub struct DelegateAdapter {
    threshold: AtomicLevel,
    mode: Option<Mode>,
    delegate: Box<dyn log::Log>,
    trap: Box<dyn Trap>,
}

impl fmt::Debug for DelegateAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegateAdapter")
            .field("threshold", &self.threshold)
            .field("mode", &self.mode)
            .field("trap", &self.trap)
            .finish_non_exhaustive()
    }
}

impl DelegateAdapter {
    /// Forward to `delegate`.
    pub fn new(delegate: impl log::Log + 'static) -> Self {
        Self {
            threshold: AtomicLevel::new(Level::ALL),
            mode: None,
            delegate: Box::new(delegate),
            trap: Box::new(DefaultTrap::default()),
        }
    }

    /// Set the threshold.
    pub fn with_threshold(self, threshold: Level) -> Self {
        self.threshold.store(threshold);
        self
    }

    /// Fix the escalation mode instead of deriving it from the threshold.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set the trap for raised escalations that cannot reach a caller.
    ///
    /// Default to [`DefaultTrap`].
    pub fn with_trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    fn mode(&self) -> Mode {
        match self.mode {
            Some(mode) => mode,
            None if self.is_loggable(Level::VERBOSE) => Mode::Strict,
            None => Mode::Lenient,
        }
    }
}

impl Adapter for DelegateAdapter {
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

        let level = log::Level::from(level);
        match error.map(Failure::stack_trace_string) {
            Some(trace) => self.delegate.log(
                &log::Record::builder()
                    .target(tag)
                    .level(level)
                    .args(format_args!("{message}"))
                    .key_values(&("error", trace.as_str()))
                    .build(),
            ),
            None => self.delegate.log(
                &log::Record::builder()
                    .target(tag)
                    .level(level)
                    .args(format_args!("{message}"))
                    .build(),
            ),
        }
    }

    fn escalate(
        &self,
        tag: &str,
        message: Option<&str>,
        error: Option<&Failure>,
    ) -> Result<(), Failure> {
        pipeline::escalate(self, self.mode(), tag, message, error)
    }

    fn trap(&self, err: &Error) {
        self.trap.trap(err);
    }

    fn flush(&self) {
        self.delegate.flush();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;

    type Seen = Arc<Mutex<Vec<(String, log::Level, String, Option<String>)>>>;

    #[derive(Default, Clone)]
    struct Sink(Seen);

    impl log::Log for Sink {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            let error = record
                .key_values()
                .get(log::kv::Key::from("error"))
                .map(|v| v.to_string());
            self.0.lock().unwrap().push((
                record.target().to_string(),
                record.level(),
                record.args().to_string(),
                error,
            ));
        }

        fn flush(&self) {}
    }

    #[test]
    fn test_forwarding() {
        let sink = Sink::default();
        let adapter = DelegateAdapter::new(sink.clone());
        let failure = Failure::bare("declined").with_kind("CardError");

        adapter.deliver("Billing", Level::VERBOSE, Some("v"), None);
        adapter.deliver("Billing", Level::CONFIG, Some("c"), None);
        adapter.deliver("Billing", Level::new(950), Some("e"), Some(&failure));
        adapter.deliver("Billing", Level::INFO, None, None);

        let seen = sink.0.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0], ("Billing".to_string(), log::Level::Trace, "v".to_string(), None));
        assert_eq!(seen[1].1, log::Level::Info);
        assert_eq!(seen[2].1, log::Level::Error);
        assert_eq!(seen[2].3.as_deref(), Some("CardError: declined"));
    }

    #[test]
    fn test_escalation_follows_verbose_threshold() {
        let sink = Sink::default();
        let adapter = DelegateAdapter::new(sink.clone());
        assert!(adapter.escalate("X", Some("bad state"), None).is_err());

        adapter.set_threshold(Level::DEBUG);
        assert!(adapter.escalate("X", Some("bad state"), None).is_ok());
        assert_eq!(sink.0.lock().unwrap()[0].1, log::Level::Error);

        let adapter = DelegateAdapter::new(Sink::default()).with_mode(Mode::Lenient);
        assert!(adapter.escalate("X", Some("bad state"), None).is_ok());
    }
}
