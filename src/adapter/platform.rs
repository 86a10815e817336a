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

//! An adapter for platform loggers that limit tag and record sizes, with crash reporting.

use crate::Adapter;
use crate::Append;
use crate::AtomicLevel;
use crate::Error;
use crate::Failure;
use crate::Level;
use crate::adapter::CrashReporter;
use crate::adapter::LOG_MARK;
use crate::adapter::Mode;
use crate::adapter::crash::guarded;
use crate::append::Stderr;
use crate::pipeline;
use crate::record::Record;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

/// The longest tag the platform accepts, in bytes.
pub const MAX_TAG_LENGTH: usize = 23;

/// The longest record the platform accepts, in bytes.
pub const MAX_LOG_LENGTH: usize = 4000;

/// The priorities a platform logger knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Verbose = 2,
    Debug = 3,
    Info = 4,
    Warn = 5,
    Error = 6,
    Assert = 7,
}

impl Priority {
    /// The level records of this priority are written at.
    pub fn level(self) -> Level {
        match self {
            Priority::Verbose => Level::VERBOSE,
            Priority::Debug => Level::DEBUG,
            Priority::Info => Level::INFO,
            Priority::Warn => Level::WARN,
            Priority::Error => Level::ERROR,
            Priority::Assert => Level::ASSERT,
        }
    }
}

impl From<Level> for Priority {
    fn from(level: Level) -> Self {
        match level {
            Level::TRACE | Level::VERBOSE => Priority::Verbose,
            Level::DEBUG => Priority::Debug,
            Level::CONFIG | Level::INFO => Priority::Info,
            Level::WARN => Priority::Warn,
            Level::ERROR => Priority::Error,
            Level::ASSERT => Priority::Assert,
            level if level > Level::ASSERT => Priority::Assert,
            _ => Priority::Verbose,
        }
    }
}

/// An adapter for a platform logger, optionally reporting to a [`CrashReporter`].
///
/// * Tags are marked with `[L]` and cut to [`MAX_TAG_LENGTH`].
/// * Records of [`MAX_LOG_LENGTH`] or more are split, see [`split_message`].
/// * In production mode nothing is written unless release logging is enabled, and escalations
///   are delivered at [`Level::ERROR`] instead of raised.
///
/// With a reporter, every record at [`Level::DEBUG`] or above leaves a breadcrumb, and records at
/// [`Level::ERROR`] or above, or [`Level::WARN`] or above when an error is attached, are reported
/// as errors right away.
///
/// # Examples
///
/// ```
/// use tagforth::Level;
/// use tagforth::adapter::PlatformAdapter;
///
/// let adapter = PlatformAdapter::default()
///     .with_threshold(Level::DEBUG)
///     .with_production_mode(true);
/// ```
#[derive(Debug)]
pub struct PlatformAdapter {
    threshold: AtomicLevel,
    production_mode: bool,
    release_logging: bool,
    reporter: Option<Box<dyn CrashReporter>>,
    append: Box<dyn Append>,
    trap: Box<dyn Trap>,
}

impl Default for PlatformAdapter {
    fn default() -> Self {
        Self {
            threshold: AtomicLevel::new(Level::ALL),
            production_mode: false,
            release_logging: false,
            reporter: None,
            append: Box::new(Stderr::default()),
            trap: Box::new(DefaultTrap::default()),
        }
    }
}

impl PlatformAdapter {
    /// Set the threshold.
    pub fn with_threshold(self, threshold: Level) -> Self {
        self.threshold.store(threshold);
        self
    }

    /// Enable or disable production mode.
    pub fn with_production_mode(mut self, production_mode: bool) -> Self {
        self.production_mode = production_mode;
        self
    }

    /// Keep writing records in production mode.
    pub fn with_release_logging(mut self, release_logging: bool) -> Self {
        self.release_logging = release_logging;
        self
    }

    /// Forward errors and breadcrumbs to `reporter`.
    pub fn with_reporter(mut self, reporter: impl Into<Box<dyn CrashReporter>>) -> Self {
        self.reporter = Some(reporter.into());
        self
    }

    /// Set the appender standing in for the platform logger.
    ///
    /// Default to [`Stderr`].
    pub fn with_append(mut self, append: impl Into<Box<dyn Append>>) -> Self {
        self.append = append.into();
        self
    }

    /// Set the trap for write and reporter failures.
    ///
    /// Default to [`DefaultTrap`].
    pub fn with_trap(mut self, trap: impl Into<Box<dyn Trap>>) -> Self {
        self.trap = trap.into();
        self
    }

    fn report(&self, reporter: &dyn CrashReporter, level: Level, message: &str, error: Option<&Failure>) {
        let floor = if error.is_some() {
            Level::WARN
        } else {
            Level::ERROR
        };
        if level < floor {
            return;
        }

        let wrapped;
        let failure = match error {
            Some(error) if message.is_empty() => error,
            _ => {
                let message = if level >= Level::ASSERT {
                    format!("WTF: {message}")
                } else {
                    format!("{}: {message}", level.letter())
                };
                wrapped = Failure::sanitized(message, error.cloned());
                &wrapped
            }
        };
        guarded(&*self.trap, "report_error", || reporter.report_error(failure));
    }

    fn write(&self, priority: Priority, tag: &str, message: &str) {
        let tag = truncate(tag, MAX_TAG_LENGTH);
        for part in split_message(message, MAX_LOG_LENGTH) {
            let record = Record::new(priority.level(), tag, part);
            if let Err(err) = self.append.append(&record) {
                self.trap.trap(&err);
            }
        }
    }
}

impl Adapter for PlatformAdapter {
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

        if let Some(reporter) = &self.reporter {
            self.report(reporter.as_ref(), level, message, error);
        }

        let full = pipeline::render(message, error);
        let priority = Priority::from(level);

        if let Some(reporter) = self.reporter.as_deref().filter(|_| level >= Level::DEBUG) {
            guarded(&*self.trap, "report_breadcrumb", || {
                reporter.report_breadcrumb(priority, tag, &full)
            });
        }

        if !self.production_mode || self.release_logging {
            self.write(priority, &format!("{LOG_MARK}{tag}"), &full);
        }
    }

    fn escalate(
        &self,
        tag: &str,
        message: Option<&str>,
        error: Option<&Failure>,
    ) -> Result<(), Failure> {
        let mode = if self.production_mode {
            Mode::Lenient
        } else {
            Mode::Strict
        };
        pipeline::escalate(self, mode, tag, message, error)
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

/// Split `message` into parts no longer than `max` bytes, preserving lines.
///
/// A message shorter than `max` is returned whole. Otherwise every line becomes one part, or
/// several consecutive parts of `max` bytes and a remainder when the line is too long. Line breaks
/// are dropped. Parts never end inside a character, so a part may fall a few bytes short of
/// `max`.
///
/// ```
/// use tagforth::adapter::platform::split_message;
///
/// assert_eq!(split_message("abcdef\ngh", 4), ["abcd", "ef", "gh"]);
/// ```
pub fn split_message(message: &str, max: usize) -> Vec<&str> {
    if message.len() < max {
        return vec![message];
    }

    let len = message.len();
    let mut parts = Vec::with_capacity(len / max.max(1) + 1);
    let mut i = 0;
    while i < len {
        let newline = message[i..].find('\n').map_or(len, |n| i + n);
        loop {
            let mut end = newline.min(i + max);
            while !message.is_char_boundary(end) {
                end -= 1;
            }
            if end == i && i < newline {
                // a single character wider than `max`
                end = i + message[i..].chars().next().map_or(1, char::len_utf8);
            }
            parts.push(&message[i..end]);
            i = end;
            if i >= newline {
                break;
            }
        }
        i += 1;
    }
    parts
}

fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
