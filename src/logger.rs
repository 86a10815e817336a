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

//! The facade application code logs through.

use std::borrow::Cow;
use std::env;
use std::env::VarError;
use std::sync::Arc;

use value_bag::ValueBag;

use crate::Adapter;
use crate::Error;
use crate::Failure;
use crate::Level;
use crate::adapter::ConsoleAdapter;
use crate::event::Event;
use crate::event::Tag;
use crate::pipeline;

/// The path of [`Logger`], whose frames are cut from inferred tags and escalated failures.
pub const BOUNDARY: &str = concat!(module_path!(), "::Logger");

/// Create a new empty [`LoggerBuilder`].
///
/// # Examples
///
/// ```
/// use tagforth::Level;
/// use tagforth::adapter::ConsoleAdapter;
///
/// let logger = tagforth::builder()
///     .adapter(ConsoleAdapter::default())
///     .threshold(Level::INFO)
///     .build();
/// logger.info("Billing", "ready");
/// ```
pub fn builder() -> LoggerBuilder {
    LoggerBuilder {
        adapter: None,
        threshold: None,
    }
}

/// A builder for configuring a [`Logger`].
#[must_use = "call `apply` to set the global logger or `build` to construct a logger instance"]
#[derive(Debug)]
pub struct LoggerBuilder {
    adapter: Option<Arc<dyn Adapter>>,
    threshold: Option<Level>,
}

impl LoggerBuilder {
    /// Set the adapter.
    ///
    /// Default to [`ConsoleAdapter`].
    pub fn adapter(mut self, adapter: impl Into<Box<dyn Adapter>>) -> Self {
        self.adapter = Some(Arc::from(adapter.into()));
        self
    }

    /// Override the adapter's threshold.
    pub fn threshold(mut self, threshold: Level) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Override the adapter's threshold with the level named by the environment variable `key`.
    ///
    /// An unset variable leaves the threshold alone.
    ///
    /// # Errors
    ///
    /// Return an error if the variable is not unicode or does not name a level.
    ///
    /// # Examples
    ///
    /// ```
    /// let logger = tagforth::builder()
    ///     .threshold_from_env("TAGFORTH_EXAMPLE_UNSET")
    ///     .unwrap()
    ///     .build();
    /// ```
    pub fn threshold_from_env(mut self, key: &str) -> Result<Self, Error> {
        match env::var(key) {
            Ok(value) => {
                let threshold = value
                    .parse::<Level>()
                    .map_err(|err| err.with_context("env", key))?;
                self.threshold = Some(threshold);
                Ok(self)
            }
            Err(VarError::NotPresent) => Ok(self),
            Err(err) => Err(Error::new("failed to read threshold")
                .with_context("env", key)
                .with_source(err)),
        }
    }

    /// Build the [`Logger`].
    pub fn build(self) -> Logger {
        let adapter = self
            .adapter
            .unwrap_or_else(|| Arc::new(ConsoleAdapter::default()));
        if let Some(threshold) = self.threshold {
            adapter.set_threshold(threshold);
        }
        Logger { adapter }
    }

    /// Build the [`Logger`] and install a clone of it as the `log` crate's logger.
    ///
    /// # Errors
    ///
    /// Return an error if a global logger has already been set.
    ///
    /// # Examples
    ///
    /// ```
    /// if tagforth::builder().try_apply().is_err() {
    ///     eprintln!("failed to set logger");
    /// }
    /// ```
    pub fn try_apply(self) -> Result<Logger, Error> {
        let logger = self.build();
        log::set_boxed_logger(Box::new(logger.clone()))
            .map_err(|err| Error::new("failed to set global logger").with_source(err))?;
        log::set_max_level(log::LevelFilter::Trace);
        Ok(logger)
    }

    /// Build the [`Logger`] and install a clone of it as the `log` crate's logger.
    ///
    /// # Panics
    ///
    /// Panic if the global logger has already been set.
    pub fn apply(self) -> Logger {
        self.try_apply()
            .expect("LoggerBuilder::apply must be called before the global logger initialized")
    }
}

/// The logging facade.
///
/// A `Logger` prepares each call and hands it to its [`Adapter`]. It is cheap to clone, and every
/// clone shares the adapter. Entry points exist per level, each in four forms:
///
/// * `info(tag, message)` logs a message as is;
/// * `info_with(tag, || message)` computes the message only when the level is loggable;
/// * `info_failure(tag, message, error)` attaches an error;
/// * `info_failure_with(tag, error, || message)` attaches an error and computes the message lazily.
///
/// [`Logger::log_args`] substitutes printf-style arguments, and [`Logger::error_or_throw`]
/// escalates according to the adapter's policy.
///
/// Tags are anything convertible to a [`Tag`]; pass [`Tag::Caller`] to name the calling type.
///
/// # Examples
///
/// ```
/// use tagforth::Level;
/// use tagforth::Logger;
/// use tagforth::adapter::ConsoleAdapter;
/// use tagforth::adapter::Mode;
/// use tagforth::event::Tag;
/// use value_bag::ValueBag;
///
/// let logger = Logger::new(ConsoleAdapter::default().with_mode(Mode::Lenient));
///
/// logger.warn("Billing", "card declined");
/// logger.error_with(Tag::Caller, || format!("{} retries left", 0));
/// logger.log_args("Billing", Level::ERROR, "retry %d of %d", &[ValueBag::from(1), ValueBag::from(3)]);
/// assert!(logger.error_or_throw("Billing", Some("unreachable state"), None).is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Logger {
    adapter: Arc<dyn Adapter>,
}

macro_rules! level_methods {
    ($($level:ident => $plain:ident, $with:ident, $failure:ident, $failure_with:ident;)*) => {$(
        #[doc = concat!("Log `message` at [`Level::", stringify!($level), "`].")]
        #[inline(never)]
        pub fn $plain<'a>(&self, tag: impl Into<Tag<'a>>, message: &'a str) {
            let tag: Tag<'a> = tag.into();
            self.dispatch(Event::new(tag, Level::$level).with_message(message));
        }

        #[doc = concat!(
            "Log the message computed by `message` at [`Level::", stringify!($level), "`].\n\n",
            "`message` is not called when the level is not loggable."
        )]
        #[inline(never)]
        pub fn $with<'a, F, M>(&self, tag: impl Into<Tag<'a>>, message: F)
        where
            F: FnOnce() -> M,
            M: AsRef<str>,
        {
            if self.adapter.is_not_loggable(Level::$level) {
                return;
            }
            let tag: Tag<'a> = tag.into();
            let message = message();
            self.dispatch(Event::new(tag, Level::$level).with_message(message.as_ref()));
        }

        #[doc = concat!(
            "Log `error` at [`Level::", stringify!($level), "`], ",
            "with `message` or else the error's own message."
        )]
        #[inline(never)]
        pub fn $failure<'a>(&self, tag: impl Into<Tag<'a>>, message: Option<&'a str>, error: &'a Failure) {
            let tag: Tag<'a> = tag.into();
            let mut event = Event::new(tag, Level::$level).with_error(error);
            if let Some(message) = message {
                event = event.with_message(message);
            }
            self.dispatch(event);
        }

        #[doc = concat!(
            "Log `error` at [`Level::", stringify!($level), "`] with the message computed by ",
            "`message`.\n\n",
            "`message` is not called when the level is not loggable. An empty message falls back ",
            "to the error's own message."
        )]
        #[inline(never)]
        pub fn $failure_with<'a, F, M>(&self, tag: impl Into<Tag<'a>>, error: &'a Failure, message: F)
        where
            F: FnOnce() -> M,
            M: AsRef<str>,
        {
            if self.adapter.is_not_loggable(Level::$level) {
                return;
            }
            let tag: Tag<'a> = tag.into();
            let message = message();
            self.dispatch(
                Event::new(tag, Level::$level)
                    .with_message(message.as_ref())
                    .with_error(error),
            );
        }
    )*};
}

impl Logger {
    /// Create a logger over `adapter`.
    pub fn new(adapter: impl Into<Box<dyn Adapter>>) -> Self {
        Logger {
            adapter: Arc::from(adapter.into()),
        }
    }

    /// The adapter events are handed to.
    pub fn adapter(&self) -> &dyn Adapter {
        &*self.adapter
    }

    /// The adapter's threshold.
    pub fn threshold(&self) -> Level {
        self.adapter.threshold()
    }

    /// Replace the adapter's threshold, for every clone of this logger.
    pub fn set_threshold(&self, threshold: Level) {
        self.adapter.set_threshold(threshold);
    }

    /// Whether `level` passes the adapter's threshold.
    pub fn is_loggable(&self, level: Level) -> bool {
        self.adapter.is_loggable(level)
    }

    level_methods! {
        TRACE => trace, trace_with, trace_failure, trace_failure_with;
        VERBOSE => verbose, verbose_with, verbose_failure, verbose_failure_with;
        DEBUG => debug, debug_with, debug_failure, debug_failure_with;
        CONFIG => config, config_with, config_failure, config_failure_with;
        INFO => info, info_with, info_failure, info_failure_with;
        WARN => warn, warn_with, warn_failure, warn_failure_with;
        ERROR => error, error_with, error_failure, error_failure_with;
        ASSERT => wtf, wtf_with, wtf_failure, wtf_failure_with;
    }

    /// Log `message` at `level`.
    #[inline(never)]
    pub fn log<'a>(&self, tag: impl Into<Tag<'a>>, level: Level, message: &'a str) {
        let tag: Tag<'a> = tag.into();
        self.dispatch(Event::new(tag, level).with_message(message));
    }

    /// Log the message computed by `message` at `level`, calling it only if `level` is loggable.
    #[inline(never)]
    pub fn log_with<'a, F, M>(&self, tag: impl Into<Tag<'a>>, level: Level, message: F)
    where
        F: FnOnce() -> M,
        M: AsRef<str>,
    {
        if self.adapter.is_not_loggable(level) {
            return;
        }
        let tag: Tag<'a> = tag.into();
        let message = message();
        self.dispatch(Event::new(tag, level).with_message(message.as_ref()));
    }

    /// Log `error` at `level` with the message computed by `message`, calling it only if `level`
    /// is loggable.
    #[inline(never)]
    pub fn log_failure_with<'a, F, M>(
        &self,
        tag: impl Into<Tag<'a>>,
        level: Level,
        error: &'a Failure,
        message: F,
    ) where
        F: FnOnce() -> M,
        M: AsRef<str>,
    {
        if self.adapter.is_not_loggable(level) {
            return;
        }
        let tag: Tag<'a> = tag.into();
        let message = message();
        self.dispatch(
            Event::new(tag, level)
                .with_message(message.as_ref())
                .with_error(error),
        );
    }

    /// Log `template` with `args` substituted at `level`.
    ///
    /// A template that does not match its arguments is logged as a diagnostic instead; see
    /// [`prepare_message`](crate::pipeline::prepare_message).
    #[inline(never)]
    pub fn log_args<'a>(
        &self,
        tag: impl Into<Tag<'a>>,
        level: Level,
        template: &'a str,
        args: &'a [ValueBag<'a>],
    ) {
        let tag: Tag<'a> = tag.into();
        self.dispatch(Event::new(tag, level).with_message(template).with_args(args));
    }

    /// Log a fully specified event.
    #[inline(never)]
    pub fn log_event(&self, event: Event<'_>) {
        self.dispatch(event);
    }

    /// Log `error` with `message` at [`Level::ERROR`], or raise it.
    ///
    /// Whether the call raises is the adapter's escalation policy. A raised failure's message is
    /// `"<tag> Error: <message>"`, its cause is the resolved error, and its frames start at the
    /// caller of this method.
    ///
    /// # Errors
    ///
    /// Return the escalated failure when the adapter raises.
    #[inline(never)]
    pub fn error_or_throw<'a>(
        &self,
        tag: impl Into<Tag<'a>>,
        message: Option<&'a str>,
        error: Option<&'a Failure>,
    ) -> Result<(), Failure> {
        let tag: Tag<'a> = tag.into();
        let mut event = Event::new(tag, Level::ERROR);
        if let Some(message) = message {
            event = event.with_message(message);
        }
        if let Some(error) = error {
            event = event.with_error(error);
        }
        self.escalate(event)
    }

    /// Like [`error_or_throw`](Logger::error_or_throw), with `args` substituted into `template`.
    ///
    /// # Errors
    ///
    /// Return the escalated failure when the adapter raises.
    #[inline(never)]
    pub fn error_or_throw_args<'a>(
        &self,
        tag: impl Into<Tag<'a>>,
        template: &'a str,
        args: &'a [ValueBag<'a>],
        error: Option<&'a Failure>,
    ) -> Result<(), Failure> {
        let tag: Tag<'a> = tag.into();
        let mut event = Event::new(tag, Level::ERROR)
            .with_message(template)
            .with_args(args);
        if let Some(error) = error {
            event = event.with_error(error);
        }
        self.escalate(event)
    }

    /// Flush the adapter.
    pub fn flush(&self) {
        self.adapter.flush();
    }

    fn dispatch(&self, event: Event<'_>) {
        let adapter = &*self.adapter;
        if adapter.is_not_loggable(event.level()) {
            return;
        }

        let prepared = pipeline::prepare(adapter, &event);
        if !prepared.is_dropped() {
            adapter.deliver(
                prepared.tag(),
                prepared.level(),
                prepared.message(),
                prepared.error(),
            );
        }
    }

    fn escalate(&self, event: Event<'_>) -> Result<(), Failure> {
        let adapter = &*self.adapter;
        let prepared = pipeline::prepare(adapter, &event);
        adapter.escalate(prepared.tag(), prepared.message(), prepared.error())
    }
}

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.adapter.is_loggable(metadata.level().into())
    }

    fn log(&self, record: &log::Record) {
        let level = Level::from(record.level());
        if self.adapter.is_not_loggable(level) {
            return;
        }

        let message = match record.args().as_str() {
            Some(message) => Cow::Borrowed(message),
            None => Cow::Owned(record.args().to_string()),
        };
        self.dispatch(Event::new(record.target(), level).with_message(&message));
    }

    fn flush(&self) {
        self.adapter.flush();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::adapter::Mode;
    use crate::append::Capture;

    fn setup(mode: Mode) -> (Logger, Capture) {
        let capture = Capture::default();
        let adapter = ConsoleAdapter::default()
            .with_mode(mode)
            .with_threshold(Level::ALL)
            .with_append(capture.clone());
        (Logger::new(adapter), capture)
    }

    #[test]
    fn test_boundary_names_the_logger() {
        assert_eq!(BOUNDARY, "tagforth::logger::Logger");
        assert_eq!(BOUNDARY, std::any::type_name::<Logger>());
    }

    #[test]
    fn test_every_level() {
        let (logger, capture) = setup(Mode::Strict);
        logger.trace("T", "t");
        logger.verbose("T", "v");
        logger.debug("T", "d");
        logger.config("T", "c");
        logger.info("T", "i");
        logger.warn("T", "w");
        logger.error("T", "e");
        logger.wtf("T", "a");

        let levels: Vec<Level> = capture.records().iter().map(|r| r.level).collect();
        assert_eq!(
            levels,
            [
                Level::TRACE,
                Level::VERBOSE,
                Level::DEBUG,
                Level::CONFIG,
                Level::INFO,
                Level::WARN,
                Level::ERROR,
                Level::ASSERT
            ]
        );
    }

    #[test]
    fn test_lazy_message_is_not_evaluated_below_threshold() {
        let (logger, capture) = setup(Mode::Strict);
        logger.set_threshold(Level::WARN);

        let called = Cell::new(false);
        logger.debug_with("T", || {
            called.set(true);
            "expensive"
        });
        assert!(!called.get());

        logger.warn_with("T", || format!("{} left", 3));
        assert_eq!(capture.payloads(), ["3 left"]);
    }

    #[test]
    fn test_lazy_message_with_error() {
        let (logger, capture) = setup(Mode::Strict);
        logger.set_threshold(Level::WARN);
        let failure = Failure::bare("declined").with_kind("CardError");

        let called = Cell::new(false);
        logger.info_failure_with("T", &failure, || {
            called.set(true);
            "expensive"
        });
        logger.log_failure_with("T", Level::DEBUG, &failure, || {
            called.set(true);
            "expensive"
        });
        assert!(!called.get());
        assert!(capture.is_empty());

        logger.error_failure_with("T", &failure, || format!("{} attempts", 2));
        logger.log_failure_with("T", Level::WARN, &failure, String::new);
        assert_eq!(
            capture.payloads(),
            ["2 attempts\nCardError: declined", "declined\nCardError: declined"]
        );
    }

    #[test]
    fn test_failure_variants() {
        let (logger, capture) = setup(Mode::Strict);
        let failure = Failure::bare("boom").with_kind("Boom");

        logger.error_failure("T", None, &failure);
        logger.warn_failure("T", Some("careful"), &failure);
        logger.info_failure("T", None, &crate::STUB);

        assert_eq!(capture.payloads(), ["boom\nBoom: boom", "careful\nBoom: boom"]);
    }

    #[test]
    fn test_log_args() {
        let (logger, capture) = setup(Mode::Lenient);
        logger.log_args("T", Level::INFO, "x=%d", &[ValueBag::from(5)]);
        assert_eq!(capture.payloads(), ["x=5"]);
    }

    #[test]
    fn test_error_or_throw() {
        let (logger, capture) = setup(Mode::Strict);
        let err = logger.error_or_throw("X", Some("bad state"), None).unwrap_err();
        assert_eq!(err.message(), Some("X Error: bad state"));
        assert!(err.frames().iter().all(|f| f.declaring_type() != BOUNDARY));
        assert!(capture.is_empty());

        let (logger, capture) = setup(Mode::Lenient);
        logger.error_or_throw("X", Some("bad state"), None).unwrap();
        assert_eq!(capture.records().len(), 1);
        assert_eq!(capture.records()[0].level, Level::ERROR);
    }

    #[test]
    fn test_error_or_throw_args_with_error() {
        let (logger, _) = setup(Mode::Strict);
        let failure = Failure::bare("declined").with_kind("CardError");
        let err = logger
            .error_or_throw_args("X", "retry %d failed", &[ValueBag::from(3)], Some(&failure))
            .unwrap_err();
        assert_eq!(err.message(), Some("X Error: retry 3 failed"));
        assert_eq!(err.cause().and_then(Failure::message), Some("declined"));

        let (logger, capture) = setup(Mode::Lenient);
        logger
            .error_or_throw_args("X", "retry %d failed", &[ValueBag::from(3)], Some(&failure))
            .unwrap();
        assert_eq!(capture.payloads(), ["retry 3 failed\nCardError: declined"]);
    }

    #[test]
    fn test_bridge() {
        let (logger, capture) = setup(Mode::Strict);
        log::Log::log(
            &logger,
            &log::Record::builder()
                .target("app::billing")
                .level(log::Level::Warn)
                .args(format_args!("{}% done", 50))
                .build(),
        );

        let records = capture.records();
        assert_eq!(records[0].tag, "[L]app::billing");
        assert_eq!(records[0].level, Level::WARN);
        assert_eq!(records[0].payload, "50% done");
    }

    #[test]
    fn test_builder_threshold() {
        let logger = builder().threshold(Level::ERROR).build();
        assert_eq!(logger.threshold(), Level::ERROR);
        assert!(!logger.is_loggable(Level::WARN));
    }

    #[test]
    fn test_threshold_from_env() {
        let logger = builder()
            .threshold_from_env("TAGFORTH_TEST_SURELY_UNSET")
            .unwrap()
            .build();
        assert_eq!(logger.threshold(), Level::WARN);
    }
}
