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

//! Backends that decide how prepared events are written.

use std::fmt;

use crate::Error;
use crate::Failure;
use crate::Level;
use crate::level;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

mod console;
mod crash;
mod delegate;
mod noop;
pub mod platform;

pub use self::console::ConsoleAdapter;
pub use self::crash::CrashReporter;
pub use self::delegate::DelegateAdapter;
pub use self::noop::NoopAdapter;
pub use self::platform::PlatformAdapter;
pub use self::platform::Priority;

/// Prefixed to tags written by the console and platform adapters, for easy filtering.
pub const LOG_MARK: &str = "[L]";

/// The contract every backend implements.
///
/// Adapters receive events that were already [prepared](crate::pipeline::prepare). They are
/// shared between threads, so the threshold is set through `&self`.
pub trait Adapter: fmt::Debug + Send + Sync + 'static {
    /// The lowest level this adapter writes.
    fn threshold(&self) -> Level;

    /// Replace the threshold. Concurrent log calls may still see the previous value.
    fn set_threshold(&self, threshold: Level);

    /// Write one event.
    ///
    /// Implementations must do nothing when `level` is not loggable or when both `message` and
    /// `error` are absent. An attached error's trace is written after the message. Nothing
    /// written here may fail the caller.
    fn deliver(&self, tag: &str, level: Level, message: Option<&str>, error: Option<&Failure>);

    /// Log an error, or raise it, according to the adapter's escalation policy.
    ///
    /// See [`pipeline::escalate`](crate::pipeline::escalate).
    fn escalate(
        &self,
        tag: &str,
        message: Option<&str>,
        error: Option<&Failure>,
    ) -> Result<(), Failure>;

    /// Handle an internal error that cannot be returned to the caller.
    ///
    /// Default to [`DefaultTrap`].
    fn trap(&self, err: &Error) {
        DefaultTrap::default().trap(err);
    }

    /// Flush any buffered output.
    fn flush(&self) {}

    /// Whether `level` passes this adapter's threshold.
    fn is_loggable(&self, level: Level) -> bool {
        level::is_loggable(level, self.threshold())
    }

    /// The negation of [`is_loggable`](Adapter::is_loggable).
    fn is_not_loggable(&self, level: Level) -> bool {
        level::is_not_loggable(level, self.threshold())
    }
}

impl<T: Adapter> From<T> for Box<dyn Adapter> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

/// How an adapter escalates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Raise the escalated error to the caller.
    Strict,
    /// Deliver the escalated error at [`Level::ERROR`] and raise nothing.
    Lenient,
}

impl Mode {
    /// `Strict` in builds with debug assertions, `Lenient` otherwise.
    pub fn from_build() -> Self {
        if cfg!(debug_assertions) {
            Mode::Strict
        } else {
            Mode::Lenient
        }
    }
}
