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

//! Severity levels and the threshold check shared by every adapter.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::AtomicI32;
use std::sync::atomic::Ordering;

use crate::Error;

/// The severity of a log event.
///
/// Levels are plain integers with a total order: a larger value is more severe. Besides the named
/// levels, any integer is a valid level, and the two sentinels [`Level::ALL`] and [`Level::OFF`]
/// bound the range so that they can be used as thresholds that accept everything or nothing.
///
/// ```
/// use tagforth::Level;
///
/// assert!(Level::ALL < Level::TRACE);
/// assert!(Level::WARN < Level::ERROR);
/// assert!(Level::ASSERT < Level::OFF);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(i32);

impl Level {
    /// Threshold that accepts every level.
    pub const ALL: Level = Level(i32::MIN);
    /// Highly detailed tracing.
    pub const TRACE: Level = Level(300);
    /// Fairly detailed tracing.
    pub const VERBOSE: Level = Level(400);
    /// Tracing broadly interesting to developers.
    pub const DEBUG: Level = Level(500);
    /// Static configuration messages.
    pub const CONFIG: Level = Level(700);
    /// Informational messages.
    pub const INFO: Level = Level(800);
    /// Potential problems.
    pub const WARN: Level = Level(900);
    /// Serious failures.
    pub const ERROR: Level = Level(1000);
    /// Conditions that should never happen.
    pub const ASSERT: Level = Level(1100);
    /// Threshold that accepts no level.
    pub const OFF: Level = Level(i32::MAX);

    /// Create a level from its raw value.
    pub const fn new(value: i32) -> Self {
        Level(value)
    }

    /// The raw value of this level.
    pub const fn value(self) -> i32 {
        self.0
    }

    /// The name of a named level, `None` for any other value.
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Level::ALL => "ALL",
            Level::TRACE => "TRACE",
            Level::VERBOSE => "VERBOSE",
            Level::DEBUG => "DEBUG",
            Level::CONFIG => "CONFIG",
            Level::INFO => "INFO",
            Level::WARN => "WARN",
            Level::ERROR => "ERROR",
            Level::ASSERT => "ASSERT",
            Level::OFF => "OFF",
            _ => return None,
        };
        Some(name)
    }

    /// The one-letter code printed in front of console records.
    ///
    /// Levels without a letter are printed as their numeric value.
    pub fn letter(self) -> String {
        let letter = match self {
            Level::TRACE => 'T',
            Level::VERBOSE => 'V',
            Level::DEBUG => 'D',
            Level::CONFIG => 'C',
            Level::INFO => 'I',
            Level::WARN => 'W',
            Level::ERROR => 'E',
            Level::ASSERT => 'A',
            _ => return self.0.to_string(),
        };
        letter.to_string()
    }
}

/// Whether an event at `level` passes `threshold`.
///
/// ```
/// use tagforth::Level;
///
/// assert!(tagforth::is_loggable(Level::WARN, Level::INFO));
/// assert!(tagforth::is_loggable(Level::INFO, Level::INFO));
/// assert!(!tagforth::is_loggable(Level::DEBUG, Level::INFO));
/// ```
pub fn is_loggable(level: Level, threshold: Level) -> bool {
    level >= threshold
}

/// The negation of [`is_loggable`].
pub fn is_not_loggable(level: Level, threshold: Level) -> bool {
    level < threshold
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.pad(name),
            None => write!(f, "Level({})", self.0),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.pad(name),
            None => f.pad(&self.0.to_string()),
        }
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Level, Self::Err> {
        let s = s.trim();
        for (name, level) in [
            ("all", Level::ALL),
            ("trace", Level::TRACE),
            ("verbose", Level::VERBOSE),
            ("debug", Level::DEBUG),
            ("config", Level::CONFIG),
            ("info", Level::INFO),
            ("warn", Level::WARN),
            ("warning", Level::WARN),
            ("error", Level::ERROR),
            ("assert", Level::ASSERT),
            ("wtf", Level::ASSERT),
            ("off", Level::OFF),
            ("none", Level::OFF),
        ] {
            if s.eq_ignore_ascii_case(name) {
                return Ok(level);
            }
        }

        s.parse::<i32>()
            .map(Level)
            .map_err(|err| Error::new(format!("malformed level: {s:?}")).with_source(err))
    }
}

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::ERROR,
            log::Level::Warn => Level::WARN,
            log::Level::Info => Level::INFO,
            log::Level::Debug => Level::DEBUG,
            log::Level::Trace => Level::TRACE,
        }
    }
}

impl From<Level> for log::Level {
    /// Map a level onto the five `log` levels by range.
    fn from(level: Level) -> Self {
        if level <= Level::VERBOSE {
            log::Level::Trace
        } else if level <= Level::DEBUG {
            log::Level::Debug
        } else if level <= Level::INFO {
            log::Level::Info
        } else if level <= Level::WARN {
            log::Level::Warn
        } else {
            log::Level::Error
        }
    }
}

/// A threshold shared between threads.
///
/// Readers may observe a stale value while a writer updates it; a single store is all an update
/// needs since no other state depends on the threshold.
#[derive(Debug)]
pub struct AtomicLevel(AtomicI32);

impl AtomicLevel {
    /// Create a threshold cell holding `level`.
    pub const fn new(level: Level) -> Self {
        AtomicLevel(AtomicI32::new(level.0))
    }

    /// Read the current threshold.
    pub fn load(&self) -> Level {
        Level(self.0.load(Ordering::Relaxed))
    }

    /// Replace the threshold.
    pub fn store(&self, level: Level) {
        self.0.store(level.0, Ordering::Relaxed);
    }
}

impl Default for AtomicLevel {
    fn default() -> Self {
        AtomicLevel::new(Level::ALL)
    }
}
