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

use std::fmt::Write;

#[cfg(feature = "colored")]
use colored::Color;
#[cfg(feature = "colored")]
use colored::ColoredString;
#[cfg(feature = "colored")]
use colored::Colorize;
use jiff::tz::TimeZone;

use crate::Error;
use crate::Level;
use crate::layout::Layout;
use crate::record::Record;

/// A layout that writes `mm:ss.SSS L/tag message`.
///
/// `L` is the [letter](Level::letter) of the record's level. The timestamp is rendered in the
/// system time zone unless configured otherwise. With the `colored` feature the letter is colored
/// by severity.
///
/// # Examples
///
/// ```
/// use jiff::tz::TimeZone;
/// use tagforth::layout::TextLayout;
///
/// let layout = TextLayout::default().timezone(TimeZone::UTC);
/// ```
#[derive(Debug, Clone)]
pub struct TextLayout {
    #[cfg(feature = "colored")]
    colors: LevelColor,
    #[cfg(feature = "colored")]
    no_color: bool,
    timezone: TimeZone,
    no_time: bool,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            #[cfg(feature = "colored")]
            colors: LevelColor::default(),
            #[cfg(feature = "colored")]
            no_color: false,
            timezone: TimeZone::system(),
            no_time: false,
        }
    }
}

impl TextLayout {
    /// Set the timezone for timestamps.
    ///
    /// Defaults to the system timezone if not set.
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.timezone = tz;
        self
    }

    /// Omit the timestamp.
    pub fn no_time(mut self) -> Self {
        self.no_time = true;
        self
    }

    /// Disable colored output.
    #[cfg(feature = "colored")]
    pub fn no_color(mut self) -> Self {
        self.no_color = true;
        self
    }

    /// Customize the color of the error and assert letters. Default to red.
    ///
    /// No effect if `no_color` is set to `true`.
    #[cfg(feature = "colored")]
    pub fn error_color(mut self, color: Color) -> Self {
        self.colors.error = color;
        self
    }

    /// Customize the color of the warn letter. Default to yellow.
    ///
    /// No effect if `no_color` is set to `true`.
    #[cfg(feature = "colored")]
    pub fn warn_color(mut self, color: Color) -> Self {
        self.colors.warn = color;
        self
    }

    /// Customize the color of the config and info letters. Default to green.
    ///
    /// No effect if `no_color` is set to `true`.
    #[cfg(feature = "colored")]
    pub fn info_color(mut self, color: Color) -> Self {
        self.colors.info = color;
        self
    }

    #[cfg(feature = "colored")]
    fn format_letter(&self, level: Level) -> ColoredString {
        self.colors.colorize_letter(self.no_color, level)
    }

    #[cfg(not(feature = "colored"))]
    fn format_letter(&self, level: Level) -> String {
        level.letter()
    }
}

impl Layout for TextLayout {
    fn format(&self, record: &Record) -> Result<Vec<u8>, Error> {
        let tag = record.tag();
        let payload = record.payload();
        let mut text = String::with_capacity(16 + tag.len() + payload.len());

        if !self.no_time {
            let time = record.time().to_zoned(self.timezone.clone());
            write!(
                &mut text,
                "{:02}:{:02}.{:03} ",
                time.minute(),
                time.second(),
                time.millisecond()
            )
            .map_err(Error::from_fmt_error)?;
        }

        let letter = self.format_letter(record.level());
        write!(&mut text, "{letter}/{tag} {payload}").map_err(Error::from_fmt_error)?;
        Ok(text.into_bytes())
    }
}

#[cfg(feature = "colored")]
#[derive(Debug, Clone)]
struct LevelColor {
    error: Color,
    warn: Color,
    info: Color,
    debug: Color,
    trace: Color,
}

#[cfg(feature = "colored")]
impl Default for LevelColor {
    fn default() -> Self {
        Self {
            error: Color::Red,
            warn: Color::Yellow,
            info: Color::Green,
            debug: Color::Blue,
            trace: Color::Magenta,
        }
    }
}

#[cfg(feature = "colored")]
impl LevelColor {
    fn colorize_letter(&self, no_color: bool, level: Level) -> ColoredString {
        if no_color {
            return ColoredString::from(level.letter());
        }

        let color = if level >= Level::ERROR {
            self.error
        } else if level >= Level::WARN {
            self.warn
        } else if level >= Level::CONFIG {
            self.info
        } else if level >= Level::DEBUG {
            self.debug
        } else {
            self.trace
        };
        ColoredString::from(level.letter()).color(color)
    }
}
