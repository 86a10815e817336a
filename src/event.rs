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

//! The raw arguments of one log call, and what they resolve to.

use std::borrow::Cow;

use value_bag::ValueBag;

use crate::Failure;
use crate::Level;

/// Identifies the source of a log event.
///
/// # Examples
///
/// ```
/// use tagforth::event::Tag;
///
/// struct Ledger;
///
/// let text = Tag::from("Billing");
/// let typed = Tag::of(&Ledger);
/// let inferred = Tag::Caller;
/// # let _ = (text, typed, inferred);
/// ```
#[derive(Debug, Clone, Copy)]
pub enum Tag<'a> {
    /// Used verbatim.
    Text(&'a str),
    /// The path of a type; resolves to its simple name.
    Type(&'static str),
    /// An error used as the source; resolves to the simple name of its kind and also serves as
    /// the event's error when none is given.
    Failure(&'a Failure),
    /// Inferred from the first stack frame outside the [`Logger`](crate::Logger).
    Caller,
}

impl Tag<'_> {
    /// A tag naming the type of `value`.
    pub fn of<T: ?Sized>(_value: &T) -> Tag<'static> {
        Tag::Type(std::any::type_name::<T>())
    }

    /// A tag naming the type `T`.
    pub fn type_of<T: ?Sized>() -> Tag<'static> {
        Tag::Type(std::any::type_name::<T>())
    }
}

impl<'a> From<&'a str> for Tag<'a> {
    fn from(text: &'a str) -> Self {
        Tag::Text(text)
    }
}

impl<'a> From<&'a String> for Tag<'a> {
    fn from(text: &'a String) -> Self {
        Tag::Text(text)
    }
}

impl<'a> From<&'a Failure> for Tag<'a> {
    fn from(failure: &'a Failure) -> Self {
        Tag::Failure(failure)
    }
}

impl<'a> From<Option<&'a str>> for Tag<'a> {
    fn from(text: Option<&'a str>) -> Self {
        text.map_or(Tag::Caller, Tag::Text)
    }
}

/// The raw arguments of one log call.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    tag: Tag<'a>,
    level: Level,
    message: Option<&'a str>,
    error: Option<&'a Failure>,
    args: &'a [ValueBag<'a>],
}

impl<'a> Event<'a> {
    /// Create an event without message, error or arguments.
    pub fn new(tag: impl Into<Tag<'a>>, level: Level) -> Self {
        Event {
            tag: tag.into(),
            level,
            message: None,
            error: None,
            args: &[],
        }
    }

    /// Set the message, a printf-style template when arguments are given.
    pub fn with_message(mut self, message: &'a str) -> Self {
        self.message = Some(message);
        self
    }

    /// Attach an error. [`STUB`](crate::STUB) counts as no error.
    pub fn with_error(mut self, error: &'a Failure) -> Self {
        self.error = Some(error);
        self
    }

    /// Set the positional arguments substituted into the message.
    pub fn with_args(mut self, args: &'a [ValueBag<'a>]) -> Self {
        self.args = args;
        self
    }

    pub fn tag(&self) -> Tag<'a> {
        self.tag
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> Option<&'a str> {
        self.message
    }

    pub fn error(&self) -> Option<&'a Failure> {
        self.error
    }

    pub fn args(&self) -> &'a [ValueBag<'a>] {
        self.args
    }
}

/// An event after tag, error and message resolution.
///
/// An event whose message and error both resolved to nothing is [dropped](Self::is_dropped) and
/// never reaches an adapter's output.
#[derive(Debug, Clone)]
pub struct PreparedEvent<'a> {
    pub(crate) tag: Cow<'a, str>,
    pub(crate) level: Level,
    pub(crate) message: Option<Cow<'a, str>>,
    pub(crate) error: Option<Cow<'a, Failure>>,
}

impl<'a> PreparedEvent<'a> {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn error(&self) -> Option<&Failure> {
        self.error.as_deref()
    }

    /// Whether there is nothing to say.
    pub fn is_dropped(&self) -> bool {
        self.message.is_none() && self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ledger;

    #[test]
    fn test_tag_conversions() {
        assert!(matches!(Tag::from("Billing"), Tag::Text("Billing")));
        assert!(matches!(Tag::from(None::<&str>), Tag::Caller));
        match Tag::of(&Ledger) {
            Tag::Type(path) => assert!(path.ends_with("::Ledger")),
            tag => panic!("unexpected tag {tag:?}"),
        }
    }

    #[test]
    fn test_event_builder() {
        let args = [ValueBag::from(5)];
        let failure = Failure::bare("boom");
        let event = Event::new("Billing", Level::INFO)
            .with_message("x=%d")
            .with_error(&failure)
            .with_args(&args);

        assert_eq!(event.level(), Level::INFO);
        assert_eq!(event.message(), Some("x=%d"));
        assert_eq!(event.args().len(), 1);
        assert!(event.error().is_some());
    }
}
