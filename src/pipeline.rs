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

//! Event preparation shared by every adapter.
//!
//! A log call goes through [`prepare`] before it reaches [`Adapter::deliver`]: the error is
//! extracted first, then the message is resolved against it, then the tag. Escalating calls run
//! the same preparation and hand the result to [`Adapter::escalate`], which adapters implement on
//! top of [`escalate`].

use std::borrow::Cow;

use value_bag::ValueBag;

use crate::Adapter;
use crate::Error;
use crate::Failure;
use crate::Level;
use crate::adapter::Mode;
use crate::event::Event;
use crate::event::PreparedEvent;
use crate::event::Tag;
use crate::format;
use crate::logger::BOUNDARY;
use crate::stack;
use crate::stack::Frame;

/// The tag the library logs its own problems under.
pub const LOG_TAG: &str = "tagforth";

/// Printed in an escalated failure when the event resolved to no message.
const NO_MESSAGE: &str = "(no message)";

/// Resolve every part of `event`.
///
/// The result may be [dropped](PreparedEvent::is_dropped); delivering it is up to the caller.
pub fn prepare<'a>(adapter: &dyn Adapter, event: &Event<'a>) -> PreparedEvent<'a> {
    let error = prepare_error(event.tag(), event.error(), event.args());
    let message = prepare_message(adapter, error.as_deref(), event.message(), event.args());
    let tag = prepare_tag(event.tag());
    PreparedEvent {
        tag,
        level: event.level(),
        message,
        error,
    }
}

/// Pick the error attached to an event.
///
/// An explicit error wins unless it is the [`STUB`](crate::STUB). Otherwise a
/// [`Tag::Failure`] is used, and as a last resort the first positional argument when it holds an
/// error, which catches calls that put the error among the arguments.
pub fn prepare_error<'a>(
    tag: Tag<'a>,
    error: Option<&'a Failure>,
    args: &[ValueBag<'_>],
) -> Option<Cow<'a, Failure>> {
    if let Some(error) = error.filter(|error| !error.is_stub()) {
        return Some(Cow::Borrowed(error));
    }

    if let Tag::Failure(failure) = tag {
        return Some(Cow::Borrowed(failure));
    }

    args.first()
        .and_then(|arg| arg.to_borrowed_error())
        .map(|err| Cow::Owned(Failure::from_dyn(err)))
}

/// Resolve a tag to its text.
///
/// [`Tag::Caller`] captures the current stack and names the first frame after the last
/// [`Logger`](crate::Logger) frame. When no `Logger` frame is on the stack the innermost frame is
/// used, and when no frame could be captured at all the tag is [`LOG_TAG`].
pub fn prepare_tag(tag: Tag<'_>) -> Cow<'_, str> {
    match tag {
        Tag::Text(text) => Cow::Borrowed(text),
        Tag::Type(path) => Cow::Borrowed(stack::simple_name(path)),
        Tag::Failure(failure) => Cow::Borrowed(stack::simple_name(failure.kind())),
        Tag::Caller => Cow::Owned(infer_tag()),
    }
}

fn infer_tag() -> String {
    let frames = stack::capture();
    let start = stack::index_of_trace_start(&frames, BOUNDARY);
    frames
        .get(start)
        .map(Frame::create_tag)
        .filter(|tag| !tag.is_empty())
        .unwrap_or_else(|| LOG_TAG.to_string())
}

/// Resolve the message of an event.
///
/// An absent or empty message falls back to the error's message. A message with arguments is a
/// printf-style template (see [`format`](crate::format)); a message without arguments is used
/// verbatim.
///
/// A template that cannot be formatted never fails the call. The returned message becomes
/// `"<template>; FORMAT ERROR: <reason>; ARGS: [<args>]"`, and the same text is escalated through
/// `adapter` under [`LOG_TAG`] with the formatting error, caused by `error`, attached. If the
/// adapter raises, the raised failure goes to the adapter's trap.
pub fn prepare_message<'a>(
    adapter: &dyn Adapter,
    error: Option<&Failure>,
    message: Option<&'a str>,
    args: &[ValueBag<'_>],
) -> Option<Cow<'a, str>> {
    let message = match message {
        Some(message) if !message.is_empty() => message,
        _ => return error.and_then(Failure::message).map(|m| Cow::Owned(m.to_string())),
    };

    if args.is_empty() {
        return Some(Cow::Borrowed(message));
    }

    match format::format(message, args) {
        Ok(text) => Some(Cow::Owned(text)),
        Err(err) => {
            let dump = args
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            let diagnostic = format!("{message}; FORMAT ERROR: {err}; ARGS: [{dump}]");

            let mut failure = Failure::capture(&err);
            failure.sanitize(BOUNDARY);
            if let Some(error) = error {
                failure.init_cause(error.clone());
            }

            if let Err(raised) = adapter.escalate(LOG_TAG, Some(&diagnostic), Some(&failure)) {
                adapter.trap(&Error::from_failure(raised).with_context("tag", LOG_TAG));
            }
            Some(Cow::Owned(diagnostic))
        }
    }
}

/// Apply the escalation policy of `mode` to a prepared event.
///
/// In [`Mode::Strict`] this returns a [sanitized](Failure::sanitized) failure with the message
/// `"<tag> Error: <message>"` caused by `error`. In [`Mode::Lenient`] the event is delivered at
/// [`Level::ERROR`] instead and nothing is raised.
pub fn escalate(
    adapter: &dyn Adapter,
    mode: Mode,
    tag: &str,
    message: Option<&str>,
    error: Option<&Failure>,
) -> Result<(), Failure> {
    match mode {
        Mode::Strict => {
            let message = message.unwrap_or(NO_MESSAGE);
            Err(Failure::sanitized(
                format!("{tag} Error: {message}"),
                error.cloned(),
            ))
        }
        Mode::Lenient => {
            adapter.deliver(tag, Level::ERROR, message, error);
            Ok(())
        }
    }
}

/// The text an adapter writes for an event: the message, then the error's trace on the next
/// line. An empty message leaves just the trace.
pub fn render<'a>(message: &'a str, error: Option<&Failure>) -> Cow<'a, str> {
    match error {
        Some(error) if message.is_empty() => Cow::Owned(error.stack_trace_string()),
        Some(error) => Cow::Owned(format!("{message}\n{}", error.stack_trace_string())),
        None => Cow::Borrowed(message),
    }
}
