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

//! The error object attached to log events and raised by escalation.

use std::borrow::Cow;
use std::fmt;
use std::fmt::Write;

use crate::logger::BOUNDARY;
use crate::stack;
use crate::stack::Frame;

/// An error together with the call stack it was captured at.
///
/// A `Failure` is what the pipeline attaches to events: it has a kind (the name of the error's
/// type), an optional message, an optional cause and the frames captured when it was created.
/// Arbitrary [`std::error::Error`]s are converted with [`Failure::capture`].
///
/// # Examples
///
/// ```
/// use tagforth::Failure;
///
/// let io = std::io::Error::other("disk full");
/// let failure = Failure::capture(&io);
/// assert_eq!(failure.message(), Some("disk full"));
/// ```
#[derive(Clone)]
pub struct Failure {
    kind: Cow<'static, str>,
    message: Option<String>,
    cause: Option<Box<Failure>>,
    frames: Vec<Frame>,
}

/// A stand-in meaning "no error", accepted wherever an error is expected.
///
/// The pipeline treats a reference to this value exactly like an absent error.
pub static STUB: Failure = Failure {
    kind: Cow::Borrowed("Stub"),
    message: None,
    cause: None,
    frames: Vec::new(),
};

impl Failure {
    /// Create a failure with `message`, capturing the current call stack.
    pub fn new(message: impl Into<String>) -> Self {
        Self::bare(message).with_frames(stack::capture())
    }

    /// Create a failure with `message` and no captured frames.
    pub fn bare(message: impl Into<String>) -> Self {
        Self {
            kind: Cow::Borrowed(std::any::type_name::<Failure>()),
            message: Some(message.into()),
            cause: None,
            frames: Vec::new(),
        }
    }

    /// Convert any error into a failure, capturing the current call stack.
    ///
    /// The error's source chain becomes the cause chain. A `Failure` passed in is cloned as is.
    pub fn capture<E>(err: &E) -> Self
    where
        E: std::error::Error + 'static,
    {
        if let Some(failure) = (err as &(dyn std::error::Error + 'static)).downcast_ref::<Failure>() {
            return failure.clone();
        }

        let mut failure = Self::from_dyn(err).with_frames(stack::capture());
        failure.kind = Cow::Borrowed(std::any::type_name::<E>());
        failure
    }

    /// Convert an error trait object, without capturing frames for errors that are not already
    /// failures.
    pub fn from_dyn(err: &(dyn std::error::Error + 'static)) -> Self {
        if let Some(failure) = err.downcast_ref::<Failure>() {
            return failure.clone();
        }

        Self {
            kind: Cow::Borrowed("Error"),
            message: Some(err.to_string()),
            cause: err.source().map(|source| Box::new(Self::from_dyn(source))),
            frames: Vec::new(),
        }
    }

    /// Build a failure whose frames start at the caller of the facade.
    ///
    /// This is what escalation raises: the captured stack is [sanitized](Failure::sanitize)
    /// against the [`Logger`](crate::Logger) boundary.
    pub fn sanitized(message: impl Into<String>, cause: Option<Failure>) -> Self {
        let mut failure = Self::new(message);
        failure.cause = cause.map(Box::new);
        failure.sanitize(BOUNDARY);
        failure
    }

    /// Replace the kind, usually the name of the error type.
    pub fn with_kind(mut self, kind: impl Into<Cow<'static, str>>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Replace the captured frames.
    pub fn with_frames(mut self, frames: Vec<Frame>) -> Self {
        self.frames = frames;
        self
    }

    /// Replace the cause.
    pub fn with_cause(mut self, cause: Failure) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Set the cause only if there is none yet.
    pub fn init_cause(&mut self, cause: Failure) {
        if self.cause.is_none() {
            self.cause = Some(Box::new(cause));
        }
    }

    /// Drop the frames up to and including the last one declared by `boundary`.
    ///
    /// Returns `self` for chaining. See [`stack::sanitize`].
    pub fn sanitize(&mut self, boundary: &str) -> &mut Self {
        stack::sanitize(&mut self.frames, boundary);
        self
    }

    /// Whether this is the [`STUB`] stand-in.
    pub fn is_stub(&self) -> bool {
        std::ptr::eq(self, &STUB)
    }

    /// The kind of this failure.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The cause, if any.
    pub fn cause(&self) -> Option<&Failure> {
        self.cause.as_deref()
    }

    /// The captured frames, innermost first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Render the full trace: a header, one `at` line per frame and each cause in turn.
    pub fn trace(&self) -> String {
        let mut out = String::with_capacity(256);
        let mut current = Some(self);
        let mut first = true;
        while let Some(failure) = current {
            if !first {
                out.push_str("Caused by: ");
            }
            first = false;
            // SAFETY: write to a string always succeeds
            writeln!(&mut out, "{}", failure.header()).unwrap();
            for frame in &failure.frames {
                writeln!(&mut out, "\tat {frame}").unwrap();
            }
            current = failure.cause();
        }
        out.truncate(out.trim_end().len());
        out
    }

    /// Render the trace to append to a log record.
    ///
    /// The header of this failure always comes first, even without captured frames, and the
    /// frames of its causes follow their own `Caused by:` headers.
    pub fn stack_trace_string(&self) -> String {
        self.trace()
    }

    fn header(&self) -> String {
        match &self.message {
            Some(message) => format!("{}: {message}", self.kind),
            None => self.kind.to_string(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => f.write_str(message),
            None => f.write_str(&self.kind),
        }
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return f
                .debug_struct("Failure")
                .field("kind", &self.kind)
                .field("message", &self.message)
                .field("cause", &self.cause)
                .field("frames", &self.frames)
                .finish();
        }
        f.write_str(&self.trace())
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}
