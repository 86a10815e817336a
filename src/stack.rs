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

//! Captured call stacks, and the helpers that cut the facade's own frames out of them.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Trailing synthetic suffixes: closure segments and numbered anonymous types.
static SYNTHETIC_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(::\{\{closure\}\}|::\{closure#\d+\}|\$\d+)+$").expect("static regex must compile")
});

/// One frame of a captured call stack.
///
/// `declaring_type` is the path that owns the function: for `app::billing::Ledger::post` it is
/// `app::billing::Ledger`, for a free function `app::main` it is the module `app`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    declaring_type: String,
    function: String,
    file: Option<String>,
    line: Option<u32>,
}

impl Frame {
    /// Create a frame by hand.
    pub fn new(declaring_type: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            declaring_type: declaring_type.into(),
            function: function.into(),
            file: None,
            line: None,
        }
    }

    /// Attach a source location.
    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    /// Build a frame from a demangled symbol name such as `<app::Ledger as app::Post>::post`.
    pub fn from_symbol(symbol: &str) -> Self {
        let symbol = SYNTHETIC_SUFFIX.replace(symbol, "");
        let (declaring_type, function) = split_symbol(&symbol);
        Frame::new(declaring_type, function)
    }

    /// The path of the type or module that declares this frame's function.
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    /// The function name.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// The source file, if symbols carried it.
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// The source line, if symbols carried it.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    /// Derive a short tag from this frame.
    ///
    /// Synthetic suffixes are removed and only the last path segment is kept, so that
    /// `app::billing::Ledger$1` becomes `Ledger`.
    pub fn create_tag(&self) -> String {
        let name = SYNTHETIC_SUFFIX.replace(&self.declaring_type, "");
        last_segment(&name).to_string()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.declaring_type.is_empty() {
            write!(f, "{}", self.function)?;
        } else {
            write!(f, "{}::{}", self.declaring_type, self.function)?;
        }
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "({file}:{line})"),
            (Some(file), None) => write!(f, "({file})"),
            _ => write!(f, "(Unknown Source)"),
        }
    }
}

/// Capture the call stack of the current thread, innermost frame first.
///
/// Frames without a symbol name are skipped. Inlined functions show up as their own frames.
pub fn capture() -> Vec<Frame> {
    let trace = backtrace::Backtrace::new();
    let mut frames = Vec::with_capacity(trace.frames().len());
    for frame in trace.frames() {
        for symbol in frame.symbols() {
            let Some(name) = symbol.name() else {
                continue;
            };
            let mut parsed = Frame::from_symbol(&format!("{name:#}"));
            parsed.file = symbol.filename().map(|p| p.display().to_string());
            parsed.line = symbol.lineno();
            frames.push(parsed);
        }
    }
    frames
}

/// The index of the first frame after the last one declared by `boundary`.
///
/// Returns 0 if `boundary` never appears. The result may equal `frames.len()` when the boundary
/// is the outermost frame, so callers must check bounds.
pub fn index_of_trace_start(frames: &[Frame], boundary: &str) -> usize {
    frames
        .iter()
        .rposition(|frame| frame.declaring_type == boundary)
        .map_or(0, |last| last + 1)
}

/// Drop every frame up to and including the last one declared by `boundary`.
///
/// Frames are left untouched when `boundary` never appears. Sanitizing twice with the same
/// boundary changes nothing the second time.
pub fn sanitize(frames: &mut Vec<Frame>, boundary: &str) {
    let start = index_of_trace_start(frames, boundary);
    frames.drain(..start);
}

/// The simple name of a type path: generic arguments and leading segments removed.
///
/// ```
/// assert_eq!(tagforth::stack::simple_name("app::billing::Ledger<u32>"), "Ledger");
/// assert_eq!(tagforth::stack::simple_name("&str"), "&str");
/// ```
pub fn simple_name(path: &str) -> &str {
    let path = match path.find('<') {
        Some(0) | None => path,
        Some(generics) => &path[..generics],
    };
    last_segment(path)
}

fn last_segment(path: &str) -> &str {
    path.rsplit_once("::").map_or(path, |(_, last)| last)
}

fn split_symbol(symbol: &str) -> (String, String) {
    // trait impls are rendered as `<Type as Trait>::method`
    if let Some(rest) = symbol.strip_prefix('<') {
        if let Some(close) = matching_angle(rest) {
            let qualified = &rest[..close];
            let function = rest[close + 1..].trim_start_matches("::");
            let owner = split_as(qualified).unwrap_or(qualified);
            return (strip_turbofish(owner), strip_turbofish(function));
        }
    }

    let symbol = strip_turbofish(symbol);
    match symbol.rsplit_once("::") {
        Some((owner, function)) => (owner.to_string(), function.to_string()),
        None => (String::new(), symbol),
    }
}

// position of the `>` closing a `<` that was already consumed
fn matching_angle(s: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, c) in s.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

// `Type as Trait` at angle depth zero
fn split_as(qualified: &str) -> Option<&str> {
    let mut depth = 0usize;
    for (i, c) in qualified.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ' ' if depth == 0 && qualified[i..].starts_with(" as ") => {
                return Some(&qualified[..i]);
            }
            _ => {}
        }
    }
    None
}

// remove `::<...>` generic argument lists
fn strip_turbofish(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(start) = rest.find("::<") {
        out.push_str(&rest[..start]);
        match matching_angle(&rest[start + 3..]) {
            Some(close) => rest = &rest[start + 3 + close + 1..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}
