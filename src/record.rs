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

//! The record adapters hand to appenders.

use jiff::Timestamp;

use crate::Level;

/// One line of output: what an adapter writes through an [`Append`](crate::Append).
///
/// A prepared event may become several records, for example when a long message is split into
/// chunks.
#[derive(Clone, Debug)]
pub struct Record<'a> {
    time: Timestamp,
    level: Level,
    tag: &'a str,
    payload: &'a str,
}

impl<'a> Record<'a> {
    /// Create a record observed now.
    pub fn new(level: Level, tag: &'a str, payload: &'a str) -> Self {
        Record {
            time: Timestamp::now(),
            level,
            tag,
            payload,
        }
    }

    /// Replace the observed time.
    pub fn with_time(mut self, time: Timestamp) -> Self {
        self.time = time;
        self
    }

    /// The observed time.
    pub fn time(&self) -> Timestamp {
        self.time
    }

    /// The level the record is written at.
    pub fn level(&self) -> Level {
        self.level
    }

    /// The tag, including any mark the adapter adds.
    pub fn tag(&self) -> &'a str {
        self.tag
    }

    /// The message body, with the rendered trace when an error was attached.
    pub fn payload(&self) -> &'a str {
        self.payload
    }
}
