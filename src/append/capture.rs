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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use crate::Error;
use crate::Level;
use crate::append::Append;
use crate::record::Record;

/// An appender that keeps every record in memory.
///
/// Clones share the same buffer, so one clone can be handed to an adapter while another is used
/// to inspect what was written.
///
/// # Examples
///
/// ```
/// use tagforth::Adapter;
/// use tagforth::Level;
/// use tagforth::adapter::ConsoleAdapter;
/// use tagforth::append::Capture;
///
/// let capture = Capture::default();
/// let adapter = ConsoleAdapter::default().with_append(capture.clone());
/// adapter.deliver("Billing", Level::ERROR, Some("card declined"), None);
///
/// assert_eq!(capture.records()[0].payload, "card declined");
/// ```
#[derive(Debug, Default, Clone)]
pub struct Capture {
    records: Arc<Mutex<Vec<CapturedRecord>>>,
}

/// An owned copy of a [`Record`] kept by [`Capture`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRecord {
    pub level: Level,
    pub tag: String,
    pub payload: String,
}

impl Capture {
    /// A snapshot of the records appended so far, oldest first.
    pub fn records(&self) -> Vec<CapturedRecord> {
        self.lock().clone()
    }

    /// The payloads appended so far, oldest first.
    pub fn payloads(&self) -> Vec<String> {
        self.lock().iter().map(|r| r.payload.clone()).collect()
    }

    /// The number of records appended so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing was appended yet.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forget every record.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CapturedRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Append for Capture {
    fn append(&self, record: &Record) -> Result<(), Error> {
        self.lock().push(CapturedRecord {
            level: record.level(),
            tag: record.tag().to_string(),
            payload: record.payload().to_string(),
        });
        Ok(())
    }
}
