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

use std::fmt;
use std::panic;
use std::panic::AssertUnwindSafe;

use crate::Error;
use crate::Failure;
use crate::adapter::Priority;
use crate::trap::Trap;

/// A crash reporting service that the [`PlatformAdapter`](crate::adapter::PlatformAdapter)
/// forwards errors and breadcrumbs to.
///
/// Whatever a reporter does wrong stays inside the log call: returned errors go to the adapter's
/// trap and panics are caught.
pub trait CrashReporter: fmt::Debug + Send + Sync + 'static {
    /// Report an error.
    fn report_error(&self, failure: &Failure) -> Result<(), Error>;

    /// Record a breadcrumb that is sent along with the next error report.
    fn report_breadcrumb(&self, priority: Priority, tag: &str, message: &str) -> Result<(), Error>;
}

impl<T: CrashReporter> From<T> for Box<dyn CrashReporter> {
    fn from(value: T) -> Self {
        Box::new(value)
    }
}

/// Run one reporter call so that it can neither fail nor unwind into the caller.
pub(crate) fn guarded<F>(trap: &dyn Trap, call: &'static str, f: F)
where
    F: FnOnce() -> Result<(), Error>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => {}
        Ok(Err(err)) => trap.trap(&err.with_context("call", call)),
        Err(_) => trap.trap(&Error::new("crash reporter panicked").with_context("call", call)),
    }
}
