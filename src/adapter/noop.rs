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

use crate::Adapter;
use crate::AtomicLevel;
use crate::Failure;
use crate::Level;

/// An adapter that writes nothing and never raises.
#[derive(Debug, Default)]
pub struct NoopAdapter {
    threshold: AtomicLevel,
}

impl Adapter for NoopAdapter {
    fn threshold(&self) -> Level {
        self.threshold.load()
    }

    fn set_threshold(&self, threshold: Level) {
        self.threshold.store(threshold);
    }

    fn deliver(&self, _: &str, _: Level, _: Option<&str>, _: Option<&Failure>) {}

    fn escalate(&self, _: &str, _: Option<&str>, _: Option<&Failure>) -> Result<(), Failure> {
        Ok(())
    }
}
