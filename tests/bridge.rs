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

use tagforth::Level;
use tagforth::adapter::DelegateAdapter;
use tagforth::adapter::Mode;

type Seen = Arc<Mutex<Vec<(String, log::Level, String)>>>;

#[derive(Clone, Default)]
struct Sink(Seen);

impl log::Log for Sink {
    fn enabled(&self, _: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let entry = (
            record.target().to_string(),
            record.level(),
            record.args().to_string(),
        );
        self.0.lock().unwrap().push(entry);
    }

    fn flush(&self) {}
}

// one process-wide logger, so everything about the global bridge lives in this test
#[test]
fn log_macros_reach_the_adapter() {
    let sink = Sink::default();
    let logger = tagforth::builder()
        .adapter(DelegateAdapter::new(sink.clone()).with_mode(Mode::Lenient))
        .threshold(Level::DEBUG)
        .apply();

    log::info!(target: "app::billing", "charged {} cents", 250);
    log::trace!(target: "app::billing", "not loggable");
    logger.config("Billing", "configured");

    let seen = sink.0.lock().unwrap();
    assert_eq!(
        *seen,
        [
            ("app::billing".to_string(), log::Level::Info, "charged 250 cents".to_string()),
            ("Billing".to_string(), log::Level::Info, "configured".to_string()),
        ]
    );
    drop(seen);

    assert!(tagforth::builder().try_apply().is_err());
}
