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

use tagforth::Failure;
use tagforth::Level;
use tagforth::adapter::ConsoleAdapter;
use tagforth::adapter::Mode;
use tagforth::append::Stdout;
use tagforth::event::Tag;
use tagforth::value_bag::ValueBag;

struct Checkout;

impl Checkout {
    #[inline(never)]
    fn pay(&self, logger: &tagforth::Logger, cents: u64) -> Result<(), Failure> {
        let args = [ValueBag::from(cents)];
        logger.log_args(Tag::Caller, Level::INFO, "charging %,d cents", &args);
        logger.error_or_throw(Tag::Caller, Some("card declined"), None)
    }
}

fn main() {
    let logger = tagforth::builder()
        .adapter(
            ConsoleAdapter::default()
                .with_mode(Mode::Lenient)
                .with_append(Stdout::default()),
        )
        .threshold(Level::ALL)
        .apply();

    log::info!("bridged from the log crate");
    if let Err(err) = Checkout.pay(&logger, 125_000) {
        eprintln!("{err:?}");
    }
    logger.log_args("Demo", Level::WARN, "%d%%", &[ValueBag::from("full")]);
}
