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

use tagforth::Error;
use tagforth::Failure;
use tagforth::Level;
use tagforth::Logger;
use tagforth::Trap;
use tagforth::adapter::ConsoleAdapter;
use tagforth::adapter::Mode;
use tagforth::adapter::NoopAdapter;
use tagforth::adapter::PlatformAdapter;
use tagforth::append::Capture;
use tagforth::event::Event;
use tagforth::event::Tag;
use tagforth::pipeline::LOG_TAG;
use value_bag::ValueBag;

#[derive(Debug, Default, Clone)]
struct Trapped(Arc<Mutex<Vec<String>>>);

impl Trap for Trapped {
    fn trap(&self, err: &Error) {
        self.0.lock().unwrap().push(err.to_string());
    }
}

fn console(mode: Mode) -> (Logger, Capture, Trapped) {
    let capture = Capture::default();
    let trapped = Trapped::default();
    let adapter = ConsoleAdapter::default()
        .with_threshold(Level::ALL)
        .with_mode(mode)
        .with_append(capture.clone())
        .with_trap(trapped.clone());
    (Logger::new(adapter), capture, trapped)
}

struct Checkout;

impl Checkout {
    #[inline(never)]
    fn pay(&self, logger: &Logger) {
        logger.warn(Tag::Caller, "card declined");
    }

    #[inline(never)]
    fn refund(&self, logger: &Logger) -> Result<(), Failure> {
        logger.error_or_throw(Tag::Caller, Some("refund exceeds charge"), None)
    }
}

#[test]
fn caller_tag_names_the_calling_type() {
    let (logger, capture, _) = console(Mode::Strict);
    Checkout.pay(&logger);

    let records = capture.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].tag, "[L]Checkout");
    assert_eq!(records[0].payload, "card declined");
}

#[test]
fn strict_escalation_starts_at_the_caller() {
    let (logger, capture, _) = console(Mode::Strict);
    let err = Checkout.refund(&logger).unwrap_err();

    assert_eq!(err.message(), Some("Checkout Error: refund exceeds charge"));
    let first = err.frames().first().expect("frames are captured");
    assert!(first.declaring_type().ends_with("Checkout"), "{first}");
    assert_eq!(first.function(), "refund");
    assert!(capture.is_empty());
}

#[test]
fn lenient_escalation_logs_once_at_error() {
    let (logger, capture, _) = console(Mode::Lenient);
    let cause = Failure::bare("ledger locked").with_kind("Locked");
    logger
        .error_or_throw("X", Some("bad state"), Some(&cause))
        .unwrap();

    let records = capture.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].level, Level::ERROR);
    assert_eq!(records[0].tag, "[L]X");
    assert_eq!(records[0].payload, "bad state\nLocked: ledger locked");
}

#[test]
fn broken_template_never_raises() {
    let (logger, capture, trapped) = console(Mode::Strict);
    logger.log_args("Billing", Level::INFO, "x=%d", &[ValueBag::from("notanumber")]);

    let records = capture.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].tag, "[L]Billing");
    assert!(records[0].payload.contains("FORMAT ERROR"));

    let trapped = trapped.0.lock().unwrap();
    assert_eq!(trapped.len(), 1);
    assert!(trapped[0].contains(&format!("{LOG_TAG} Error: x=%d; FORMAT ERROR")));
}

#[test]
fn broken_template_is_logged_twice_when_lenient() {
    let (logger, capture, trapped) = console(Mode::Lenient);
    logger.log_args("Billing", Level::INFO, "%s and %s", &[ValueBag::from("one")]);

    let records = capture.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].tag, format!("[L]{LOG_TAG}"));
    assert_eq!(records[0].level, Level::ERROR);
    assert!(records[0].payload.starts_with("%s and %s; FORMAT ERROR"));
    assert!(records[0].payload.contains("FormatError"));
    assert_eq!(records[1].tag, "[L]Billing");
    assert!(trapped.0.lock().unwrap().is_empty());
}

#[test]
fn message_falls_back_to_error_message() {
    let (logger, capture, _) = console(Mode::Strict);
    let boom = Failure::bare("boom").with_kind("Boom");
    logger.error_failure("Billing", None, &boom);
    assert_eq!(capture.payloads(), ["boom\nBoom: boom"]);
}

#[test]
fn error_tag_is_used_as_the_error() {
    let (logger, capture, _) = console(Mode::Strict);
    let failure = Failure::bare("disk full").with_kind("app::StorageError");
    logger.warn(&failure, "cannot persist");
    assert_eq!(capture.records()[0].tag, "[L]StorageError");
    assert_eq!(capture.payloads(), ["cannot persist\napp::StorageError: disk full"]);
}

#[test]
fn misplaced_error_argument_is_salvaged() {
    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Refused;

    let (logger, capture, _) = console(Mode::Lenient);
    let refused = Refused;
    let args = [ValueBag::capture_error(&refused)];
    logger.log_event(
        Event::new("Net", Level::ERROR)
            .with_message("connect failed: %s")
            .with_args(&args),
    );

    let payloads = capture.payloads();
    assert_eq!(payloads.len(), 1);
    assert!(payloads[0].starts_with("connect failed: connection refused\n"));
    assert!(payloads[0].contains("connection refused"));
}

#[test]
fn traces_keep_every_error_in_the_chain() {
    #[derive(Debug, thiserror::Error)]
    #[error("connection reset")]
    struct Reset(#[source] std::io::Error);

    let (logger, capture, _) = console(Mode::Lenient);
    let inner = Failure::bare("inner").with_kind("Inner");
    let outer = Failure::bare("outer").with_kind("Outer").with_cause(inner);
    logger.error_failure("T", Some("ctx"), &outer);

    let reset = Reset(std::io::Error::other("peer closed"));
    let args = [ValueBag::capture_error(&reset)];
    logger.log_args("T", Level::ERROR, "failed", &args);

    assert_eq!(
        capture.payloads(),
        [
            "ctx\nOuter: outer\nCaused by: Inner: inner",
            "failed\nError: connection reset\nCaused by: Error: peer closed",
        ]
    );
}

#[test]
fn nothing_to_say_is_dropped() {
    let (logger, capture, _) = console(Mode::Strict);
    logger.log_event(Event::new("Billing", Level::ERROR));
    logger.error_failure("Billing", None, &tagforth::STUB);
    assert!(capture.is_empty());
}

#[test]
fn threshold_changes_are_shared() {
    let (logger, capture, _) = console(Mode::Strict);
    let other = logger.clone();
    other.set_threshold(Level::ERROR);

    logger.warn("Billing", "hidden");
    logger.error("Billing", "shown");
    assert_eq!(capture.payloads(), ["shown"]);
}

#[test]
fn platform_chunks_long_messages() {
    let capture = Capture::default();
    let logger = Logger::new(PlatformAdapter::default().with_append(capture.clone()));
    let message = "z".repeat(9000);
    logger.info("Billing", &message);

    let records = capture.records();
    let lens: Vec<usize> = records.iter().map(|r| r.payload.len()).collect();
    assert_eq!(lens, [4000, 4000, 1000]);
    assert!(records.iter().all(|r| r.tag == "[L]Billing"));
}

#[test]
fn noop_swallows_everything() {
    let logger = Logger::new(NoopAdapter::default());
    logger.wtf("Billing", "impossible");
    assert!(logger.error_or_throw("Billing", Some("bad"), None).is_ok());
}

#[test]
fn concurrent_logging() {
    let (logger, capture, _) = console(Mode::Strict);
    let handles: Vec<_> = (0..4)
        .map(|n| {
            let logger = logger.clone();
            std::thread::spawn(move || {
                for i in 0..25 {
                    let args = [ValueBag::from(n), ValueBag::from(i)];
                    logger.log_args("Worker", Level::INFO, "%d/%d", &args);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(capture.len(), 100);
}
