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

//! Tagforth is a tagged logging facade with pluggable adapters.
//!
//! # Overview
//!
//! Application code logs through a [`Logger`]: every call carries a tag naming its source, a
//! [`Level`], a message and optionally an error ([`Failure`]) and printf-style arguments. The
//! logger prepares the call (it resolves the tag, picks the error, formats the message) and
//! hands the result to an [`Adapter`], which decides what gets written where:
//!
//! * [`ConsoleAdapter`](adapter::ConsoleAdapter) writes `mm:ss.SSS L/[L]tag message` lines;
//! * [`PlatformAdapter`](adapter::PlatformAdapter) splits long records for size-limited
//!   platform loggers and forwards to a [`CrashReporter`](adapter::CrashReporter);
//! * [`DelegateAdapter`](adapter::DelegateAdapter) forwards to another `log` implementation;
//! * [`NoopAdapter`](adapter::NoopAdapter) discards everything.
//!
//! [`Logger::error_or_throw`] escalates: depending on the adapter it raises a failure whose stack
//! starts at the caller, or logs at [`Level::ERROR`].
//!
//! # Examples
//!
//! ```
//! use tagforth::Failure;
//! use tagforth::Level;
//! use tagforth::adapter::ConsoleAdapter;
//! use tagforth::adapter::Mode;
//! use tagforth::event::Tag;
//! use value_bag::ValueBag;
//!
//! let logger = tagforth::builder()
//!     .adapter(ConsoleAdapter::default().with_mode(Mode::Strict))
//!     .threshold(Level::INFO)
//!     .build();
//!
//! logger.info("Billing", "invoice sent");
//! logger.log_args(Tag::Caller, Level::WARN, "%d of %d retries used", &[ValueBag::from(2), ValueBag::from(3)]);
//!
//! let err = logger.error_or_throw("Billing", Some("negative balance"), None).unwrap_err();
//! assert_eq!(err.message(), Some("Billing Error: negative balance"));
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use value_bag;

pub mod adapter;
pub mod append;
pub mod event;
pub mod format;
pub mod layout;
pub mod pipeline;
pub mod record;
pub mod stack;
pub mod trap;

pub use self::adapter::Adapter;
pub use self::append::Append;
pub use self::layout::Layout;
pub use self::trap::Trap;

mod error;
pub use self::error::Error;

mod failure;
pub use self::failure::Failure;
pub use self::failure::STUB;

mod level;
pub use self::level::AtomicLevel;
pub use self::level::Level;
pub use self::level::is_loggable;
pub use self::level::is_not_loggable;

mod logger;
pub use self::logger::BOUNDARY;
pub use self::logger::Logger;
pub use self::logger::LoggerBuilder;
pub use self::logger::builder;
