//! # Cardbox Core Library
//!
//! This library provides the core business logic for the Cardbox Leitner
//! flashcard reviewer. It implements a CLI-first philosophy where all
//! operations are available via a standalone CLI binary; the core itself
//! performs no terminal I/O, so review sessions are fully scriptable in
//! tests.
//!
//! ## Architecture
//!
//! - **Leitner rules**: pure functions for the interval table, the due
//!   predicate, and box transitions, all parameterized on an explicit
//!   reference date
//! - **Review session**: a caller-driven state machine over the due set;
//!   the driver reads answer lines and feeds them to `submit()`
//! - **Storage**: a CSV card store with replace and merge-upsert save
//!   policies, and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`leitner`]: scheduling rules
//! - [`ReviewSession`]: review state machine
//! - [`DeckStore`]: card persistence
//! - [`Config`]: application configuration management

pub mod card;
pub mod error;
pub mod leitner;
pub mod session;
pub mod storage;

pub use card::Card;
pub use error::{ConfigError, CoreError, StoreError};
pub use session::{ReviewSession, SessionProgress, Verdict, STOP_SENTINEL};
pub use storage::{Config, DatePrecision, DeckStore, SavePolicy};
