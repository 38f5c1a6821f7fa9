//! # Mercado Core
//!
//! The request assertion pipeline behind the Mercado API end-to-end suite.
//!
//! A suite is a set of groups; each group owns a setup step and an ordered
//! list of cases. Every step follows the same shape: build a request, send
//! it, capture the response, assert on it, and optionally bind the capture
//! under a typed key so later steps can address the entity it created.
//!
//! ## Architecture (block diagram)
//!
//! ```text
//! +---------------------+      +---------------------+      +---------------------+
//! | group definitions   | ---> | runner (execution)  | ---> | reporter (output)   |
//! | setup + cases       |      | + event channel     |      | List/Null           |
//! +---------------------+      +---------------------+      +---------------------+
//!            |                           ^                            ^
//!            v                           |                            |
//! +---------------------+               publish          +---------------------+
//! | assertion evaluator | ------------------------------ | HTTP client         |
//! | status, schema      |                                | req/res capture     |
//! +---------------------+                                +---------------------+
//!            |                                                      ^
//!            v                                                      |
//! +---------------------+      +---------------------+      +---------------------+
//! | typed bindings      |      | fixture generator   |      | config              |
//! | per-group captures  |      | names, cnpj, prices |      | base_url, timeout   |
//! +---------------------+      +---------------------+      +---------------------+
//! ```
//!
//! Steps within a group run strictly sequentially because later steps depend
//! on identifiers bound by earlier ones; groups themselves run concurrently.

pub mod assertion;
pub mod config;
pub mod error;
pub mod fixture;
pub mod http;
pub mod reporter;
pub mod runner;
pub mod schema;
pub mod store;

// Re-export error handling crate for suites built on top of this one.
pub use eyre;

/// Type alias for group names.
///
/// A group corresponds to one resource family under test (e.g. "Mercado",
/// "Doces") and owns the setup step shared by its cases.
pub type GroupName = String;

/// Type alias for individual case names within a group.
pub type CaseName = String;

// Re-export key functionality
pub use assertion::Capture;
pub use config::{get_config, Config};
pub use error::{Error, Result};
pub use fixture::Fixture;
pub use http::{Client, Response, StatusCode};
pub use reporter::{ListReporter, NullReporter, Reporter};
pub use runner::{CaseStatus, Group, GroupExec, GroupReport, Runner, StepFuture};
pub use schema::{FieldKind, Schema};
pub use store::{BindKey, Bindings};
