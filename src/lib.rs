//! Audits a cluster's events and reports abnormal ones.
//!
//! Two checks run on every poll: any event whose type is neither `Normal`
//! nor `Warning`, and non-`Normal` Node events seen within a lookback window.
//! The cluster is healthy only when both come back clean.

pub mod audit;
pub mod check;
pub mod config;
pub mod error;
pub mod event;
pub mod poll;
pub mod report;
pub mod selector;
pub mod source;

pub use audit::{Auditor, Verdict};
pub use config::{Cli, Settings};
pub use error::AuditError;
pub use poll::{run, shutdown_signal, Exit, RunMode};
pub use report::{OutputFormat, Reporter};
pub use source::{EventSource, FileEventSource, KubeEventSource};
