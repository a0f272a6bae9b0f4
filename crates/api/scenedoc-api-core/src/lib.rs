//! scenedoc-api-core: document tree, conversion and error-reporting contracts (engine-agnostic)

pub mod convert;
pub mod json;
pub mod node;
pub mod report;
pub mod target_path;

pub use node::{Input, Node};
pub use report::{ErrorCode, ErrorSink, Report, Severity};
pub use target_path::TargetPath;
