// External tool execution: streaming output, optional timeout, tool lookup.

pub mod engine;
pub mod run;
pub mod types;

pub use engine::{ensure_available, java_tool};
pub use run::{run, spawn};
pub use types::{OutputLine, ToolCommand, ToolResult};
