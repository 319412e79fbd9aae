//! Tool system: handler trait, schemas, registry and dispatch.

pub mod arguments;
pub mod builtin;
pub mod registry;
pub mod tool;
pub mod types;
pub mod validation;

pub use arguments::ToolArguments;
pub use registry::{stringify_result, ToolRegistry};
pub use tool::{AgentTool, Tool, ToolInput};
pub use types::{ToolDefinition, ToolParameters};
