//! Tool framework and the agent's built-in catalog.

pub mod args;
pub mod builtin;
pub mod executor;
pub mod registry;
pub mod traits;

pub use args::ToolArgs;
pub use builtin::{default_registry, ToolContext};
pub use executor::ToolExecutor;
pub use registry::{ToolRegistry, ToolRegistryBuilder};
pub use traits::{FnTool, ParamSpec, ParamType, Tool, ToolDescriptor};
