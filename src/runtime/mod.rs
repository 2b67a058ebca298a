mod context;
mod executor;

pub use context::ToolContext;
pub use executor::NodeExecutor;
