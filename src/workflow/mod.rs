pub mod node;
pub mod reference;
mod workflow;

pub use reference::resolve;
pub use workflow::{Workflow, schedule};
