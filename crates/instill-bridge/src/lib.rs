pub mod host;
pub mod protocol;
pub mod render;

mod orchestrator;

pub use orchestrator::Orchestrator;
pub use protocol::{dispatch, handle_line, HookRequest};
