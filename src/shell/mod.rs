pub mod commands;
pub mod dispatcher;
pub mod session;
pub mod system_info;

pub use commands::Command;
pub use dispatcher::{Flow, Shell};
pub use session::Session;
pub use system_info::SystemInfo;
