//! 命令定义和实现

pub mod config;
pub mod effector;
pub mod r#move;
pub mod run;
pub mod search;

pub use config::ConfigCommand;
pub use effector::{GripperCommand, SuctionCommand};
pub use r#move::MoveCommand;
pub use run::RunCommand;
