//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use dobot_sdk::prelude::*;
//! ```

// 客户端层（推荐使用）
pub use crate::client::{
    ConnectError, ConnectFailure, ConnectionState, GripperAction, Magician, MagicianBuilder,
    MotionProfile, SessionError,
};
pub use crate::protocol::Pose;

// 链路层（常用 Trait）
pub use crate::link::LinkAdapter;

// 驱动层（高级用户使用）
pub use crate::driver::{Dobot, DriverConfig, DriverError};
