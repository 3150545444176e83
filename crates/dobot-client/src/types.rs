//! 会话类型

use std::fmt;

pub use dobot_protocol::{DeviceVersion, Pose};

/// 连接状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
}

impl ConnectionState {
    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => f.write_str("Disconnected"),
            ConnectionState::Connected => f.write_str("Connected"),
        }
    }
}

/// 夹爪动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GripperAction {
    Open,
    Close,
}

impl GripperAction {
    /// `true` = 张开，`false` = 闭合
    pub fn from_open(open: bool) -> Self {
        if open {
            GripperAction::Open
        } else {
            GripperAction::Close
        }
    }
}
