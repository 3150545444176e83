//! # Dobot Link Layer
//!
//! 链路抽象层，提供统一的收发接口：
//! - `serial`: USB 串口后端（默认启用）
//! - `discovery`: 枚举可能连接着 Magician 的串口
//! - `mock`: 模拟机械臂固件（`mock` feature，测试用）

use std::time::Duration;
use thiserror::Error;

// 重新导出 dobot-protocol 中的 DobotPacket
pub use dobot_protocol::DobotPacket;

pub mod discovery;
pub use discovery::{DeviceInfo, is_dobot_bridge};

#[cfg(feature = "serial")]
pub mod serial;

#[cfg(feature = "serial")]
pub use serial::SerialLinkAdapter;

#[cfg(feature = "serial")]
pub use discovery::search_dobot;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

/// 链路层统一错误类型
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device Error: {0}")]
    Device(#[from] LinkDeviceError),
    #[error("Protocol Error: {0}")]
    Protocol(#[from] dobot_protocol::ProtocolError),
    #[error("Read timeout")]
    Timeout,
    #[error("Device disconnected")]
    Disconnected,
}

/// 设备/后端错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDeviceErrorKind {
    Unknown,
    NotFound,
    NoDevice,
    AccessDenied,
    Busy,
    UnsupportedConfig,
    Backend,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct LinkDeviceError {
    pub kind: LinkDeviceErrorKind,
    pub message: String,
}

impl LinkDeviceError {
    pub fn new(kind: LinkDeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<String> for LinkDeviceError {
    fn from(message: String) -> Self {
        Self::new(LinkDeviceErrorKind::Unknown, message)
    }
}

impl From<&str> for LinkDeviceError {
    fn from(message: &str) -> Self {
        Self::new(LinkDeviceErrorKind::Unknown, message)
    }
}

/// 链路适配器
///
/// 一次只有一个请求在途：驱动层发送请求后阻塞读取应答。
pub trait LinkAdapter {
    /// 发送一个数据包
    fn send(&mut self, packet: &DobotPacket) -> Result<(), LinkError>;

    /// 接收一个数据包（受接收超时约束）
    fn receive(&mut self) -> Result<DobotPacket, LinkError>;

    /// 设置接收超时
    fn set_receive_timeout(&mut self, _timeout: Duration) {}

    /// 丢弃尚未读取的输入（残留应答、噪声）
    fn clear_input(&mut self) -> Result<(), LinkError> {
        Ok(())
    }

    /// 端口名称（用于日志）
    fn port_name(&self) -> &str;
}

impl<L: LinkAdapter + ?Sized> LinkAdapter for Box<L> {
    fn send(&mut self, packet: &DobotPacket) -> Result<(), LinkError> {
        (**self).send(packet)
    }

    fn receive(&mut self) -> Result<DobotPacket, LinkError> {
        (**self).receive()
    }

    fn set_receive_timeout(&mut self, timeout: Duration) {
        (**self).set_receive_timeout(timeout)
    }

    fn clear_input(&mut self) -> Result<(), LinkError> {
        (**self).clear_input()
    }

    fn port_name(&self) -> &str {
        (**self).port_name()
    }
}
