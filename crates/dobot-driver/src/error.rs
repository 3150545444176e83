//! 驱动层错误类型定义

use dobot_link::LinkError;
use dobot_protocol::ProtocolError;
use thiserror::Error;

/// 驱动层错误类型
#[derive(Error, Debug)]
pub enum DriverError {
    /// 链路错误（串口 IO、设备拔出、应答超时）
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    /// 协议解析错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 应答与请求不匹配
    #[error("Unexpected response: expected command {expected}, got {actual}")]
    UnexpectedResponse { expected: u8, actual: u8 },

    /// 固件指令队列已满（入队应答 index = 0）
    #[error("Command queue buffer full")]
    BufferFull,

    /// 等待队列指令完成超时
    #[error("Operation timeout")]
    Timeout,

    /// 未找到可用的 Magician 串口
    #[error("No Dobot device found")]
    NotFound,

    /// 无效输入
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl DriverError {
    /// 设备没有在超时时间内应答
    pub fn is_no_response(&self) -> bool {
        matches!(self, DriverError::Link(LinkError::Timeout))
    }
}
