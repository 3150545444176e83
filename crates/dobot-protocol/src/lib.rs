//! # Dobot Protocol
//!
//! Dobot Magician 串口通信协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `constants`: 协议常量定义
//! - `ids`: 指令 ID 枚举
//! - `packet`: 数据包结构与校验和
//! - `decoder`: 字节流解包（支持噪声重同步）
//! - `control`: 控制指令构建
//! - `feedback`: 应答解析
//!
//! ## 帧格式
//!
//! ```text
//! 0xAA 0xAA | Len | ID | Ctrl | Params[Len-2] | Checksum
//! ```
//!
//! 协议使用小端字节序（`f32` / `u32` / `u64`），
//! 本模块提供了字节序转换工具函数。

pub mod constants;
pub mod control;
pub mod decoder;
pub mod feedback;
pub mod ids;
pub mod packet;

// 重新导出常用类型
pub use constants::*;
pub use control::*;
pub use decoder::PacketDecoder;
pub use feedback::*;
pub use ids::*;
pub use packet::{CtrlFlags, DobotPacket, checksum};

use thiserror::Error;

/// 协议解析错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Invalid packet length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Unknown command ID: {id}")]
    UnknownCommandId { id: u8 },

    #[error("Unexpected command ID: expected {expected}, got {actual}")]
    UnexpectedCommandId { expected: u8, actual: u8 },

    #[error("Checksum mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("Params too long: {len} bytes (max {max})")]
    ParamsTooLong { len: usize, max: usize },

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: String, value: u8 },
}

/// 字节序转换工具函数
///
/// 协议使用小端字节序，这些函数用于在协议层进行字节序转换。
///
/// 小端字节序转 f32
pub fn bytes_to_f32_le(bytes: [u8; 4]) -> f32 {
    f32::from_le_bytes(bytes)
}

/// 小端字节序转 u64
pub fn bytes_to_u64_le(bytes: [u8; 8]) -> u64 {
    u64::from_le_bytes(bytes)
}

/// f32 转小端字节序
pub fn f32_to_bytes_le(value: f32) -> [u8; 4] {
    value.to_le_bytes()
}

/// u32 转小端字节序
pub fn u32_to_bytes_le(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

/// u64 转小端字节序
pub fn u64_to_bytes_le(value: u64) -> [u8; 8] {
    value.to_le_bytes()
}

/// 从参数区读取第 `index` 个 f32（调用方保证长度）
pub(crate) fn read_f32(params: &[u8], index: usize) -> f32 {
    let offset = index * 4;
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&params[offset..offset + 4]);
    bytes_to_f32_le(bytes)
}

/// 校验参数区最小长度
pub(crate) fn ensure_len(params: &[u8], expected: usize) -> Result<(), ProtocolError> {
    if params.len() < expected {
        return Err(ProtocolError::InvalidLength {
            expected,
            actual: params.len(),
        });
    }
    Ok(())
}
