//! 数据包结构
//!
//! `DobotPacket` 是协议层与链路层之间的中间抽象：
//!
//! ```text
//! Protocol Layer (dobot-protocol)
//!     ↓ DobotCommand::to_packet() 构建 / TryFrom<&DobotPacket> 解析
//! DobotPacket (此类型)
//!     ↓ encode() / PacketDecoder
//! Link Layer (dobot-link)
//!     ↓ 串口 / 模拟机械臂
//! Hardware
//! ```

use crate::constants::{FRAME_OVERHEAD, HEADER, MAX_PARAMS_LEN, MIN_PAYLOAD_LEN};
use crate::ids::CommandId;
use crate::ProtocolError;
use bilge::prelude::*;

/// Ctrl 字节位域
///
/// 协议定义：
/// - Bit 0: rw（1 = 写，0 = 读）
/// - Bit 1: isQueued（1 = 进入指令队列）
/// - Bit 2-7: 保留
///
/// 设备应答会原样回显请求的 Ctrl 字节。
#[bitsize(8)]
#[derive(FromBits, DebugBits, Clone, Copy, Default, PartialEq)]
pub struct CtrlFlags {
    pub rw: bool,        // Bit 0: 读写标志
    pub is_queued: bool, // Bit 1: 队列标志
    pub reserved: u6,    // Bit 2-7: 保留
}

impl CtrlFlags {
    /// 读请求（rw = 0, isQueued = 0）
    pub fn read() -> Self {
        Self::from(0u8)
    }

    /// 写请求
    pub fn write(queued: bool) -> Self {
        let mut flags = Self::from(0u8);
        flags.set_rw(true);
        flags.set_is_queued(queued);
        flags
    }

    /// 原始字节
    pub fn to_byte(self) -> u8 {
        u8::from(self)
    }
}

/// 计算校验和
///
/// ID、Ctrl、Params 逐字节相加（模 256）后取补码，
/// 使得 `sum(ID, Ctrl, Params, Checksum) ≡ 0 (mod 256)`。
pub fn checksum(id: u8, ctrl: u8, params: &[u8]) -> u8 {
    let sum = params.iter().fold(id.wrapping_add(ctrl), |acc, b| acc.wrapping_add(*b));
    0u8.wrapping_sub(sum)
}

/// Dobot 数据包
#[derive(Debug, Clone, PartialEq)]
pub struct DobotPacket {
    /// 指令 ID（保留原始值，未知 ID 也能被解包和丢弃）
    pub id: u8,
    /// Ctrl 位域
    pub ctrl: CtrlFlags,
    /// 参数区（小端字节序）
    pub params: Vec<u8>,
}

impl DobotPacket {
    /// 通用构造器
    pub fn new(id: u8, ctrl: CtrlFlags, params: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            ctrl,
            params: params.into(),
        }
    }

    /// 构建读请求（无参数）
    pub fn read(id: CommandId) -> Self {
        Self::new(id.into(), CtrlFlags::read(), Vec::new())
    }

    /// 构建写请求
    pub fn write(id: CommandId, queued: bool, params: impl Into<Vec<u8>>) -> Self {
        Self::new(id.into(), CtrlFlags::write(queued), params)
    }

    /// 解析指令 ID
    pub fn command_id(&self) -> Result<CommandId, ProtocolError> {
        CommandId::try_from(self.id).map_err(|_| ProtocolError::UnknownCommandId { id: self.id })
    }

    /// 是否为队列指令
    pub fn is_queued(&self) -> bool {
        self.ctrl.is_queued()
    }

    /// 是否为写指令
    pub fn is_write(&self) -> bool {
        self.ctrl.rw()
    }

    /// 本包的校验和
    pub fn checksum(&self) -> u8 {
        checksum(self.id, self.ctrl.to_byte(), &self.params)
    }

    /// 编码后的总长度
    pub fn encoded_len(&self) -> usize {
        FRAME_OVERHEAD + self.params.len()
    }

    /// 编码为线上字节
    ///
    /// # 错误
    ///
    /// - `ProtocolError::ParamsTooLong`: 参数区超过 Len 字段可表示的范围
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        if self.params.len() > MAX_PARAMS_LEN {
            return Err(ProtocolError::ParamsTooLong {
                len: self.params.len(),
                max: MAX_PARAMS_LEN,
            });
        }

        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&HEADER);
        out.push((MIN_PAYLOAD_LEN + self.params.len()) as u8);
        out.push(self.id);
        out.push(self.ctrl.to_byte());
        out.extend_from_slice(&self.params);
        out.push(self.checksum());
        Ok(out)
    }

    /// 检查应答是否对应指定指令
    pub fn expect_id(&self, expected: CommandId) -> Result<(), ProtocolError> {
        let expected = u8::from(expected);
        if self.id != expected {
            return Err(ProtocolError::UnexpectedCommandId {
                expected,
                actual: self.id,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ctrl_flags_bit_order() {
        // rw 在 Bit 0，isQueued 在 Bit 1
        assert_eq!(CtrlFlags::read().to_byte(), 0x00);
        assert_eq!(CtrlFlags::write(false).to_byte(), 0x01);
        assert_eq!(CtrlFlags::write(true).to_byte(), 0x03);

        let flags = CtrlFlags::from(0x02u8);
        assert!(!flags.rw());
        assert!(flags.is_queued());
    }

    #[test]
    fn test_checksum_get_pose() {
        // 官方示例：GetPose 请求为 AA AA 02 0A 00 F6
        assert_eq!(checksum(10, 0, &[]), 0xF6);
    }

    #[test]
    fn test_encode_get_pose() {
        let packet = DobotPacket::read(CommandId::GetPose);
        assert_eq!(
            packet.encode().unwrap(),
            vec![0xAA, 0xAA, 0x02, 0x0A, 0x00, 0xF6]
        );
    }

    #[test]
    fn test_encode_queued_home() {
        let packet = DobotPacket::write(CommandId::HomeCmd, true, vec![0, 0, 0, 0]);
        let bytes = packet.encode().unwrap();
        assert_eq!(&bytes[..6], &[0xAA, 0xAA, 0x06, 31, 0x03, 0]);
        assert_eq!(bytes.len(), packet.encoded_len());

        // 负载与校验和相加应为 0
        let sum = bytes[3..].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        assert_eq!(sum, 0);
    }

    #[test]
    fn test_encode_params_too_long() {
        let packet = DobotPacket::write(CommandId::PtpCmd, false, vec![0u8; MAX_PARAMS_LEN + 1]);
        assert!(matches!(
            packet.encode(),
            Err(ProtocolError::ParamsTooLong { .. })
        ));
    }

    #[test]
    fn test_command_id_unknown() {
        let packet = DobotPacket::new(200, CtrlFlags::read(), vec![]);
        assert_eq!(
            packet.command_id(),
            Err(ProtocolError::UnknownCommandId { id: 200 })
        );
    }

    #[test]
    fn test_expect_id() {
        let packet = DobotPacket::read(CommandId::GetPose);
        assert!(packet.expect_id(CommandId::GetPose).is_ok());
        assert!(packet.expect_id(CommandId::PtpCmd).is_err());
    }
}
