//! 字节流解包
//!
//! 串口读到的是无边界的字节流，`PacketDecoder` 负责：
//! - 在帧头 `0xAA 0xAA` 处对齐，丢弃之前的噪声
//! - 等待完整帧到达
//! - 校验失败时跳过当前帧头并返回错误，下一次调用从后续字节重新同步

use crate::constants::{FRAME_OVERHEAD, HEADER, HEADER_LEN, MIN_PAYLOAD_LEN};
use crate::packet::{CtrlFlags, DobotPacket, checksum};
use crate::ProtocolError;
use bytes::{Buf, BytesMut};

/// 流式解包器
#[derive(Debug, Default)]
pub struct PacketDecoder {
    buf: BytesMut,
}

impl PacketDecoder {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(256),
        }
    }

    /// 追加从链路读到的字节
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// 缓冲区中尚未消费的字节数
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// 丢弃所有缓冲数据
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// 尝试解出下一个数据包
    ///
    /// # 返回
    ///
    /// - `None`: 数据不足，需要继续读取
    /// - `Some(Ok(packet))`: 解出一个完整数据包
    /// - `Some(Err(e))`: 遇到损坏的帧（已跳过），可以继续调用
    pub fn decode_next(&mut self) -> Option<Result<DobotPacket, ProtocolError>> {
        // 1. 对齐帧头
        match self.buf.windows(HEADER_LEN).position(|w| w == HEADER) {
            Some(0) => {},
            Some(pos) => self.buf.advance(pos),
            None => {
                // 保留最后一个 0xAA，它可能是下一个帧头的前半部分
                let keep = usize::from(self.buf.last() == Some(&HEADER[0]));
                let drop = self.buf.len() - keep;
                self.buf.advance(drop);
                return None;
            },
        }

        // 2. 读取 Len
        if self.buf.len() <= HEADER_LEN {
            return None;
        }
        let payload_len = self.buf[HEADER_LEN] as usize;
        if payload_len < MIN_PAYLOAD_LEN {
            self.buf.advance(HEADER_LEN);
            return Some(Err(ProtocolError::InvalidLength {
                expected: MIN_PAYLOAD_LEN,
                actual: payload_len,
            }));
        }

        // 3. 等待整帧
        let frame_len = FRAME_OVERHEAD - MIN_PAYLOAD_LEN + payload_len;
        if self.buf.len() < frame_len {
            return None;
        }

        let frame = self.buf.split_to(frame_len);
        let id = frame[HEADER_LEN + 1];
        let ctrl = frame[HEADER_LEN + 2];
        let params = &frame[HEADER_LEN + 3..frame_len - 1];
        let actual = frame[frame_len - 1];
        let expected = checksum(id, ctrl, params);

        if actual != expected {
            // 把帧头之后的字节放回去，从中寻找真正的帧头
            let mut rest = BytesMut::from(&frame[HEADER_LEN..]);
            rest.extend_from_slice(&self.buf);
            self.buf = rest;
            return Some(Err(ProtocolError::ChecksumMismatch { expected, actual }));
        }

        Some(Ok(DobotPacket::new(id, CtrlFlags::from(ctrl), params.to_vec())))
    }
}
