//! 协议常量定义

/// 帧头（两个字节均为 0xAA）
pub const HEADER: [u8; 2] = [0xAA, 0xAA];

/// 帧头长度
pub const HEADER_LEN: usize = 2;

/// Len 字段覆盖 ID + Ctrl + Params，因此最小为 2
pub const MIN_PAYLOAD_LEN: usize = 2;

/// Params 最大长度（Len 为单字节，减去 ID 与 Ctrl）
pub const MAX_PARAMS_LEN: usize = u8::MAX as usize - MIN_PAYLOAD_LEN;

/// 完整帧的额外开销：帧头 + Len + ID + Ctrl + Checksum
pub const FRAME_OVERHEAD: usize = HEADER_LEN + 1 + MIN_PAYLOAD_LEN + 1;

/// 默认串口波特率
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// 队列指令应答中 queuedCmdIndex 的字节数
pub const QUEUED_INDEX_LEN: usize = 8;

/// GetPose 应答长度：x, y, z, r, j1..j4 共 8 个 f32
pub const POSE_PARAMS_LEN: usize = 32;

/// 固件在指令缓冲区满时返回的索引
pub const BUFFER_FULL_INDEX: u64 = 0;
