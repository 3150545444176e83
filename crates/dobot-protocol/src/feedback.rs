//! 应答解析

use crate::constants::{POSE_PARAMS_LEN, QUEUED_INDEX_LEN};
use crate::ids::CommandId;
use crate::packet::DobotPacket;
use crate::{ProtocolError, bytes_to_u64_le, ensure_len, f32_to_bytes_le, read_f32, u64_to_bytes_le};

/// 实时位姿 (ID 10)
///
/// 笛卡尔坐标单位为 mm，R 轴与关节角单位为度。
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub r: f32,
    /// J1..J4 关节角
    pub joints: [f32; 4],
}

impl Pose {
    /// 仅包含笛卡尔坐标的位姿
    pub fn cartesian(x: f32, y: f32, z: f32, r: f32) -> Self {
        Self {
            x,
            y,
            z,
            r,
            joints: [0.0; 4],
        }
    }

    /// (x, y, z, r) 元组
    pub fn xyzr(&self) -> (f32, f32, f32, f32) {
        (self.x, self.y, self.z, self.r)
    }

    /// 与目标点的欧氏距离（mm，不含 R 轴）
    pub fn distance_to(&self, x: f32, y: f32, z: f32) -> f32 {
        ((self.x - x).powi(2) + (self.y - y).powi(2) + (self.z - z).powi(2)).sqrt()
    }

    /// 是否在给定容差内到达目标（位置 mm，R 轴度）
    pub fn approx_eq(&self, x: f32, y: f32, z: f32, r: f32, tolerance: f32) -> bool {
        self.distance_to(x, y, z) <= tolerance && (self.r - r).abs() <= tolerance
    }

    /// 编码为应答参数区（模拟设备使用）
    pub fn to_params(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(POSE_PARAMS_LEN);
        for value in [self.x, self.y, self.z, self.r]
            .iter()
            .chain(self.joints.iter())
        {
            buf.extend_from_slice(&f32_to_bytes_le(*value));
        }
        buf
    }
}

impl TryFrom<&DobotPacket> for Pose {
    type Error = ProtocolError;

    fn try_from(packet: &DobotPacket) -> Result<Self, Self::Error> {
        packet.expect_id(CommandId::GetPose)?;
        ensure_len(&packet.params, POSE_PARAMS_LEN)?;
        let p = &packet.params;
        Ok(Self {
            x: read_f32(p, 0),
            y: read_f32(p, 1),
            z: read_f32(p, 2),
            r: read_f32(p, 3),
            joints: [read_f32(p, 4), read_f32(p, 5), read_f32(p, 6), read_f32(p, 7)],
        })
    }
}

impl std::fmt::Display for Pose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "X:{:.2}, Y:{:.2}, Z:{:.2}, R:{:.2}",
            self.x, self.y, self.z, self.r
        )
    }
}

/// 队列指令索引
///
/// 队列模式写指令的应答参数区为 8 字节 queuedCmdIndex；
/// `GetQueuedCmdCurrentIndex` (ID 246) 的应答格式相同。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct QueuedCmdIndex(pub u64);

impl QueuedCmdIndex {
    /// 从任意队列指令应答中读取索引
    pub fn parse(packet: &DobotPacket) -> Result<Self, ProtocolError> {
        ensure_len(&packet.params, QUEUED_INDEX_LEN)?;
        let mut bytes = [0u8; QUEUED_INDEX_LEN];
        bytes.copy_from_slice(&packet.params[..QUEUED_INDEX_LEN]);
        Ok(Self(bytes_to_u64_le(bytes)))
    }

    /// 解析 `GetQueuedCmdCurrentIndex` 应答
    pub fn parse_current(packet: &DobotPacket) -> Result<Self, ProtocolError> {
        packet.expect_id(CommandId::QueuedCmdCurrentIndex)?;
        Self::parse(packet)
    }

    /// 编码为应答参数区（模拟设备使用）
    pub fn to_params(self) -> Vec<u8> {
        u64_to_bytes_le(self.0).to_vec()
    }
}

/// 固件版本 (ID 2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceVersion {
    pub major: u8,
    pub minor: u8,
    pub revision: u8,
}

impl DeviceVersion {
    pub fn to_params(self) -> Vec<u8> {
        vec![self.major, self.minor, self.revision]
    }
}

impl TryFrom<&DobotPacket> for DeviceVersion {
    type Error = ProtocolError;

    fn try_from(packet: &DobotPacket) -> Result<Self, Self::Error> {
        packet.expect_id(CommandId::DeviceVersion)?;
        ensure_len(&packet.params, 3)?;
        Ok(Self {
            major: packet.params[0],
            minor: packet.params[1],
            revision: packet.params[2],
        })
    }
}

impl std::fmt::Display for DeviceVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::CtrlFlags;

    fn pose_response(pose: &Pose) -> DobotPacket {
        DobotPacket::new(CommandId::GetPose.into(), CtrlFlags::read(), pose.to_params())
    }

    #[test]
    fn test_pose_parse() {
        let pose = Pose {
            x: 230.0,
            y: 0.0,
            z: 20.0,
            r: 0.0,
            joints: [0.0, 35.2, 41.7, 0.0],
        };
        let parsed = Pose::try_from(&pose_response(&pose)).unwrap();
        assert_eq!(parsed, pose);
    }

    #[test]
    fn test_pose_parse_short() {
        let packet = DobotPacket::new(CommandId::GetPose.into(), CtrlFlags::read(), vec![0u8; 16]);
        assert_eq!(
            Pose::try_from(&packet),
            Err(ProtocolError::InvalidLength {
                expected: 32,
                actual: 16
            })
        );
    }

    #[test]
    fn test_pose_parse_wrong_id() {
        let packet = DobotPacket::new(
            CommandId::DeviceVersion.into(),
            CtrlFlags::read(),
            vec![0u8; 32],
        );
        assert!(matches!(
            Pose::try_from(&packet),
            Err(ProtocolError::UnexpectedCommandId { .. })
        ));
    }

    #[test]
    fn test_pose_approx_eq() {
        let pose = Pose::cartesian(230.02, -0.01, 19.98, 0.0);
        assert!(pose.approx_eq(230.0, 0.0, 20.0, 0.0, 0.5));
        assert!(!pose.approx_eq(200.0, 0.0, 20.0, 0.0, 0.5));
        assert!(!pose.approx_eq(230.0, 0.0, 20.0, 5.0, 0.5));
    }

    #[test]
    fn test_pose_display() {
        let pose = Pose::cartesian(145.49, -114.58, 47.45, -0.24);
        assert_eq!(pose.to_string(), "X:145.49, Y:-114.58, Z:47.45, R:-0.24");
    }

    #[test]
    fn test_queued_index_parse() {
        let packet = DobotPacket::new(
            CommandId::PtpCmd.into(),
            CtrlFlags::write(true),
            QueuedCmdIndex(42).to_params(),
        );
        assert_eq!(QueuedCmdIndex::parse(&packet).unwrap(), QueuedCmdIndex(42));
        // 不是 246 应答
        assert!(QueuedCmdIndex::parse_current(&packet).is_err());
    }

    #[test]
    fn test_queued_index_short() {
        let packet = DobotPacket::new(CommandId::PtpCmd.into(), CtrlFlags::write(true), vec![]);
        assert!(QueuedCmdIndex::parse(&packet).is_err());
    }

    #[test]
    fn test_device_version() {
        let version = DeviceVersion {
            major: 3,
            minor: 7,
            revision: 0,
        };
        let packet = DobotPacket::new(
            CommandId::DeviceVersion.into(),
            CtrlFlags::read(),
            version.to_params(),
        );
        let parsed = DeviceVersion::try_from(&packet).unwrap();
        assert_eq!(parsed, version);
        assert_eq!(parsed.to_string(), "3.7.0");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_pose_serde_json() {
        let pose = Pose::cartesian(1.0, 2.0, 3.0, 4.0);
        let json = serde_json::to_string(&pose).unwrap();
        let back: Pose = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pose);
    }
}
