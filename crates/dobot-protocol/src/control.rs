//! 控制指令构建
//!
//! 每个指令结构体对应一个写指令，通过 [`DobotCommand::to_packet`] 转换为数据包。
//! 同时实现 `TryFrom<&DobotPacket>`，便于模拟机械臂与抓包工具解析下行指令。

use crate::ids::CommandId;
use crate::packet::DobotPacket;
use crate::{ProtocolError, ensure_len, f32_to_bytes_le, read_f32, u32_to_bytes_le};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 写指令的统一抽象
pub trait DobotCommand {
    /// 指令 ID
    fn id(&self) -> CommandId;

    /// 编码参数区（小端字节序）
    fn encode_params(&self, buf: &mut Vec<u8>);

    /// 转换为数据包
    ///
    /// `queued = true` 时指令进入设备的指令队列，应答携带 queuedCmdIndex。
    fn to_packet(&self, queued: bool) -> DobotPacket {
        let mut params = Vec::new();
        self.encode_params(&mut params);
        DobotPacket::write(self.id(), queued, params)
    }
}

fn push_f32s(buf: &mut Vec<u8>, values: &[f32]) {
    for value in values {
        buf.extend_from_slice(&f32_to_bytes_le(*value));
    }
}

// ============================================================================
// 回零
// ============================================================================

/// 回零点参数 (ID 30)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HomeParams {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub r: f32,
}

impl Default for HomeParams {
    fn default() -> Self {
        Self {
            x: 200.0,
            y: 0.0,
            z: 50.0,
            r: 0.0,
        }
    }
}

impl DobotCommand for HomeParams {
    fn id(&self) -> CommandId {
        CommandId::HomeParams
    }

    fn encode_params(&self, buf: &mut Vec<u8>) {
        push_f32s(buf, &[self.x, self.y, self.z, self.r]);
    }
}

impl TryFrom<&DobotPacket> for HomeParams {
    type Error = ProtocolError;

    fn try_from(packet: &DobotPacket) -> Result<Self, Self::Error> {
        packet.expect_id(CommandId::HomeParams)?;
        ensure_len(&packet.params, 16)?;
        Ok(Self {
            x: read_f32(&packet.params, 0),
            y: read_f32(&packet.params, 1),
            z: read_f32(&packet.params, 2),
            r: read_f32(&packet.params, 3),
        })
    }
}

/// 回零指令 (ID 31)
///
/// 参数区为 4 字节保留字段，固件忽略其值。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HomeCommand {
    pub reserved: u32,
}

impl DobotCommand for HomeCommand {
    fn id(&self) -> CommandId {
        CommandId::HomeCmd
    }

    fn encode_params(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&u32_to_bytes_le(self.reserved));
    }
}

// ============================================================================
// 末端执行器
// ============================================================================

/// 末端执行器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndEffector {
    /// 吸盘 (ID 62)
    SuctionCup,
    /// 夹爪 (ID 63)
    Gripper,
}

/// 末端执行器指令 (ID 62 / 63)
///
/// - `enable_ctrl`: 由固件控制末端 IO（始终为 1）
/// - `on`: 吸盘 1 = 吸气；夹爪 1 = 闭合、0 = 张开
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndEffectorCommand {
    pub effector: EndEffector,
    pub enable_ctrl: bool,
    pub on: bool,
}

impl EndEffectorCommand {
    /// 吸盘开/关
    pub fn suction_cup(on: bool) -> Self {
        Self {
            effector: EndEffector::SuctionCup,
            enable_ctrl: true,
            on,
        }
    }

    /// 夹爪张开（通电为闭合，因此 on = 0）
    pub fn gripper_open() -> Self {
        Self {
            effector: EndEffector::Gripper,
            enable_ctrl: true,
            on: false,
        }
    }

    /// 夹爪闭合
    pub fn gripper_close() -> Self {
        Self {
            effector: EndEffector::Gripper,
            enable_ctrl: true,
            on: true,
        }
    }
}

impl DobotCommand for EndEffectorCommand {
    fn id(&self) -> CommandId {
        match self.effector {
            EndEffector::SuctionCup => CommandId::EndEffectorSuctionCup,
            EndEffector::Gripper => CommandId::EndEffectorGripper,
        }
    }

    fn encode_params(&self, buf: &mut Vec<u8>) {
        buf.push(u8::from(self.enable_ctrl));
        buf.push(u8::from(self.on));
    }
}

impl TryFrom<&DobotPacket> for EndEffectorCommand {
    type Error = ProtocolError;

    fn try_from(packet: &DobotPacket) -> Result<Self, Self::Error> {
        let effector = match packet.command_id()? {
            CommandId::EndEffectorSuctionCup => EndEffector::SuctionCup,
            CommandId::EndEffectorGripper => EndEffector::Gripper,
            _ => {
                return Err(ProtocolError::UnexpectedCommandId {
                    expected: CommandId::EndEffectorSuctionCup.into(),
                    actual: packet.id,
                });
            },
        };
        ensure_len(&packet.params, 2)?;
        Ok(Self {
            effector,
            enable_ctrl: packet.params[0] != 0,
            on: packet.params[1] != 0,
        })
    }
}

// ============================================================================
// PTP 参数
// ============================================================================

/// PTP 关节速度/加速度 (ID 80)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PtpJointParams {
    /// J1..J4 速度（°/s）
    pub velocity: [f32; 4],
    /// J1..J4 加速度（°/s²）
    pub acceleration: [f32; 4],
}

impl Default for PtpJointParams {
    fn default() -> Self {
        Self {
            velocity: [200.0; 4],
            acceleration: [200.0; 4],
        }
    }
}

impl DobotCommand for PtpJointParams {
    fn id(&self) -> CommandId {
        CommandId::PtpJointParams
    }

    fn encode_params(&self, buf: &mut Vec<u8>) {
        push_f32s(buf, &self.velocity);
        push_f32s(buf, &self.acceleration);
    }
}

/// PTP 坐标速度/加速度 (ID 81)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PtpCoordinateParams {
    /// XYZ 合成速度（mm/s）
    pub xyz_velocity: f32,
    /// R 轴速度（°/s）
    pub r_velocity: f32,
    /// XYZ 合成加速度（mm/s²）
    pub xyz_acceleration: f32,
    /// R 轴加速度（°/s²）
    pub r_acceleration: f32,
}

impl Default for PtpCoordinateParams {
    fn default() -> Self {
        Self {
            xyz_velocity: 100.0,
            r_velocity: 100.0,
            xyz_acceleration: 100.0,
            r_acceleration: 100.0,
        }
    }
}

impl DobotCommand for PtpCoordinateParams {
    fn id(&self) -> CommandId {
        CommandId::PtpCoordinateParams
    }

    fn encode_params(&self, buf: &mut Vec<u8>) {
        push_f32s(
            buf,
            &[
                self.xyz_velocity,
                self.r_velocity,
                self.xyz_acceleration,
                self.r_acceleration,
            ],
        );
    }
}

/// PTP 速度/加速度比例 (ID 83)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PtpCommonParams {
    /// 速度比例（%）
    pub velocity_ratio: f32,
    /// 加速度比例（%）
    pub acceleration_ratio: f32,
}

impl Default for PtpCommonParams {
    fn default() -> Self {
        Self {
            velocity_ratio: 50.0,
            acceleration_ratio: 50.0,
        }
    }
}

impl DobotCommand for PtpCommonParams {
    fn id(&self) -> CommandId {
        CommandId::PtpCommonParams
    }

    fn encode_params(&self, buf: &mut Vec<u8>) {
        push_f32s(buf, &[self.velocity_ratio, self.acceleration_ratio]);
    }
}

// ============================================================================
// PTP 运动
// ============================================================================

/// PTP 运动模式
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, TryFromPrimitive, IntoPrimitive,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PtpMode {
    /// 门型运动，笛卡尔坐标
    JumpXyz = 0,
    /// 关节插补，笛卡尔坐标
    MovjXyz = 1,
    /// 直线插补，笛卡尔坐标
    #[default]
    MovlXyz = 2,
    /// 门型运动，关节角
    JumpAngle = 3,
    /// 关节插补，关节角
    MovjAngle = 4,
    /// 直线插补，关节角
    MovlAngle = 5,
    /// 关节插补，关节角增量
    MovjInc = 6,
    /// 直线插补，笛卡尔增量
    MovlInc = 7,
    /// 关节插补，笛卡尔增量
    MovjXyzInc = 8,
    /// 门型运动 + 直线插补
    JumpMovlXyz = 9,
}

impl PtpMode {
    /// 目标是否为笛卡尔坐标（而非关节角）
    pub fn is_cartesian(self) -> bool {
        !matches!(
            self,
            PtpMode::JumpAngle | PtpMode::MovjAngle | PtpMode::MovlAngle | PtpMode::MovjInc
        )
    }

    /// 目标是否为相对当前位置的增量
    pub fn is_incremental(self) -> bool {
        matches!(
            self,
            PtpMode::MovjInc | PtpMode::MovlInc | PtpMode::MovjXyzInc
        )
    }
}

/// PTP 运动指令 (ID 84)
///
/// 关节角模式下 x/y/z/r 依次表示 J1..J4。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PtpCommand {
    pub mode: PtpMode,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub r: f32,
}

impl PtpCommand {
    /// 直线插补到笛卡尔目标
    pub fn movl_xyz(x: f32, y: f32, z: f32, r: f32) -> Self {
        Self {
            mode: PtpMode::MovlXyz,
            x,
            y,
            z,
            r,
        }
    }
}

impl DobotCommand for PtpCommand {
    fn id(&self) -> CommandId {
        CommandId::PtpCmd
    }

    fn encode_params(&self, buf: &mut Vec<u8>) {
        buf.push(self.mode.into());
        push_f32s(buf, &[self.x, self.y, self.z, self.r]);
    }
}

impl TryFrom<&DobotPacket> for PtpCommand {
    type Error = ProtocolError;

    fn try_from(packet: &DobotPacket) -> Result<Self, Self::Error> {
        packet.expect_id(CommandId::PtpCmd)?;
        ensure_len(&packet.params, 17)?;
        let mode = PtpMode::try_from(packet.params[0]).map_err(|_| ProtocolError::InvalidValue {
            field: "ptp_mode".to_string(),
            value: packet.params[0],
        })?;
        let coords = &packet.params[1..];
        Ok(Self {
            mode,
            x: read_f32(coords, 0),
            y: read_f32(coords, 1),
            z: read_f32(coords, 2),
            r: read_f32(coords, 3),
        })
    }
}

// ============================================================================
// 指令队列控制
// ============================================================================

/// 指令队列控制（立即执行，不入队）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueControl {
    /// 启动队列执行 (ID 240)
    StartExec,
    /// 停止队列执行 (ID 241)
    StopExec,
    /// 清空队列 (ID 245)
    Clear,
}

impl QueueControl {
    pub fn id(self) -> CommandId {
        match self {
            QueueControl::StartExec => CommandId::QueuedCmdStartExec,
            QueueControl::StopExec => CommandId::QueuedCmdStopExec,
            QueueControl::Clear => CommandId::QueuedCmdClear,
        }
    }

    pub fn to_packet(self) -> DobotPacket {
        DobotPacket::write(self.id(), false, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytes_to_f32_le;

    #[test]
    fn test_ptp_command_layout() {
        let packet = PtpCommand::movl_xyz(230.0, 0.0, 20.0, 0.0).to_packet(true);
        assert_eq!(packet.id, 84);
        assert!(packet.is_queued());
        assert_eq!(packet.params.len(), 17);
        assert_eq!(packet.params[0], 2); // MOVL_XYZ
        assert_eq!(
            bytes_to_f32_le(packet.params[1..5].try_into().unwrap()),
            230.0
        );
        assert_eq!(
            bytes_to_f32_le(packet.params[9..13].try_into().unwrap()),
            20.0
        );
    }

    #[test]
    fn test_ptp_command_parse() {
        let cmd = PtpCommand::movl_xyz(145.49, -114.58, 47.45, -0.24);
        let packet = cmd.to_packet(true);
        let parsed = PtpCommand::try_from(&packet).unwrap();
        assert_eq!(parsed, cmd);
    }

    #[test]
    fn test_ptp_command_parse_invalid_mode() {
        let mut packet = PtpCommand::movl_xyz(0.0, 0.0, 0.0, 0.0).to_packet(false);
        packet.params[0] = 42;
        assert!(matches!(
            PtpCommand::try_from(&packet),
            Err(ProtocolError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_ptp_mode_classification() {
        assert!(PtpMode::MovlXyz.is_cartesian());
        assert!(!PtpMode::MovlXyz.is_incremental());
        assert!(!PtpMode::MovjAngle.is_cartesian());
        assert!(PtpMode::MovlInc.is_incremental());
        assert_eq!(PtpMode::default(), PtpMode::MovlXyz);
    }

    #[test]
    fn test_gripper_polarity() {
        // 夹爪通电闭合：open → on = 0，close → on = 1
        let open = EndEffectorCommand::gripper_open().to_packet(true);
        assert_eq!(open.id, 63);
        assert_eq!(open.params, vec![1, 0]);

        let close = EndEffectorCommand::gripper_close().to_packet(true);
        assert_eq!(close.params, vec![1, 1]);
    }

    #[test]
    fn test_suction_cup_packet() {
        let on = EndEffectorCommand::suction_cup(true).to_packet(true);
        assert_eq!(on.id, 62);
        assert_eq!(on.params, vec![1, 1]);

        let parsed = EndEffectorCommand::try_from(&on).unwrap();
        assert_eq!(parsed.effector, EndEffector::SuctionCup);
        assert!(parsed.on);
    }

    #[test]
    fn test_end_effector_parse_wrong_id() {
        let packet = HomeCommand::default().to_packet(true);
        assert!(EndEffectorCommand::try_from(&packet).is_err());
    }

    #[test]
    fn test_home_params_defaults_and_parse() {
        let params = HomeParams::default();
        assert_eq!((params.x, params.y, params.z, params.r), (200.0, 0.0, 50.0, 0.0));

        let packet = params.to_packet(true);
        assert_eq!(packet.params.len(), 16);
        assert_eq!(HomeParams::try_from(&packet).unwrap(), params);
    }

    #[test]
    fn test_home_command_reserved() {
        let packet = HomeCommand::default().to_packet(true);
        assert_eq!(packet.id, 31);
        assert_eq!(packet.params, vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_ptp_params_lengths() {
        assert_eq!(PtpJointParams::default().to_packet(true).params.len(), 32);
        assert_eq!(PtpCoordinateParams::default().to_packet(true).params.len(), 16);
        assert_eq!(PtpCommonParams::default().to_packet(true).params.len(), 8);
    }

    #[test]
    fn test_queue_control_is_immediate() {
        for control in [QueueControl::StartExec, QueueControl::StopExec, QueueControl::Clear] {
            let packet = control.to_packet();
            assert!(packet.is_write());
            assert!(!packet.is_queued());
            assert!(packet.params.is_empty());
        }
        assert_eq!(QueueControl::Clear.to_packet().id, 245);
    }
}
