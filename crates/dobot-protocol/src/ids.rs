//! 指令 ID 定义
//!
//! 仅包含本 SDK 实际使用的指令；完整列表见 Dobot Magician 通信协议文档。

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 指令 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum CommandId {
    /// 固件版本（读）
    DeviceVersion = 2,
    /// 实时位姿（读）
    GetPose = 10,
    /// 回零点参数（写，可入队）
    HomeParams = 30,
    /// 回零指令（写，可入队）
    HomeCmd = 31,
    /// 吸盘（写，可入队）
    EndEffectorSuctionCup = 62,
    /// 夹爪（写，可入队）
    EndEffectorGripper = 63,
    /// PTP 关节速度/加速度（写，可入队）
    PtpJointParams = 80,
    /// PTP 坐标速度/加速度（写，可入队）
    PtpCoordinateParams = 81,
    /// PTP 速度/加速度比例（写，可入队）
    PtpCommonParams = 83,
    /// PTP 运动指令（写，可入队）
    PtpCmd = 84,
    /// 启动指令队列
    QueuedCmdStartExec = 240,
    /// 停止指令队列（执行完当前指令后停止）
    QueuedCmdStopExec = 241,
    /// 清空指令队列
    QueuedCmdClear = 245,
    /// 当前已执行的队列指令索引（读）
    QueuedCmdCurrentIndex = 246,
}

impl CommandId {
    /// 是否允许以队列模式（isQueued = 1）下发
    pub fn is_queueable(self) -> bool {
        matches!(
            self,
            CommandId::HomeParams
                | CommandId::HomeCmd
                | CommandId::EndEffectorSuctionCup
                | CommandId::EndEffectorGripper
                | CommandId::PtpJointParams
                | CommandId::PtpCoordinateParams
                | CommandId::PtpCommonParams
                | CommandId::PtpCmd
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_id_values() {
        assert_eq!(u8::from(CommandId::GetPose), 10);
        assert_eq!(u8::from(CommandId::PtpCmd), 84);
        assert_eq!(u8::from(CommandId::QueuedCmdCurrentIndex), 246);
    }

    #[test]
    fn test_command_id_try_from() {
        assert_eq!(CommandId::try_from(31u8).unwrap(), CommandId::HomeCmd);
        assert_eq!(
            CommandId::try_from(63u8).unwrap(),
            CommandId::EndEffectorGripper
        );
        assert!(CommandId::try_from(99u8).is_err());
    }

    #[test]
    fn test_queueable() {
        assert!(CommandId::PtpCmd.is_queueable());
        assert!(CommandId::EndEffectorSuctionCup.is_queueable());
        assert!(!CommandId::GetPose.is_queueable());
        assert!(!CommandId::QueuedCmdClear.is_queueable());
    }
}
