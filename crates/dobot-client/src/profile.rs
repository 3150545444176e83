//! 运动参数配置
//!
//! 连接建立后下发到设备的回零点与 PTP 速度参数，以及末端执行器的等待时间。
//! 可以保存为 TOML 文件：
//!
//! ```toml
//! [home]
//! x = 200.0
//! y = 0.0
//! z = 50.0
//! r = 0.0
//!
//! [ptp_common]
//! velocity_ratio = 50.0
//! acceleration_ratio = 50.0
//!
//! [effector]
//! gripper_settle_ms = 700
//! suction_settle_ms = 300
//! disconnect_pause_ms = 100
//! ```

use crate::error::ProfileError;
use dobot_protocol::{HomeParams, PtpCommonParams, PtpCoordinateParams, PtpJointParams};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 末端执行器等待时间
///
/// 指令在队列中执行完成后，气泵和舵机仍需要一段时间动作到位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectorTiming {
    pub gripper_settle_ms: u64,
    pub suction_settle_ms: u64,
    /// 断开前关闭吸盘、清空队列后的停顿
    pub disconnect_pause_ms: u64,
}

impl Default for EffectorTiming {
    fn default() -> Self {
        Self {
            gripper_settle_ms: 700,
            suction_settle_ms: 300,
            disconnect_pause_ms: 100,
        }
    }
}

impl EffectorTiming {
    /// 不等待（模拟设备与测试使用）
    pub fn immediate() -> Self {
        Self {
            gripper_settle_ms: 0,
            suction_settle_ms: 0,
            disconnect_pause_ms: 0,
        }
    }

    pub fn gripper_settle(&self) -> Duration {
        Duration::from_millis(self.gripper_settle_ms)
    }

    pub fn suction_settle(&self) -> Duration {
        Duration::from_millis(self.suction_settle_ms)
    }

    pub fn disconnect_pause(&self) -> Duration {
        Duration::from_millis(self.disconnect_pause_ms)
    }
}

/// 运动参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MotionProfile {
    pub home: HomeParams,
    pub ptp_joint: PtpJointParams,
    pub ptp_coordinate: PtpCoordinateParams,
    pub ptp_common: PtpCommonParams,
    pub effector: EffectorTiming,
}

impl MotionProfile {
    /// 从 TOML 文件加载
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path)?;
        let profile: Self = toml::from_str(&content)?;
        profile.validate()?;
        Ok(profile)
    }

    /// 保存为 TOML 文件
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ProfileError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// 校验参数范围
    ///
    /// - 坐标必须是有限值
    /// - 速度、加速度必须为正
    /// - 比例必须在 (0, 100] 内
    pub fn validate(&self) -> Result<(), ProfileError> {
        let home = [
            ("home.x", self.home.x),
            ("home.y", self.home.y),
            ("home.z", self.home.z),
            ("home.r", self.home.r),
        ];
        for (field, value) in home {
            if !value.is_finite() {
                return Err(invalid(field, "must be a finite number"));
            }
        }

        let mut positive: Vec<(&str, f32)> = Vec::with_capacity(12);
        for value in self.ptp_joint.velocity {
            positive.push(("ptp_joint.velocity", value));
        }
        for value in self.ptp_joint.acceleration {
            positive.push(("ptp_joint.acceleration", value));
        }
        positive.push(("ptp_coordinate.xyz_velocity", self.ptp_coordinate.xyz_velocity));
        positive.push(("ptp_coordinate.r_velocity", self.ptp_coordinate.r_velocity));
        positive.push((
            "ptp_coordinate.xyz_acceleration",
            self.ptp_coordinate.xyz_acceleration,
        ));
        positive.push((
            "ptp_coordinate.r_acceleration",
            self.ptp_coordinate.r_acceleration,
        ));
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, "must be greater than 0"));
            }
        }

        for (field, value) in [
            ("ptp_common.velocity_ratio", self.ptp_common.velocity_ratio),
            (
                "ptp_common.acceleration_ratio",
                self.ptp_common.acceleration_ratio,
            ),
        ] {
            if !(value > 0.0 && value <= 100.0) {
                return Err(invalid(field, "must be within (0, 100]"));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ProfileError {
    ProfileError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
