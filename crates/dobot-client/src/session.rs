//! Magician 会话
//!
//! 一个 `Magician` 对应一条到机械臂的连接。所有操作都会阻塞，
//! 直到设备确认指令并执行完成；操作之间严格串行。
//!
//! 会话在 `disconnect()` 或 `Drop` 时释放连接。断开后的任何操作都返回
//! [`SessionError::NotConnected`]，不会产生设备通信。

use crate::error::SessionError;
use crate::profile::MotionProfile;
use crate::types::{ConnectionState, GripperAction, Pose};
use dobot_driver::Dobot;
use dobot_protocol::{EndEffectorCommand, HomeCommand, PtpCommand};
use tracing::{debug, info, warn};

/// Dobot Magician 会话
pub struct Magician {
    driver: Option<Dobot>,
    port: String,
    profile: MotionProfile,
}

impl Magician {
    /// 连接机械臂
    ///
    /// `target` 为 `None` 时自动搜索，依次尝试已知 USB 桥接芯片的串口。
    /// 连接成功后会下发回零点与 PTP 速度参数（见 [`MotionProfile`]）。
    ///
    /// 失败时返回带原因码的 [`ConnectError`](crate::ConnectError)，端口已被释放。
    #[cfg(feature = "serial")]
    pub fn connect(target: Option<&str>) -> Result<Self, crate::ConnectError> {
        let mut builder = crate::MagicianBuilder::new();
        if let Some(port) = target {
            builder = builder.port(port);
        }
        builder.connect()
    }

    pub(crate) fn from_driver(driver: Dobot, profile: MotionProfile) -> Self {
        let port = driver.port_name().to_string();
        Self {
            driver: Some(driver),
            port,
            profile,
        }
    }

    pub fn state(&self) -> ConnectionState {
        if self.driver.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.driver.is_some()
    }

    /// 连接的端口名（断开后为 `None`）
    pub fn port(&self) -> Option<&str> {
        self.driver.as_ref().map(|_| self.port.as_str())
    }

    pub fn profile(&self) -> &MotionProfile {
        &self.profile
    }

    fn driver(&mut self) -> Result<&mut Dobot, SessionError> {
        self.driver.as_mut().ok_or(SessionError::NotConnected)
    }

    /// 回零，阻塞直到完成
    ///
    /// 回零点由连接时下发的 `MotionProfile::home` 决定。
    pub fn home(&mut self) -> Result<(), SessionError> {
        debug!("Homing");
        self.driver()?.execute_queued(&HomeCommand::default())?;
        Ok(())
    }

    /// 直线插补（MOVL_XYZ）到笛卡尔目标，阻塞直到到位
    ///
    /// 目标不做可达性检查，由固件决定是否执行。
    pub fn move_to(&mut self, x: f32, y: f32, z: f32, r: f32) -> Result<(), SessionError> {
        debug!("Moving to ({:.2}, {:.2}, {:.2}, {:.2})", x, y, z, r);
        self.driver()?
            .execute_queued(&PtpCommand::movl_xyz(x, y, z, r))?;
        Ok(())
    }

    /// 吸盘开/关，阻塞直到气泵动作到位
    pub fn set_suction_cup(&mut self, on: bool) -> Result<(), SessionError> {
        let settle = self.profile.effector.suction_settle();
        debug!("Suction cup {}", if on { "on" } else { "off" });
        self.driver()?
            .execute_queued(&EndEffectorCommand::suction_cup(on))?;
        spin_sleep::sleep(settle);
        Ok(())
    }

    /// 夹爪张开（`true`）/闭合（`false`），阻塞直到动作到位
    pub fn set_gripper(&mut self, open: bool) -> Result<(), SessionError> {
        self.gripper(GripperAction::from_open(open))
    }

    pub fn gripper(&mut self, action: GripperAction) -> Result<(), SessionError> {
        let settle = self.profile.effector.gripper_settle();
        let command = match action {
            GripperAction::Open => EndEffectorCommand::gripper_open(),
            GripperAction::Close => EndEffectorCommand::gripper_close(),
        };
        debug!("Gripper {:?}", action);
        self.driver()?.execute_queued(&command)?;
        spin_sleep::sleep(settle);
        Ok(())
    }

    /// 读取当前位姿（每次都向设备查询，不缓存）
    pub fn get_pose(&mut self) -> Result<Pose, SessionError> {
        Ok(self.driver()?.get_pose()?)
    }

    /// 断开连接
    ///
    /// 尽力而为的清理：关闭吸盘、停止并清空指令队列，然后关闭端口。
    /// 清理失败只记录日志，会话一定会进入 `Disconnected`。重复调用无效果。
    pub fn disconnect(&mut self) {
        let Some(mut driver) = self.driver.take() else {
            return;
        };

        if let Err(e) = driver.execute_queued(&EndEffectorCommand::suction_cup(false)) {
            warn!("{}: failed to release suction cup: {}", self.port, e);
        }
        if let Err(e) = driver.stop_queue() {
            warn!("{}: failed to stop command queue: {}", self.port, e);
        }
        if let Err(e) = driver.clear_queue() {
            warn!("{}: failed to clear command queue: {}", self.port, e);
        }

        spin_sleep::sleep(self.profile.effector.disconnect_pause());
        driver.close();
        info!("Disconnected from {}", self.port);
    }
}

impl Drop for Magician {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl std::fmt::Debug for Magician {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Magician")
            .field("port", &self.port)
            .field("state", &self.state())
            .finish()
    }
}
