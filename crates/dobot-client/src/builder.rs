//! Client 层 Builder
//!
//! 打开链路、握手并下发初始运动参数，得到一个已连接的 [`Magician`]。

use crate::error::{ConnectError, ConnectFailure};
use crate::profile::MotionProfile;
use crate::session::Magician;
use dobot_driver::{Dobot, DriverConfig};
use dobot_link::LinkAdapter;
use tracing::{info, warn};

/// Magician Builder
///
/// # Example
///
/// ```no_run
/// use dobot_client::{MagicianBuilder, MotionProfile};
///
/// let mut profile = MotionProfile::default();
/// profile.ptp_common.velocity_ratio = 30.0;
///
/// let mut arm = MagicianBuilder::new()
///     .port("/dev/ttyUSB0")
///     .profile(profile)
///     .connect()
///     .unwrap();
/// arm.home().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MagicianBuilder {
    port: Option<String>,
    baud_rate: Option<u32>,
    driver_config: Option<DriverConfig>,
    profile: Option<MotionProfile>,
}

impl MagicianBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定串口（可选，默认自动搜索）
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    /// 波特率（可选，默认 115200）
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = Some(baud_rate);
        self
    }

    /// 驱动配置（应答超时、轮询间隔、运动超时）
    pub fn driver_config(mut self, config: DriverConfig) -> Self {
        self.driver_config = Some(config);
        self
    }

    /// 连接后下发的运动参数
    pub fn profile(mut self, profile: MotionProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// 通过串口连接
    #[cfg(feature = "serial")]
    pub fn connect(self) -> Result<Magician, ConnectError> {
        let profile = self.checked_profile()?;

        let mut builder = dobot_driver::DobotBuilder::new()
            .config(self.driver_config.clone().unwrap_or_default());
        if let Some(ref port) = self.port {
            builder = builder.port(port.clone());
        }
        if let Some(baud_rate) = self.baud_rate {
            builder = builder.baud_rate(baud_rate);
        }

        // DobotBuilder 已完成握手
        let driver = builder
            .build()
            .map_err(|e| ConnectError::from_driver(self.port.as_deref(), e))?;
        setup(driver, profile)
    }

    /// 使用已打开的链路连接（模拟设备、自定义后端）
    pub fn connect_with(
        self,
        link: impl LinkAdapter + Send + 'static,
    ) -> Result<Magician, ConnectError> {
        let profile = self.checked_profile()?;
        let mut driver = Dobot::new(link, self.driver_config.unwrap_or_default());

        let version = driver
            .device_version()
            .map_err(|e| ConnectError::from_driver(Some(driver.port_name()), e))?;
        info!("Connected to Dobot on {} (firmware {})", driver.port_name(), version);

        setup(driver, profile)
    }

    fn checked_profile(&self) -> Result<MotionProfile, ConnectError> {
        let profile = self.profile.clone().unwrap_or_default();
        profile.validate().map_err(|e| {
            ConnectError::new(ConnectFailure::Setup, self.port.as_deref(), e.to_string())
        })?;
        Ok(profile)
    }
}

/// 清空队列并下发初始参数，等待其执行完成
fn setup(mut driver: Dobot, profile: MotionProfile) -> Result<Magician, ConnectError> {
    let result = driver.execute_queued_batch(&[
        &profile.home,
        &profile.ptp_joint,
        &profile.ptp_coordinate,
        &profile.ptp_common,
    ]);

    match result {
        Ok(_) => Ok(Magician::from_driver(driver, profile)),
        Err(e) => {
            let port = driver.port_name().to_string();
            warn!("{}: failed to apply motion profile: {}", port, e);
            driver.close();
            Err(ConnectError::with_failure(
                ConnectFailure::Setup,
                Some(&port),
                e,
            ))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dobot_link::mock::MockLinkAdapter;
    use dobot_protocol::{CommandId, HomeParams};
    use std::time::Duration;

    fn fast_config() -> DriverConfig {
        DriverConfig {
            response_timeout: Duration::from_millis(10),
            poll_interval: Duration::from_millis(1),
            motion_timeout: Some(Duration::from_millis(200)),
        }
    }

    #[test]
    fn test_connect_applies_profile() {
        let link = MockLinkAdapter::new();
        let device = link.device();
        let mut profile = MotionProfile::default();
        profile.home = HomeParams {
            x: 210.0,
            y: 5.0,
            z: 40.0,
            r: 0.0,
        };

        let _arm = MagicianBuilder::new()
            .driver_config(fast_config())
            .profile(profile.clone())
            .connect_with(link)
            .unwrap();

        assert_eq!(device.home_params(), profile.home);
        let ids = device.sent_ids();
        assert_eq!(
            &ids[..6],
            &[
                CommandId::DeviceVersion,
                CommandId::QueuedCmdClear,
                CommandId::HomeParams,
                CommandId::PtpJointParams,
                CommandId::PtpCoordinateParams,
                CommandId::PtpCommonParams,
            ]
        );
        assert!(ids.contains(&CommandId::QueuedCmdStartExec));
    }

    #[test]
    fn test_connect_no_response() {
        let link = MockLinkAdapter::new();
        link.device().set_responsive(false);
        let err = MagicianBuilder::new()
            .driver_config(fast_config())
            .connect_with(link)
            .unwrap_err();
        assert!(err.is_no_response());
        assert_eq!(err.port.as_deref(), Some("mock"));
    }

    #[test]
    fn test_connect_setup_failure() {
        let link = MockLinkAdapter::new();
        link.device().set_buffer_full(true);
        let err = MagicianBuilder::new()
            .driver_config(fast_config())
            .connect_with(link)
            .unwrap_err();
        assert_eq!(err.failure(), ConnectFailure::Setup);
    }

    #[test]
    fn test_connect_invalid_profile() {
        let link = MockLinkAdapter::new();
        let device = link.device();
        let mut profile = MotionProfile::default();
        profile.ptp_common.velocity_ratio = 0.0;

        let err = MagicianBuilder::new()
            .profile(profile)
            .connect_with(link)
            .unwrap_err();
        assert_eq!(err.failure(), ConnectFailure::Setup);
        assert!(device.sent_packets().is_empty());
    }
}
