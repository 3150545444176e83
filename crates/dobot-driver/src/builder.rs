//! Builder 模式实现
//!
//! 提供链式构造 `Dobot` 实例的便捷方式。

use crate::config::DriverConfig;
use crate::dobot::Dobot;
use crate::error::DriverError;
use dobot_link::{SerialLinkAdapter, search_dobot};
use dobot_protocol::DEFAULT_BAUD_RATE;
use tracing::{debug, info, warn};

/// Dobot Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use dobot_driver::{DobotBuilder, DriverConfig};
///
/// // 自动搜索设备
/// let dobot = DobotBuilder::new().build().unwrap();
///
/// // 指定端口
/// let dobot = DobotBuilder::new()
///     .port("/dev/ttyUSB0")
///     .config(DriverConfig::default())
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Default)]
pub struct DobotBuilder {
    /// 串口名称（`None` 表示自动搜索）
    port: Option<String>,
    /// 波特率（默认 115200）
    baud_rate: Option<u32>,
    /// 驱动配置
    config: Option<DriverConfig>,
}

impl DobotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置串口（可选，默认自动搜索）
    ///
    /// - Linux: "/dev/ttyUSB0"
    /// - macOS: "/dev/cu.SLAB_USBtoUART"
    /// - Windows: "COM3"
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    /// 设置波特率（可选，默认 115200）
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = Some(baud_rate);
        self
    }

    /// 设置驱动配置（可选）
    pub fn config(mut self, config: DriverConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 打开设备并完成握手
    ///
    /// 未指定端口时依次尝试 [`search_dobot`] 返回的候选端口，
    /// 返回第一个能应答版本查询的设备。
    ///
    /// # Errors
    /// - `DriverError::NotFound`: 没有候选端口
    /// - `DriverError::Link`: 端口无法打开（占用、无权限）或设备未应答
    pub fn build(self) -> Result<Dobot, DriverError> {
        if let Some(ref port) = self.port {
            return self.open(port);
        }

        let candidates = search_dobot()?;
        if candidates.is_empty() {
            return Err(DriverError::NotFound);
        }

        let mut last_error = DriverError::NotFound;
        for device in candidates {
            match self.open(&device.port_name) {
                Ok(dobot) => return Ok(dobot),
                Err(e) => {
                    debug!("Skipping {}: {}", device.port_name, e);
                    last_error = e;
                },
            }
        }

        warn!("No candidate serial port answered as a Dobot");
        Err(last_error)
    }

    fn open(&self, port: &str) -> Result<Dobot, DriverError> {
        let baud_rate = self.baud_rate.unwrap_or(DEFAULT_BAUD_RATE);
        let link = SerialLinkAdapter::open(port, baud_rate)?;

        let mut dobot = Dobot::new(link, self.config.clone().unwrap_or_default());
        let version = dobot.device_version()?;
        info!("Connected to Dobot on {} (firmware {})", port, version);
        Ok(dobot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dobot_link::{LinkDeviceErrorKind, LinkError};

    #[test]
    fn test_builder_defaults() {
        let builder = DobotBuilder::new();
        assert!(builder.port.is_none());
        assert!(builder.baud_rate.is_none());
        assert!(builder.config.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let builder = DobotBuilder::new()
            .port("COM3")
            .baud_rate(9600)
            .config(DriverConfig::default());
        assert_eq!(builder.port.as_deref(), Some("COM3"));
        assert_eq!(builder.baud_rate, Some(9600));
    }

    #[test]
    fn test_build_missing_port() {
        let result = DobotBuilder::new()
            .port("/dev/this-port-does-not-exist")
            .build();
        match result {
            Err(DriverError::Link(LinkError::Device(e))) => assert!(matches!(
                e.kind,
                LinkDeviceErrorKind::NotFound
                    | LinkDeviceErrorKind::NoDevice
                    | LinkDeviceErrorKind::Backend
            )),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("opening a missing port must fail"),
        }
    }
}
