//! 驱动配置

use std::time::Duration;

/// 驱动配置
///
/// # Example
///
/// ```
/// use dobot_driver::DriverConfig;
/// use std::time::Duration;
///
/// let config = DriverConfig {
///     poll_interval: Duration::from_millis(50),
///     motion_timeout: Some(Duration::from_secs(30)),
///     ..Default::default()
/// };
/// assert_eq!(config.response_timeout, Duration::from_millis(200));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// 单次请求等待应答的超时
    pub response_timeout: Duration,
    /// 查询队列当前索引的间隔
    pub poll_interval: Duration,
    /// 等待队列指令完成的上限（`None` 表示一直等待）
    pub motion_timeout: Option<Duration>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            response_timeout: Duration::from_millis(200),
            poll_interval: Duration::from_millis(100),
            motion_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DriverConfig::default();
        assert_eq!(config.response_timeout, Duration::from_millis(200));
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert!(config.motion_timeout.is_none());
    }
}
