//! 错误类型体系
//!
//! - `ConnectError`: 连接失败，携带原因码 [`ConnectFailure`]
//! - `SessionError`: 会话操作失败（未连接或驱动错误）
//! - `ProfileError`: 运动参数文件读写与校验

use dobot_driver::DriverError;
use dobot_link::{LinkDeviceErrorKind, LinkError};
use std::fmt;
use thiserror::Error;

/// 连接失败原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectFailure {
    /// 没有找到设备（未插入或端口不存在）
    NotFound,
    /// 端口被其他程序占用
    Occupied,
    /// 无权限打开端口
    PermissionDenied,
    /// 端口已打开但设备未应答握手
    NoResponse,
    /// 握手成功但初始化运动参数失败
    Setup,
    /// 其他 IO 错误
    Io,
}

impl fmt::Display for ConnectFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConnectFailure::NotFound => "device not found",
            ConnectFailure::Occupied => "port occupied",
            ConnectFailure::PermissionDenied => "permission denied",
            ConnectFailure::NoResponse => "device not responding",
            ConnectFailure::Setup => "setup failed",
            ConnectFailure::Io => "I/O error",
        };
        f.write_str(text)
    }
}

impl ConnectFailure {
    /// 根据驱动错误判断失败原因（握手阶段之前）
    pub fn classify(error: &DriverError) -> Self {
        match error {
            DriverError::NotFound => ConnectFailure::NotFound,
            DriverError::Link(LinkError::Device(e)) => match e.kind {
                LinkDeviceErrorKind::NotFound | LinkDeviceErrorKind::NoDevice => {
                    ConnectFailure::NotFound
                },
                LinkDeviceErrorKind::Busy => ConnectFailure::Occupied,
                LinkDeviceErrorKind::AccessDenied => ConnectFailure::PermissionDenied,
                _ => ConnectFailure::Io,
            },
            DriverError::Link(LinkError::Timeout)
            | DriverError::Link(LinkError::Protocol(_))
            | DriverError::Protocol(_)
            | DriverError::UnexpectedResponse { .. } => ConnectFailure::NoResponse,
            _ => ConnectFailure::Io,
        }
    }
}

/// 连接错误
///
/// 连接失败时不会留下半打开的会话；端口已被释放。
///
/// ```
/// use dobot_client::{ConnectError, ConnectFailure};
///
/// let err = ConnectError::new(ConnectFailure::Occupied, Some("COM3"), "in use");
/// assert!(err.is_occupied());
/// assert_eq!(err.to_string(), "Failed to connect to COM3: port occupied (in use)");
/// ```
#[derive(Error, Debug)]
#[error("Failed to connect to {}: {failure} ({message})", .port.as_deref().unwrap_or("Dobot"))]
pub struct ConnectError {
    pub failure: ConnectFailure,
    pub port: Option<String>,
    pub message: String,
    #[source]
    pub source: Option<DriverError>,
}

impl ConnectError {
    pub fn new(failure: ConnectFailure, port: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            failure,
            port: port.map(str::to_string),
            message: message.into(),
            source: None,
        }
    }

    /// 从驱动错误构建（自动分类原因）
    pub fn from_driver(port: Option<&str>, error: DriverError) -> Self {
        Self::with_failure(ConnectFailure::classify(&error), port, error)
    }

    /// 从驱动错误构建（指定原因）
    pub fn with_failure(failure: ConnectFailure, port: Option<&str>, error: DriverError) -> Self {
        Self {
            failure,
            port: port.map(str::to_string),
            message: error.to_string(),
            source: Some(error),
        }
    }

    pub fn failure(&self) -> ConnectFailure {
        self.failure
    }

    pub fn is_not_found(&self) -> bool {
        self.failure == ConnectFailure::NotFound
    }

    pub fn is_occupied(&self) -> bool {
        self.failure == ConnectFailure::Occupied
    }

    pub fn is_permission_denied(&self) -> bool {
        self.failure == ConnectFailure::PermissionDenied
    }

    pub fn is_no_response(&self) -> bool {
        self.failure == ConnectFailure::NoResponse
    }
}

/// 会话操作错误
#[derive(Error, Debug)]
pub enum SessionError {
    /// 会话已断开
    #[error("Not connected to a Dobot")]
    NotConnected,

    /// 驱动错误（设备拒绝指令、通信失败）
    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl SessionError {
    pub fn is_not_connected(&self) -> bool {
        matches!(self, SessionError::NotConnected)
    }
}

/// 运动参数文件错误
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Failed to read profile: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse profile: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize profile: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// 参数超出允许范围
    #[error("Invalid profile value '{field}': {reason}")]
    Invalid { field: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use dobot_link::LinkDeviceError;

    fn device_error(kind: LinkDeviceErrorKind) -> DriverError {
        DriverError::Link(LinkError::Device(LinkDeviceError::new(kind, "test")))
    }

    #[test]
    fn test_classify_device_errors() {
        assert_eq!(
            ConnectFailure::classify(&DriverError::NotFound),
            ConnectFailure::NotFound
        );
        assert_eq!(
            ConnectFailure::classify(&device_error(LinkDeviceErrorKind::NoDevice)),
            ConnectFailure::NotFound
        );
        assert_eq!(
            ConnectFailure::classify(&device_error(LinkDeviceErrorKind::Busy)),
            ConnectFailure::Occupied
        );
        assert_eq!(
            ConnectFailure::classify(&device_error(LinkDeviceErrorKind::AccessDenied)),
            ConnectFailure::PermissionDenied
        );
        assert_eq!(
            ConnectFailure::classify(&device_error(LinkDeviceErrorKind::Backend)),
            ConnectFailure::Io
        );
    }

    #[test]
    fn test_classify_no_response() {
        assert_eq!(
            ConnectFailure::classify(&DriverError::Link(LinkError::Timeout)),
            ConnectFailure::NoResponse
        );
        assert_eq!(
            ConnectFailure::classify(&DriverError::UnexpectedResponse {
                expected: 2,
                actual: 10
            }),
            ConnectFailure::NoResponse
        );
    }

    #[test]
    fn test_connect_error_display_without_port() {
        let err = ConnectError::from_driver(None, DriverError::NotFound);
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Failed to connect to Dobot: device not found (No Dobot device found)"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_session_error_transparent() {
        let err: SessionError = DriverError::BufferFull.into();
        assert_eq!(err.to_string(), "Command queue buffer full");
        assert!(!err.is_not_connected());
        assert!(SessionError::NotConnected.is_not_connected());
    }
}
