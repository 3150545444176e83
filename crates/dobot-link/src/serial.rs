//! USB 串口后端
//!
//! 115200 8N1，无流控。串口是字节流，读到的数据先送入 [`PacketDecoder`]，
//! 直到解出一个完整数据包或超时。

use crate::{DobotPacket, LinkAdapter, LinkDeviceError, LinkDeviceErrorKind, LinkError};
use dobot_protocol::PacketDecoder;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// 默认接收超时
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_millis(200);

/// 串口适配器
pub struct SerialLinkAdapter {
    port: Box<dyn SerialPort>,
    port_name: String,
    decoder: PacketDecoder,
    receive_timeout: Duration,
    read_buf: [u8; 256],
}

impl SerialLinkAdapter {
    /// 打开串口
    ///
    /// # 错误
    ///
    /// - `LinkDeviceErrorKind::NotFound` / `NoDevice`: 端口不存在或已拔出
    /// - `LinkDeviceErrorKind::Busy` / `AccessDenied`: 端口被其他进程占用或无权限
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self, LinkError> {
        let port = serialport::new(port_name, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(DEFAULT_RECEIVE_TIMEOUT)
            .open()
            .map_err(|e| LinkError::Device(map_open_error(port_name, &e)))?;

        debug!("Opened serial port {} at {} baud", port_name, baud_rate);

        let mut adapter = Self {
            port,
            port_name: port_name.to_string(),
            decoder: PacketDecoder::new(),
            receive_timeout: DEFAULT_RECEIVE_TIMEOUT,
            read_buf: [0u8; 256],
        };
        // 丢弃打开前残留在驱动缓冲区中的字节
        adapter.clear_input()?;
        Ok(adapter)
    }
}

impl LinkAdapter for SerialLinkAdapter {
    fn send(&mut self, packet: &DobotPacket) -> Result<(), LinkError> {
        let bytes = packet.encode()?;
        trace!("TX {} bytes (id {})", bytes.len(), packet.id);
        self.port.write_all(&bytes).map_err(map_io_error)?;
        self.port.flush().map_err(map_io_error)?;
        Ok(())
    }

    fn receive(&mut self) -> Result<DobotPacket, LinkError> {
        let deadline = Instant::now() + self.receive_timeout;

        loop {
            while let Some(result) = self.decoder.decode_next() {
                match result {
                    Ok(packet) => {
                        trace!("RX id {} ({} param bytes)", packet.id, packet.params.len());
                        return Ok(packet);
                    },
                    Err(e) => warn!("{}: dropping corrupted packet: {}", self.port_name, e),
                }
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(LinkError::Timeout);
            }
            self.port.set_timeout(deadline - now).map_err(|e| {
                LinkError::Device(LinkDeviceError::new(
                    LinkDeviceErrorKind::Backend,
                    e.to_string(),
                ))
            })?;

            match self.port.read(&mut self.read_buf) {
                Ok(0) => continue,
                Ok(n) => self.decoder.extend(&self.read_buf[..n]),
                Err(e) if e.kind() == ErrorKind::TimedOut => return Err(LinkError::Timeout),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(map_io_error(e)),
            }
        }
    }

    fn set_receive_timeout(&mut self, timeout: Duration) {
        self.receive_timeout = timeout;
    }

    fn clear_input(&mut self) -> Result<(), LinkError> {
        self.decoder.clear();
        self.port.clear(ClearBuffer::Input).map_err(|e| {
            LinkError::Device(LinkDeviceError::new(
                LinkDeviceErrorKind::Backend,
                e.to_string(),
            ))
        })
    }

    fn port_name(&self) -> &str {
        &self.port_name
    }
}

/// 将打开串口的错误映射为结构化设备错误
pub(crate) fn map_open_error(port_name: &str, error: &serialport::Error) -> LinkDeviceError {
    let kind = match error.kind() {
        serialport::ErrorKind::NoDevice => LinkDeviceErrorKind::NoDevice,
        serialport::ErrorKind::InvalidInput => LinkDeviceErrorKind::UnsupportedConfig,
        serialport::ErrorKind::Io(ErrorKind::NotFound) => LinkDeviceErrorKind::NotFound,
        serialport::ErrorKind::Io(ErrorKind::PermissionDenied) => LinkDeviceErrorKind::AccessDenied,
        serialport::ErrorKind::Io(_) if is_busy_message(&error.description) => {
            LinkDeviceErrorKind::Busy
        },
        _ => LinkDeviceErrorKind::Backend,
    };
    LinkDeviceError::new(kind, format!("{}: {}", port_name, error.description))
}

fn is_busy_message(description: &str) -> bool {
    let lower = description.to_ascii_lowercase();
    lower.contains("busy") || lower.contains("in use")
}

/// 读写过程中的 IO 错误：设备拔出视为断开
fn map_io_error(error: std::io::Error) -> LinkError {
    match error.kind() {
        ErrorKind::BrokenPipe | ErrorKind::NotConnected | ErrorKind::UnexpectedEof => {
            LinkError::Disconnected
        },
        _ => LinkError::Io(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_open_error_not_found() {
        let err = serialport::Error::new(
            serialport::ErrorKind::Io(ErrorKind::NotFound),
            "No such file or directory",
        );
        let mapped = map_open_error("/dev/ttyUSB9", &err);
        assert_eq!(mapped.kind, LinkDeviceErrorKind::NotFound);
        assert!(mapped.message.starts_with("/dev/ttyUSB9"));
    }

    #[test]
    fn test_map_open_error_permission() {
        let err = serialport::Error::new(
            serialport::ErrorKind::Io(ErrorKind::PermissionDenied),
            "Permission denied",
        );
        assert_eq!(
            map_open_error("COM3", &err).kind,
            LinkDeviceErrorKind::AccessDenied
        );
    }

    #[test]
    fn test_map_open_error_busy() {
        let err = serialport::Error::new(
            serialport::ErrorKind::Io(ErrorKind::Other),
            "Device or resource busy",
        );
        assert_eq!(
            map_open_error("/dev/ttyUSB0", &err).kind,
            LinkDeviceErrorKind::Busy
        );
    }

    #[test]
    fn test_map_open_error_no_device() {
        let err = serialport::Error::new(serialport::ErrorKind::NoDevice, "gone");
        assert_eq!(
            map_open_error("/dev/ttyUSB0", &err).kind,
            LinkDeviceErrorKind::NoDevice
        );
    }

    #[test]
    fn test_map_io_error_disconnect() {
        let err = std::io::Error::new(ErrorKind::BrokenPipe, "pipe");
        assert!(matches!(map_io_error(err), LinkError::Disconnected));

        let err = std::io::Error::other("other");
        assert!(matches!(map_io_error(err), LinkError::Io(_)));
    }
}
