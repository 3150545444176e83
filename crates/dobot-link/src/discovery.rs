//! 设备发现
//!
//! Magician 通过 USB 转串口芯片接入主机。只有 VID/PID 与已知桥接芯片
//! 一致的 USB 串口才会成为候选，其他设备（Arduino 等）不会被打开。

/// Magician 出厂使用的 USB 转串口芯片（VID, PID）
pub const DOBOT_USB_BRIDGES: &[(u16, u16)] = &[
    (0x10C4, 0xEA60), // Silicon Labs CP210x
    (0x1A86, 0x7523), // WCH CH340
];

/// 串口设备信息
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceInfo {
    pub port_name: String,
    pub vid: u16,
    pub pid: u16,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

impl DeviceInfo {
    /// 是否为已知的 Magician 桥接芯片
    pub fn is_known_bridge(&self) -> bool {
        is_dobot_bridge(self.vid, self.pid)
    }
}

/// 判断 VID/PID 是否为 Magician 使用的桥接芯片
pub fn is_dobot_bridge(vid: u16, pid: u16) -> bool {
    DOBOT_USB_BRIDGES.contains(&(vid, pid))
}

/// 筛选候选端口：只保留已知桥接芯片，按端口名排序
pub fn select_candidates(devices: Vec<DeviceInfo>) -> Vec<DeviceInfo> {
    let mut candidates: Vec<DeviceInfo> =
        devices.into_iter().filter(DeviceInfo::is_known_bridge).collect();
    candidates.sort_by(|a, b| a.port_name.cmp(&b.port_name));
    candidates
}

/// 搜索可能连接着 Magician 的串口
///
/// 返回的列表可能为空；`connect` 会依次尝试其中的端口。
#[cfg(feature = "serial")]
pub fn search_dobot() -> Result<Vec<DeviceInfo>, crate::LinkError> {
    use crate::{LinkDeviceError, LinkDeviceErrorKind};
    use serialport::SerialPortType;

    let ports = serialport::available_ports().map_err(|e| {
        LinkDeviceError::new(
            LinkDeviceErrorKind::Backend,
            format!("Failed to enumerate serial ports: {}", e),
        )
    })?;

    let devices: Vec<DeviceInfo> = ports
        .into_iter()
        .filter_map(|port| match port.port_type {
            SerialPortType::UsbPort(usb) => Some(DeviceInfo {
                port_name: port.port_name,
                vid: usb.vid,
                pid: usb.pid,
                serial_number: usb.serial_number,
                manufacturer: usb.manufacturer,
                product: usb.product,
            }),
            _ => None,
        })
        .collect();

    let total = devices.len();
    let candidates = select_candidates(devices);
    tracing::debug!(
        "Found {} USB serial port(s), {} with a Dobot USB bridge",
        total,
        candidates.len()
    );
    Ok(candidates)
}
