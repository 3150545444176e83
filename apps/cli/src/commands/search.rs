//! search 命令
//!
//! 列出 VID/PID 与 Magician 桥接芯片一致的串口

use anyhow::{Context, Result};

pub fn execute() -> Result<()> {
    let devices = dobot_sdk::search_dobot().context("Failed to search serial ports")?;

    if devices.is_empty() {
        println!("No serial port with a Dobot USB bridge found");
        return Ok(());
    }

    println!("Candidate ports:");
    for device in &devices {
        println!(
            "  {}  [{:04x}:{:04x}] {}",
            device.port_name,
            device.vid,
            device.pid,
            device.product.as_deref().unwrap_or("")
        );
    }

    Ok(())
}
