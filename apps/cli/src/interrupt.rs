//! Ctrl+C 处理
//!
//! 第一次 Ctrl+C 清除运行标志：当前命令完成后停止，会话照常断开（关闭吸盘）。
//! 第二次 Ctrl+C 立即退出进程。

use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 128 + SIGINT
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// 安装 Ctrl+C 处理器，返回运行标志
///
/// 每个进程只能安装一次。
pub fn install() -> Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();

    ctrlc::set_handler(move || {
        if record_interrupt(&flag) {
            eprintln!("\nSecond interrupt, exiting without waiting for the arm");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
        eprintln!(
            "\nInterrupt received, stopping after the current command (Ctrl+C again to exit now)..."
        );
    })
    .context("Failed to install Ctrl+C handler")?;

    Ok(running)
}

/// 清除运行标志；已经清除过（第二次中断）时返回 `true`
fn record_interrupt(running: &AtomicBool) -> bool {
    !running.swap(false, Ordering::SeqCst)
}
