//! 驱动层模块
//!
//! 本模块提供 Dobot Magician 的设备驱动功能，包括：
//! - 请求/应答事务（一次只有一个请求在途）
//! - 指令队列原语（清空、启动、停止、查询当前索引）
//! - 阻塞等待队列指令执行完成
//! - 串口设备发现与 Builder
//!
//! # 使用场景
//!
//! 适用于需要直接下发协议指令的场景。
//! 大多数用户应该使用 `dobot-client` 提供的 `Magician` 会话接口。

#[cfg(feature = "serial")]
mod builder;
mod config;
mod dobot;
mod error;

#[cfg(feature = "serial")]
pub use builder::DobotBuilder;
pub use config::DriverConfig;
pub use dobot::Dobot;
pub use error::DriverError;
