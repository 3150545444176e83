//! Dobot SDK - 越疆 Magician 机械臂 Rust SDK
//!
//! 阻塞式、单线程的 Magician 控制接口：每个操作都会等待机械臂完成动作后才返回。
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **协议层** (`protocol`): 串口数据包编码/解码
//! - **链路层** (`link`): 串口后端、设备发现、模拟机械臂
//! - **驱动层** (`driver`): 请求/应答事务、指令队列管理
//! - **客户端层** (`client`): `Magician` 会话
//!
//! # 快速开始
//!
//! ```no_run
//! use dobot_sdk::prelude::*;
//!
//! dobot_sdk::init_logger();
//!
//! let mut arm = Magician::connect(None)?;
//! arm.home()?;
//! arm.move_to(230.0, 0.0, 20.0, 0.0)?;
//! arm.set_suction_cup(true)?;
//! println!("{}", arm.get_pose()?);
//! arm.disconnect();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! 需要直接下发协议指令的用户可以使用驱动层：
//!
//! ```rust
//! use dobot_sdk::driver::{Dobot, DriverConfig};
//! ```

pub use dobot_client as client;
pub use dobot_driver as driver;
pub use dobot_link as link;
pub use dobot_protocol as protocol;

mod logging;
pub mod prelude;

pub use logging::{init_logger, init_logger_with_filter};

// --- 用户以此为界 ---

// 链路层常用类型
pub use link::{LinkAdapter, LinkError};

// 协议层
pub use protocol::{Pose, ProtocolError};

// 驱动层错误（驱动本身通过 driver::Dobot 访问）
pub use driver::DriverError;

// 客户端层（推荐入口）
pub use client::{
    ConnectError, ConnectFailure, ConnectionState, EffectorTiming, Magician, MagicianBuilder,
    MotionProfile, SessionError,
};

#[cfg(feature = "serial")]
pub use link::{DeviceInfo, search_dobot};
