//! 客户端接口模块
//!
//! 本模块提供 Dobot Magician 的阻塞式会话接口：
//! - `Magician`: 一个会话对应一条连接，`Drop` 时自动断开
//! - `MotionProfile`: 连接时下发的运动参数与末端执行器等待时间
//! - 分类错误：`ConnectError`（带原因码）与 `SessionError`
//!
//! # 使用场景
//!
//! 这是大多数用户应该使用的模块。每个操作都会阻塞，直到机械臂完成动作。
//! 如果需要直接下发协议指令，可以使用 `dobot-driver`。
//!
//! ```no_run
//! use dobot_client::Magician;
//!
//! let mut arm = Magician::connect(None)?;
//! arm.home()?;
//! arm.move_to(230.0, 0.0, 20.0, 0.0)?;
//! println!("{}", arm.get_pose()?);
//! arm.disconnect();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod builder;
pub mod error;
pub mod profile;
mod session;
pub mod types;

pub use builder::MagicianBuilder;
pub use error::{ConnectError, ConnectFailure, ProfileError, SessionError};
pub use profile::{EffectorTiming, MotionProfile};
pub use session::Magician;
pub use types::*;
