//! One-shot 模式
//!
//! 每个命令独立执行：
//! 1. 读取配置
//! 2. 连接机器人
//! 3. 执行操作
//! 4. 断开连接

use anyhow::{Context, Result};
use dobot_sdk::driver::DriverConfig;
use dobot_sdk::{Magician, MagicianBuilder, MotionProfile};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::commands::config::CliConfig;
use crate::commands::{GripperCommand, MoveCommand, SuctionCommand};
use crate::interrupt;
use crate::script::{self, ScriptConfig, ScriptExecutor};

/// 单条队列指令的最长等待时间，机械臂卡住时命令不会一直挂起
pub const MOTION_TIMEOUT: Duration = Duration::from_secs(60);

/// One-shot 模式配置
#[derive(Debug, Clone)]
pub struct OneShotConfig {
    /// 串口（`None` 时自动搜索）
    pub port: Option<String>,

    /// 运动参数
    pub profile: MotionProfile,

    /// 驱动配置（带运动超时）
    pub driver: DriverConfig,
}

impl OneShotConfig {
    /// 命令行参数优先，其次配置文件
    pub fn resolve(config: CliConfig, port: Option<String>, profile: Option<PathBuf>) -> Result<Self> {
        let config = CliConfig {
            port: port.or(config.port),
            profile: profile.or(config.profile),
        };
        Ok(Self {
            profile: config.load_profile()?,
            port: config.port,
            driver: DriverConfig {
                motion_timeout: Some(MOTION_TIMEOUT),
                ..Default::default()
            },
        })
    }
}

/// One-shot 模式
pub struct OneShotMode {
    config: OneShotConfig,
}

impl OneShotMode {
    /// 加载配置文件并合并命令行参数
    pub fn new(
        config_path: Option<&Path>,
        port: Option<String>,
        profile: Option<PathBuf>,
    ) -> Result<Self> {
        let file = CliConfig::load(config_path)?;
        Ok(Self {
            config: OneShotConfig::resolve(file, port, profile)?,
        })
    }

    /// 连接机械臂
    pub fn connect(&self) -> Result<Magician> {
        match &self.config.port {
            Some(port) => println!("⏳ Connecting to Dobot on {}...", port),
            None => println!("⏳ Searching for Dobot..."),
        }

        let mut builder = MagicianBuilder::new()
            .driver_config(self.config.driver.clone())
            .profile(self.config.profile.clone());
        if let Some(port) = &self.config.port {
            builder = builder.port(port.clone());
        }

        let arm = builder.connect().context(
            "Check the USB cable and make sure no other program (e.g. DobotStudio) holds the port",
        )?;
        println!("✅ Connected to {}", arm.port().unwrap_or("Dobot"));
        Ok(arm)
    }

    /// 位置查询
    pub fn pose(&self) -> Result<()> {
        let mut arm = self.connect()?;
        println!("{}", arm.get_pose()?);
        Ok(())
    }

    /// 回零
    pub fn home(&self) -> Result<()> {
        let mut arm = self.connect()?;
        println!("⏳ Homing...");
        arm.home()?;
        println!("✅ Home reached: {}", arm.get_pose()?);
        Ok(())
    }

    /// 移动命令
    pub fn move_to(&self, args: MoveCommand) -> Result<()> {
        // 连接之前先检查参数
        let (x, y, z, r) = args.target()?;

        let mut arm = self.connect()?;
        println!("⏳ Moving to ({:.2}, {:.2}, {:.2}, {:.2})...", x, y, z, r);
        arm.move_to(x, y, z, r)?;
        println!("✅ Pose: {}", arm.get_pose()?);
        Ok(())
    }

    /// 吸盘
    pub fn suction(&self, args: SuctionCommand) -> Result<()> {
        let mut arm = self.connect()?;
        arm.set_suction_cup(args.is_on())?;
        println!("✅ Suction cup {}", if args.is_on() { "on" } else { "off" });

        // 断开时会关闭吸盘
        if args.is_on() {
            println!("ℹ️  The suction cup is released when the session disconnects");
        }
        Ok(())
    }

    /// 夹爪
    pub fn gripper(&self, args: GripperCommand) -> Result<()> {
        let mut arm = self.connect()?;
        let action = args.action();
        arm.gripper(action)?;
        println!("✅ Gripper {:?}", action);
        Ok(())
    }

    /// 运行内置演示序列（出错即停止，Ctrl+C 在当前步骤完成后停止）
    pub fn demo(&self) -> Result<()> {
        let demo = script::demo_script();
        let executor = ScriptExecutor::new().with_config(ScriptConfig {
            continue_on_error: false,
            execution_delay_ms: 0,
        });

        let running = interrupt::install()?;
        let mut arm = self.connect()?;
        println!("📜 {}", demo.description);
        let result = executor.execute(&mut arm, &demo, &running);
        arm.disconnect();

        if result.is_complete() {
            println!("✅ Demo finished in {:.1} s", result.duration_secs);
            return Ok(());
        }
        if let Some((idx, err)) = result.failed.first() {
            anyhow::bail!("Demo failed at step {}: {}", idx + 1, err);
        }
        anyhow::bail!("Demo interrupted")
    }
}
