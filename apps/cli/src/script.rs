//! 脚本系统
//!
//! JSON 脚本加载与执行，以及内置演示序列

use anyhow::{Context, Result};
use dobot_sdk::Magician;
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// 脚本命令序列
///
/// ```json
/// {
///   "name": "pick",
///   "description": "pick and place",
///   "commands": [
///     { "type": "Home" },
///     { "type": "Move", "x": 200.0, "y": -50.0, "z": 0.0 },
///     { "type": "Suction", "on": true },
///     { "type": "Wait", "duration_ms": 500 },
///     { "type": "Pose" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    /// 脚本名称
    pub name: String,

    /// 脚本描述
    #[serde(default)]
    pub description: String,

    /// 命令序列
    pub commands: Vec<ScriptCommand>,
}

/// 脚本命令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScriptCommand {
    /// 回零
    Home,

    /// 直线移动到笛卡尔坐标
    Move {
        x: f32,
        y: f32,
        z: f32,
        #[serde(default)]
        r: f32,
    },

    /// 吸盘开/关
    Suction { on: bool },

    /// 夹爪张开/闭合
    Gripper { open: bool },

    /// 等待
    Wait { duration_ms: u64 },

    /// 查询并打印位姿
    Pose,
}

impl ScriptCommand {
    fn describe(&self) -> String {
        match self {
            ScriptCommand::Home => "home".to_string(),
            ScriptCommand::Move { x, y, z, r } => {
                format!("move to ({:.2}, {:.2}, {:.2}, {:.2})", x, y, z, r)
            },
            ScriptCommand::Suction { on } => {
                format!("suction {}", if *on { "on" } else { "off" })
            },
            ScriptCommand::Gripper { open } => {
                format!("gripper {}", if *open { "open" } else { "close" })
            },
            ScriptCommand::Wait { duration_ms } => format!("wait {} ms", duration_ms),
            ScriptCommand::Pose => "pose".to_string(),
        }
    }
}

/// 内置演示序列：回零、两次移动、吸盘切换，每步之间停顿 1 秒
pub fn demo_script() -> Script {
    let pause = || ScriptCommand::Wait { duration_ms: 1000 };
    Script {
        name: "demo".to_string(),
        description: "Home, move between two points and toggle the suction cup".to_string(),
        commands: vec![
            ScriptCommand::Home,
            pause(),
            ScriptCommand::Pose,
            ScriptCommand::Move {
                x: 145.49,
                y: -114.58,
                z: 47.45,
                r: -0.24,
            },
            pause(),
            ScriptCommand::Pose,
            ScriptCommand::Suction { on: false },
            pause(),
            ScriptCommand::Move {
                x: 200.0,
                y: -50.0,
                z: 0.0,
                r: 0.0,
            },
            pause(),
            ScriptCommand::Pose,
            ScriptCommand::Suction { on: true },
            pause(),
            ScriptCommand::Home,
            pause(),
            ScriptCommand::Pose,
            ScriptCommand::Suction { on: false },
            pause(),
        ],
    }
}

/// 脚本配置
#[derive(Debug, Clone)]
pub struct ScriptConfig {
    /// 失败时是否继续
    pub continue_on_error: bool,

    /// 命令之间的延迟（毫秒）
    pub execution_delay_ms: u64,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            continue_on_error: false,
            execution_delay_ms: 100,
        }
    }
}

/// 脚本执行器
#[derive(Debug, Default)]
pub struct ScriptExecutor {
    config: ScriptConfig,
}

impl ScriptExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: ScriptConfig) -> Self {
        self.config = config;
        self
    }

    /// 加载脚本文件
    pub fn load_script<P: AsRef<std::path::Path>>(path: P) -> Result<Script> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read script {}", path.display()))?;
        let script: Script = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse script {}", path.display()))?;

        validate_script(&script)?;
        Ok(script)
    }

    /// 执行脚本
    ///
    /// `running` 被清除后（Ctrl+C），在当前命令完成后停止，不会打断正在执行的动作。
    pub fn execute(
        &self,
        arm: &mut Magician,
        script: &Script,
        running: &AtomicBool,
    ) -> ScriptResult {
        let start = Instant::now();
        let mut result = ScriptResult {
            total_commands: script.commands.len(),
            ..Default::default()
        };

        for (i, cmd) in script.commands.iter().enumerate() {
            if !running.load(Ordering::SeqCst) {
                warn!("Script '{}' interrupted before command {}", script.name, i + 1);
                result.interrupted = true;
                break;
            }

            println!("[{}/{}] {}", i + 1, result.total_commands, cmd.describe());

            match execute_command(arm, cmd) {
                Ok(()) => result.succeeded.push(i),
                Err(err) => {
                    println!("  ❌ {}", err);
                    result.failed.push((i, err.to_string()));

                    if !self.config.continue_on_error {
                        break;
                    }
                },
            }

            if i + 1 < script.commands.len() && self.config.execution_delay_ms > 0 {
                std::thread::sleep(Duration::from_millis(self.config.execution_delay_ms));
            }
        }

        result.duration_secs = start.elapsed().as_secs_f64();
        info!(
            "Script '{}' finished: {} succeeded, {} failed",
            script.name,
            result.succeeded.len(),
            result.failed.len()
        );
        result
    }
}

/// 执行单个命令
fn execute_command(arm: &mut Magician, cmd: &ScriptCommand) -> Result<()> {
    match *cmd {
        ScriptCommand::Home => arm.home()?,
        ScriptCommand::Move { x, y, z, r } => arm.move_to(x, y, z, r)?,
        ScriptCommand::Suction { on } => arm.set_suction_cup(on)?,
        ScriptCommand::Gripper { open } => arm.set_gripper(open)?,
        ScriptCommand::Wait { duration_ms } => {
            std::thread::sleep(Duration::from_millis(duration_ms))
        },
        ScriptCommand::Pose => println!("  {}", arm.get_pose()?),
    }
    Ok(())
}

/// 在连接之前检查脚本内容
fn validate_script(script: &Script) -> Result<()> {
    for (i, cmd) in script.commands.iter().enumerate() {
        if let ScriptCommand::Move { x, y, z, r } = *cmd {
            crate::validation::validate_target(x, y, z, r)
                .with_context(|| format!("Command {} of script '{}'", i + 1, script.name))?;
        }
    }
    Ok(())
}

/// 脚本执行结果
#[derive(Debug, Default)]
pub struct ScriptResult {
    /// 总命令数
    pub total_commands: usize,

    /// 成功的命令索引
    pub succeeded: Vec<usize>,

    /// 失败的命令索引和错误
    pub failed: Vec<(usize, String)>,

    /// 是否被 Ctrl+C 中断
    pub interrupted: bool,

    /// 执行时长（秒）
    pub duration_secs: f64,
}

impl ScriptResult {
    /// 所有命令都已执行且成功
    pub fn is_complete(&self) -> bool {
        !self.interrupted && self.failed.is_empty() && self.succeeded.len() == self.total_commands
    }
}
