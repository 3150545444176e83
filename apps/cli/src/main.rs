//! # Dobot CLI
//!
//! Command-line interface for the Dobot Magician robot arm.
//!
//! 每个机械臂命令都是 One-shot：连接 -> 执行 -> 断开。
//!
//! ```bash
//! # 配置默认串口
//! dobot-cli config set --port /dev/ttyUSB0
//!
//! # 单条命令
//! dobot-cli home
//! dobot-cli move --x 200 --y -50 --z 0 --r 0
//! dobot-cli suction on
//!
//! # 执行 JSON 脚本
//! dobot-cli run pick.json --continue-on-error
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod interrupt;
mod modes;
mod script;
mod validation;

use commands::{ConfigCommand, GripperCommand, MoveCommand, RunCommand, SuctionCommand};
use modes::oneshot::OneShotMode;

/// Dobot CLI - 机械臂命令行工具
#[derive(Parser, Debug)]
#[command(name = "dobot-cli")]
#[command(about = "Command-line interface for the Dobot Magician robot arm", long_about = None)]
#[command(version)]
struct Cli {
    /// 串口（覆盖配置文件，默认自动搜索）
    #[arg(short, long, global = true)]
    port: Option<String>,

    /// 运动参数文件（TOML，覆盖配置文件）
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    /// CLI 配置文件路径
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 列出可能连接着 Magician 的串口
    Search,

    /// 查询当前位姿
    Pose,

    /// 回零
    Home,

    /// 移动到笛卡尔坐标
    Move {
        #[command(flatten)]
        args: MoveCommand,
    },

    /// 吸盘开/关
    Suction {
        #[command(flatten)]
        args: SuctionCommand,
    },

    /// 夹爪张开/闭合
    Gripper {
        #[command(flatten)]
        args: GripperCommand,
    },

    /// 执行 JSON 脚本
    Run {
        #[command(flatten)]
        args: RunCommand,
    },

    /// 运行内置演示序列
    Demo,
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dobot_cli=info".parse()?),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        // 不需要连接机械臂的命令
        Commands::Config(cmd) => cmd.execute(config, cli.port, cli.profile),
        Commands::Search => commands::search::execute(),

        // One-shot 模式：连接 -> 执行 -> 断开
        Commands::Pose => OneShotMode::new(config, cli.port, cli.profile)?.pose(),
        Commands::Home => OneShotMode::new(config, cli.port, cli.profile)?.home(),
        Commands::Move { args } => OneShotMode::new(config, cli.port, cli.profile)?.move_to(args),
        Commands::Suction { args } => {
            OneShotMode::new(config, cli.port, cli.profile)?.suction(args)
        },
        Commands::Gripper { args } => {
            OneShotMode::new(config, cli.port, cli.profile)?.gripper(args)
        },
        Commands::Run { args } => args.execute(&OneShotMode::new(config, cli.port, cli.profile)?),
        Commands::Demo => OneShotMode::new(config, cli.port, cli.profile)?.demo(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_port_after_subcommand() {
        let cli = Cli::try_parse_from(["dobot-cli", "home", "--port", "COM3"]).unwrap();
        assert_eq!(cli.port.as_deref(), Some("COM3"));
        assert!(matches!(cli.command, Commands::Home));
    }

    #[test]
    fn test_parse_move() {
        let cli = Cli::try_parse_from([
            "dobot-cli", "move", "--x", "200", "--y", "-50", "--z", "0", "--r", "0",
        ])
        .unwrap();
        match cli.command {
            Commands::Move { args } => {
                assert_eq!(args.x, 200.0);
                assert_eq!(args.y, -50.0);
            },
            other => panic!("unexpected: {:?}", other),
        }
    }
}
