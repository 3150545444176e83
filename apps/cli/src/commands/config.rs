//! 配置管理命令
//!
//! 用于管理 CLI 配置（默认串口、运动参数文件）

use anyhow::{Context, Result};
use clap::Subcommand;
use dobot_sdk::MotionProfile;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 默认配置文件路径：`<config_dir>/dobot/config.toml`
pub fn default_config_file() -> Result<PathBuf> {
    let mut path = dirs::config_dir().context("Cannot determine the user config directory")?;
    path.push("dobot");
    path.push("config.toml");
    Ok(path)
}

fn resolve(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_file(),
    }
}

/// CLI 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// 默认串口（未设置时自动搜索）
    pub port: Option<String>,

    /// 运动参数文件（TOML）
    pub profile: Option<PathBuf>,
}

impl CliConfig {
    /// 加载配置，文件不存在时返回默认配置
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = resolve(path)?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// 保存配置
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = resolve(path)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(path)
    }

    /// 加载运动参数（未配置时使用默认值）
    pub fn load_profile(&self) -> Result<MotionProfile> {
        match &self.profile {
            Some(path) => MotionProfile::load_from_file(path)
                .with_context(|| format!("Failed to load motion profile {}", path.display())),
            None => Ok(MotionProfile::default()),
        }
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 设置配置项（使用全局参数 `--port` / `--profile`）
    Set,

    /// 获取配置项
    Get {
        /// 配置项名称（port, profile, all）
        #[arg(default_value = "all")]
        key: String,
    },

    /// 检查配置
    Check,
}

impl ConfigCommand {
    /// `port` / `profile` 来自全局参数，仅 `set` 使用
    pub fn execute(
        self,
        path: Option<&Path>,
        port: Option<String>,
        profile: Option<PathBuf>,
    ) -> Result<()> {
        match self {
            ConfigCommand::Set => Self::set_(path, port, profile),

            ConfigCommand::Get { key } => Self::get_(path, &key),

            ConfigCommand::Check => Self::check_(path),
        }
    }

    fn set_(path: Option<&Path>, port: Option<String>, profile: Option<PathBuf>) -> Result<()> {
        if port.is_none() && profile.is_none() {
            anyhow::bail!("Nothing to set, use --port and/or --profile");
        }

        let mut config = CliConfig::load(path)?;

        if let Some(port) = port {
            println!("✅ Default port: {}", port);
            config.port = Some(port);
        }

        if let Some(profile) = profile {
            println!("✅ Motion profile: {}", profile.display());
            config.profile = Some(profile);
        }

        config.save(path)?;
        Ok(())
    }

    fn get_(path: Option<&Path>, key: &str) -> Result<()> {
        let config = CliConfig::load(path)?;

        match key {
            "port" => println!("{}", config.port.as_deref().unwrap_or("(not set)")),

            "profile" => match &config.profile {
                Some(profile) => println!("{}", profile.display()),
                None => println!("(not set)"),
            },

            "all" => print_config(&config),

            other => anyhow::bail!("Unknown config key '{}' (expected port, profile or all)", other),
        }

        Ok(())
    }

    fn check_(path: Option<&Path>) -> Result<()> {
        let file = resolve(path)?;
        let config = CliConfig::load(path)?;

        println!("Config file: {}", file.display());
        print_config(&config);

        // 运动参数文件必须能被解析且通过校验
        config.load_profile()?;
        println!("✅ Configuration OK");

        Ok(())
    }
}

fn print_config(config: &CliConfig) {
    println!("Dobot CLI config:");
    println!("  port:    {}", config.port.as_deref().unwrap_or("(auto)"));
    match &config.profile {
        Some(profile) => println!("  profile: {}", profile.display()),
        None => println!("  profile: (default)"),
    }
}
