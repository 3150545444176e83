//! run 命令
//!
//! 执行 JSON 脚本文件，Ctrl+C 在当前命令完成后停止

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::interrupt;
use crate::modes::oneshot::OneShotMode;
use crate::script::{ScriptConfig, ScriptExecutor};

/// 脚本执行命令参数
#[derive(Args, Debug)]
pub struct RunCommand {
    /// 脚本文件路径
    pub script: PathBuf,

    /// 失败时继续执行
    #[arg(long)]
    pub continue_on_error: bool,

    /// 命令之间的延迟（毫秒）
    #[arg(long, default_value_t = 100)]
    pub delay_ms: u64,
}

impl RunCommand {
    /// 执行脚本
    pub fn execute(&self, mode: &OneShotMode) -> Result<()> {
        println!("📜 Loading script: {}", self.script.display());

        // 先解析脚本，出错时不连接机械臂
        let script = ScriptExecutor::load_script(&self.script)?;

        println!("📋 Script: {}", script.name);
        if !script.description.is_empty() {
            println!("    {}", script.description);
        }
        println!("    {} commands", script.commands.len());
        println!();

        let running = interrupt::install()?;

        let executor = ScriptExecutor::new().with_config(ScriptConfig {
            continue_on_error: self.continue_on_error,
            execution_delay_ms: self.delay_ms,
        });

        let mut arm = mode.connect()?;
        let result = executor.execute(&mut arm, &script, &running);
        arm.disconnect();

        println!();
        println!("📊 Result:");
        println!("  Total:     {}", result.total_commands);
        println!("  Succeeded: {}", result.succeeded.len());
        println!("  Failed:    {}", result.failed.len());
        println!("  Duration:  {:.2} s", result.duration_secs);

        if !result.failed.is_empty() {
            println!();
            println!("❌ Failed commands:");
            for (idx, err) in &result.failed {
                println!("  {}: {}", idx + 1, err);
            }
        }

        if result.is_complete() {
            println!("✅ Script completed");
            return Ok(());
        }
        if result.interrupted {
            anyhow::bail!("Script interrupted");
        }
        anyhow::bail!("{} command(s) failed", result.failed.len())
    }
}
