//! 移动命令
//!
//! 直线移动到笛卡尔坐标（mm / 度）

use crate::validation;
use anyhow::Result;
use clap::Args;

/// 移动命令参数
#[derive(Args, Debug)]
pub struct MoveCommand {
    /// 目标 X (mm)
    #[arg(long, allow_negative_numbers = true)]
    pub x: f32,

    /// 目标 Y (mm)
    #[arg(long, allow_negative_numbers = true)]
    pub y: f32,

    /// 目标 Z (mm)
    #[arg(long, allow_negative_numbers = true)]
    pub z: f32,

    /// 末端旋转 R（度）
    #[arg(long, allow_negative_numbers = true, default_value_t = 0.0)]
    pub r: f32,
}

impl MoveCommand {
    /// 验证目标坐标
    pub fn target(&self) -> Result<(f32, f32, f32, f32)> {
        validation::validate_target(self.x, self.y, self.z, self.r)?;
        Ok((self.x, self.y, self.z, self.r))
    }
}
