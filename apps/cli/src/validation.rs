//! 输入验证模块
//!
//! 机械臂不检查 NaN/无穷大，下发前在这里拦截。可达性由固件判断。

use anyhow::Result;

/// 验证单个坐标值
pub fn validate_coordinate(name: &str, value: f32) -> Result<()> {
    if !value.is_finite() {
        anyhow::bail!(
            "Coordinate {} is invalid: {}",
            name,
            if value.is_nan() { "NaN" } else { "infinite" }
        );
    }
    Ok(())
}

/// 验证笛卡尔目标 (x, y, z, r)
pub fn validate_target(x: f32, y: f32, z: f32, r: f32) -> Result<()> {
    for (name, value) in [("x", x), ("y", y), ("z", z), ("r", r)] {
        validate_coordinate(name, value)?;
    }
    Ok(())
}
