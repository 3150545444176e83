//! 末端执行器命令（吸盘、夹爪）

use clap::{Args, ValueEnum};
use dobot_sdk::prelude::GripperAction;

/// 吸盘状态
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Switch {
    On,
    Off,
}

/// 吸盘命令参数
#[derive(Args, Debug)]
pub struct SuctionCommand {
    /// on / off
    #[arg(value_enum)]
    pub state: Switch,
}

impl SuctionCommand {
    pub fn is_on(&self) -> bool {
        self.state == Switch::On
    }
}

/// 夹爪动作
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GripperArg {
    Open,
    Close,
}

/// 夹爪命令参数
#[derive(Args, Debug)]
pub struct GripperCommand {
    /// open / close
    #[arg(value_enum)]
    pub action: GripperArg,
}

impl GripperCommand {
    pub fn action(&self) -> GripperAction {
        match self.action {
            GripperArg::Open => GripperAction::Open,
            GripperArg::Close => GripperAction::Close,
        }
    }
}
