//! 模拟机械臂固件
//!
//! 在内存中模拟 Magician 的指令队列与末端状态，用于无硬件测试：
//!
//! - 队列指令返回自增的 queuedCmdIndex（从 1 开始）
//! - 启动执行后，每次查询 `CurrentIndex` 推进队列
//! - 应答回显请求的 ID 与 Ctrl
//!
//! `MockDevice` 是共享状态的句柄，测试可通过它注入故障（缓冲区满、
//! 无应答、断线）并检查设备收到的指令。

use crate::{DobotPacket, LinkAdapter, LinkError};
use dobot_protocol::{
    CommandId, DeviceVersion, EndEffector, EndEffectorCommand, HomeParams, PacketDecoder, Pose,
    PtpCommand, QueuedCmdIndex,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// 队列中的一条指令
#[derive(Debug, Clone, Copy, PartialEq)]
enum QueuedAction {
    Home,
    Move(PtpCommand),
    Effector(EndEffectorCommand),
    SetHomeParams(HomeParams),
    /// 运动参数，只记录不建模
    Params,
}

impl QueuedAction {
    fn is_motion(&self) -> bool {
        matches!(self, QueuedAction::Home | QueuedAction::Move(_))
    }
}

#[derive(Debug)]
struct QueuedEntry {
    index: u64,
    action: QueuedAction,
    remaining_polls: u32,
}

/// 模拟设备状态
#[derive(Debug)]
struct MockArmState {
    version: DeviceVersion,
    pose: Pose,
    home: HomeParams,
    suction_on: bool,
    gripper_closed: bool,

    queue: VecDeque<QueuedEntry>,
    next_index: u64,
    current_index: u64,
    executing: bool,

    buffer_full: bool,
    responsive: bool,
    disconnected: bool,
    stalled: bool,
    motion_polls: u32,

    sent: Vec<DobotPacket>,
}

impl Default for MockArmState {
    fn default() -> Self {
        let home = HomeParams::default();
        let mut state = Self {
            version: DeviceVersion {
                major: 3,
                minor: 7,
                revision: 0,
            },
            pose: Pose::default(),
            home,
            suction_on: false,
            gripper_closed: false,
            queue: VecDeque::new(),
            next_index: 1,
            current_index: 0,
            executing: false,
            buffer_full: false,
            responsive: true,
            disconnected: false,
            stalled: false,
            motion_polls: 0,
            sent: Vec::new(),
        };
        state.set_cartesian(home.x, home.y, home.z, home.r);
        state
    }
}

impl MockArmState {
    /// 处理一条请求，返回应答（`None` 表示设备不应答）
    fn handle(&mut self, packet: &DobotPacket) -> Option<DobotPacket> {
        let id = packet.command_id().ok()?;

        if packet.is_queued() {
            if !id.is_queueable() {
                return None;
            }
            let action = self.parse_action(id, packet)?;
            let index = if self.buffer_full {
                0
            } else {
                self.enqueue(action)
            };
            return Some(reply(packet, QueuedCmdIndex(index).to_params()));
        }

        let params = match id {
            CommandId::DeviceVersion => self.version.to_params(),
            CommandId::GetPose => self.pose.to_params(),
            CommandId::QueuedCmdCurrentIndex => {
                self.advance();
                QueuedCmdIndex(self.current_index).to_params()
            },
            CommandId::QueuedCmdStartExec => {
                self.executing = true;
                Vec::new()
            },
            CommandId::QueuedCmdStopExec => {
                self.executing = false;
                Vec::new()
            },
            CommandId::QueuedCmdClear => {
                self.queue.clear();
                Vec::new()
            },
            _ => {
                // 非队列模式下的写指令立即生效
                let action = self.parse_action(id, packet)?;
                self.apply(action);
                Vec::new()
            },
        };
        Some(reply(packet, params))
    }

    fn parse_action(&self, id: CommandId, packet: &DobotPacket) -> Option<QueuedAction> {
        let action = match id {
            CommandId::HomeCmd => QueuedAction::Home,
            CommandId::PtpCmd => QueuedAction::Move(PtpCommand::try_from(packet).ok()?),
            CommandId::EndEffectorSuctionCup | CommandId::EndEffectorGripper => {
                QueuedAction::Effector(EndEffectorCommand::try_from(packet).ok()?)
            },
            CommandId::HomeParams => QueuedAction::SetHomeParams(HomeParams::try_from(packet).ok()?),
            CommandId::PtpJointParams
            | CommandId::PtpCoordinateParams
            | CommandId::PtpCommonParams => QueuedAction::Params,
            _ => return None,
        };
        Some(action)
    }

    fn enqueue(&mut self, action: QueuedAction) -> u64 {
        let index = self.next_index;
        self.next_index += 1;
        let remaining_polls = if action.is_motion() {
            self.motion_polls
        } else {
            0
        };
        self.queue.push_back(QueuedEntry {
            index,
            action,
            remaining_polls,
        });
        index
    }

    /// 推进队列：完成所有已到期的指令，遇到仍在运动的指令则停下
    fn advance(&mut self) {
        if !self.executing || self.stalled {
            return;
        }
        while let Some(entry) = self.queue.front_mut() {
            if entry.remaining_polls > 0 {
                entry.remaining_polls -= 1;
                break;
            }
            let index = entry.index;
            let action = entry.action;
            self.queue.pop_front();
            self.apply(action);
            self.current_index = index;
        }
    }

    fn apply(&mut self, action: QueuedAction) {
        match action {
            QueuedAction::Home => {
                let home = self.home;
                self.set_cartesian(home.x, home.y, home.z, home.r);
            },
            QueuedAction::Move(cmd) => {
                if cmd.mode.is_cartesian() {
                    let (x, y, z, r) = if cmd.mode.is_incremental() {
                        (
                            self.pose.x + cmd.x,
                            self.pose.y + cmd.y,
                            self.pose.z + cmd.z,
                            self.pose.r + cmd.r,
                        )
                    } else {
                        (cmd.x, cmd.y, cmd.z, cmd.r)
                    };
                    self.set_cartesian(x, y, z, r);
                } else {
                    // 关节角模式：不做正运动学，只更新关节角
                    let base = if cmd.mode.is_incremental() {
                        self.pose.joints
                    } else {
                        [0.0; 4]
                    };
                    self.pose.joints = [
                        base[0] + cmd.x,
                        base[1] + cmd.y,
                        base[2] + cmd.z,
                        base[3] + cmd.r,
                    ];
                }
            },
            QueuedAction::Effector(cmd) => match cmd.effector {
                EndEffector::SuctionCup => self.suction_on = cmd.on,
                EndEffector::Gripper => self.gripper_closed = cmd.on,
            },
            QueuedAction::SetHomeParams(home) => self.home = home,
            QueuedAction::Params => {},
        }
    }

    fn set_cartesian(&mut self, x: f32, y: f32, z: f32, r: f32) {
        let j1 = y.atan2(x).to_degrees();
        self.pose = Pose {
            x,
            y,
            z,
            r,
            joints: [j1, 0.0, 0.0, r - j1],
        };
    }
}

/// 构建应答：回显请求的 ID 与 Ctrl
fn reply(request: &DobotPacket, params: Vec<u8>) -> DobotPacket {
    DobotPacket::new(request.id, request.ctrl, params)
}

/// 模拟设备句柄（可克隆，与适配器共享状态）
#[derive(Debug, Clone, Default)]
pub struct MockDevice {
    state: Arc<Mutex<MockArmState>>,
}

impl MockDevice {
    /// 当前位姿
    pub fn pose(&self) -> Pose {
        self.state.lock().pose
    }

    /// 直接设置位姿（模拟手动拖动机械臂）
    pub fn set_pose(&self, pose: Pose) {
        self.state.lock().pose = pose;
    }

    pub fn set_version(&self, version: DeviceVersion) {
        self.state.lock().version = version;
    }

    pub fn home_params(&self) -> HomeParams {
        self.state.lock().home
    }

    pub fn suction_on(&self) -> bool {
        self.state.lock().suction_on
    }

    pub fn gripper_closed(&self) -> bool {
        self.state.lock().gripper_closed
    }

    /// 队列中尚未执行的指令数
    pub fn queue_len(&self) -> usize {
        self.state.lock().queue.len()
    }

    pub fn is_executing(&self) -> bool {
        self.state.lock().executing
    }

    pub fn current_index(&self) -> u64 {
        self.state.lock().current_index
    }

    /// 模拟队列缓冲区满（入队应答 index = 0）
    pub fn set_buffer_full(&self, full: bool) {
        self.state.lock().buffer_full = full;
    }

    /// 关闭后设备不再应答任何请求
    pub fn set_responsive(&self, responsive: bool) {
        self.state.lock().responsive = responsive;
    }

    /// 模拟 USB 拔出：收发均返回 `LinkError::Disconnected`
    pub fn set_disconnected(&self, disconnected: bool) {
        self.state.lock().disconnected = disconnected;
    }

    /// 队列停止推进（模拟机械臂卡住）
    pub fn set_stalled(&self, stalled: bool) {
        self.state.lock().stalled = stalled;
    }

    /// 运动指令完成前需要的 `CurrentIndex` 查询次数
    pub fn set_motion_polls(&self, polls: u32) {
        self.state.lock().motion_polls = polls;
    }

    /// 设备收到的所有数据包（按接收顺序）
    pub fn sent_packets(&self) -> Vec<DobotPacket> {
        self.state.lock().sent.clone()
    }

    /// 设备收到的已知指令 ID（按接收顺序）
    pub fn sent_ids(&self) -> Vec<CommandId> {
        self.state
            .lock()
            .sent
            .iter()
            .filter_map(|p| p.command_id().ok())
            .collect()
    }

    /// 设备收到的指定指令
    pub fn sent_with_id(&self, id: CommandId) -> Vec<DobotPacket> {
        let raw = u8::from(id);
        self.state
            .lock()
            .sent
            .iter()
            .filter(|p| p.id == raw)
            .cloned()
            .collect()
    }

    pub fn clear_sent(&self) {
        self.state.lock().sent.clear();
    }
}

/// 模拟链路适配器
///
/// 应答先编码成字节再经 `PacketDecoder` 解出，与串口后端走同一条接收路径。
/// `receive` 不会真正等待：解不出完整数据包时立即返回 `LinkError::Timeout`。
pub struct MockLinkAdapter {
    device: MockDevice,
    rx: PacketDecoder,
    port_name: String,
    receive_timeout: Duration,
}

impl MockLinkAdapter {
    pub fn new() -> Self {
        Self::with_device(MockDevice::default())
    }

    /// 连接到已有的模拟设备（多个适配器可共享同一设备状态）
    pub fn with_device(device: MockDevice) -> Self {
        Self {
            device,
            rx: PacketDecoder::new(),
            port_name: "mock".to_string(),
            receive_timeout: Duration::from_millis(200),
        }
    }

    pub fn with_port_name(mut self, name: impl Into<String>) -> Self {
        self.port_name = name.into();
        self
    }

    /// 共享状态句柄
    pub fn device(&self) -> MockDevice {
        self.device.clone()
    }

    pub fn configured_timeout(&self) -> Duration {
        self.receive_timeout
    }

    /// 直接注入一个应答（模拟串口上的残留数据）
    ///
    /// 参数超长、无法编码的数据包被忽略。
    pub fn inject_response(&mut self, packet: DobotPacket) {
        if let Ok(bytes) = packet.encode() {
            self.rx.extend(&bytes);
        }
    }

    /// 注入原始字节（噪声、半帧）
    pub fn inject_bytes(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    /// 接收缓冲中尚未解出的字节数
    pub fn buffered(&self) -> usize {
        self.rx.buffered()
    }
}

impl Default for MockLinkAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkAdapter for MockLinkAdapter {
    fn send(&mut self, packet: &DobotPacket) -> Result<(), LinkError> {
        // 与真实串口一致：超长参数在编码阶段即失败
        packet.encode()?;

        let mut state = self.device.state.lock();
        if state.disconnected {
            return Err(LinkError::Disconnected);
        }
        state.sent.push(packet.clone());
        trace!("mock TX id {}", packet.id);

        if !state.responsive {
            return Ok(());
        }
        if let Some(response) = state.handle(packet) {
            self.rx.extend(&response.encode()?);
        }
        Ok(())
    }

    fn receive(&mut self) -> Result<DobotPacket, LinkError> {
        if self.device.state.lock().disconnected {
            return Err(LinkError::Disconnected);
        }
        while let Some(result) = self.rx.decode_next() {
            match result {
                Ok(packet) => return Ok(packet),
                Err(e) => trace!("mock RX dropping corrupted packet: {}", e),
            }
        }
        Err(LinkError::Timeout)
    }

    fn set_receive_timeout(&mut self, timeout: Duration) {
        self.receive_timeout = timeout;
    }

    fn clear_input(&mut self) -> Result<(), LinkError> {
        self.rx.clear();
        Ok(())
    }

    fn port_name(&self) -> &str {
        &self.port_name
    }
}
