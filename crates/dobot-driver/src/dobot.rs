//! Dobot 驱动实现
//!
//! 所有操作都是阻塞的：发送请求后读取应答，再发送下一个请求。
//! 队列指令（运动、末端执行器、参数）的执行流程：
//!
//! ```text
//! Clear → 入队（应答 queuedCmdIndex）→ StartExec → 轮询 CurrentIndex ≥ index → StopExec
//! ```

use crate::config::DriverConfig;
use crate::error::DriverError;
use dobot_link::{LinkAdapter, LinkError};
use dobot_protocol::{
    BUFFER_FULL_INDEX, CommandId, DeviceVersion, DobotCommand, DobotPacket, Pose, QueueControl,
    QueuedCmdIndex,
};
use std::time::Instant;
use tracing::{debug, trace, warn};

/// 一次事务中最多丢弃的过期应答数
const MAX_STALE_RESPONSES: usize = 4;

/// Dobot 驱动
///
/// 持有链路适配器，负责请求/应答配对和指令队列管理。
/// 所有方法都需要 `&mut self`，同一时刻只有一个请求在途。
pub struct Dobot {
    link: Box<dyn LinkAdapter + Send>,
    config: DriverConfig,
}

impl Dobot {
    /// 使用任意链路适配器创建驱动
    ///
    /// # Example
    ///
    /// ```
    /// use dobot_driver::{Dobot, DriverConfig};
    /// use dobot_link::mock::MockLinkAdapter;
    ///
    /// let mut dobot = Dobot::new(MockLinkAdapter::new(), DriverConfig::default());
    /// let pose = dobot.get_pose().unwrap();
    /// ```
    pub fn new(link: impl LinkAdapter + Send + 'static, config: DriverConfig) -> Self {
        let mut link: Box<dyn LinkAdapter + Send> = Box::new(link);
        link.set_receive_timeout(config.response_timeout);
        Self { link, config }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// 端口名称
    pub fn port_name(&self) -> &str {
        self.link.port_name()
    }

    /// 发送请求并读取对应的应答
    ///
    /// 应答的指令 ID 必须与请求一致；ID 不符的应答视为上一次事务的残留并丢弃。
    /// 超时后丢弃链路上未读的输入，避免残留的半帧吞掉之后的应答。
    ///
    /// # 错误
    ///
    /// - `DriverError::Link(LinkError::Timeout)`: 设备未应答
    /// - `DriverError::UnexpectedResponse`: 连续收到不匹配的应答
    pub fn transact(&mut self, request: &DobotPacket) -> Result<DobotPacket, DriverError> {
        self.link.send(request)?;

        let mut last_id = request.id;
        for _ in 0..=MAX_STALE_RESPONSES {
            let response = match self.link.receive() {
                Ok(response) => response,
                Err(LinkError::Timeout) => {
                    self.discard_input();
                    return Err(LinkError::Timeout.into());
                },
                Err(e) => return Err(e.into()),
            };
            if response.id == request.id {
                return Ok(response);
            }
            warn!(
                "{}: discarding stale response (id {}, waiting for {})",
                self.link.port_name(),
                response.id,
                request.id
            );
            last_id = response.id;
        }

        Err(DriverError::UnexpectedResponse {
            expected: request.id,
            actual: last_id,
        })
    }

    /// 读取固件版本（用作握手）
    pub fn device_version(&mut self) -> Result<DeviceVersion, DriverError> {
        let response = self.transact(&DobotPacket::read(CommandId::DeviceVersion))?;
        Ok(DeviceVersion::try_from(&response)?)
    }

    /// 读取实时位姿
    pub fn get_pose(&mut self) -> Result<Pose, DriverError> {
        let response = self.transact(&DobotPacket::read(CommandId::GetPose))?;
        Ok(Pose::try_from(&response)?)
    }

    /// 立即执行写指令（不入队）
    pub fn send_immediate(&mut self, command: &dyn DobotCommand) -> Result<(), DriverError> {
        self.transact(&command.to_packet(false))?;
        Ok(())
    }

    /// 将指令加入固件队列，返回其队列索引
    ///
    /// # 错误
    ///
    /// - `DriverError::BufferFull`: 固件拒绝入队（应答 index = 0）
    /// - `DriverError::InvalidInput`: 该指令不支持队列模式
    pub fn queue_command(
        &mut self,
        command: &dyn DobotCommand,
    ) -> Result<QueuedCmdIndex, DriverError> {
        let id = command.id();
        if !id.is_queueable() {
            return Err(DriverError::InvalidInput(format!(
                "{:?} cannot be queued",
                id
            )));
        }

        let response = self.transact(&command.to_packet(true))?;
        let index = QueuedCmdIndex::parse(&response)?;
        if index.0 == BUFFER_FULL_INDEX {
            warn!("{}: queue rejected {:?} (buffer full)", self.link.port_name(), id);
            return Err(DriverError::BufferFull);
        }

        trace!("Queued {:?} as index {}", id, index.0);
        Ok(index)
    }

    fn queue_control(&mut self, control: QueueControl) -> Result<(), DriverError> {
        self.transact(&control.to_packet())?;
        Ok(())
    }

    /// 启动队列执行
    pub fn start_queue(&mut self) -> Result<(), DriverError> {
        self.queue_control(QueueControl::StartExec)
    }

    /// 停止队列执行（当前指令执行完后停止）
    pub fn stop_queue(&mut self) -> Result<(), DriverError> {
        self.queue_control(QueueControl::StopExec)
    }

    /// 清空队列中尚未执行的指令
    pub fn clear_queue(&mut self) -> Result<(), DriverError> {
        self.queue_control(QueueControl::Clear)
    }

    /// 当前已执行完成的队列索引
    pub fn current_index(&mut self) -> Result<QueuedCmdIndex, DriverError> {
        let response = self.transact(&DobotPacket::read(CommandId::QueuedCmdCurrentIndex))?;
        Ok(QueuedCmdIndex::parse_current(&response)?)
    }

    /// 阻塞直到队列执行到 `target`
    ///
    /// 每隔 `poll_interval` 查询一次；设置了 `motion_timeout` 时超时返回
    /// `DriverError::Timeout`。
    pub fn wait_for_index(&mut self, target: QueuedCmdIndex) -> Result<(), DriverError> {
        let deadline = self.config.motion_timeout.map(|t| Instant::now() + t);

        loop {
            let current = self.current_index()?;
            if current >= target {
                trace!("Queue reached index {} (target {})", current.0, target.0);
                return Ok(());
            }

            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!(
                    "{}: timed out waiting for index {} (current {})",
                    self.link.port_name(),
                    target.0,
                    current.0
                );
                return Err(DriverError::Timeout);
            }

            spin_sleep::sleep(self.config.poll_interval);
        }
    }

    /// 阻塞执行一条队列指令
    pub fn execute_queued(
        &mut self,
        command: &dyn DobotCommand,
    ) -> Result<QueuedCmdIndex, DriverError> {
        self.execute_queued_batch(&[command])
    }

    /// 阻塞执行一组队列指令，返回最后一条的索引
    ///
    /// 先清空队列，依次入队，启动执行并等待最后一条完成，最后停止队列。
    /// 中途出错时不会自动停止队列。
    pub fn execute_queued_batch(
        &mut self,
        commands: &[&dyn DobotCommand],
    ) -> Result<QueuedCmdIndex, DriverError> {
        if commands.is_empty() {
            return Err(DriverError::InvalidInput(
                "empty command batch".to_string(),
            ));
        }

        self.clear_queue()?;

        let mut last = QueuedCmdIndex::default();
        for command in commands {
            last = self.queue_command(*command)?;
        }

        self.start_queue()?;
        self.wait_for_index(last)?;
        self.stop_queue()?;

        debug!("Executed {} queued command(s), last index {}", commands.len(), last.0);
        Ok(last)
    }

    /// 关闭链路
    pub fn close(self) {
        debug!("Closing link {}", self.link.port_name());
        drop(self.link);
    }

    fn discard_input(&mut self) {
        if let Err(e) = self.link.clear_input() {
            warn!("{}: failed to discard input: {}", self.link.port_name(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dobot_link::mock::MockLinkAdapter;
    use dobot_protocol::{
        EndEffectorCommand, HomeCommand, HomeParams, PtpCommand, PtpCommonParams,
    };
    use std::time::Duration;

    fn fast_config() -> DriverConfig {
        DriverConfig {
            response_timeout: Duration::from_millis(10),
            poll_interval: Duration::from_millis(1),
            motion_timeout: Some(Duration::from_secs(2)),
        }
    }

    fn mock_dobot() -> (Dobot, dobot_link::mock::MockDevice) {
        let link = MockLinkAdapter::new();
        let device = link.device();
        (Dobot::new(link, fast_config()), device)
    }

    #[test]
    fn test_device_version_handshake() {
        let (mut dobot, _) = mock_dobot();
        let version = dobot.device_version().unwrap();
        assert_eq!(version.major, 3);
    }

    #[test]
    fn test_get_pose() {
        let (mut dobot, _) = mock_dobot();
        let pose = dobot.get_pose().unwrap();
        assert!(pose.approx_eq(200.0, 0.0, 50.0, 0.0, 1e-3));
    }

    #[test]
    fn test_execute_queued_move() {
        let (mut dobot, device) = mock_dobot();
        device.set_motion_polls(3);

        let index = dobot
            .execute_queued(&PtpCommand::movl_xyz(230.0, 0.0, 20.0, 0.0))
            .unwrap();
        assert_eq!(index.0, 1);
        assert!(device.pose().approx_eq(230.0, 0.0, 20.0, 0.0, 1e-3));
        assert!(!device.is_executing());

        // Clear → PtpCmd → Start → CurrentIndex... → Stop
        let ids = device.sent_ids();
        assert_eq!(ids[0], CommandId::QueuedCmdClear);
        assert_eq!(ids[1], CommandId::PtpCmd);
        assert_eq!(ids[2], CommandId::QueuedCmdStartExec);
        assert_eq!(*ids.last().unwrap(), CommandId::QueuedCmdStopExec);
        let polls = ids
            .iter()
            .filter(|id| **id == CommandId::QueuedCmdCurrentIndex)
            .count();
        assert_eq!(polls, 4);
    }

    #[test]
    fn test_execute_queued_buffer_full() {
        let (mut dobot, device) = mock_dobot();
        device.set_buffer_full(true);

        let err = dobot.execute_queued(&HomeCommand::default()).unwrap_err();
        assert!(matches!(err, DriverError::BufferFull));
        // 入队失败时不会启动队列
        assert!(!device.sent_ids().contains(&CommandId::QueuedCmdStartExec));
    }

    #[test]
    fn test_execute_batch_waits_for_last() {
        let (mut dobot, device) = mock_dobot();
        let home = HomeParams {
            x: 190.0,
            y: 0.0,
            z: 40.0,
            r: 0.0,
        };
        let last = dobot
            .execute_queued_batch(&[&home, &PtpCommonParams::default()])
            .unwrap();
        assert_eq!(last.0, 2);
        assert_eq!(device.home_params(), home);
        assert_eq!(device.queue_len(), 0);
    }

    #[test]
    fn test_execute_batch_empty() {
        let (mut dobot, _) = mock_dobot();
        assert!(matches!(
            dobot.execute_queued_batch(&[]),
            Err(DriverError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_queue_command_rejects_non_queueable() {
        let (mut dobot, device) = mock_dobot();
        let err = dobot.queue_command(&QueueControlCommand).unwrap_err();
        assert!(matches!(err, DriverError::InvalidInput(_)));
        assert!(device.sent_packets().is_empty());
    }

    #[test]
    fn test_wait_for_index_timeout() {
        let (mut dobot, device) = mock_dobot();
        device.set_stalled(true);
        dobot.config.motion_timeout = Some(Duration::from_millis(20));

        let err = dobot
            .execute_queued(&EndEffectorCommand::suction_cup(true))
            .unwrap_err();
        assert!(matches!(err, DriverError::Timeout));
    }

    #[test]
    fn test_no_response() {
        let (mut dobot, device) = mock_dobot();
        device.set_responsive(false);
        let err = dobot.get_pose().unwrap_err();
        assert!(err.is_no_response());
    }

    #[test]
    fn test_stale_response_discarded() {
        let mut link = MockLinkAdapter::new();
        link.inject_response(DobotPacket::read(CommandId::DeviceVersion));
        let mut dobot = Dobot::new(link, fast_config());
        assert!(dobot.get_pose().is_ok());
    }

    #[test]
    fn test_timeout_discards_partial_frame() {
        let mut link = MockLinkAdapter::new();
        // 残留的帧头声明了 240 字节载荷
        link.inject_bytes(&[0xAA, 0xAA, 0xF0]);
        let mut dobot = Dobot::new(link, fast_config());

        assert!(dobot.get_pose().unwrap_err().is_no_response());
        for _ in 0..10 {
            let pose = dobot.get_pose().unwrap();
            assert!(pose.approx_eq(200.0, 0.0, 50.0, 0.0, 1e-3));
        }
    }

    #[test]
    fn test_send_immediate_applies_effector() {
        let (mut dobot, device) = mock_dobot();
        dobot
            .send_immediate(&EndEffectorCommand::gripper_close())
            .unwrap();
        assert!(device.gripper_closed());
        assert_eq!(device.queue_len(), 0);
    }

    /// 不支持入队的指令（用于校验 queue_command 的前置检查）
    struct QueueControlCommand;

    impl DobotCommand for QueueControlCommand {
        fn id(&self) -> CommandId {
            CommandId::GetPose
        }

        fn encode_params(&self, _buf: &mut Vec<u8>) {}
    }
}
