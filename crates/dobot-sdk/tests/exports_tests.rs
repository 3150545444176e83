//! 顶层导出测试

use dobot_sdk::protocol::{CommandId, DobotPacket, PacketDecoder};

#[test]
fn layers_are_reachable() {
    let config = dobot_sdk::driver::DriverConfig::default();
    assert_eq!(config.poll_interval.as_millis(), 100);

    let profile = dobot_sdk::MotionProfile::default();
    assert_eq!(profile.effector.gripper_settle_ms, 700);

    assert_eq!(
        dobot_sdk::ConnectionState::default(),
        dobot_sdk::ConnectionState::Disconnected
    );
}

#[test]
fn packet_round_trip_through_facade() {
    let bytes = DobotPacket::read(CommandId::GetPose).encode().unwrap();
    let mut decoder = PacketDecoder::new();
    decoder.extend(&bytes);
    let packet = decoder.decode_next().unwrap().unwrap();
    assert_eq!(packet.command_id().unwrap(), CommandId::GetPose);
}

#[test]
fn connect_error_is_std_error() {
    fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
    assert_error::<dobot_sdk::ConnectError>();
    assert_error::<dobot_sdk::SessionError>();
    assert_error::<dobot_sdk::DriverError>();
}
