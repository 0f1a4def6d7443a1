// Licensed under the Apache-2.0 license

use embedded_hal::i2c::{Error as _, ErrorKind, NoAcknowledgeSource};

use fugit::ExtU32;

use crate::i2c::context::TransactionContext;
use crate::i2c::{ControllerState, Event, I2cConfig, I2cError, I2cHardware, Timeout};
use crate::tests::mock::{
    controller, service, BusOp, InterruptPump, MockHardware, RecordingLogger, RecordingSlave,
    SimTarget, OWN_ADDRESS, TARGET_ADDRESS,
};

const MASTER_BUSY: Event = Event::MASTER.union(Event::BUSY);

#[test]
fn address_nack_on_write_sends_no_data() {
    let mut target = SimTarget::new(TARGET_ADDRESS);
    target.nack_address = true;
    let i2c = controller(target);
    let mut delay = InterruptPump::new(&i2c);

    let result = i2c.write(TARGET_ADDRESS, &[1, 2, 3], true, true, &mut delay);
    assert_eq!(result, Err(I2cError::AddressNacked));
    assert_eq!(
        result.unwrap_err().kind(),
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown)
    );

    let log = i2c.with_hardware(|hw| hw.log.clone());
    assert_eq!(
        log,
        [BusOp::Start, BusOp::Address(TARGET_ADDRESS << 1), BusOp::Stop]
    );
    assert_eq!(i2c.state(), ControllerState::Ready);
    assert_eq!(i2c.last_error(), Some(I2cError::AddressNacked));
    assert!(i2c.with_hardware(|hw| hw.cleared.contains(&Event::ACK_FAILURE)));
}

#[test]
fn absent_device_reports_nack_on_read() {
    let i2c = controller(SimTarget::new(TARGET_ADDRESS));
    let mut delay = InterruptPump::new(&i2c);

    let mut buffer = [0u8; 4];
    let result = i2c.read(0x33, &mut buffer, true, Timeout::Forever, &mut delay);
    assert_eq!(result, Err(I2cError::AddressNacked));

    let log = i2c.with_hardware(|hw| hw.log.clone());
    assert_eq!(log, [BusOp::Start, BusOp::Address(0x33 << 1 | 1), BusOp::Stop]);
    assert_eq!(i2c.state(), ControllerState::Ready);
}

#[test]
fn data_nack_stops_the_write() {
    let mut target = SimTarget::new(TARGET_ADDRESS);
    target.nack_data_after = Some(2);
    let i2c = controller(target);
    let mut delay = InterruptPump::new(&i2c);

    let result = i2c.write(TARGET_ADDRESS, &[1, 2, 3, 4], true, true, &mut delay);
    assert_eq!(result, Err(I2cError::AddressNacked));
    assert_eq!(i2c.with_hardware(|hw| hw.sent_bytes()), [1, 2]);
    assert_eq!(
        i2c.with_hardware(|hw| hw.log.last().copied()),
        Some(BusOp::Stop)
    );
}

#[test]
fn next_transfer_clears_a_latched_error() {
    let mut target = SimTarget::new(TARGET_ADDRESS);
    target.nack_address = true;
    let i2c = controller(target);
    let mut delay = InterruptPump::new(&i2c);

    assert!(i2c.write(TARGET_ADDRESS, &[1], true, true, &mut delay).is_err());
    i2c.with_hardware(|hw| hw.target.nack_address = false);

    i2c.write(TARGET_ADDRESS, &[1], true, true, &mut delay)
        .unwrap();
    assert_eq!(i2c.last_error(), None);
}

#[test]
fn bus_error_forces_stop_and_ready() {
    let i2c = controller(SimTarget::new(TARGET_ADDRESS));
    let mut delay = InterruptPump::new(&i2c);

    i2c.write(TARGET_ADDRESS, &[1, 2], false, true, &mut delay)
        .unwrap();
    i2c.with_hardware(|hw| hw.inject_front(MASTER_BUSY | Event::BUS_ERROR));
    service(&i2c);

    assert_eq!(i2c.state(), ControllerState::Ready);
    assert_eq!(i2c.poll_complete(), Err(nb::Error::Other(I2cError::BusError)));
    assert_eq!(
        i2c.with_hardware(|hw| hw.log.clone()),
        [BusOp::Start, BusOp::Stop]
    );
    assert!(i2c.with_hardware(|hw| hw.cleared.contains(&Event::BUS_ERROR)));
}

#[test]
fn bus_error_also_ends_a_slave_session() {
    let i2c = controller(SimTarget::new(TARGET_ADDRESS));
    i2c.with_hardware(|hw| {
        hw.inject(Event::BUSY | Event::ADDRESS_MATCHED);
        hw.inject(Event::BUSY | Event::BUS_ERROR);
    });
    service(&i2c);

    assert_eq!(i2c.state(), ControllerState::Ready);
    assert_eq!(i2c.last_error(), Some(I2cError::BusError));
}

#[test]
fn arbitration_loss_releases_without_stop() {
    let i2c = controller(SimTarget::new(TARGET_ADDRESS));
    let mut delay = InterruptPump::new(&i2c);

    i2c.write(TARGET_ADDRESS, &[1], false, true, &mut delay)
        .unwrap();
    // Losing arbitration drops the master bit.
    i2c.with_hardware(|hw| hw.inject_front(Event::BUSY | Event::ARBITRATION_LOST));
    i2c.on_interrupt();

    assert_eq!(i2c.state(), ControllerState::Ready);
    assert_eq!(i2c.last_error(), Some(I2cError::ArbitrationLost));
    assert!(!i2c.with_hardware(|hw| hw.log.contains(&BusOp::Stop)));
    assert_eq!(
        I2cError::ArbitrationLost.kind(),
        ErrorKind::ArbitrationLoss
    );
}

#[test]
fn arbitration_loss_leaves_slave_session_running() {
    let i2c = controller(SimTarget::new(TARGET_ADDRESS));
    i2c.with_hardware(|hw| hw.inject(Event::BUSY | Event::ADDRESS_MATCHED));
    i2c.on_interrupt();
    assert_eq!(i2c.state(), ControllerState::SlaveReceiving);

    i2c.with_hardware(|hw| hw.inject(Event::BUSY | Event::ARBITRATION_LOST));
    i2c.on_interrupt();
    assert_eq!(i2c.state(), ControllerState::SlaveReceiving);
    assert_eq!(i2c.last_error(), Some(I2cError::ArbitrationLost));
}

#[test]
fn status_flags_are_cleared_and_latched() {
    let cases = [
        (Event::OVERRUN, I2cError::Overrun),
        (Event::PEC_ERROR, I2cError::ProtocolCheckFailed),
        (Event::TIMEOUT, I2cError::Timeout),
        (Event::SMBUS_ALERT, I2cError::AlertAsserted),
    ];
    for (flag, error) in cases {
        let i2c = controller(SimTarget::new(TARGET_ADDRESS));
        i2c.with_hardware(|hw| hw.inject(flag));
        i2c.on_interrupt();

        assert_eq!(i2c.last_error(), Some(error), "{flag:?}");
        assert_eq!(i2c.state(), ControllerState::Ready);
        assert_eq!(i2c.with_hardware(|hw| hw.cleared.clone()), [flag]);
    }
}

#[test]
fn later_flag_wins_when_several_are_raised() {
    let i2c = controller(SimTarget::new(TARGET_ADDRESS));
    i2c.with_hardware(|hw| hw.inject(Event::OVERRUN | Event::SMBUS_ALERT));
    i2c.on_interrupt();

    assert_eq!(i2c.last_error(), Some(I2cError::AlertAsserted));
    assert_eq!(
        i2c.with_hardware(|hw| hw.cleared.clone()),
        [Event::OVERRUN, Event::SMBUS_ALERT]
    );
}

#[test]
fn overrun_mid_read_is_reported_on_completion() {
    let mut target = SimTarget::responding(TARGET_ADDRESS, &[&[1, 2]]);
    target.stall_after = Some(0);
    let i2c = controller(target);
    let mut delay = InterruptPump::new(&i2c);

    let mut buffer = [0u8; 2];
    let partial = i2c
        .read(TARGET_ADDRESS, &mut buffer, true, Timeout::After(2.millis()), &mut delay)
        .unwrap();
    assert_eq!(partial, 0);

    i2c.with_hardware(|hw| {
        hw.inject(MASTER_BUSY | Event::OVERRUN);
        hw.target.stall_after = None;
    });
    service(&i2c);

    assert_eq!(i2c.state(), ControllerState::Ready);
    assert_eq!(i2c.poll_complete(), Err(nb::Error::Other(I2cError::Overrun)));
}

#[test]
fn errors_reach_the_logger() {
    let mut target = SimTarget::new(TARGET_ADDRESS);
    target.nack_address = true;
    let mut ctx: TransactionContext<_, RecordingSlave, _> = TransactionContext::new(
        MockHardware::new(target),
        RecordingLogger::default(),
        I2cConfig::default(),
    );
    ctx.init(OWN_ADDRESS);
    ctx.begin_write(TARGET_ADDRESS, &[1], true).unwrap();

    for _ in 0..2 {
        let event = ctx.hardware.last_event();
        ctx.dispatch(event);
    }

    assert_eq!(ctx.error, Some(I2cError::AddressNacked));
    assert_eq!(ctx.logger.errors.len(), 1);
    assert!(ctx.logger.errors[0].contains("AddressNacked"));
    assert!(ctx.logger.debug.iter().any(|line| line.contains("0xa0")));
}
