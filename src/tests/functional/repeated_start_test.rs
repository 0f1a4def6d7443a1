// Licensed under the Apache-2.0 license

use crate::i2c::{ControllerState, Timeout};
use crate::tests::mock::{controller, BusOp, InterruptPump, SimTarget, TARGET_ADDRESS};

const WRITE_ADDRESS: u8 = TARGET_ADDRESS << 1;
const READ_ADDRESS: u8 = TARGET_ADDRESS << 1 | 1;

#[test]
fn write_without_stop_chains_into_read() {
    let i2c = controller(SimTarget::responding(TARGET_ADDRESS, &[&[0xDE, 0xAD]]));
    let mut delay = InterruptPump::new(&i2c);

    i2c.write(TARGET_ADDRESS, &[0x10], true, false, &mut delay)
        .unwrap();
    assert_eq!(i2c.state(), ControllerState::Ready);
    assert!(i2c.in_repeated_start());
    // Handler masked interrupts after issuing the restart.
    assert!(!i2c.with_hardware(|hw| hw.interrupts));

    let mut buffer = [0u8; 2];
    let count = i2c
        .read(TARGET_ADDRESS, &mut buffer, true, Timeout::Forever, &mut delay)
        .unwrap();
    assert_eq!(count, 2);
    assert_eq!(buffer, [0xDE, 0xAD]);
    assert!(!i2c.in_repeated_start());
    assert!(i2c.with_hardware(|hw| hw.interrupts));

    let log = i2c.with_hardware(|hw| hw.log.clone());
    assert_eq!(
        log,
        [
            BusOp::Start,
            BusOp::Address(WRITE_ADDRESS),
            BusOp::Sent(0x10),
            BusOp::Start,
            BusOp::Address(READ_ADDRESS),
            BusOp::Received {
                byte: 0xDE,
                acked: true
            },
            BusOp::Received {
                byte: 0xAD,
                acked: false
            },
            BusOp::Stop,
        ]
    );
}

#[test]
fn read_without_stop_chains_into_write() {
    let i2c = controller(SimTarget::responding(TARGET_ADDRESS, &[&[0x01]]));
    let mut delay = InterruptPump::new(&i2c);

    let mut buffer = [0u8; 1];
    i2c.read(TARGET_ADDRESS, &mut buffer, false, Timeout::Forever, &mut delay)
        .unwrap();
    assert!(i2c.in_repeated_start());

    i2c.write(TARGET_ADDRESS, &[0x77], true, true, &mut delay)
        .unwrap();

    let log = i2c.with_hardware(|hw| hw.log.clone());
    let stops = log.iter().filter(|op| **op == BusOp::Stop).count();
    assert_eq!(stops, 1);
    assert_eq!(log.last(), Some(&BusOp::Stop));
    assert_eq!(
        log[3..],
        [
            BusOp::Start,
            BusOp::Address(WRITE_ADDRESS),
            BusOp::Sent(0x77),
            BusOp::Stop
        ]
    );
}

#[test]
fn chain_of_three_transfers_holds_the_bus() {
    let i2c = controller(SimTarget::new(TARGET_ADDRESS));
    let mut delay = InterruptPump::new(&i2c);

    i2c.write(TARGET_ADDRESS, &[1], true, false, &mut delay)
        .unwrap();
    i2c.write(TARGET_ADDRESS, &[2], true, false, &mut delay)
        .unwrap();
    let mut buffer = [0u8; 2];
    i2c.read(TARGET_ADDRESS, &mut buffer, true, Timeout::Forever, &mut delay)
        .unwrap();
    assert_eq!(buffer, [1, 2]);

    let log = i2c.with_hardware(|hw| hw.log.clone());
    let starts = log.iter().filter(|op| **op == BusOp::Start).count();
    let stops = log.iter().filter(|op| **op == BusOp::Stop).count();
    assert_eq!((starts, stops), (3, 1));
}

#[test]
fn write_without_wait_and_stop_can_be_polled() {
    let i2c = controller(SimTarget::new(TARGET_ADDRESS));
    let mut delay = InterruptPump::new(&i2c);

    i2c.write(TARGET_ADDRESS, &[5, 6], false, false, &mut delay)
        .unwrap();
    assert_eq!(i2c.poll_complete(), Err(nb::Error::WouldBlock));
    crate::tests::mock::service(&i2c);
    assert_eq!(i2c.poll_complete(), Ok(()));
    assert!(i2c.in_repeated_start());
    assert_eq!(i2c.with_hardware(|hw| hw.sent_bytes()), [5, 6]);
}
