//! Relay bank and heartbeat tests.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --test relay_tests

mod common;

use common::{pin_log, relay_pins, FakePin};
use thermo_rig::indicator::Heartbeat;
use thermo_rig::relay::Relays;
use thermo_rig::{BusFault, Error};

// ============================================================================
// Relay Tests
// ============================================================================

#[test]
fn relays_start_off() {
    let log = pin_log();
    let relays = Relays::new(relay_pins(&log));
    assert_eq!(relays.states(), [false; 3]);
    assert_eq!(relays.len(), 3);
    assert!(log.borrow().is_empty());
}

#[test]
fn relays_apply_positionally() {
    let log = pin_log();
    let mut relays = Relays::new(relay_pins(&log));
    relays.apply(&[true, false, true]).unwrap();
    assert_eq!(*log.borrow(), vec![(7, true), (8, false), (9, true)]);
    assert_eq!(relays.states(), [true, false, true]);
}

#[test]
fn relays_reject_too_few_states() {
    let log = pin_log();
    let mut relays = Relays::new(relay_pins(&log));
    assert_eq!(
        relays.apply(&[true, false]),
        Err(Error::ArityMismatch {
            expected: 3,
            actual: 2
        })
    );
    assert!(log.borrow().is_empty(), "no line may be driven on arity mismatch");
    assert_eq!(relays.states(), [false; 3]);
}

#[test]
fn relays_reject_too_many_states() {
    let log = pin_log();
    let mut relays = Relays::new(relay_pins(&log));
    assert_eq!(
        relays.apply(&[true, true, true, true]),
        Err(Error::ArityMismatch {
            expected: 3,
            actual: 4
        })
    );
    assert!(log.borrow().is_empty());
}

#[test]
fn relays_all_off() {
    let log = pin_log();
    let mut relays = Relays::new(relay_pins(&log));
    relays.apply(&[true, true, true]).unwrap();
    relays.all_off().unwrap();
    assert_eq!(relays.states(), [false; 3]);
    assert_eq!(log.borrow().len(), 6);
}

#[test]
fn relay_pin_failure_is_a_bus_fault() {
    let log = pin_log();
    let mut relays = Relays::new([FakePin::new(7, &log), FakePin::failing(8, &log)]);
    assert_eq!(
        relays.apply(&[true, true]),
        Err(Error::BusTransaction(BusFault::Pin(embedded_hal::digital::ErrorKind::Other)))
    );
    // first line went through, second did not
    assert_eq!(relays.states(), [true, false]);
}

// ============================================================================
// Heartbeat Tests
// ============================================================================

#[test]
fn heartbeat_toggles() {
    let log = pin_log();
    let mut led = Heartbeat::new(FakePin::new(0, &log));
    assert!(!led.is_on().unwrap());
    led.toggle().unwrap();
    assert!(led.is_on().unwrap());
    led.toggle().unwrap();
    assert!(!led.is_on().unwrap());
    assert_eq!(led.beats(), 2);
    assert_eq!(*log.borrow(), vec![(0, true), (0, false)]);
}
