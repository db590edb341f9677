//! Integration tests for the `knxnet` library.
//!
//! The `#[ignore]`d tests exercise the tunnelling client against a live
//! KNXnet/IP gateway (or simulator) and are skipped in CI.
//!
//! ## Running
//!
//! ```bash
//! # Terminal 1: start a simulator listening on 127.0.0.1:3671
//! python3 knx_simulator.py --verbose
//!
//! # Terminal 2
//! cargo test --test integration_test -- --ignored
//! ```

use std::net::{SocketAddr, SocketAddrV4};
use std::time::Duration;

use knxnet::addressing::{GroupAddress, IndividualAddress};
use knxnet::config::Configuration;
use knxnet::dpt::DptValue;
use knxnet::tunnel;

const SIMULATOR_IP: [u8; 4] = [127, 0, 0, 1];
const SIMULATOR_PORT: u16 = 3671;
const TEST_TIMEOUT: Duration = Duration::from_secs(3);

fn simulator_addr() -> SocketAddr {
    SocketAddr::V4(SocketAddrV4::new(SIMULATOR_IP.into(), SIMULATOR_PORT))
}

fn test_source() -> IndividualAddress {
    IndividualAddress::new(1, 1, 250).unwrap()
}

fn test_ga() -> GroupAddress {
    GroupAddress::new(1, 2, 3).unwrap()
}

#[test]
#[ignore]
fn tunnel_connects_and_writes() {
    let config = Configuration::new(test_source()).group_address(test_ga(), "1.001");
    let handle = tunnel::start(config, simulator_addr()).expect("failed to start tunnel client");

    // Give the connect handshake a moment to complete against the gateway.
    std::thread::sleep(Duration::from_millis(500));

    handle
        .write_group_address(test_ga(), DptValue::Bool(true))
        .expect("write failed");

    handle.shutdown();
}

#[test]
#[ignore]
fn tunnel_read_round_trip() {
    let config = Configuration::new(test_source()).group_address(test_ga(), "1.001");
    let handle = tunnel::start(config, simulator_addr()).expect("failed to start tunnel client");

    std::thread::sleep(Duration::from_millis(500));

    let telegram = handle
        .read_group_address(test_ga(), TEST_TIMEOUT)
        .expect("no group_response arrived in time");
    assert_eq!(telegram.destination, test_ga());

    handle.shutdown();
}

#[test]
fn group_address_creation() {
    let addr = GroupAddress::new(1, 2, 3).expect("failed to create group address");
    assert_eq!(addr.raw(), 0x0A03);

    let addr = GroupAddress::from(0x0A03);
    assert_eq!(addr.raw(), 0x0A03);
}

#[test]
fn individual_address_creation() {
    let addr = IndividualAddress::new(1, 1, 250).expect("failed to create individual address");
    assert_eq!(addr.raw(), 0x11FA);

    let addr = IndividualAddress::from(0x11FA);
    assert_eq!(addr.raw(), 0x11FA);
}
