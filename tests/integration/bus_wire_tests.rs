//! Full-stack tests: `NodeService` over a real `TpUartBus`.
//!
//! The transceiver UART is replaced by an in-memory loopback so the
//! assertions run against the actual bytes the node puts on the wire.

use std::collections::VecDeque;

use crate::mock_hw::{MockHardware, RecordingSink, SharedPin};
use multisensor::app::ports::OutputChannel;
use multisensor::app::service::NodeService;
use multisensor::config::NodeConfig;
use multisensor::drivers::button::Debouncer;
use multisensor::knx::address::{GroupAddress, IndividualAddress};
use multisensor::knx::link::ByteLink;
use multisensor::knx::telegram::{Command, MAX_FRAME_LEN, Telegram};
use multisensor::knx::tpuart::{TpUartBus, U_ACK_ADDRESSED};

// ── Loopback UART ─────────────────────────────────────────────

#[derive(Default)]
struct Loopback {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
}

impl ByteLink for Loopback {
    type Error = ();

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
        let mut n = 0;
        while n < buf.len() {
            let Some(b) = self.rx.pop_front() else { break };
            buf[n] = b;
            n += 1;
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        self.tx.extend_from_slice(data);
        Ok(data.len())
    }

    fn available(&self) -> bool {
        !self.rx.is_empty()
    }
}

/// What the node wrote: acknowledgements and complete outbound frames.
#[derive(Debug, Default)]
struct WireLog {
    acks: usize,
    telegrams: Vec<Telegram>,
}

/// Undo the U_L_Data* wrapping the TP-UART expects on transmit.
fn unwrap_wire(tx: &[u8]) -> WireLog {
    let mut log = WireLog::default();
    let mut frame = Vec::new();
    let mut i = 0;
    while i < tx.len() {
        let service = tx[i];
        if service == U_ACK_ADDRESSED {
            log.acks += 1;
            i += 1;
            continue;
        }
        frame.push(tx[i + 1]);
        if service & 0xC0 == 0x40 {
            log.telegrams.push(Telegram::decode(&frame).unwrap());
            frame.clear();
        }
        i += 2;
    }
    assert!(frame.is_empty(), "trailing partial frame on the wire");
    log
}

// ── Rig ───────────────────────────────────────────────────────

struct WireRig {
    node: NodeService,
    hw: MockHardware,
    bus: TpUartBus<Loopback>,
    button: Debouncer<SharedPin>,
    sink: RecordingSink,
}

impl WireRig {
    /// Started node that has already run its first cycle, with the wire
    /// log cleared.
    fn settled() -> Self {
        let config = NodeConfig::default();
        let mut bus = TpUartBus::new(Loopback::default(), config.physical_address);
        for route in NodeService::new(config.clone()).unwrap().dispatcher().routes() {
            bus.listen(route.address).unwrap();
        }
        let mut rig = Self {
            button: Debouncer::new(SharedPin::released(), config.debounce_ms),
            node: NodeService::new(config).unwrap(),
            hw: MockHardware::new(),
            bus,
            sink: RecordingSink::new(),
        };
        rig.node.start(0, &mut rig.hw, &mut rig.sink);
        rig.cycle(0);
        rig.bus.link_mut().tx.clear();
        rig
    }

    fn cycle(&mut self, now_ms: u64) {
        self.node
            .cycle(now_ms, &mut self.hw, &mut self.bus, &mut self.button, &mut self.sink);
    }

    fn inject(&mut self, t: &Telegram) {
        let mut buf = [0u8; MAX_FRAME_LEN];
        let n = t.encode(&mut buf).unwrap();
        self.bus.link_mut().rx.extend(buf[..n].iter().copied());
    }

    fn wire(&self) -> WireLog {
        unwrap_wire(&self.bus.link().tx)
    }
}

fn ga(s: &str) -> GroupAddress {
    s.parse().unwrap()
}

fn own() -> IndividualAddress {
    NodeConfig::default().physical_address
}

fn peer() -> IndividualAddress {
    IndividualAddress::new(1, 1, 7).unwrap()
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() <= b.abs() / 1_000.0 + 0.01
}

// ── Tests ─────────────────────────────────────────────────────

#[test]
fn telemetry_frames_on_the_wire() {
    let mut rig = WireRig::settled();
    rig.cycle(10_000);

    let wire = rig.wire();
    assert_eq!(wire.acks, 0);
    assert_eq!(wire.telegrams.len(), 4);

    let expected = [
        ("10/1/1", 612.0),
        ("10/1/2", 22.25),
        ("10/1/3", 41.5),
        ("10/1/4", 180.0),
    ];
    for (t, (addr, value)) in wire.telegrams.iter().zip(expected) {
        assert_eq!(t.source, own());
        assert_eq!(t.destination, ga(addr));
        assert_eq!(t.command, Command::Write);
        let got = t.as_f16().unwrap();
        assert!(close(got, value), "{}: {} vs {}", addr, got, value);
    }
}

#[test]
fn read_is_acked_and_answered() {
    let mut rig = WireRig::settled();
    rig.inject(&Telegram::group_read(peer(), ga("10/1/2")));
    rig.cycle(1);

    let wire = rig.wire();
    assert_eq!(rig.bus.link().tx[0], U_ACK_ADDRESSED, "ack precedes the answer");
    assert_eq!(wire.acks, 1);
    assert_eq!(wire.telegrams.len(), 1);

    let answer = &wire.telegrams[0];
    assert_eq!(answer.command, Command::Response);
    assert_eq!(answer.destination, ga("10/1/2"));
    assert!(close(answer.as_f16().unwrap(), 22.25));
}

#[test]
fn write_is_acked_and_switches_without_transmitting() {
    let mut rig = WireRig::settled();
    rig.inject(&Telegram::group_write_bool(peer(), ga("10/1/13"), true));
    rig.cycle(1);

    let wire = rig.wire();
    assert_eq!(wire.acks, 1);
    assert!(wire.telegrams.is_empty());
    assert_eq!(rig.hw.output(OutputChannel::Red), Some(true));
}

#[test]
fn foreign_traffic_is_neither_acked_nor_answered() {
    let mut rig = WireRig::settled();
    rig.inject(&Telegram::group_read(peer(), ga("0/0/1")));
    rig.cycle(1);

    assert!(rig.bus.link().tx.is_empty());
}

#[test]
fn service_indications_are_skipped() {
    let mut rig = WireRig::settled();
    // Reset confirmation and a positive data confirm ahead of the frame.
    rig.bus.link_mut().rx.extend([0x03, 0x8B]);
    rig.inject(&Telegram::group_read(peer(), ga("10/1/4")));
    rig.cycle(1);

    let wire = rig.wire();
    assert_eq!(wire.telegrams.len(), 1);
    assert_eq!(wire.telegrams[0].destination, ga("10/1/4"));
}

#[test]
fn corrupted_frame_is_dropped_and_next_one_served() {
    let mut rig = WireRig::settled();

    let mut bad = [0u8; MAX_FRAME_LEN];
    let n = Telegram::group_read(peer(), ga("10/1/1")).encode(&mut bad).unwrap();
    bad[n - 1] ^= 0xFF;
    rig.bus.link_mut().rx.extend(bad[..n].iter().copied());
    rig.inject(&Telegram::group_read(peer(), ga("10/1/3")));
    rig.cycle(1);

    let wire = rig.wire();
    assert_eq!(wire.telegrams.len(), 1);
    assert_eq!(wire.telegrams[0].destination, ga("10/1/3"));
}
