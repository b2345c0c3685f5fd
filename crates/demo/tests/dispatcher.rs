// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use sopc_config::{BoardDescriptor, ConfigError, Variant};
use sopc_core::bus::SystemBus;
use sopc_core::clock::ManualClock;
use sopc_core::custom::{CustomInstruction, VectorMultiply};
use sopc_core::peripherals::lcd::LcdHandle;
use sopc_core::peripherals::seven_seg::SevenSegment;
use sopc_core::{RegisterAccess, RegisterRef, SimResult, SimulationError};
use sopc_demo::console::SharedSink;
use sopc_demo::{Firmware, FirmwareError, Step};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const LMS_BANNER: &str = "Demo SoPC program\n\
Enter command: ledr <value> | ledg <value> | sw | lcd <text> | mult <value> | seg <value>\n             \
| mute <value> | adapt <value> | bypass <value> | delay <value> | audio\n\n";

struct Rig {
    board: BoardDescriptor,
    firmware: Firmware<SystemBus, ManualClock>,
    console: SharedSink,
}

impl Rig {
    fn new(variant: Variant, input: &str) -> Self {
        Self::with_clock(variant, input, ManualClock::new)
    }

    fn with_clock(variant: Variant, input: &str, clock: impl FnOnce(u64) -> ManualClock) -> Self {
        let board = BoardDescriptor::builtin(variant).unwrap();
        let bus = SystemBus::from_config(&board).unwrap();
        let console = SharedSink::new();
        let firmware = Firmware::new(
            &board,
            bus,
            clock(board.clock_hz),
            Cursor::new(input.to_string()),
            console.clone(),
        )
        .unwrap();
        Self {
            board,
            firmware,
            console,
        }
    }

    /// Boot and discard the startup text.
    fn started(mut self) -> Self {
        self.firmware.start().unwrap();
        self.console.clear();
        self
    }

    fn reg(&self, peripheral: &str, register: &str) -> RegisterRef {
        self.board.register(peripheral, register).unwrap()
    }

    fn read(&self, peripheral: &str, register: &str) -> u32 {
        self.firmware.bus().read(self.reg(peripheral, register)).unwrap()
    }

    fn step(&mut self) -> Step {
        self.firmware.step().unwrap()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Access {
    Read(u64, u32),
    Write(u64, u32, u32),
}

/// Register backend that logs every access and can be told to fail.
#[derive(Default)]
struct RecordingRegisters {
    log: RefCell<Vec<Access>>,
    values: HashMap<(u64, u32), u32>,
    fail: bool,
}

impl RegisterAccess for RecordingRegisters {
    fn read_register(&self, base: u64, offset: u32) -> SimResult<u32> {
        self.log.borrow_mut().push(Access::Read(base, offset));
        if self.fail {
            return Err(SimulationError::MemoryViolation(base + offset as u64 * 4));
        }
        Ok(self.values.get(&(base, offset)).copied().unwrap_or(0))
    }

    fn write_register(&mut self, base: u64, offset: u32, value: u32) -> SimResult<()> {
        self.log.borrow_mut().push(Access::Write(base, offset, value));
        if self.fail {
            return Err(SimulationError::MemoryViolation(base + offset as u64 * 4));
        }
        self.values.insert((base, offset), value);
        Ok(())
    }
}

fn recording_firmware(
    variant: Variant,
    input: &str,
    fail: bool,
) -> (Firmware<RecordingRegisters, ManualClock>, SharedSink) {
    let board = BoardDescriptor::builtin(variant).unwrap();
    let console = SharedSink::new();
    let regs = RecordingRegisters {
        fail,
        ..Default::default()
    };
    let firmware = Firmware::new(
        &board,
        regs,
        ManualClock::new(board.clock_hz),
        Cursor::new(input.to_string()),
        console.clone(),
    )
    .unwrap();
    (firmware, console)
}

#[test]
fn test_startup_sequence() {
    let lcd = LcdHandle::new(2, 16);
    let mut rig = Rig::new(Variant::LmsFilter, "");
    rig.firmware = rig.firmware.with_lcd(lcd.clone());
    rig.firmware.start().unwrap();

    assert_eq!(rig.console.contents(), LMS_BANNER);
    assert_eq!(rig.read("ledr", "data"), 0xAA);
    assert_eq!(rig.read("ledg", "data"), 0x55);
    assert_eq!(lcd.lines()[0], "SoPC Demo");
}

#[test]
fn test_startup_without_timer_or_lcd() {
    let mut rig = Rig::with_clock(Variant::AudioLoop, "mult 1", |hz| {
        ManualClock::new(hz).without_timer()
    });
    rig.firmware.start().unwrap();

    let out = rig.console.contents();
    assert!(out.starts_with("No timestamp device available\nCould not open LCD driver\nDemo SoPC program\n"));
    assert!(out.contains("Enter command: ledr <value> | ledg <value> | sw | lcd <text> | mult <value> | hex <value>\n"));

    rig.console.clear();
    assert_eq!(rig.step(), Step::Continue);
    assert!(rig.console.contents().contains("SW time: 0\n"));
}

#[test]
fn test_ledr_writes_and_echoes() {
    let mut rig = Rig::new(Variant::LmsFilter, "ledr 170\n").started();
    assert_eq!(rig.step(), Step::Continue);

    assert_eq!(rig.read("ledr", "data"), 170);
    assert_eq!(rig.console.contents(), "CMD:> LED Red val:170\n");
}

#[test]
fn test_ledg_truncates_to_a_byte() {
    let mut rig = Rig::new(Variant::AudioLoop, "ledg 300").started();
    rig.step();

    assert_eq!(rig.read("ledg", "data"), 44);
    assert_eq!(rig.console.contents(), "CMD:> LED Green val:44\n");
}

#[test]
fn test_unknown_command_touches_nothing() {
    let (mut firmware, console) = recording_firmware(Variant::AudioLoop, "foo", false);
    assert_eq!(firmware.step().unwrap(), Step::Continue);

    assert!(firmware.bus().log.borrow().is_empty());
    assert_eq!(console.contents(), "CMD:> ");
    assert_eq!(firmware.clock().sleeps(), &[Duration::from_secs(1)]);
}

#[test]
fn test_unknown_command_leaves_board_unchanged() {
    let mut rig = Rig::new(Variant::LmsFilter, "LEDR 1").started();
    let before = rig.firmware.bus().snapshot();
    rig.step();
    rig.step();
    assert_eq!(rig.firmware.bus().snapshot(), before);
}

#[test]
fn test_switches_read_in_hex() {
    let mut rig = Rig::new(Variant::LmsFilter, "sw sw").started();
    rig.step();
    assert_eq!(rig.console.contents(), "CMD:> SW val: A5\n");

    rig.firmware.bus_mut().set_pio_input("sw", 0x7);
    rig.console.clear();
    rig.step();
    assert_eq!(rig.console.contents(), "CMD:> SW val:  7\n");
}

#[test]
fn test_mult_software() {
    let mut rig = Rig::with_clock(Variant::LmsFilter, "mult 1", |hz| {
        ManualClock::new(hz).with_cycles_per_read(250)
    })
    .started();
    rig.step();

    let expected = "CMD:> Matrix :\n 1  2  3  4\n 5  6  7  8\n 9 10 11 12\n13 14 15 16\n\
Matrix :\n 1  1  1  1\n 2  2  2  2\n 3  3  3  3\n 4  4  4  4\n\
SW time: 250\n\
Matrix :\n10 20 30 40\n26 52 78 104\n42 84 126 168\n58 116 174 232\n";
    assert_eq!(rig.console.contents(), expected);
}

#[test]
fn test_mult_hardware_matches_software() {
    let mut rig = Rig::new(Variant::AudioLoop, "mult 2").started();
    rig.step();

    let out = rig.console.contents();
    assert!(out.contains("HW time: 1\n"));
    assert!(out.ends_with("Matrix :\n10 20 30 40\n26 52 78 104\n42 84 126 168\n58 116 174 232\n"));
}

#[test]
fn test_mult_invalid_selector() {
    let mut rig = Rig::new(Variant::LmsFilter, "mult 3").started();
    rig.step();

    let out = rig.console.contents();
    assert!(out.ends_with("mult: invalid parameter\n"));
    assert!(!out.contains("time:"));
}

#[test]
fn test_seg_encodes_bcd() {
    let mut rig = Rig::new(Variant::LmsFilter, "seg 1234 seg 12345").started();
    rig.step();
    assert_eq!(rig.read("seven_seg", "bcd"), 0x1234);
    assert_eq!(rig.console.contents(), "CMD:> HEX value:1234\n");

    rig.console.clear();
    rig.step();
    assert_eq!(rig.read("seven_seg", "bcd"), 0x2345);
    assert_eq!(rig.console.contents(), "CMD:> HEX value:12345\n");
    let display = rig
        .firmware
        .bus()
        .peripheral_as::<SevenSegment>("seven_seg")
        .unwrap();
    assert_eq!(display.text(), "2345");
}

#[test]
fn test_lcd_text() {
    let lcd = LcdHandle::new(2, 16);
    let mut rig = Rig::new(Variant::LmsFilter, "lcd hello");
    rig.firmware = rig.firmware.with_lcd(lcd.clone());
    let mut rig = rig.started();
    rig.step();

    assert_eq!(lcd.lines()[0], "hello");
    assert_eq!(rig.console.contents(), "CMD:> ");
}

#[test]
fn test_lcd_without_device_is_skipped() {
    let mut rig = Rig::new(Variant::AudioLoop, "lcd hello sw").started();
    assert_eq!(rig.step(), Step::Continue);
    assert_eq!(rig.step(), Step::Continue);
    assert_eq!(rig.console.contents(), "CMD:> CMD:> SW val: A5\n");
}

#[test]
fn test_lms_refreshes_display_from_adapt() {
    let mut rig = Rig::new(Variant::LmsFilter, "adapt 192 sw").started();
    rig.step();
    assert_eq!(rig.console.contents(), "CMD:> adapt: 00C0\n");
    assert_eq!(rig.read("lms_filter", "adapt"), 192);

    rig.step();
    assert_eq!(rig.read("seven_seg", "bcd"), 0x192);
}

#[test]
fn test_audio_status() {
    let mut rig = Rig::new(
        Variant::LmsFilter,
        "mute 1\nbypass 2\ndelay 3\nadapt 4660\naudio\n",
    )
    .started();
    assert_eq!(rig.firmware.run(None).unwrap(), 5);

    let out = rig.console.contents();
    assert!(out.starts_with("CMD:> mute: 1\nCMD:> bypass: 2\nCMD:> delay: 3\nCMD:> adapt: 1234\n"));
    assert!(out.ends_with("CMD:> mute: 1\nbypass: 2\ndelay: 3\nadapt: 1234\nCMD:> "));
    assert_eq!(rig.read("audio_delay", "bypass"), 3);
}

#[test]
fn test_counter_runs_while_enabled() {
    let mut rig = Rig::new(Variant::AudioLoop, "enable 1 counter").started();
    rig.step();
    assert_eq!(rig.console.contents(), "CMD:> Counter enabled: 1\n");

    rig.console.clear();
    rig.step();
    assert_eq!(rig.console.contents(), "CMD:> Counter value: 50000000\n");
}

#[test]
fn test_hex_writes_raw_value() {
    let mut rig = Rig::new(Variant::AudioLoop, "hex 4660").started();
    rig.step();
    assert_eq!(rig.read("seven_seg", "bcd"), 4660);
    assert_eq!(rig.console.contents(), "CMD:> HEX value:4660\n");
}

#[test]
fn test_mute_unmute_and_audio() {
    let mut rig = Rig::new(Variant::AudioLoop, "mute 3 audio unmute audio").started();
    rig.firmware.run(None).unwrap();

    assert_eq!(
        rig.console.contents(),
        "CMD:> mute 3\nCMD:> mute: 3\nCMD:> unmute\nCMD:> mute: 0\nCMD:> "
    );
    assert_eq!(rig.read("audio_process", "mute"), 0);
}

#[test]
fn test_malformed_argument_is_skipped() {
    let mut rig = Rig::new(Variant::LmsFilter, "ledr abc sw").started();
    assert_eq!(rig.step(), Step::Continue);
    assert_eq!(rig.read("ledr", "data"), 0xAA);
    assert_eq!(rig.console.contents(), "CMD:> ");

    rig.step();
    assert_eq!(rig.console.contents(), "CMD:> CMD:> SW val: A5\n");
}

#[test]
fn test_negative_seg_is_malformed() {
    let mut rig = Rig::new(Variant::LmsFilter, "seg -5").started();
    rig.step();
    assert_eq!(rig.console.contents(), "CMD:> ");
}

#[test]
fn test_input_closed() {
    let mut rig = Rig::new(Variant::LmsFilter, "").started();
    assert_eq!(rig.step(), Step::InputClosed);

    let mut rig = Rig::new(Variant::LmsFilter, "ledr").started();
    assert_eq!(rig.step(), Step::InputClosed);
    assert_eq!(rig.firmware.iterations(), 0);
}

#[test]
fn test_run_counts_iterations() {
    let mut rig = Rig::new(Variant::AudioLoop, "sw sw foo").started();
    assert_eq!(rig.firmware.run(Some(2)).unwrap(), 2);
    assert_eq!(rig.firmware.run(None).unwrap(), 1);
    assert_eq!(rig.firmware.iterations(), 3);
    assert_eq!(rig.firmware.clock().sleeps().len(), 3);
}

#[test]
fn test_line_noise_is_an_unknown_command() {
    let board = BoardDescriptor::builtin(Variant::LmsFilter).unwrap();
    let bus = SystemBus::from_config(&board).unwrap();
    let console = SharedSink::new();
    let mut firmware = Firmware::new(
        &board,
        bus,
        ManualClock::new(board.clock_hz),
        Cursor::new(b"\xff\xfe junk\nledr 7\n".to_vec()),
        console.clone(),
    )
    .unwrap();

    assert_eq!(firmware.run(None).unwrap(), 3);
    let ledr = board.register("ledr", "data").unwrap();
    assert_eq!(firmware.bus().read(ledr).unwrap(), 7);
    assert!(console.contents().ends_with("CMD:> LED Red val:7\n"));
}

/// Vector unit that counts invocations and defers to the real one.
#[derive(Debug)]
struct CountingUnit {
    calls: Arc<AtomicUsize>,
    inner: VectorMultiply,
}

impl CustomInstruction for CountingUnit {
    fn name(&self) -> &str {
        "counting_vector_mult"
    }

    fn execute(&mut self, dataa: u32, datab: u32) -> u32 {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.execute(dataa, datab)
    }
}

#[test]
fn test_hardware_path_uses_the_attached_unit() {
    let calls = Arc::new(AtomicUsize::new(0));
    let unit = CountingUnit {
        calls: calls.clone(),
        inner: VectorMultiply::new(),
    };
    let mut rig = Rig::new(Variant::LmsFilter, "mult 2 mult 1");
    rig.firmware = rig.firmware.with_vector_unit(Box::new(unit));
    let mut rig = rig.started();

    rig.step();
    assert_eq!(calls.load(Ordering::SeqCst), 16);
    rig.step();
    assert_eq!(calls.load(Ordering::SeqCst), 16);
}

#[test]
fn test_register_errors_do_not_stop_the_loop() {
    let (mut firmware, console) = recording_firmware(Variant::AudioLoop, "ledr 5 sw", true);
    assert_eq!(firmware.run(None).unwrap(), 2);
    assert_eq!(console.contents(), "CMD:> CMD:> CMD:> ");
    assert_eq!(firmware.bus().log.borrow().len(), 2);
}

#[test]
fn test_recorded_register_traffic() {
    let (mut firmware, _console) = recording_firmware(Variant::LmsFilter, "bypass 1", false);
    firmware.step().unwrap();

    let adapt = Access::Read(0x0001_1060, 1);
    let seg = Access::Write(0x0001_1030, 0, 0);
    let bypass = Access::Write(0x0001_1060, 0, 1);
    assert_eq!(*firmware.bus().log.borrow(), vec![adapt, seg, bypass]);
}

#[test]
fn test_missing_register_is_rejected() {
    let mut board = BoardDescriptor::builtin(Variant::LmsFilter).unwrap();
    board.peripherals.retain(|p| p.id != "audio_delay");
    let bus = SystemBus::from_config(&board).unwrap();

    let err = Firmware::new(
        &board,
        bus,
        ManualClock::new(board.clock_hz),
        Cursor::new(String::new()),
        SharedSink::new(),
    )
    .err()
    .unwrap();
    assert!(matches!(
        err,
        FirmwareError::Config(ConfigError::UnknownPeripheral(ref id)) if id == "audio_delay"
    ));
}
