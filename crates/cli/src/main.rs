// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

mod int2hex;

use clap::{Parser, Subcommand};
use serde::Serialize;
use sopc_config::{BoardDescriptor, Variant};
use sopc_core::bus::SystemBus;
use sopc_core::clock::{Clock, HostClock, ManualClock};
use sopc_core::peripherals::lcd::LcdHandle;
use sopc_demo::{Firmware, FirmwareError};
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use tracing::{error, info};

const EXIT_PASS: u8 = 0;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_RUNTIME_ERROR: u8 = 3;

const SNAPSHOT_SCHEMA_VERSION: &str = "1.0";

fn parse_u32_value(s: &str) -> Result<u32, String> {
    let trimmed = s.trim();
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value '{}': {}", s, e))
    } else {
        u32::from_str(trimmed).map_err(|e| format!("Invalid value '{}': {}", s, e))
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "SoPC demo board simulator",
    long_about = None,
    subcommand_negates_reqs = true
)]
struct Cli {
    /// Board descriptor (YAML). Defaults to the built-in board of the variant.
    #[arg(short, long)]
    board: Option<PathBuf>,

    /// Firmware image to run (lms-filter | audio-loop). Overrides the board.
    #[arg(long)]
    variant: Option<Variant>,

    /// File or character device receiving LCD output instead of the
    /// simulated LCD.
    #[arg(long)]
    lcd: Option<PathBuf>,

    /// Slide switch positions (decimal or 0x-prefixed hex).
    #[arg(long, value_parser = parse_u32_value)]
    switches: Option<u32>,

    /// Stop after this many commands (default: until stdin closes)
    #[arg(long)]
    max_iterations: Option<u64>,

    /// Skip the one-second pause between commands
    #[arg(long)]
    no_delay: bool,

    /// Write the peripheral state (JSON) on exit.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Enable register-level tracing
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a file of decimal integers to 8-digit hex lines.
    Int2hex(Int2HexArgs),
}

#[derive(Parser, Debug)]
struct Int2HexArgs {
    #[arg(short, long, default_value = "Noise.txt")]
    input: PathBuf,

    #[arg(short, long, default_value = "NoiseHex.txt")]
    output: PathBuf,
}

#[derive(Serialize)]
struct Snapshot<'a> {
    snapshot_schema_version: &'static str,
    board: &'a str,
    variant: Variant,
    iterations: u64,
    lcd: Option<Vec<String>>,
    peripherals: BTreeMap<String, serde_json::Value>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Console protocol owns stdout; logs go to stderr.
    if cli.trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Some(Commands::Int2hex(ref args)) => run_int2hex(args),
        None => run_interactive(&cli),
    }
}

fn run_int2hex(args: &Int2HexArgs) -> ExitCode {
    match int2hex::convert_files(&args.input, &args.output) {
        Ok(_) => ExitCode::from(EXIT_PASS),
        Err(e) => {
            error!("{:#}", e);
            if e.downcast_ref::<int2hex::Int2HexError>().is_some() {
                ExitCode::from(EXIT_RUNTIME_ERROR)
            } else {
                ExitCode::from(EXIT_CONFIG_ERROR)
            }
        }
    }
}

fn load_board(cli: &Cli) -> anyhow::Result<BoardDescriptor> {
    let mut board = match &cli.board {
        Some(path) => {
            info!("Loading board descriptor: {:?}", path);
            BoardDescriptor::from_file(path)?
        }
        None => {
            let variant = cli.variant.unwrap_or(Variant::LmsFilter);
            info!("Using built-in {:?} board", variant);
            BoardDescriptor::builtin(variant)?
        }
    };
    if let Some(variant) = cli.variant {
        board.variant = variant;
    }
    Ok(board)
}

fn run_interactive(cli: &Cli) -> ExitCode {
    info!("Starting SoPC demo simulator");

    let board = match load_board(cli) {
        Ok(board) => board,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let mut bus = match SystemBus::from_config(&board) {
        Ok(bus) => bus,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    if let Some(switches) = cli.switches {
        if !bus.set_pio_input("sw", switches) {
            tracing::warn!("Board has no 'sw' input port; --switches ignored");
        }
    }

    if cli.no_delay {
        let clock = ManualClock::new(board.clock_hz);
        let clock = if board.timestamp {
            clock
        } else {
            clock.without_timer()
        };
        run_firmware(cli, &board, bus, clock)
    } else {
        let clock = HostClock::new(board.clock_hz, board.timestamp);
        run_firmware(cli, &board, bus, clock)
    }
}

fn run_firmware<C: Clock>(
    cli: &Cli,
    board: &BoardDescriptor,
    bus: SystemBus,
    clock: C,
) -> ExitCode {
    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout();

    let firmware = match Firmware::new(board, bus, clock, stdin, stdout) {
        Ok(firmware) => firmware,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let (mut firmware, simulated_lcd) = attach_lcd(cli, board, firmware);

    let result = firmware
        .start()
        .and_then(|()| firmware.run(cli.max_iterations));

    if let Some(lcd) = &simulated_lcd {
        info!("LCD: {:?}", lcd.lines());
    }

    if let Some(path) = &cli.snapshot {
        let snapshot = Snapshot {
            snapshot_schema_version: SNAPSHOT_SCHEMA_VERSION,
            board: &board.name,
            variant: board.variant,
            iterations: firmware.iterations(),
            lcd: simulated_lcd.as_ref().map(|lcd| lcd.lines()),
            peripherals: firmware.bus().snapshot(),
        };
        write_snapshot(path, &snapshot);
    }

    match result {
        Ok(iterations) => {
            info!("Firmware stopped after {} commands", iterations);
            ExitCode::from(EXIT_PASS)
        }
        Err(e @ FirmwareError::Config(_)) => {
            error!("{}", e);
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(EXIT_RUNTIME_ERROR)
        }
    }
}

/// LCD selection: `--lcd`, then the board's LCD device when it exists, then
/// the simulated LCD.
fn attach_lcd<C: Clock>(
    cli: &Cli,
    board: &BoardDescriptor,
    firmware: Firmware<SystemBus, C>,
) -> (Firmware<SystemBus, C>, Option<LcdHandle>) {
    if let Some(path) = &cli.lcd {
        return match std::fs::File::create(path) {
            Ok(file) => {
                info!("LCD output goes to {:?}", path);
                (firmware.with_lcd(file), None)
            }
            Err(e) => {
                tracing::warn!("Could not open LCD device {:?}: {}", path, e);
                (firmware, None)
            }
        };
    }

    let device = Path::new(&board.lcd.device);
    if device.exists() {
        match OpenOptions::new().write(true).open(device) {
            Ok(file) => {
                info!("LCD output goes to board device {:?}", device);
                return (firmware.with_lcd(file), None);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not open board LCD device {:?}: {}; using the simulated LCD",
                    device,
                    e
                );
            }
        }
    }

    let lcd = LcdHandle::new(board.lcd.rows, board.lcd.cols);
    (firmware.with_lcd(lcd.clone()), Some(lcd))
}

fn write_snapshot(path: &Path, snapshot: &Snapshot<'_>) {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                error!("Failed to create snapshot parent dir {:?}: {}", parent, e);
                return;
            }
        }
    }

    match std::fs::File::create(path) {
        Ok(f) => {
            if let Err(e) = serde_json::to_writer_pretty(f, snapshot) {
                error!("Failed to write snapshot {:?}: {}", path, e);
            }
        }
        Err(e) => error!("Failed to create snapshot {:?}: {}", path, e),
    }
}
