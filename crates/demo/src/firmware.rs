// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! The demo firmware: startup sequence plus the interactive command loop.
//!
//! Hardware is reached only through [`RegisterAccess`] and [`Clock`], so the
//! loop runs unchanged against the simulated `SystemBus` or a test fake.

use crate::bcd::encode_bcd;
use crate::matrix::{multiply_hardware, multiply_software, set_input_matrices, MultiplyPath};
use crate::tokens::TokenReader;
use crate::vocabulary::{Arg, ArgKind, CommandSpec, Op, Refresh, Target, Vocabulary};
use sopc_config::{BoardDescriptor, ConfigError};
use sopc_core::clock::Clock;
use sopc_core::custom::{CustomInstruction, VectorMultiply};
use sopc_core::{RegisterAccess, RegisterRef, SimulationError};
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::time::Duration;

pub const PROMPT: &str = "CMD:> ";
pub const LCD_BANNER: &str = "\x1b[1;1HSoPC Demo";
const LCD_CLEAR: &str = "\x1b[2J";
const LCD_HOME: &str = "\x1b[1;1H";
const STARTUP_LEDR: u32 = 0xAA;
const STARTUP_LEDG: u32 = 0x55;
/// Pause at the end of every iteration.
pub const LOOP_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, thiserror::Error)]
pub enum FirmwareError {
    #[error("board does not fit the firmware image: {0}")]
    Config(#[from] ConfigError),
    #[error("console I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("register access failed: {0}")]
    Bus(#[from] SimulationError),
}

/// Outcome of one loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// The console reached end of input; no further commands can arrive.
    InputClosed,
}

pub struct Firmware<B, C> {
    vocabulary: Vocabulary,
    registers: BTreeMap<Target, RegisterRef>,
    bus: B,
    clock: C,
    input: TokenReader<Box<dyn BufRead>>,
    console: Box<dyn Write>,
    lcd: Option<Box<dyn Write>>,
    vector_unit: Box<dyn CustomInstruction>,
    iterations: u64,
}

impl<B: RegisterAccess, C: Clock> Firmware<B, C> {
    /// Bind the image selected by `board.variant` to its registers.
    ///
    /// Every register the image can touch is resolved here, so a board that
    /// lacks one is rejected before the loop starts.
    pub fn new(
        board: &BoardDescriptor,
        bus: B,
        clock: C,
        input: impl BufRead + 'static,
        console: impl Write + 'static,
    ) -> Result<Self, FirmwareError> {
        let vocabulary = Vocabulary::for_variant(board.variant);
        let mut registers = BTreeMap::new();
        for target in vocabulary.targets() {
            let (peripheral, register) = target.location();
            registers.insert(target, board.register(peripheral, register)?);
        }

        Ok(Self {
            vocabulary,
            registers,
            bus,
            clock,
            input: TokenReader::new(Box::new(input)),
            console: Box::new(console),
            lcd: None,
            vector_unit: Box::new(VectorMultiply::new()),
            iterations: 0,
        })
    }

    pub fn with_lcd(mut self, lcd: impl Write + 'static) -> Self {
        self.lcd = Some(Box::new(lcd));
        self
    }

    pub fn with_vector_unit(mut self, unit: Box<dyn CustomInstruction>) -> Self {
        self.vector_unit = unit;
        self
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Completed loop iterations.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Power-on sequence: timestamp timer, LCD banner, LED pattern, console
    /// welcome text.
    pub fn start(&mut self) -> Result<(), FirmwareError> {
        tracing::info!(
            "Starting {:?} firmware image at {} Hz with custom instruction '{}'",
            self.vocabulary.variant(),
            self.clock.frequency(),
            self.vector_unit.name()
        );

        if let Err(e) = self.clock.start_timestamp() {
            tracing::warn!("{}; timing deltas will read 0", e);
            writeln!(self.console, "{}", e)?;
        }

        if self.lcd.is_some() {
            self.write_lcd(&[LCD_BANNER]);
        } else {
            tracing::warn!("No LCD attached; LCD output will be dropped");
            writeln!(self.console, "Could not open LCD driver")?;
        }

        self.write_logged(Target::LedRed, STARTUP_LEDR);
        self.write_logged(Target::LedGreen, STARTUP_LEDG);

        writeln!(self.console, "Demo SoPC program")?;
        for line in self.vocabulary.help_lines() {
            writeln!(self.console, "{}", line)?;
        }
        writeln!(self.console)?;
        self.console.flush()?;
        Ok(())
    }

    /// One iteration: refresh, prompt, read and execute a command, sleep.
    pub fn step(&mut self) -> Result<Step, FirmwareError> {
        if self.vocabulary.refresh() == Refresh::AdaptOnDisplay {
            self.refresh_display();
        }

        write!(self.console, "{}", PROMPT)?;
        self.console.flush()?;

        let Some(token) = self.input.next_token()? else {
            return Ok(Step::InputClosed);
        };

        match self.vocabulary.lookup(&token) {
            Some(spec) => {
                if self.dispatch(spec)? == Step::InputClosed {
                    return Ok(Step::InputClosed);
                }
            }
            None => tracing::trace!("Ignoring unknown command '{}'", token),
        }
        self.console.flush()?;

        let cycles = self.clock.sleep(LOOP_DELAY);
        self.bus.advance(cycles);
        self.iterations += 1;
        Ok(Step::Continue)
    }

    /// Step until the input closes or `max_iterations` have completed.
    /// Returns the number of iterations run by this call.
    pub fn run(&mut self, max_iterations: Option<u64>) -> Result<u64, FirmwareError> {
        let mut completed = 0;
        while max_iterations.map_or(true, |max| completed < max) {
            match self.step()? {
                Step::Continue => completed += 1,
                Step::InputClosed => {
                    tracing::info!("Console input closed after {} commands", completed);
                    break;
                }
            }
        }
        Ok(completed)
    }

    fn dispatch(&mut self, spec: &CommandSpec) -> Result<Step, FirmwareError> {
        tracing::debug!("Command '{}'", spec.name);

        if spec.op == Op::Multiply {
            let (a, b) = set_input_matrices();
            write!(self.console, "{}{}", a, b)?;
        }

        let arg = match spec.arg {
            ArgKind::None => Arg::None,
            kind => {
                let Some(word) = self.input.next_token()? else {
                    return Ok(Step::InputClosed);
                };
                match kind.parse(&word) {
                    Some(arg) => arg,
                    None => {
                        tracing::warn!("{}: ignoring malformed argument '{}'", spec.name, word);
                        return Ok(Step::Continue);
                    }
                }
            }
        };

        match self.execute(spec.op, arg) {
            Ok(()) => Ok(Step::Continue),
            Err(FirmwareError::Bus(e)) => {
                tracing::error!("{}: {}", spec.name, e);
                Ok(Step::Continue)
            }
            Err(e) => Err(e),
        }
    }

    fn execute(&mut self, op: Op, arg: Arg) -> Result<(), FirmwareError> {
        match (op, arg) {
            (Op::Write(target, echo), arg) => {
                if let Some((value, shown)) = arg.register_value() {
                    let reg = self.register(target)?;
                    self.bus.write(reg, value)?;
                    writeln!(self.console, "{}", echo.line(shown))?;
                }
            }
            (Op::Read(target, echo), _) => {
                let reg = self.register(target)?;
                let value = self.bus.read(reg)?;
                writeln!(self.console, "{}", echo.line(value as i32 as i64))?;
            }
            (Op::SegmentBcd, Arg::Unsigned(value)) => {
                let reg = self.register(Target::SevenSegment)?;
                self.bus.write(reg, encode_bcd(value))?;
                writeln!(self.console, "HEX value:{}", value)?;
            }
            (Op::LcdText, Arg::Text(text)) => {
                self.write_lcd(&[LCD_CLEAR, LCD_HOME, text.as_str()]);
            }
            (Op::Multiply, Arg::Byte(selector)) => match MultiplyPath::from_selector(selector) {
                Some(path) => self.multiply(path)?,
                None => writeln!(self.console, "mult: invalid parameter")?,
            },
            (Op::Unmute, _) => {
                let reg = self.register(Target::Mute)?;
                self.bus.write(reg, 0)?;
                writeln!(self.console, "unmute")?;
            }
            (Op::AudioStatus, _) => {
                let mute = self.read_target(Target::Mute)?;
                let bypass = self.read_target(Target::LmsBypass)?;
                let delay = self.read_target(Target::DelayBypass)?;
                let adapt = self.read_target(Target::LmsAdapt)?;
                writeln!(self.console, "mute: {}", mute as i32)?;
                writeln!(self.console, "bypass: {}", bypass as i32)?;
                writeln!(self.console, "delay: {}", delay as i32)?;
                writeln!(self.console, "adapt: {:04X}", adapt)?;
            }
            (op, arg) => {
                tracing::warn!("{:?} cannot take argument {:?}", op, arg);
            }
        }
        Ok(())
    }

    fn multiply(&mut self, path: MultiplyPath) -> Result<(), FirmwareError> {
        let (a, b) = set_input_matrices();

        let start = self.clock.timestamp();
        let product = match path {
            MultiplyPath::Software => multiply_software(&a, &b),
            MultiplyPath::Hardware => multiply_hardware(&a, &b, self.vector_unit.as_mut()),
        };
        let end = self.clock.timestamp();

        let delta = match (start, end) {
            (Some(start), Some(end)) => end.wrapping_sub(start) as u32,
            _ => 0,
        };
        writeln!(self.console, "{} time: {}", path.label(), delta)?;
        write!(self.console, "{}", product)?;
        Ok(())
    }

    fn refresh_display(&mut self) {
        let result = self.read_target(Target::LmsAdapt).and_then(|adapt| {
            let reg = self.register(Target::SevenSegment)?;
            self.bus.write(reg, encode_bcd(adapt))?;
            Ok(())
        });
        if let Err(e) = result {
            tracing::error!("Seven-segment refresh failed: {}", e);
        }
    }

    fn register(&self, target: Target) -> Result<RegisterRef, FirmwareError> {
        self.registers.get(&target).copied().ok_or_else(|| {
            let (peripheral, register) = target.location();
            FirmwareError::Config(ConfigError::UnknownRegister {
                peripheral: peripheral.to_string(),
                register: register.to_string(),
            })
        })
    }

    fn read_target(&self, target: Target) -> Result<u32, FirmwareError> {
        let reg = self.register(target)?;
        Ok(self.bus.read(reg)?)
    }

    fn write_logged(&mut self, target: Target, value: u32) {
        let result = self
            .register(target)
            .and_then(|reg| self.bus.write(reg, value).map_err(FirmwareError::from));
        if let Err(e) = result {
            tracing::error!("Writing {:?} failed: {}", target, e);
        }
    }

    fn write_lcd(&mut self, parts: &[&str]) {
        let Some(lcd) = self.lcd.as_mut() else {
            tracing::warn!("No LCD attached; dropping {:?}", parts.concat());
            return;
        };
        let result = parts
            .iter()
            .try_for_each(|part| lcd.write_all(part.as_bytes()))
            .and_then(|()| lcd.flush());
        if let Err(e) = result {
            tracing::warn!("LCD write failed: {}", e);
        }
    }
}
