// LabWired - Firmware Simulation Platform
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Table-driven command sets for the two firmware images.

use sopc_config::Variant;

/// What a command reads from the console after its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    None,
    /// Decimal integer truncated to 8 bits.
    Byte,
    /// Signed 32-bit decimal integer.
    Int,
    /// Non-negative decimal integer.
    Unsigned,
    /// One whitespace-delimited word.
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    None,
    Byte(u8),
    Int(i32),
    Unsigned(u32),
    Text(String),
}

impl ArgKind {
    /// Parse a console word. `None` means the word is not a valid value of
    /// this kind.
    pub fn parse(self, word: &str) -> Option<Arg> {
        match self {
            Self::None => Some(Arg::None),
            Self::Byte => word.parse::<i32>().ok().map(|v| Arg::Byte(v as u8)),
            Self::Int => word.parse::<i32>().ok().map(Arg::Int),
            Self::Unsigned => word.parse::<u32>().ok().map(Arg::Unsigned),
            Self::Text => Some(Arg::Text(word.to_string())),
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Text => " <text>",
            _ => " <value>",
        }
    }
}

impl Arg {
    /// Value as written to a register plus the value echoed on the console.
    pub fn register_value(&self) -> Option<(u32, i64)> {
        match self {
            Self::Byte(v) => Some((*v as u32, *v as i64)),
            Self::Int(v) => Some((*v as u32, *v as i64)),
            Self::Unsigned(v) => Some((*v, *v as i64)),
            Self::None | Self::Text(_) => None,
        }
    }
}

/// Registers the firmware touches, independent of where a board maps them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Target {
    LedRed,
    LedGreen,
    Switches,
    SevenSegment,
    Counter,
    Mute,
    LmsBypass,
    LmsAdapt,
    DelayBypass,
}

impl Target {
    /// `(peripheral id, register name)` in the board descriptor.
    pub fn location(self) -> (&'static str, &'static str) {
        match self {
            Self::LedRed => ("ledr", "data"),
            Self::LedGreen => ("ledg", "data"),
            Self::Switches => ("sw", "data"),
            Self::SevenSegment => ("seven_seg", "bcd"),
            Self::Counter => ("counter", "count"),
            Self::Mute => ("audio_process", "mute"),
            Self::LmsBypass => ("lms_filter", "bypass"),
            Self::LmsAdapt => ("lms_filter", "adapt"),
            Self::DelayBypass => ("audio_delay", "bypass"),
        }
    }
}

/// How a value is echoed back on the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    /// `<label><decimal>`
    Decimal(&'static str),
    /// `<label><hex, space padded to 2>`
    Hex2(&'static str),
    /// `<label><hex, zero padded to 4>`
    Hex4(&'static str),
}

impl Echo {
    pub fn line(self, value: i64) -> String {
        match self {
            Self::Decimal(label) => format!("{}{}", label, value),
            Self::Hex2(label) => format!("{}{:2X}", label, value as u32),
            Self::Hex4(label) => format!("{}{:04X}", label, value as u32),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Write the argument to a register and echo it.
    Write(Target, Echo),
    /// Read a register and echo the value.
    Read(Target, Echo),
    /// BCD-encode the argument onto the seven-segment display.
    SegmentBcd,
    /// Clear the LCD and print the argument at the top-left corner.
    LcdText,
    /// Show A and B, then run the product selected by the argument.
    Multiply,
    /// Write 0 to the mute register.
    Unmute,
    /// Dump mute, bypass, delay and adapt.
    AudioStatus,
}

impl Op {
    pub fn targets(self) -> Vec<Target> {
        match self {
            Self::Write(target, _) | Self::Read(target, _) => vec![target],
            Self::SegmentBcd => vec![Target::SevenSegment],
            Self::Unmute => vec![Target::Mute],
            Self::AudioStatus => vec![
                Target::Mute,
                Target::LmsBypass,
                Target::DelayBypass,
                Target::LmsAdapt,
            ],
            Self::LcdText | Self::Multiply => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub arg: ArgKind,
    pub op: Op,
}

/// Work done at the top of every loop iteration, before the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    None,
    /// Show the LMS adaptation coefficient on the seven-segment display.
    AdaptOnDisplay,
}

const fn cmd(name: &'static str, arg: ArgKind, op: Op) -> CommandSpec {
    CommandSpec { name, arg, op }
}

const SHARED: [CommandSpec; 5] = [
    cmd("ledr", ArgKind::Byte, Op::Write(Target::LedRed, Echo::Decimal("LED Red val:"))),
    cmd("ledg", ArgKind::Byte, Op::Write(Target::LedGreen, Echo::Decimal("LED Green val:"))),
    cmd("sw", ArgKind::None, Op::Read(Target::Switches, Echo::Hex2("SW val: "))),
    cmd("lcd", ArgKind::Text, Op::LcdText),
    cmd("mult", ArgKind::Byte, Op::Multiply),
];

static LMS_FILTER: [CommandSpec; 11] = [
    SHARED[0],
    SHARED[1],
    SHARED[2],
    SHARED[3],
    SHARED[4],
    cmd("seg", ArgKind::Unsigned, Op::SegmentBcd),
    cmd("mute", ArgKind::Int, Op::Write(Target::Mute, Echo::Decimal("mute: "))),
    cmd("adapt", ArgKind::Int, Op::Write(Target::LmsAdapt, Echo::Hex4("adapt: "))),
    cmd("bypass", ArgKind::Int, Op::Write(Target::LmsBypass, Echo::Decimal("bypass: "))),
    cmd("delay", ArgKind::Int, Op::Write(Target::DelayBypass, Echo::Decimal("delay: "))),
    cmd("audio", ArgKind::None, Op::AudioStatus),
];

static AUDIO_LOOP: [CommandSpec; 11] = [
    SHARED[0],
    SHARED[1],
    SHARED[2],
    SHARED[3],
    SHARED[4],
    cmd("hex", ArgKind::Int, Op::Write(Target::SevenSegment, Echo::Decimal("HEX value:"))),
    cmd("counter", ArgKind::None, Op::Read(Target::Counter, Echo::Decimal("Counter value: "))),
    cmd("enable", ArgKind::Int, Op::Write(Target::Counter, Echo::Decimal("Counter enabled: "))),
    cmd("mute", ArgKind::Int, Op::Write(Target::Mute, Echo::Decimal("mute "))),
    cmd("unmute", ArgKind::None, Op::Unmute),
    cmd("audio", ArgKind::None, Op::Read(Target::Mute, Echo::Decimal("mute: "))),
];

const HELP_PREFIX: &str = "Enter command: ";
const HELP_PER_LINE: usize = 6;

/// Command set of one firmware image.
#[derive(Debug, Clone, Copy)]
pub struct Vocabulary {
    variant: Variant,
    commands: &'static [CommandSpec],
    refresh: Refresh,
}

impl Vocabulary {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::LmsFilter => Self {
                variant,
                commands: &LMS_FILTER,
                refresh: Refresh::AdaptOnDisplay,
            },
            Variant::AudioLoop => Self {
                variant,
                commands: &AUDIO_LOOP,
                refresh: Refresh::None,
            },
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn commands(&self) -> &'static [CommandSpec] {
        self.commands
    }

    pub fn refresh(&self) -> Refresh {
        self.refresh
    }

    /// Exact, case-sensitive match.
    pub fn lookup(&self, token: &str) -> Option<&'static CommandSpec> {
        self.commands.iter().find(|c| c.name == token)
    }

    /// Every register this image can touch, sorted and deduplicated.
    pub fn targets(&self) -> Vec<Target> {
        let mut targets: Vec<Target> = self
            .commands
            .iter()
            .flat_map(|c| c.op.targets())
            .collect();
        if self.refresh == Refresh::AdaptOnDisplay {
            targets.extend([Target::LmsAdapt, Target::SevenSegment]);
        }
        // Startup LED pattern.
        targets.extend([Target::LedRed, Target::LedGreen]);
        targets.sort();
        targets.dedup();
        targets
    }

    /// Console banner listing the commands, six per line.
    pub fn help_lines(&self) -> Vec<String> {
        let entries: Vec<String> = self
            .commands
            .iter()
            .map(|c| format!("{}{}", c.name, c.arg.placeholder()))
            .collect();
        let indent = " ".repeat(HELP_PREFIX.len() - 2);
        entries
            .chunks(HELP_PER_LINE)
            .enumerate()
            .map(|(i, chunk)| {
                let body = chunk.join(" | ");
                if i == 0 {
                    format!("{}{}", HELP_PREFIX, body)
                } else {
                    format!("{}| {}", indent, body)
                }
            })
            .collect()
    }
}
