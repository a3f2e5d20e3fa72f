//! Named flags and the flag sets that group them
//!
//! A [`FlagSet`] is an ordered list of [`Flag`] descriptors. Each descriptor
//! knows how to turn itself into a `clap::Arg` for parsing and how it should
//! be shown in grouped help output.

use std::time::Duration;

use clap::builder::{BoolishValueParser, RangedI64ValueParser};
use clap::{Arg, ArgAction};

/// The kind of value a flag accepts
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueKind {
    String,
    Int { min: i64, max: i64 },
    Bool,
    Duration,
    StringArray,
}

impl ValueKind {
    /// Type name shown after the flag name in help output
    pub fn type_name(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Int { .. } => "int",
            ValueKind::Bool => "",
            ValueKind::Duration => "duration",
            ValueKind::StringArray => "stringArray",
        }
    }

    fn is_zero_default(&self, default: &str) -> bool {
        match self {
            ValueKind::String | ValueKind::StringArray => default.is_empty(),
            ValueKind::Int { .. } => default == "0",
            ValueKind::Bool => default == "false",
            ValueKind::Duration => matches!(default, "0" | "0s"),
        }
    }
}

/// A single named setting
#[derive(Clone, Debug)]
pub struct Flag {
    name: String,
    shorthand: Option<char>,
    kind: ValueKind,
    default: String,
    usage: String,
    deprecated: Option<String>,
}

impl Flag {
    fn new(name: &str, kind: ValueKind, default: String, usage: &str) -> Self {
        Self {
            name: name.to_string(),
            shorthand: None,
            kind,
            default,
            usage: usage.to_string(),
            deprecated: None,
        }
    }

    /// Add a single character alias, e.g. `-v` for `--log-level`.
    pub fn shorthand(&mut self, c: char) -> &mut Self {
        self.shorthand = Some(c);
        self
    }

    /// Restrict an int flag to `min..=max`. Has no effect on other kinds.
    pub fn range(&mut self, min: i64, max: i64) -> &mut Self {
        if let ValueKind::Int { .. } = self.kind {
            self.kind = ValueKind::Int { min, max };
        }
        self
    }

    /// Keep accepting the flag but announce that it is going away.
    ///
    /// The message is shown in help output and logged whenever the flag is
    /// passed on the command line.
    pub fn deprecated(&mut self, message: &str) -> &mut Self {
        self.deprecated = Some(message.to_string());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short(&self) -> Option<char> {
        self.shorthand
    }

    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub fn default_value(&self) -> &str {
        &self.default
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn deprecation(&self) -> Option<&str> {
        self.deprecated.as_deref()
    }

    /// Build the parser-side argument for this flag.
    pub fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name.clone())
            .long(self.name.clone())
            .help(self.usage.clone());

        if let Some(c) = self.shorthand {
            arg = arg.short(c);
        }

        arg = match &self.kind {
            ValueKind::String => arg
                .action(ArgAction::Set)
                .value_parser(clap::value_parser!(String)),
            ValueKind::Int { min, max } => arg
                .action(ArgAction::Set)
                .value_parser(RangedI64ValueParser::<i64>::new().range(*min..=*max)),
            // Mirrors pflag: `--flag` means true, `--flag=false` is accepted.
            ValueKind::Bool => arg
                .action(ArgAction::Set)
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .value_parser(BoolishValueParser::new()),
            ValueKind::Duration => arg
                .action(ArgAction::Set)
                .value_parser(parse_duration),
            ValueKind::StringArray => arg
                .action(ArgAction::Append)
                .value_parser(clap::value_parser!(String)),
        };

        if !self.default.is_empty() && self.kind != ValueKind::StringArray {
            arg = arg.default_value(self.default.clone());
        }

        arg
    }

    /// Render the left column (`  -v, --name type`) and the right column
    /// (usage plus default and deprecation notes) of a help line.
    pub(crate) fn usage_columns(&self) -> (String, String) {
        let mut left = match self.shorthand {
            Some(c) => format!("  -{c}, --{}", self.name),
            None => format!("      --{}", self.name),
        };
        let type_name = self.kind.type_name();
        if !type_name.is_empty() {
            left.push(' ');
            left.push_str(type_name);
        }

        let mut right = self.usage.clone();
        if !self.kind.is_zero_default(&self.default) {
            match self.kind {
                ValueKind::String => right.push_str(&format!(" (default {:?})", self.default)),
                _ => right.push_str(&format!(" (default {})", self.default)),
            }
        }
        if let Some(message) = &self.deprecated {
            right.push_str(&format!(" (DEPRECATED: {message})"));
        }

        (left, right)
    }
}

/// A titled, ordered group of flags
#[derive(Clone, Debug)]
pub struct FlagSet {
    name: String,
    flags: Vec<Flag>,
}

impl FlagSet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            flags: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.flags.iter().find(|f| f.name == name)
    }

    fn push(&mut self, flag: Flag) -> &mut Flag {
        self.flags.push(flag);
        let last = self.flags.len() - 1;
        &mut self.flags[last]
    }

    /// Register a string flag. An empty default means "unset".
    pub fn string(&mut self, name: &str, default: &str, usage: &str) -> &mut Flag {
        self.push(Flag::new(name, ValueKind::String, default.to_string(), usage))
    }

    /// Register a signed integer flag.
    pub fn int(&mut self, name: &str, default: i64, usage: &str) -> &mut Flag {
        let kind = ValueKind::Int {
            min: i64::MIN,
            max: i64::MAX,
        };
        self.push(Flag::new(name, kind, default.to_string(), usage))
    }

    pub fn bool(&mut self, name: &str, default: bool, usage: &str) -> &mut Flag {
        self.push(Flag::new(name, ValueKind::Bool, default.to_string(), usage))
    }

    /// Register a duration flag; `default` uses the same syntax as the
    /// command line (`0`, `30s`, `1h30m`).
    pub fn duration(&mut self, name: &str, default: &str, usage: &str) -> &mut Flag {
        self.push(Flag::new(name, ValueKind::Duration, default.to_string(), usage))
    }

    /// Register a repeatable string flag.
    pub fn string_array(&mut self, name: &str, usage: &str) -> &mut Flag {
        self.push(Flag::new(name, ValueKind::StringArray, String::new(), usage))
    }
}

/// Parse a Go-style duration such as `0`, `250ms`, `30s` or `1h30m`.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err("empty duration".to_string());
    }

    let mut total = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(format!("invalid duration {input:?}"));
        }
        let number: f64 = rest[..number_len]
            .parse()
            .map_err(|_| format!("invalid duration {input:?}"))?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let seconds_per_unit = match &rest[..unit_len] {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            "" => return Err(format!("missing unit in duration {input:?}")),
            unit => return Err(format!("unknown unit {unit:?} in duration {input:?}")),
        };
        rest = &rest[unit_len..];
        total += number * seconds_per_unit;
    }

    Duration::try_from_secs_f64(total).map_err(|e| format!("invalid duration {input:?}: {e}"))
}
