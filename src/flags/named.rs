//! Ordered registry of titled flag sets and the help renderer for it

use std::collections::HashMap;
use std::fmt::{self, Write};

use clap::parser::ValueSource;
use clap::ArgMatches;

use super::flag_set::FlagSet;
use crate::error::{Error, Result};

/// Names clap reserves on every command.
const BUILTIN_GROUP: &str = "builtin";
const RESERVED_LONGS: [&str; 2] = ["help", "version"];
const RESERVED_SHORTS: [char; 2] = ['h', 'V'];

/// Flag sets keyed by title, kept in the order they were first requested
#[derive(Clone, Debug, Default)]
pub struct NamedFlagSets {
    sets: Vec<FlagSet>,
}

impl NamedFlagSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the set titled `name`, creating it at the end of the order if
    /// it does not exist yet.
    pub fn flag_set(&mut self, name: &str) -> &mut FlagSet {
        let index = match self.sets.iter().position(|s| s.name() == name) {
            Some(index) => index,
            None => {
                self.sets.push(FlagSet::new(name));
                self.sets.len() - 1
            }
        };
        &mut self.sets[index]
    }

    pub fn get(&self, name: &str) -> Option<&FlagSet> {
        self.sets.iter().find(|s| s.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FlagSet> {
        self.sets.iter()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Reject any long name or shorthand defined more than once across all
    /// sets, including the names the parser reserves for itself.
    pub fn validate(&self) -> Result<()> {
        let mut longs: HashMap<&str, &str> = RESERVED_LONGS
            .iter()
            .map(|name| (*name, BUILTIN_GROUP))
            .collect();
        let mut shorts: HashMap<char, &str> = RESERVED_SHORTS
            .iter()
            .map(|c| (*c, BUILTIN_GROUP))
            .collect();

        for set in &self.sets {
            for flag in set.flags() {
                if let Some(previous) = longs.insert(flag.name(), set.name()) {
                    return Err(Error::FlagRedefined {
                        flag: format!("--{}", flag.name()),
                        group: set.name().to_string(),
                        previous: previous.to_string(),
                    });
                }
                if let Some(c) = flag.short() {
                    if let Some(previous) = shorts.insert(c, set.name()) {
                        return Err(Error::FlagRedefined {
                            flag: format!("-{c}"),
                            group: set.name().to_string(),
                            previous: previous.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Warnings for every deprecated flag that was passed on the command line.
    pub fn deprecation_warnings(&self, matches: &ArgMatches) -> Vec<String> {
        self.sets
            .iter()
            .flat_map(|set| set.flags())
            .filter_map(|flag| {
                let message = flag.deprecation()?;
                match matches.value_source(flag.name()) {
                    Some(ValueSource::CommandLine) => Some(format!(
                        "Flag --{} has been deprecated, {}",
                        flag.name(),
                        message
                    )),
                    _ => None,
                }
            })
            .collect()
    }

    /// Render all non-empty sections into a string.
    pub fn sections(&self, cols: usize) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = print_sections(&mut out, self, cols);
        out
    }
}

/// Write each non-empty set as a titled section, in registration order.
///
/// `cols` wraps usage text to that terminal width; `0` disables wrapping.
pub fn print_sections<W: Write>(w: &mut W, sets: &NamedFlagSets, cols: usize) -> fmt::Result {
    for set in sets.iter() {
        if set.is_empty() {
            continue;
        }
        write!(w, "\n{} flags:\n\n{}", set.name(), flag_usages(set, cols))?;
    }
    Ok(())
}

/// Aligned usage lines for one set.
pub fn flag_usages(set: &FlagSet, cols: usize) -> String {
    let columns: Vec<(String, String)> = set.flags().iter().map(|f| f.usage_columns()).collect();
    let width = columns.iter().map(|(left, _)| left.len()).max().unwrap_or(0);

    let mut out = String::new();
    for (left, right) in columns {
        out.push_str(&format!(
            "{left:<width$}   {}\n",
            wrap(width + 3, cols, &right)
        ));
    }
    out
}

/// Wrap `text` to `cols`, indenting continuation lines by `indent`.
fn wrap(indent: usize, cols: usize, text: &str) -> String {
    let padding = format!("\n{}", " ".repeat(indent));
    if cols == 0 || cols <= indent + 24 {
        return text.replace('\n', &padding);
    }

    let limit = cols - indent;
    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.len() + 1 + word.len() > limit {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines.join(&padding)
}
