// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Display configuration resolved once at startup.

use crate::cli::Cli;

/// How timestamps are rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimestampMode {
    /// Seconds since the session started (the default).
    Relative,
    /// Absolute seconds since the Unix epoch.
    Unix,
    /// UTC wall-clock date and time.
    Utc,
}

/// Field separator style inside the prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delimiter {
    /// `1@0.123456: line`
    Colon,
    /// `1 0.123456 line`
    Space,
}

impl Delimiter {
    /// Separator between the timestamp and the line content.
    pub fn field(self) -> &'static str {
        match self {
            Delimiter::Colon => ": ",
            Delimiter::Space => " ",
        }
    }

    /// Separator between the stream id and the timestamp in verbose mode.
    pub fn id_tag(self) -> &'static str {
        match self {
            Delimiter::Colon => "@",
            Delimiter::Space => " ",
        }
    }
}

/// Resolved display options, passed by reference wherever prefixes are built.
#[derive(Clone, Debug)]
pub struct Config {
    pub mode: TimestampMode,
    pub color: bool,
    pub verbose: bool,
    pub delimiter: Delimiter,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        let mode = if cli.utc {
            TimestampMode::Utc
        } else if cli.unix {
            TimestampMode::Unix
        } else {
            TimestampMode::Relative
        };

        Self {
            mode,
            color: !cli.no_color,
            verbose: cli.verbose,
            delimiter: if cli.space {
                Delimiter::Space
            } else {
                Delimiter::Colon
            },
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
