// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! CLI argument parsing.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "tsout",
    about = "Timestamp stdout/stderr output with microsecond precision"
)]
pub struct Cli {
    /// Show Unix timestamps
    #[arg(short = 'T', conflicts_with = "utc")]
    pub unix: bool,

    /// Show UTC timestamps
    #[arg(short = 'u')]
    pub utc: bool,

    /// Show the originating stream id (1 stdout, 2 stderr)
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Disable color output
    #[arg(short = 'C')]
    pub no_color: bool,

    /// Use a space as the field delimiter
    #[arg(short = 's')]
    pub space: bool,

    /// Command to run and its arguments
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
