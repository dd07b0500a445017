// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tsout binary entry point.

use clap::{CommandFactory, Parser};

use tsout::cli::Cli;
use tsout::config::Config;
use tsout::session;

fn main() {
    let cli = Cli::parse();

    if cli.command.is_empty() {
        let _ = Cli::command().print_help();
        std::process::exit(1);
    }

    let config = Config::from_cli(&cli);
    match session::run(&config, &cli.command) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("tsout: {e:#}");
            std::process::exit(1);
        }
    }
}
