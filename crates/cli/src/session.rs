// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One wrapped run: launch the child, pump the relay, shut down.

use std::io;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;
use nix::sys::signal::Signal;

use crate::config::Config;
use crate::prefix::PrefixBuilder;
use crate::pty::{self, PtySource, TermGuard};
use crate::relay::{Outcome, Relay, Sinks};
use crate::time::{Clock, SystemClock};

/// Exit status reported when an interrupt cut the run short.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Run `command` under the relay and return the exit status to report.
pub fn run(config: &Config, command: &[String]) -> Result<i32> {
    // Terminal attributes are saved before the child exists and restored
    // whenever this function returns.
    let _guard = TermGuard::capture();

    let interrupted = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&interrupted))?;

    let (masters, child) = pty::launch(command, config.color)?;

    let clock = SystemClock;
    let session_start = clock.now();
    let prefixer = PrefixBuilder::new(config, session_start);

    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();
    let sinks = Sinks {
        out: &mut out,
        err: &mut err,
    };

    let source = PtySource::new(masters, Arc::clone(&interrupted));
    let mut relay = Relay::new(source, sinks, prefixer, &clock);

    match relay.pump()? {
        Outcome::Interrupted => {
            // Buffered partial data is dropped on purpose here; the child
            // is told to stop and the terminal guard still restores state.
            let _ = child.signal(Signal::SIGTERM);
            Ok(EXIT_INTERRUPTED)
        }
        Outcome::Eof => {
            let status = child.wait()?;
            relay.drain()?;
            Ok(status)
        }
    }
}
