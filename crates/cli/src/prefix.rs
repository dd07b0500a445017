// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Prefix construction: color, optional stream id, timestamp, delimiter.

use std::time::SystemTime;

use crate::channel::{ChannelKind, COLOR_RESET};
use crate::config::Config;
use crate::time;

/// Builds the byte prefix attached to each emitted line.
///
/// Field order: color start (if enabled), stream id and id separator
/// (verbose mode), timestamp, field delimiter, color reset. The reset
/// closes the prefix itself, so line content renders uncolored.
pub struct PrefixBuilder<'a> {
    config: &'a Config,
    session_start: SystemTime,
}

impl<'a> PrefixBuilder<'a> {
    pub fn new(config: &'a Config, session_start: SystemTime) -> Self {
        Self {
            config,
            session_start,
        }
    }

    /// Assemble the prefix for one channel at one instant.
    pub fn build(&self, kind: ChannelKind, instant: SystemTime) -> Vec<u8> {
        let mut prefix = Vec::new();

        if self.config.color {
            prefix.extend_from_slice(kind.color().as_bytes());
        }

        if self.config.verbose {
            prefix.extend_from_slice(kind.stream_id().to_string().as_bytes());
            prefix.extend_from_slice(self.config.delimiter.id_tag().as_bytes());
        }

        let stamp = time::format_timestamp(instant, self.config.mode, self.session_start);
        prefix.extend_from_slice(stamp.as_bytes());
        prefix.extend_from_slice(self.config.delimiter.field().as_bytes());

        if self.config.color {
            prefix.extend_from_slice(COLOR_RESET.as_bytes());
        }

        prefix
    }
}

#[cfg(test)]
#[path = "prefix_tests.rs"]
mod tests;
