// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The relay loop: multiplexed reading, line assembly, prefixing.
//!
//! Readiness and reading sit behind the [`Source`] trait so the loop can
//! be exercised with scripted byte sequences instead of real descriptors.

use std::io::{self, Write};
use std::mem;

use crate::channel::{Channel, ChannelKind, Status};
use crate::prefix::PrefixBuilder;
use crate::time::Clock;

/// Bytes read per readiness event and channel.
pub const READ_CHUNK: usize = 4096;

/// Result of one readiness wait.
#[derive(Debug)]
pub enum Wake {
    /// Channels with data (or EOF) available.
    Ready(Vec<ChannelKind>),
    /// An interrupt signal arrived; the caller shuts down.
    Interrupted,
}

/// Why the relay stopped pumping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Both channels reached end of stream.
    Eof,
    /// Interrupted before end of stream; the final drain is skipped.
    Interrupted,
}

/// Readiness waiting and non-blocking reads over a set of channels.
pub trait Source {
    /// Block until at least one watched channel is readable. No timeout.
    fn wait(&mut self) -> io::Result<Wake>;

    /// Non-blocking read; `Ok(None)` when the channel has no data after all.
    fn read(&mut self, kind: ChannelKind, buf: &mut [u8]) -> io::Result<Option<usize>>;

    /// Stop watching a channel once it reported end of stream.
    fn close(&mut self, kind: ChannelKind);
}

/// The two real output streams the relay writes through.
pub struct Sinks<'a> {
    pub out: &'a mut dyn Write,
    pub err: &'a mut dyn Write,
}

impl<'a> Sinks<'a> {
    fn for_kind(&mut self, kind: ChannelKind) -> &mut (dyn Write + 'a) {
        match kind {
            ChannelKind::Stdout => &mut *self.out,
            ChannelKind::Stderr => &mut *self.err,
        }
    }
}

/// Line-assembling relay between a source and the real output streams.
pub struct Relay<'a, S: Source> {
    source: S,
    sinks: Sinks<'a>,
    prefixer: PrefixBuilder<'a>,
    clock: &'a dyn Clock,
    channels: [Channel; 2],
}

impl<'a, S: Source> Relay<'a, S> {
    pub fn new(
        source: S,
        sinks: Sinks<'a>,
        prefixer: PrefixBuilder<'a>,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            source,
            sinks,
            prefixer,
            clock,
            channels: [
                Channel::new(ChannelKind::Stdout),
                Channel::new(ChannelKind::Stderr),
            ],
        }
    }

    /// Run until both channels reach end of stream or an interrupt arrives.
    pub fn pump(&mut self) -> io::Result<Outcome> {
        let mut buf = [0u8; READ_CHUNK];

        while self.channels.iter().any(|c| c.status == Status::Open) {
            let ready = match self.source.wait()? {
                Wake::Interrupted => return Ok(Outcome::Interrupted),
                Wake::Ready(kinds) => kinds,
            };

            // Error output wins the tie when both channels are ready in
            // the same wake.
            for kind in ChannelKind::PRIORITY {
                if !ready.contains(&kind) || self.channels[kind.index()].status != Status::Open {
                    continue;
                }
                match self.source.read(kind, &mut buf) {
                    // EOF and read errors both end the channel; the other
                    // channel keeps flowing.
                    Ok(Some(0)) | Err(_) => self.shut(kind),
                    Ok(Some(n)) => self.emit_batch(kind, &buf[..n])?,
                    // Spurious wake; nothing to do.
                    Ok(None) => {}
                }
            }
        }

        Ok(Outcome::Eof)
    }

    /// Flush whatever is left once the child has exited.
    ///
    /// Channels drain stderr first, matching the pump loop's tie-break. A
    /// line left dangling by the last batch is terminated here even when
    /// no buffered bytes remain.
    pub fn drain(&mut self) -> io::Result<()> {
        for kind in ChannelKind::PRIORITY {
            let channel = &mut self.channels[kind.index()];
            if channel.status != Status::HalfClosed {
                continue;
            }

            let leftover = mem::take(&mut channel.buffer);
            let writer = self.sinks.for_kind(kind);
            if !leftover.is_empty() && !channel.line_in_progress {
                let prefix = self.prefixer.build(kind, self.clock.now());
                writer.write_all(&prefix)?;
            }
            writer.write_all(&leftover)?;
            writer.write_all(b"\n")?;
            writer.flush()?;

            channel.line_in_progress = false;
            channel.status = Status::Closed;
        }
        Ok(())
    }

    fn shut(&mut self, kind: ChannelKind) {
        self.source.close(kind);
        let channel = &mut self.channels[kind.index()];
        channel.status = if channel.buffer.is_empty() && !channel.line_in_progress {
            Status::Closed
        } else {
            Status::HalfClosed
        };
    }

    /// Split one batch into lines, prefix them, and write through.
    fn emit_batch(&mut self, kind: ChannelKind, chunk: &[u8]) -> io::Result<()> {
        let channel = &mut self.channels[kind.index()];
        channel.buffer.extend_from_slice(chunk);
        let data = mem::take(&mut channel.buffer);

        // One timestamp per batch; every line in it shares the prefix.
        let prefix = self.prefixer.build(kind, self.clock.now());
        let writer = self.sinks.for_kind(kind);

        let mut segments: Vec<&[u8]> = data.split(|&b| b == b'\n').collect();
        let remainder = segments.pop().unwrap_or_default();

        for line in segments {
            if channel.line_in_progress {
                channel.line_in_progress = false;
            } else {
                writer.write_all(&prefix)?;
            }
            writer.write_all(line)?;
            writer.write_all(b"\n")?;
        }

        if !remainder.is_empty() {
            // A continuation of an already-started line keeps its original
            // prefix; only a fresh partial line gets one.
            if !channel.line_in_progress {
                writer.write_all(&prefix)?;
                channel.line_in_progress = true;
            }
            writer.write_all(remainder)?;
        }

        writer.flush()
    }
}

#[cfg(test)]
#[path = "relay_tests.rs"]
mod tests;
