// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Dual-PTY child launching and poll-based readiness.
//!
//! Each of the child's output streams gets its own pseudo-terminal pair,
//! so the child sees both stdout and stderr as interactive terminals and
//! keeps line-buffered output instead of the fully-buffered behavior it
//! would fall into on pipes.

use std::ffi::CString;
use std::io::{self, IsTerminal};
use std::os::fd::{AsFd, AsRawFd, OwnedFd};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use nix::errno::Errno;
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::pty::openpty;
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::termios::{tcgetattr, tcsetattr, SetArg, Termios};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{dup2, execvp, fork, setsid, ForkResult, Pid};
use thiserror::Error;

use crate::channel::ChannelKind;
use crate::relay::{Source, Wake};

/// Errors that abort the launch before a child exists.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("no command given")]
    EmptyCommand,

    #[error("invalid command argument: {0}")]
    BadArg(#[from] std::ffi::NulError),

    #[error("failed to allocate pseudo-terminal: {0}")]
    OpenPty(#[source] nix::Error),

    #[error("failed to fork: {0}")]
    Fork(#[source] nix::Error),

    #[error("failed to configure pty descriptor: {0}")]
    Nonblock(#[source] nix::Error),
}

/// Parent-side master descriptors, one per output stream.
pub struct PtyMasters {
    pub stdout: OwnedFd,
    pub stderr: OwnedFd,
}

/// A running child process.
pub struct Child {
    pid: Pid,
}

impl Child {
    /// Forward a signal to the child.
    pub fn signal(&self, signal: Signal) -> nix::Result<()> {
        nix::sys::signal::kill(self.pid, signal)
    }

    /// Wait for the child to exit and return its exit code.
    pub fn wait(self) -> nix::Result<i32> {
        loop {
            match waitpid(self.pid, None) {
                Ok(WaitStatus::Exited(_, code)) => return Ok(code),
                Ok(WaitStatus::Signaled(_, sig, _)) => return Ok(128 + sig as i32),
                Ok(_) => return Ok(1),
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Spawn `command` with stdout and stderr each backed by its own pty.
///
/// Returns the parent-side masters, already non-blocking, and the child
/// handle for signalling and reaping.
pub fn launch(command: &[String], color: bool) -> Result<(PtyMasters, Child), LaunchError> {
    let program = CString::new(
        command
            .first()
            .ok_or(LaunchError::EmptyCommand)?
            .as_str(),
    )?;
    let args: Vec<CString> = command
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<Result<_, _>>()?;

    let out = openpty(None, None).map_err(LaunchError::OpenPty)?;
    let err = openpty(None, None).map_err(LaunchError::OpenPty)?;

    // SAFETY: the child branch only adjusts descriptors and signal
    // dispositions before exec; no allocation or locking happens between
    // fork and exec.
    match unsafe { fork() }.map_err(LaunchError::Fork)? {
        ForkResult::Child => {
            drop(out.master);
            drop(err.master);

            // New session: terminal signals aimed at the wrapper's group
            // must not reach the child directly.
            let _ = setsid();

            let _ = dup2(out.slave.as_raw_fd(), io::stdout().as_raw_fd());
            let _ = dup2(err.slave.as_raw_fd(), io::stderr().as_raw_fd());
            drop(out.slave);
            drop(err.slave);

            // SAFETY: restoring the default SIGPIPE disposition before
            // exec; the child has no other threads at this point.
            unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl).ok() };

            if !color {
                // Children that probe the terminal type will disable
                // their own ANSI coloring.
                std::env::set_var("TERM", "dumb");
            }

            let _ = execvp(&program, &args);
            std::process::exit(1);
        }
        ForkResult::Parent { child } => {
            drop(out.slave);
            drop(err.slave);

            set_non_blocking(&out.master).map_err(LaunchError::Nonblock)?;
            set_non_blocking(&err.master).map_err(LaunchError::Nonblock)?;

            Ok((
                PtyMasters {
                    stdout: out.master,
                    stderr: err.master,
                },
                Child { pid: child },
            ))
        }
    }
}

/// Saves the invoking terminal's attributes and restores them on drop.
///
/// The restore runs on every exit path, interrupt included, so a child
/// that fiddled with its ptys never leaves the user's terminal raw.
pub struct TermGuard {
    saved: Option<Termios>,
}

impl TermGuard {
    /// Capture the current attributes when stdin is a terminal.
    pub fn capture() -> Self {
        let stdin = io::stdin();
        let saved = if stdin.is_terminal() {
            tcgetattr(&stdin).ok()
        } else {
            None
        };
        Self { saved }
    }
}

impl Drop for TermGuard {
    fn drop(&mut self) {
        if let Some(saved) = &self.saved {
            let _ = tcsetattr(&io::stdin(), SetArg::TCSADRAIN, saved);
        }
    }
}

/// Poll-backed readiness source over the two pty masters.
pub struct PtySource {
    fds: [Option<OwnedFd>; 2],
    interrupted: Arc<AtomicBool>,
}

impl PtySource {
    pub fn new(masters: PtyMasters, interrupted: Arc<AtomicBool>) -> Self {
        let mut fds = [None, None];
        fds[ChannelKind::Stdout.index()] = Some(masters.stdout);
        fds[ChannelKind::Stderr.index()] = Some(masters.stderr);
        Self { fds, interrupted }
    }
}

impl Source for PtySource {
    fn wait(&mut self) -> io::Result<Wake> {
        loop {
            if self.interrupted.load(Ordering::Relaxed) {
                return Ok(Wake::Interrupted);
            }

            let mut kinds = Vec::new();
            let mut pollfds = Vec::new();
            for kind in ChannelKind::PRIORITY {
                if let Some(fd) = &self.fds[kind.index()] {
                    kinds.push(kind);
                    pollfds.push(PollFd::new(fd.as_fd(), PollFlags::POLLIN));
                }
            }

            match poll(&mut pollfds, PollTimeout::NONE) {
                Ok(_) => {}
                // poll is never auto-restarted; a signal lands here and
                // the flag check above decides what it meant.
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(e.into()),
            }

            // Hangup and error both mean "reading will resolve it": the
            // next read reports EOF for them.
            let readable = PollFlags::POLLIN | PollFlags::POLLHUP | PollFlags::POLLERR;
            let ready: Vec<ChannelKind> = kinds
                .iter()
                .zip(&pollfds)
                .filter(|(_, pollfd)| pollfd.revents().is_some_and(|r| r.intersects(readable)))
                .map(|(kind, _)| *kind)
                .collect();

            if !ready.is_empty() {
                return Ok(Wake::Ready(ready));
            }
        }
    }

    fn read(&mut self, kind: ChannelKind, buf: &mut [u8]) -> io::Result<Option<usize>> {
        match &self.fds[kind.index()] {
            Some(fd) => non_blocking_read(fd, buf).map_err(io::Error::from),
            None => Ok(Some(0)),
        }
    }

    fn close(&mut self, kind: ChannelKind) {
        self.fds[kind.index()] = None;
    }
}

fn set_non_blocking<F: AsRawFd>(fd: &F) -> nix::Result<()> {
    let flags = fcntl(fd.as_raw_fd(), FcntlArg::F_GETFL)?;
    let flags = OFlag::from_bits_truncate(flags) | OFlag::O_NONBLOCK;
    fcntl(fd.as_raw_fd(), FcntlArg::F_SETFL(flags))?;
    Ok(())
}

/// Read, handling EAGAIN/EWOULDBLOCK. Returns None if would block.
fn non_blocking_read<F: AsRawFd>(fd: &F, buf: &mut [u8]) -> nix::Result<Option<usize>> {
    match nix::unistd::read(fd.as_raw_fd(), buf) {
        Ok(n) => Ok(Some(n)),
        Err(Errno::EAGAIN) => Ok(None),
        Err(Errno::EIO) => Ok(Some(0)), // PTY closed
        Err(e) => Err(e),
    }
}
