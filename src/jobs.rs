use crate::notice::{Notice, NoticeSink};
use crate::table::{Job, JobId, ProcessTable};
use nix::errno::Errno;
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use nix::unistd::{ForkResult, Pid, execvp, fork};
use std::ffi::{CString, NulError};
use std::process;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{debug, warn};

/// A command line already split into words by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub program: String,
    pub args: Vec<String>,
    pub background: bool,
    /// The command line with any trailing `&` stripped; echoed in notices.
    pub text: String,
}

/// What [`JobControl::launch`] hands back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobHandle {
    pub number: JobId,
    pub pid: Pid,
    pub background: bool,
    /// False when the table was full and the job runs untracked.
    pub tracked: bool,
}

/// Failures that prevent a job from being created at all.
///
/// An exec failure is not represented here: it happens in the child, which
/// reports it on stderr and exits with status 1, and the parent observes it
/// as an ordinary termination.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("fork failed: {0}")]
    ForkFailed(Errno),
    #[error("command contains an interior NUL byte: {0}")]
    BadArgument(#[from] NulError),
}

struct State {
    table: ProcessTable,
    next_number: JobId,
    notices: Box<dyn NoticeSink>,
}

/// Shared job-control state: the launch entry point, the reap drain, and the
/// waits that tie the two together.
///
/// One instance lives for the whole shell session, shared between the main
/// loop and the [`Reaper`](crate::Reaper) thread. All table mutation happens
/// under a single mutex, so neither side can observe a half-updated table.
pub struct JobControl {
    state: Mutex<State>,
    reaped: Condvar,
}

impl JobControl {
    pub fn new(capacity: usize, notices: Box<dyn NoticeSink>) -> Self {
        Self {
            state: Mutex::new(State {
                table: ProcessTable::new(capacity),
                next_number: 1,
                notices,
            }),
            reaped: Condvar::new(),
        }
    }

    // Poisoning is absorbed: the reaper keeps running even if another holder
    // panicked mid-update.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fork `cmd` and register it in the job table.
    ///
    /// Background launches emit a start notice and return immediately.
    /// Foreground launches do not return until the reaper has removed the
    /// child's pid from the table; background children terminating in the
    /// meantime are reaped without disturbing the wait.
    pub fn launch(&self, cmd: &ParsedCommand) -> Result<JobHandle, SpawnError> {
        let program = CString::new(cmd.program.as_str())?;
        let mut argv = Vec::with_capacity(cmd.args.len() + 1);
        argv.push(program.clone());
        for arg in &cmd.args {
            argv.push(CString::new(arg.as_str())?);
        }

        // The lock spans fork and register: the reap drain cannot observe a
        // child that is not yet in the table, however quickly it exits.
        let mut state = self.state();
        let child = match unsafe { fork() } {
            Ok(ForkResult::Child) => {
                // Nothing but exec and exit happens here; the child must
                // never fall through into the parent's logic.
                if let Err(errno) = execvp(&program, &argv) {
                    eprintln!("jobshell: {}: {}", cmd.program, errno.desc());
                }
                process::exit(1);
            }
            Ok(ForkResult::Parent { child }) => child,
            Err(errno) => return Err(SpawnError::ForkFailed(errno)),
        };

        // Registration failures still consume a job number.
        let number = state.next_number;
        state.next_number += 1;

        let registered = state.table.register(Job {
            pid: child,
            number,
            background: cmd.background,
            command: cmd.text.clone(),
        });
        if let Err(full) = registered {
            warn!(pid = child.as_raw(), "{full}, job runs untracked");
        }

        let handle = JobHandle {
            number,
            pid: child,
            background: cmd.background,
            tracked: registered.is_ok(),
        };

        if cmd.background {
            state.notices.emit(Notice::Started {
                number,
                pid: child,
            });
            return Ok(handle);
        }

        // The reaper owns removal for every job, this one included; wait for
        // the pid to leave the table. Reaps of other jobs signal the condvar
        // without satisfying the predicate. An untracked foreground job has
        // no entry to wait on and returns right away.
        while state.table.contains(child) {
            state = self
                .reaped
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        Ok(handle)
    }

    /// Drain every terminated child, removing each from the table and
    /// emitting completion notices in reap order. Returns how many children
    /// were collected.
    ///
    /// One SIGCHLD delivery may stand for several exits, so the caller must
    /// not assume one child per invocation; this loop polls until no
    /// terminated child remains. A reaped pid without a table entry is a
    /// benign miss.
    pub fn reap_finished(&self) -> usize {
        let mut state = self.state();
        let mut reaped = 0;
        loop {
            let pid = match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
                Ok(WaitStatus::Exited(pid, _)) => pid,
                Ok(WaitStatus::Signaled(pid, _, _)) => pid,
                // StillAlive, or a stop/continue report; neither ends a job.
                Ok(_) => break,
                Err(Errno::ECHILD) => break,
                Err(Errno::EINTR) => continue,
                Err(errno) => {
                    warn!("waitpid failed: {errno}");
                    break;
                }
            };
            reaped += 1;
            match state.table.remove(pid) {
                Some(job) if job.background => {
                    state.notices.emit(Notice::Finished {
                        number: job.number,
                        command: job.command,
                    });
                }
                Some(job) => {
                    debug!(pid = pid.as_raw(), "foreground job [{}] finished", job.number);
                    state
                        .notices
                        .emit(Notice::ForegroundFinished { number: job.number });
                }
                None => debug!(pid = pid.as_raw(), "reaped a pid with no table entry"),
            }
        }
        if reaped > 0 {
            self.reaped.notify_all();
        }
        reaped
    }

    /// Block until the table is empty.
    ///
    /// The end-of-input path uses this to let remaining jobs finish before
    /// the shell exits.
    pub fn wait_for_all(&self) {
        let mut state = self.state();
        while !state.table.is_empty() {
            state = self
                .reaped
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Number of currently-tracked jobs.
    pub fn active_jobs(&self) -> usize {
        self.state().table.len()
    }

    /// Whether the table currently holds an entry for `pid`.
    pub fn is_tracked(&self, pid: Pid) -> bool {
        self.state().table.contains(pid)
    }
}
