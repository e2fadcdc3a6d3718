use crate::jobs::JobControl;
use anyhow::Result;
use libc::c_int;
use nix::sys::signal::Signal;
use signal_hook::iterator::Signals;
use signal_hook::iterator::backend::Handle;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::debug;

/// Watches SIGCHLD on a dedicated thread and drains terminated children
/// through [`JobControl::reap_finished`].
///
/// Running the drain on an ordinary thread instead of inside the signal
/// handler keeps table mutation and notice formatting out of the
/// async-signal context; the iterator hands the coalesced signal over at a
/// safe point.
pub struct Reaper {
    handle: Handle,
    thread: JoinHandle<()>,
}

impl Reaper {
    /// Install the SIGCHLD watcher and start the drain thread.
    pub fn spawn(control: Arc<JobControl>) -> Result<Self> {
        let mut signals = Signals::new([Signal::SIGCHLD as c_int])?;
        let handle = signals.handle();
        let thread = std::thread::Builder::new()
            .name("reaper".to_string())
            .spawn(move || {
                for signal in signals.forever() {
                    let reaped = control.reap_finished();
                    debug!(signal, reaped, "drained terminated children");
                }
            })?;
        Ok(Self { handle, thread })
    }

    /// Stop watching and join the thread.
    ///
    /// Children already collected stay collected; anything terminating
    /// afterwards is no longer reaped.
    pub fn shutdown(self) {
        self.handle.close();
        let _ = self.thread.join();
    }
}
