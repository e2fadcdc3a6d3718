use nix::unistd::Pid;
use thiserror::Error;

/// Job sequence number shown to the user in notices, e.g. `[3] 12345`.
///
/// Assigned strictly increasing from 1 at registration time and never reused,
/// even when registration itself fails.
pub type JobId = u32;

/// One tracked child process and its shell-visible metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub pid: Pid,
    pub number: JobId,
    pub background: bool,
    /// Command line the job was launched with, echoed in completion notices.
    pub command: String,
}

/// Returned by [`ProcessTable::register`] when the table is at capacity.
///
/// The child keeps running; it is simply untracked, and its completion notice
/// is lost.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("job table is full ({capacity} active jobs)")]
pub struct TableFull {
    pub capacity: usize,
}

/// Bounded, insertion-ordered registry of currently-active jobs.
///
/// A job is present exactly from successful registration until the reap path
/// removes it. Lookup is a linear scan; the table never holds more than a
/// couple dozen entries.
#[derive(Debug)]
pub struct ProcessTable {
    jobs: Vec<Job>,
    capacity: usize,
}

impl ProcessTable {
    pub fn new(capacity: usize) -> Self {
        Self {
            jobs: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a job, keeping insertion order.
    pub fn register(&mut self, job: Job) -> Result<(), TableFull> {
        if self.jobs.len() >= self.capacity {
            return Err(TableFull {
                capacity: self.capacity,
            });
        }
        self.jobs.push(job);
        Ok(())
    }

    /// Remove and return the job with the given pid.
    ///
    /// `None` is a recoverable miss: the pid belongs to a process the table
    /// never tracked or no longer tracks. Removal preserves the order of the
    /// remaining entries.
    pub fn remove(&mut self, pid: Pid) -> Option<Job> {
        let at = self.jobs.iter().position(|job| job.pid == pid)?;
        Some(self.jobs.remove(at))
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.jobs.iter().any(|job| job.pid == pid)
    }

    /// Tracked jobs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
