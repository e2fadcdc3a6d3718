use crate::table::JobId;
use nix::unistd::Pid;
use std::sync::{Arc, Mutex, PoisonError};

/// A job event produced by the core for its collaborator to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A background job was launched.
    Started { number: JobId, pid: Pid },
    /// A background job terminated and was removed from the table.
    Finished { number: JobId, command: String },
    /// A foreground job terminated and was removed from the table.
    ///
    /// Interactive shells print nothing for this; it exists so the reap path
    /// stays observable through a sink.
    ForegroundFinished { number: JobId },
}

impl Notice {
    /// Console form of the event, or `None` for events the console keeps
    /// silent.
    pub fn render(&self) -> Option<String> {
        match self {
            Notice::Started { number, pid } => Some(format!("[{number}] {pid}")),
            Notice::Finished { number, command } => {
                Some(format!("[{number}]+ Done                 {command}"))
            }
            Notice::ForegroundFinished { .. } => None,
        }
    }
}

/// Output seam between the job-control core and whatever renders it.
///
/// Emission happens inside the core's critical section, so implementations
/// see notices in exactly the order table mutations happened.
pub trait NoticeSink: Send {
    fn emit(&mut self, notice: Notice);
}

/// Renders notices to standard output.
pub struct ConsoleSink;

impl NoticeSink for ConsoleSink {
    fn emit(&mut self, notice: Notice) {
        if let Some(line) = notice.render() {
            println!("{line}");
        }
    }
}

/// Collects notices in memory so tests can assert on them.
pub struct RecordingSink {
    buf: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingSink {
    /// Create the sink and return it together with a handle the caller can
    /// read collected notices through afterwards.
    pub fn with_handle() -> (Self, Arc<Mutex<Vec<Notice>>>) {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let handle = Arc::clone(&buf);
        (Self { buf }, handle)
    }
}

impl NoticeSink for RecordingSink {
    fn emit(&mut self, notice: Notice) {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_notice_matches_the_launch_line() {
        let notice = Notice::Started {
            number: 1,
            pid: Pid::from_raw(4321),
        };
        assert_eq!(notice.render().unwrap(), "[1] 4321");
    }

    #[test]
    fn finish_notice_echoes_the_command() {
        let notice = Notice::Finished {
            number: 2,
            command: "sleep 2".to_string(),
        };
        assert_eq!(
            notice.render().unwrap(),
            "[2]+ Done                 sleep 2"
        );
    }

    #[test]
    fn foreground_finish_renders_nothing() {
        let notice = Notice::ForegroundFinished { number: 7 };
        assert!(notice.render().is_none());
    }

    #[test]
    fn recording_sink_keeps_emission_order() {
        let (mut sink, notices) = RecordingSink::with_handle();
        sink.emit(Notice::Started {
            number: 1,
            pid: Pid::from_raw(100),
        });
        sink.emit(Notice::ForegroundFinished { number: 2 });

        let recorded = notices.lock().unwrap();
        assert_eq!(recorded.len(), 2);
        assert_eq!(recorded[1], Notice::ForegroundFinished { number: 2 });
    }
}
