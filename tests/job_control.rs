//! End-to-end scenario driving the real SIGCHLD reaper thread.
//!
//! Kept as a single test: the reap drain waits on any child of the process,
//! so concurrent tests with their own reapers would steal each other's
//! children.

use jobshell::{JobControl, Notice, ParsedCommand, Reaper, RecordingSink};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

fn sleep_cmd(seconds: &str, background: bool) -> ParsedCommand {
    ParsedCommand {
        program: "sleep".to_string(),
        args: vec![seconds.to_string()],
        background,
        text: format!("sleep {seconds}"),
    }
}

fn wait_until<F>(notices: &Arc<Mutex<Vec<Notice>>>, what: &str, seen: F)
where
    F: Fn(&[Notice]) -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if seen(&notices.lock().unwrap()) {
            return;
        }
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn background_and_foreground_jobs_reconcile_with_the_reaper() {
    let (sink, notices) = RecordingSink::with_handle();
    let control = Arc::new(JobControl::new(2, Box::new(sink)));
    let reaper = Reaper::spawn(Arc::clone(&control)).expect("install SIGCHLD watcher");

    // two background jobs fill the table
    let first = control.launch(&sleep_cmd("0.2", true)).expect("launch first");
    let second = control.launch(&sleep_cmd("1", true)).expect("launch second");
    assert_eq!((first.number, second.number), (1, 2));
    assert!(first.tracked && second.tracked);
    assert_eq!(control.active_jobs(), 2);

    // the reaper collects the short job on its own, no polling call from us
    wait_until(&notices, "the first completion notice", |seen| {
        seen.contains(&Notice::Finished {
            number: 1,
            command: "sleep 0.2".to_string(),
        })
    });
    assert_eq!(control.active_jobs(), 1);

    // the second job is still running; a foreground launch must block for
    // its own child and must not be woken early when that job is reaped
    let started = Instant::now();
    let third = control.launch(&sleep_cmd("1", false)).expect("launch third");
    let elapsed = started.elapsed();
    assert_eq!(third.number, 3);
    assert!(!third.background);
    assert!(
        elapsed >= Duration::from_millis(900),
        "foreground launch returned after {elapsed:?}"
    );
    // the foreground job only returns once the reaper removed it
    assert!(!control.is_tracked(third.pid));

    control.wait_for_all();
    assert_eq!(control.active_jobs(), 0);
    reaper.shutdown();

    let recorded = notices.lock().unwrap();
    let started_numbers: Vec<u32> = recorded
        .iter()
        .filter_map(|n| match n {
            Notice::Started { number, .. } => Some(*number),
            _ => None,
        })
        .collect();
    assert_eq!(started_numbers, vec![1, 2]);

    let mut finished_numbers: Vec<u32> = recorded
        .iter()
        .filter_map(|n| match n {
            Notice::Finished { number, .. } => Some(*number),
            _ => None,
        })
        .collect();
    finished_numbers.sort_unstable();
    assert_eq!(finished_numbers, vec![1, 2]);

    // the foreground job went through the same removal path, observably
    assert!(recorded.contains(&Notice::ForegroundFinished { number: 3 }));
}
