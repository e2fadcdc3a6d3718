use anyhow::Result;
use argh::FromArgs;
use jobshell::builtin::try_builtin;
use jobshell::env::Environment;
use jobshell::lexer::parse_line;
use jobshell::{ConsoleSink, JobControl, Reaper};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Minimal interactive shell that tracks background jobs.
#[derive(FromArgs)]
struct Args {
    /// maximum number of concurrently tracked jobs
    #[argh(option, default = "20")]
    max_jobs: usize,
    /// prompt shown before each input line
    #[argh(option, default = "String::from(\"$ \")")]
    prompt: String,
}

fn main() -> Result<()> {
    let args: Args = argh::from_env();

    let default_level = "warn";
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let control = Arc::new(JobControl::new(args.max_jobs, Box::new(ConsoleSink)));
    let reaper = Reaper::spawn(Arc::clone(&control))?;

    repl(&control, &args.prompt)?;

    // end of input: let the remaining jobs finish, then leave cleanly
    control.wait_for_all();
    reaper.shutdown();
    Ok(())
}

fn repl(control: &JobControl, prompt: &str) -> Result<()> {
    let mut rl = DefaultEditor::new()?;
    let mut env = Environment::new();

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                rl.add_history_entry(line.as_str())?;
                let Some(cmd) = parse_line(&line) else { continue };

                let args: Vec<&str> = cmd.args.iter().map(|arg| arg.as_str()).collect();
                if let Some(result) = try_builtin(&mut env, &cmd.program, &args) {
                    if let Err(err) = result {
                        eprintln!("jobshell: {err:#}");
                    }
                    if env.should_exit {
                        break;
                    }
                    continue;
                }

                if let Err(err) = control.launch(&cmd) {
                    eprintln!("jobshell: {err}");
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
