//! Clikor -- system-wide mouse click recorder and replayer.
//!
//! Entry point, logger setup, and a line-oriented command loop over the
//! three engine actions: `record`, `stop`, `play` (plus `quit`). Lifecycle
//! errors are reported and leave the loop running, so a refused start can
//! simply be retried.

mod app;
mod error;
mod event;
mod platform;
mod replay;

use std::io::{self, BufRead};

use app::App;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("clikor v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), error::EngineError> {
    let mut app = App::with_platform_backends()?;

    println!("commands: record, stop, play, quit");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };

        match line.trim() {
            "record" => match app.on_record_pressed() {
                Ok(()) => println!("recording... click anywhere, then type 'stop'"),
                Err(e) => log::error!("{e}"),
            },
            "stop" => {
                app.on_stop_pressed();
                println!("{} events recorded", app.recorded_events());
            }
            "play" => match app.on_play_pressed() {
                Ok(outcome) => {
                    println!("replayed {} events ({} failed)", outcome.injected, outcome.failed)
                }
                Err(e) => log::error!("{e}"),
            },
            "quit" | "exit" => break,
            "" => {}
            other => println!("unknown command: {other}"),
        }
    }

    // The hook must not outlive the loop.
    if app.is_recording() {
        app.on_stop_pressed();
    }
    Ok(())
}
