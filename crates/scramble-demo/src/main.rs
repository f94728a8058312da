#![forbid(unsafe_code)]

//! Scramble demo binary entry point.

use std::io::Stdout;
use std::thread;
use std::time::Duration;

use scramble_core::SeededRandom;
use scramble_demo::cli::Opts;
use scramble_demo::{Result, Settled, TerminalLine, drive, load_config};
use scramble_runtime::{IntervalFrames, Session};
use tracing_subscriber::EnvFilter;

type DemoSession = Session<IntervalFrames, TerminalLine<Stdout>>;

fn main() {
    init_logging();
    let opts = Opts::parse();
    if let Err(e) = run(&opts) {
        eprintln!("scramble-demo: {e}");
        std::process::exit(1);
    }
}

/// Log to stderr only when `SCRAMBLE_LOG` is set, so stdout stays clean.
fn init_logging() {
    let Ok(filter) = std::env::var("SCRAMBLE_LOG") else {
        return;
    };
    let filter = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(opts: &Opts) -> Result<()> {
    let base = load_config(opts.config_path.as_deref())?;
    let config = opts.patch.apply(base);
    let phrases = opts.phrases();
    let rng = opts
        .rng_seed
        .map_or_else(SeededRandom::from_entropy, SeededRandom::seeded);

    let first = phrases.first().cloned().unwrap_or_default();
    let mut session: DemoSession = Session::new(first, config, IntervalFrames::from_fps(opts.fps))
        .with_random(rng)
        .with_sink(TerminalLine::stdout());
    for issue in session.config_issues() {
        eprintln!("warning: {issue}");
    }
    if let Some(sink) = session.sink_mut() {
        sink.begin()?;
    }

    let result = play_all(&mut session, &phrases, opts);
    if let Some(sink) = session.sink_mut() {
        sink.finish()?;
    }
    result
}

fn play_all(session: &mut DemoSession, phrases: &[String], opts: &Opts) -> Result<()> {
    let hold = Duration::from_millis(opts.hold_ms);
    session.mount();
    let mut first = true;
    loop {
        for phrase in phrases {
            if !first {
                if session.target().as_str() == phrase {
                    session.replay();
                } else {
                    session.set_text(phrase);
                }
            }
            first = false;

            match drive(session, |host| host.wait_next())? {
                Settled::Complete => thread::sleep(hold),
                Settled::Parked => {
                    eprintln!("\nspeed is 0; nothing to animate");
                    return Ok(());
                }
                Settled::Stopped => return Ok(()),
            }
        }
        if !opts.repeat {
            return Ok(());
        }
    }
}
