// SPDX-License-Identifier: MIT
//
// n-replay — types one file's contents into another, live.
//
// Opens FILE as a buffer, finds the first file matching PATTERN under the
// current directory, and lets the animator walk the buffer toward that
// file's text a few chars per heartbeat, redrawing the terminal after each
// edit. On convergence the buffer is saved over FILE.
//
// A frame is just "clear screen, print buffer". Logs go to stderr
// (`RUST_LOG`, default `warn`) so they never tear a frame.
//
// Exit codes:
//
//   0   converged, FILE saved
//   1   bad arguments, FILE unreadable, target failed to load, or the
//       converged buffer could not be saved
//   130 interrupted with Ctrl-C before converging

use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use n_animate::host::{FsReader, GlobResolver, LogReporter};
use n_animate::{Animator, AnimatorConfig, Driver, Status, Tick};
use n_text::Buffer;

const USAGE: &str = "\
usage: n-replay [options] <FILE> <PATTERN>

Animate FILE into the contents of the first file matching PATTERN.

options:
  --chars N       chars typed per heartbeat (default 5)
  --interval MS   milliseconds between heartbeats (default 33)
  --quiet         don't redraw the terminal while typing
  -h, --help      show this help";

/// Clear the screen and home the cursor.
const CLEAR: &str = "\x1b[H\x1b[2J";

// ─── Arguments ──────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
struct Args {
    file: PathBuf,
    pattern: String,
    config: AnimatorConfig,
    quiet: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum Parsed {
    Run(Args),
    Help,
}

fn parse_number(flag: &str, value: Option<String>) -> Result<u64, String> {
    let value = value.ok_or_else(|| format!("{flag} needs a value"))?;
    value
        .parse()
        .map_err(|_| format!("{flag}: not a number: {value}"))
}

fn parse_args<I>(args: I) -> Result<Parsed, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut config = AnimatorConfig::default();
    let mut quiet = false;
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Parsed::Help),
            "--quiet" | "-q" => quiet = true,
            "--chars" => {
                let chars = parse_number("--chars", args.next())?;
                let chars = usize::try_from(chars).map_err(|e| format!("--chars: {e}"))?;
                config = config.with_chars_per_change(chars);
            }
            "--interval" => {
                let ms = parse_number("--interval", args.next())?;
                config = config.with_heartbeat_interval(Duration::from_millis(ms));
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("unknown option: {flag}"));
            }
            _ => positional.push(arg),
        }
    }

    let config = config.validate().map_err(|e| e.to_string())?;
    let mut positional = positional.into_iter();
    let (Some(file), Some(pattern), None) = (positional.next(), positional.next(), positional.next())
    else {
        return Err("expected exactly two arguments: <FILE> <PATTERN>".into());
    };

    Ok(Parsed::Run(Args {
        file: PathBuf::from(file),
        pattern,
        config,
        quiet,
    }))
}

// ─── Output ─────────────────────────────────────────────────────────────────

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};
    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .try_init();
}

/// Draw one frame: the whole buffer, from the top of the screen.
fn render(buffer: &Buffer, out: &mut impl Write) -> io::Result<()> {
    out.write_all(CLEAR.as_bytes())?;
    out.write_all(buffer.contents().as_bytes())?;
    out.flush()
}

/// Process exit code for how the run ended. `saved` is whether the
/// converging heartbeat managed to write FILE.
const fn exit_code(status: Status, saved: bool) -> i32 {
    match status {
        Status::Converged if saved => 0,
        Status::Stopped => 130,
        Status::Converged
        | Status::Failed
        | Status::Idle
        | Status::Loading
        | Status::Running => 1,
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    init_tracing();

    let args = match parse_args(env::args().skip(1)) {
        Ok(Parsed::Run(args)) => args,
        Ok(Parsed::Help) => {
            println!("{USAGE}");
            return;
        }
        Err(e) => {
            eprintln!("n-replay: {e}\n\n{USAGE}");
            process::exit(1);
        }
    };

    let mut buffer = Buffer::open(&args.file).unwrap_or_else(|e| {
        eprintln!("n-replay: cannot open {}: {e}", args.file.display());
        process::exit(1);
    });

    let root = env::current_dir().unwrap_or_else(|e| {
        eprintln!("n-replay: cannot determine current directory: {e}");
        process::exit(1);
    });

    let mut animator = Animator::new(
        args.pattern,
        Arc::new(GlobResolver::new(root)),
        Arc::new(FsReader),
        Box::new(LogReporter),
    )
    .with_config(args.config);

    let mut driver = Driver::new();
    driver.install_interrupt_handler();

    let quiet = args.quiet;
    let mut saved = false;
    let mut stdout = io::stdout().lock();
    let status = driver.run(&mut animator, &mut buffer, |buf, tick| {
        if let Tick::Converged { saved: ok } = tick {
            saved = *ok;
        }
        if !quiet && matches!(tick, Tick::Edited(_)) {
            if let Err(e) = render(buf, &mut stdout) {
                tracing::debug!(error = %e, "frame dropped");
            }
        }
    });
    drop(stdout);

    if status == Status::Converged && !quiet {
        println!();
    }
    if status == Status::Converged && !saved {
        eprintln!("n-replay: could not save {}", args.file.display());
    }
    let code = exit_code(status, saved);
    if code == 0 {
        tracing::info!(file = %args.file.display(), "saved");
    }
    process::exit(code);
}

// ─── Tests ──────────────────────────────────────────────────────────────────
