use argh::FromArgs;
use hsh::Repl;
use hsh::launcher::LaunchPolicy;
use std::io;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(FromArgs)]
/// A minimal interactive command interpreter: prompt, read, execute, report.
struct Options {
    /// run each line through "/bin/sh -c" instead of executing it directly
    #[argh(switch)]
    via_shell: bool,
}

/// Log to stderr, filtered by RUST_LOG (default: warnings only), so log
/// events never mix into the interpreter's stdout protocol.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let options: Options = argh::from_env();
    init_tracing();

    let policy = if options.via_shell {
        LaunchPolicy::ViaShell
    } else {
        LaunchPolicy::Direct
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut repl = Repl::new(stdin.lock(), stdout.lock(), policy);

    match repl.run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("{}: {:#}", hsh::PROGRAM_NAME, err);
            process::exit(1);
        }
    }
}
