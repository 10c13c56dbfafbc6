use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use catscript::shell::{self, ShellCommand, HELP};
use catscript::Options;

/// Run a CatScript file, or start the interactive shell.
#[derive(Debug, Parser)]
#[command(name = "catscript", version, about)]
struct Cli {
    /// Script to run. Without one the interactive shell starts.
    file: Option<PathBuf>,

    /// Extension of CatScript files.
    #[arg(long, default_value = ".cat")]
    extension: String,
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let options = Options::default().with_extension(&cli.extension);

    match cli.file {
        Some(path) => {
            let (_, outcome) = shell::run_script(&path, &options)?;
            Ok(if outcome.completion.is_failure() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        None => {
            repl(&options)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn repl(options: &Options) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("reading shell input")? == 0 {
            writeln!(stdout)?;
            return Ok(());
        }

        match ShellCommand::parse(&line) {
            ShellCommand::Quit => return Ok(()),
            ShellCommand::Nothing => {}
            ShellCommand::Help => println!("{}", HELP),
            ShellCommand::MissingPath => println!("usage: run <path>"),
            ShellCommand::Unknown(cmd) => println!("unknown command '{}', type 'help'", cmd),
            ShellCommand::Run(path) => match shell::run_script(&path, options) {
                Ok((interp, _)) => {
                    if !interp.host().output().is_empty() && !interp.host().output().ends_with('\n') {
                        println!();
                    }
                }
                Err(e) => println!("{}", e),
            },
        }
    }
}
