use anyhow::{Context, Result};
use env_logger::Env;
use minishell::{Config, CredentialFile, Environment, Interpreter, LoginOutcome, Terminal, login};
use std::io::{self, Write};
use std::process::ExitCode;

fn init_logging(default_level: &str) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(default_level));
    builder.format_timestamp_millis();
    let _ = builder.try_init();
}

fn run() -> Result<ExitCode> {
    let config = Config::load();
    init_logging(&config.log.level);
    log::debug!("{config:?}");

    // Relative to where we were launched, not to the root we are about to enter.
    let credentials = CredentialFile::new(
        std::path::absolute(&config.login.credentials)
            .context("could not resolve credential file path")?,
    );
    log::info!("credentials from {}", credentials.path().display());

    let mut terminal = Terminal::new(config.shell.history)?;
    let mut stdout = io::stdout();
    writeln!(stdout, "\nWelcome to the Shell\n")?;

    match login(
        &mut terminal,
        &credentials,
        config.login.max_attempts,
        &mut stdout,
    )? {
        LoginOutcome::Granted { .. } => {}
        LoginOutcome::Denied | LoginOutcome::Aborted => {
            writeln!(stdout, "Maximum login attempts exceeded. Exiting.")?;
            return Ok(ExitCode::FAILURE);
        }
    }

    writeln!(stdout, "Type 'help' to see available commands.\n")?;
    let mut shell = Interpreter::new(Environment::new(config.shell.root_dir()));
    shell.change_to_root();
    shell.repl(&mut terminal)?;
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("shell: {e:#}");
            ExitCode::FAILURE
        }
    }
}
