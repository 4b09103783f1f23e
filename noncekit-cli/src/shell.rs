//! Line-oriented command shell over one store.

use std::io::{BufRead, Write};
use std::time::Duration;

use eyre::{bail, eyre, Result};
use noncekit_core::{NonceStore, Token};

const HELP: &str = "\
commands:
  issue <action>            issue a token, printed as hex
  consume <token> <action>  validate and consume
  peek <token> <action>     validate without consuming
  expiration <ms>           set the lifetime of new tokens
  salt <text>               replace the salt (invalidates outstanding tokens)
  sweep                     reclaim expired entries now
  stats                     entry count and timings
  help                      this text
  quit                      leave the shell";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Issue { action: String },
    Consume { token: Token, action: String },
    Peek { token: Token, action: String },
    Expiration(Duration),
    Salt(String),
    Sweep,
    Stats,
    Help,
    Quit,
}

impl Command {
    /// Parses one input line. Actions run to the end of the line so they may
    /// contain spaces.
    fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim_start();
        let command = match verb {
            "issue" => Self::Issue {
                action: rest.to_string(),
            },
            "consume" | "peek" => {
                let (token, action) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let token = token
                    .parse::<Token>()
                    .map_err(|err| eyre!("{err}: expected {} hex characters", 2 * noncekit_core::TOKEN_LEN))?;
                let action = action.trim_start().to_string();
                if verb == "consume" {
                    Self::Consume { token, action }
                } else {
                    Self::Peek { token, action }
                }
            }
            "expiration" => {
                let millis: u64 = rest.parse().map_err(|_| eyre!("expected milliseconds"))?;
                Self::Expiration(Duration::from_millis(millis))
            }
            "salt" => {
                if rest.is_empty() {
                    bail!("expected salt text");
                }
                Self::Salt(rest.to_string())
            }
            "sweep" => Self::Sweep,
            "stats" => Self::Stats,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => bail!("unknown command `{other}`, try `help`"),
        };
        Ok(Some(command))
    }
}

/// Runs the shell until `quit` or end of input.
pub fn run(store: &NonceStore, input: impl BufRead, mut output: impl Write) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        match Command::parse(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => execute(store, command, &mut output)?,
            Ok(None) => {}
            Err(err) => writeln!(output, "error: {err}")?,
        }
    }
    Ok(())
}

fn execute(store: &NonceStore, command: Command, output: &mut impl Write) -> Result<()> {
    match command {
        Command::Issue { action } => writeln!(output, "{}", store.issue(&action).to_hex())?,
        Command::Consume { token, action } => {
            writeln!(output, "{}", store.consume(token, &action))?;
        }
        Command::Peek { token, action } => writeln!(output, "{}", store.peek(token, &action))?,
        Command::Expiration(expiration) => {
            store.set_expiration(expiration);
            writeln!(output, "expiration {expiration:?}, sweep every {:?}", store.sweep_interval())?;
        }
        Command::Salt(text) => {
            store.set_salt(text.into_bytes());
            writeln!(output, "salt replaced")?;
        }
        Command::Sweep => writeln!(output, "reclaimed {}", store.reclaim_expired())?,
        Command::Stats => writeln!(
            output,
            "entries {}, expiration {:?}, sweep every {:?}",
            store.len(),
            store.expiration(),
            store.sweep_interval()
        )?,
        Command::Help => writeln!(output, "{HELP}")?,
        Command::Quit => {}
    }
    Ok(())
}
