//! CLI command implementations

pub mod account;
pub mod backup;
pub mod config;
pub mod favorites;
pub mod login;
pub mod logs;
pub mod profile;
pub mod reviews;
pub mod signup;

use std::env;
use std::fmt;
use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use dialoguer::{Input, Password};
use serde::Serialize;

use mimo_core::{EntryPoint, LogEvent, LoggingService, MimoContext, OperationResult};

use crate::output;
use crate::session::Session;

/// Environment variable consulted for secrets before prompting
pub const PASSWORD_ENV: &str = "MIMO_PASSWORD";

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let root = get_root_dir();
    std::fs::create_dir_all(&root).ok()?;
    LoggingService::new(&root, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the data root from MIMO_DIR, or the current directory
pub fn get_root_dir() -> PathBuf {
    if let Ok(dir) = env::var("MIMO_DIR") {
        PathBuf::from(dir)
    } else {
        env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    }
}

/// Create the context for the data root
pub fn get_context() -> Result<MimoContext> {
    let root = get_root_dir();
    std::fs::create_dir_all(&root)
        .with_context(|| format!("Failed to create data directory: {:?}", root))?;
    MimoContext::new(&root).context("Failed to initialize mimo context")
}

/// The logged-in session, or an error telling the user to log in
pub fn require_session() -> Result<Session> {
    Session::load(&get_root_dir())?
        .ok_or_else(|| anyhow::anyhow!("Not logged in. Run 'mimo login' first."))
}

/// Where a command's secrets come from
///
/// Each secret without a flag takes the next source in turn. MIMO_PASSWORD
/// answers at most one of them, piped stdin gives one line per secret, and a
/// terminal gets a hidden prompt.
pub struct SecretSource<R> {
    env: Option<String>,
    piped: Option<R>,
}

impl SecretSource<io::StdinLock<'static>> {
    pub fn from_env() -> Self {
        let piped = atty::isnt(atty::Stream::Stdin).then(|| io::stdin().lock());
        Self::new(env::var(PASSWORD_ENV).ok(), piped)
    }
}

impl<R: BufRead> SecretSource<R> {
    pub fn new(env: Option<String>, piped: Option<R>) -> Self {
        Self { env, piped }
    }

    /// True when the next secret without a flag would be prompted for
    fn prompts_next(&self) -> bool {
        self.env.is_none() && self.piped.is_none()
    }

    /// Get a secret from the flag, or the next source in turn
    pub fn read(&mut self, flag: Option<String>, prompt: &str) -> Result<String> {
        if let Some(p) = flag {
            return Ok(p);
        }
        if let Some(p) = self.env.take() {
            return Ok(p);
        }
        if let Some(reader) = self.piped.as_mut() {
            let mut line = String::new();
            let read = reader
                .read_line(&mut line)
                .context("Failed to read password from stdin")?;
            if read == 0 {
                bail!("{}: no more input on stdin", prompt);
            }
            return Ok(line.trim_end_matches(['\r', '\n']).to_string());
        }
        Ok(Password::new().with_prompt(prompt).interact()?)
    }

    /// A secret and its confirmation. Interactive prompts ask twice; other
    /// sources use `confirm_flag`, or the secret itself when that is absent.
    pub fn read_with_confirm(
        &mut self,
        flag: Option<String>,
        confirm_flag: Option<String>,
        prompt: &str,
        confirm_prompt: &str,
    ) -> Result<(String, String)> {
        let interactive = flag.is_none() && self.prompts_next();
        let secret = self.read(flag, prompt)?;
        let confirm = match confirm_flag {
            Some(c) => c,
            None if interactive => Password::new().with_prompt(confirm_prompt).interact()?,
            None => secret.clone(),
        };
        Ok((secret, confirm))
    }
}

/// Use the flag value or ask for it
pub fn read_text(flag: Option<String>, prompt: &str) -> Result<String> {
    match flag {
        Some(value) => Ok(value),
        None => Ok(Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?),
    }
}

/// Marker error for failures already printed (as JSON) by the command
#[derive(Debug)]
pub struct Reported;

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "command failed")
    }
}

impl std::error::Error for Reported {}

/// Render a core result
///
/// With `--json` the whole `OperationResult` is printed. Otherwise `render`
/// prints the payload, and failures become the user-facing error message.
pub fn finish<T: Serialize>(
    result: mimo_core::domain::result::Result<T>,
    json: bool,
    render: impl FnOnce(&T),
) -> Result<()> {
    if json {
        let op = OperationResult::from(result);
        println!("{}", serde_json::to_string_pretty(&op)?);
        return if op.success { Ok(()) } else { Err(Reported.into()) };
    }

    match result {
        Ok(data) => {
            render(&data);
            Ok(())
        }
        Err(e) => {
            output::error(&e.user_message());
            Err(Reported.into())
        }
    }
}
