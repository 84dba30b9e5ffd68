//! Interactive first-run flow that stores the ISP login

use std::io::{self, BufRead, Write};

use crate::storage::{CredentialStore, Credentials, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("Terminal error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("{0} is required")]
    Empty(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    Saved,
    /// Existing credentials were kept
    Declined,
}

/// Prompt for a username and password on `input` and save them to `store`.
///
/// Input is echoed. When `store` already holds credentials the user must
/// answer `y` or `yes` before anything is overwritten.
pub fn run_setup<R: BufRead, W: Write>(
    store: &dyn CredentialStore,
    input: &mut R,
    output: &mut W,
) -> Result<SetupOutcome, SetupError> {
    if store.exists()? {
        let answer = prompt(
            input,
            output,
            &format!("Credentials already stored in {}. Overwrite? [y/N]: ", store.location()),
        )?;
        if !is_yes(&answer) {
            writeln!(output, "Keeping existing credentials.")?;
            return Ok(SetupOutcome::Declined);
        }
    }

    let username = prompt(input, output, "Username: ")?.trim().to_string();
    if username.is_empty() {
        return Err(SetupError::Empty("Username"));
    }

    // Spaces are legal in passwords; only the line ending is dropped
    let password = prompt(input, output, "Password: ")?;
    if password.is_empty() {
        return Err(SetupError::Empty("Password"));
    }

    store.save(&Credentials { username, password })?;
    writeln!(output, "Credentials saved to {}.", store.location())?;
    log::info!("Setup: stored credentials in {}", store.location());

    Ok(SetupOutcome::Saved)
}

fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, text: &str) -> io::Result<String> {
    write!(output, "{}", text)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
