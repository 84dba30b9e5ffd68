pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod providers;
pub mod report;
pub mod setup;
pub mod storage;
pub mod usage;

use std::io::{self, Write};

use cli::Cli;
use config::{AppConfig, CredentialBackend};
use error::AppError;
use providers::InternodeProvider;
use setup::SetupOutcome;
use storage::{CredentialStore, FileStore, KeyringStore};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

const SETUP_HINT: &str = "Run `isp-usage --setup` to store your ISP login first.";

/// Run setup or the usage report, depending on `cli`
pub async fn run(cli: &Cli) -> Result<(), AppError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let store = open_credential_store(&config)?;

    if cli.setup {
        let mut input = io::stdin().lock();
        let mut output = io::stdout();
        match setup::run_setup(store.as_ref(), &mut input, &mut output)? {
            SetupOutcome::Saved => log::debug!("Setup: done"),
            SetupOutcome::Declined => log::debug!("Setup: declined, nothing written"),
        }
        return Ok(());
    }

    let provider = InternodeProvider::new(config.api.clone(), store, config.timeout())?;
    let mut stdout = io::stdout();
    report::run_report(
        &provider,
        &config.api,
        || chrono::Local::now().naive_local(),
        &mut stdout,
    )
    .await?;

    Ok(())
}

pub fn open_credential_store(config: &AppConfig) -> Result<Box<dyn CredentialStore>, AppError> {
    let store: Box<dyn CredentialStore> = match config.credential_backend {
        CredentialBackend::File => Box::new(FileStore::new(config.credentials_path()?)),
        CredentialBackend::Keyring => Box::new(KeyringStore::new()?),
    };
    Ok(store)
}

/// Exit status for a finished run. Failures are logged, with a setup hint on
/// `err_out` when missing or rejected credentials are the cause.
pub fn exit_status<W: Write>(result: &Result<(), AppError>, err_out: &mut W) -> u8 {
    match result {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            if err.needs_setup() {
                // Nothing useful to do if stderr is gone
                let _ = writeln!(err_out, "{}", SETUP_HINT);
            }
            EXIT_FAILURE
        }
    }
}
