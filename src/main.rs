use std::process::ExitCode;

use isp_usage::cli::{self, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::parse_lenient(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => err.exit(),
    };

    isp_usage::logging::init(cli.verbose);

    if let Some(ignored) = &cli.ignored {
        log::warn!("Ignoring unrecognized arguments: {}", ignored);
    }

    if cli.help {
        return ExitCode::from(cli::show_help(&mut std::io::stderr()));
    }

    let result = isp_usage::run(&cli).await;
    ExitCode::from(isp_usage::exit_status(&result, &mut std::io::stderr()))
}
