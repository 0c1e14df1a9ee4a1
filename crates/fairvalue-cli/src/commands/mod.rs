pub(crate) mod run;
pub(crate) mod show;

use crate::cli::{Cli, Command};
use crate::config::AppConfig;
use crate::error::CliError;

pub(crate) async fn run(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Command::Run(args) => {
            let config = AppConfig::load(args, cli.log_level)?;
            run::run(args, &config).await
        }
        Command::Show(args) => show::run(args),
    }
}
