//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`] or [`validate`].

pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::RelayError;

pub async fn dispatch(cli: Cli) -> Result<(), RelayError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(*args).await,
        Some(Commands::Validate(ref args)) => validate::execute(args),
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  hostrelay v{version} \u{2014} single-hop HTTP forwarding proxy\n\n  \
         No command provided. To get started:\n\n    \
         hostrelay run --target http://localhost:3000    Forward :8080 to a local app\n    \
         hostrelay validate -c relay.yaml                Check a config file\n    \
         hostrelay --help                                See all commands and options\n"
    );
}
