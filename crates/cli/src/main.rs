mod commands;
mod error;
mod util;

use commands::{TeabotCli, TeabotSubcommand};
use error::CliError;
use teabot_core::{context::AppContext, logger};
use tracing::{error, info};
use util::{load_bot_config, load_signer};

async fn run_command(cli: TeabotCli) -> Result<(), CliError> {
    if let TeabotSubcommand::Init { out, force } = &cli.command {
        return commands::init(out, *force);
    }

    let (mut config, found) = load_bot_config(&cli.config)?;
    if let Some(rpc_url) = cli.rpc_url {
        config.rpc_url = rpc_url;
    }
    logger::init(Some(config.log_file.as_path()))?;
    if !found {
        info!(
            "No bot file at {}, using default settings",
            cli.config.display()
        );
    }
    let settings = config.to_settings()?;

    if let TeabotSubcommand::Recipients { add } = &cli.command {
        return commands::recipients(&settings, add.as_deref());
    }

    let signer = load_signer(std::env::var("PRIVATE_KEY").ok().as_deref())?;
    let ctx = AppContext::connect(&settings, signer)?;

    match cli.command {
        TeabotSubcommand::Run { seed } => commands::run(&ctx, &settings, seed).await,
        TeabotSubcommand::Act { command } => commands::act(&ctx, command).await,
        TeabotSubcommand::Score { address } => commands::score(&ctx, address.as_deref()).await,
        TeabotSubcommand::Votes => commands::votes(&ctx).await,
        TeabotSubcommand::Messages { count } => commands::messages(&ctx, count).await,
        TeabotSubcommand::Token { address } => commands::token(&ctx, address.as_deref()).await,
        // handled before connecting
        TeabotSubcommand::Init { .. } | TeabotSubcommand::Recipients { .. } => Ok(()),
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    // a missing .env is fine; variables may come from the environment
    let _ = dotenv::dotenv();
    let cli = TeabotCli::parse_args();

    if let Err(e) = run_command(cli).await {
        error!("{e}");
        return Err(e.into());
    }
    Ok(())
}
