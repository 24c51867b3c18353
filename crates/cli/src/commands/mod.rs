mod act;
mod init;
mod query;
mod recipients;
mod run;
mod teabot_subcommand;

use clap::Parser;
use std::path::PathBuf;

pub use act::act;
pub use init::init;
pub use query::{messages, score, token, votes};
pub use recipients::recipients;
pub use run::run;
pub use teabot_subcommand::{ActCommand, TeabotSubcommand};

#[derive(Parser, Debug)]
#[command(name = "teabot", version, about = "Keeps a testnet account active on the tea contracts")]
pub struct TeabotCli {
    /// Path to the bot file. Defaults apply when it does not exist.
    #[arg(short, long, global = true, default_value = "teabot.toml")]
    pub config: PathBuf,

    /// Overrides the RPC endpoint from the bot file.
    #[arg(long, global = true, env = "RPC_URL")]
    pub rpc_url: Option<String>,

    #[command(subcommand)]
    pub command: TeabotSubcommand,
}

impl TeabotCli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
