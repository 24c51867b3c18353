use clap::Subcommand;
use std::path::PathBuf;

#[derive(Debug, Subcommand)]
pub enum TeabotSubcommand {
    #[command(
        name = "run",
        long_about = "Run the bot: pick weighted random actions in operational windows until interrupted."
    )]
    Run {
        /// Seed for action selection and parameters. Random if omitted.
        #[arg(long)]
        seed: Option<u64>,
    },

    #[command(name = "init", about = "Write a bot file with the default settings")]
    Init {
        /// Where to write the bot file.
        #[arg(short, long, default_value = "teabot.toml")]
        out: PathBuf,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    #[command(name = "act", about = "Execute a single action and exit")]
    Act {
        #[command(subcommand)]
        command: ActCommand,
    },

    #[command(name = "score", about = "Show the tea game score of an address")]
    Score {
        /// Defaults to the signer.
        address: Option<String>,
    },

    #[command(name = "votes", about = "Show current vote totals")]
    Votes,

    #[command(name = "messages", about = "Show the most recent chat messages")]
    Messages {
        #[arg(short = 'n', long, default_value = "10")]
        count: u64,
    },

    #[command(name = "token", about = "Show token details and the balance of an address")]
    Token {
        /// Defaults to the signer.
        address: Option<String>,
    },

    #[command(name = "recipients", about = "Show or extend the transfer recipient list")]
    Recipients {
        /// Address to append to the list.
        #[arg(long)]
        add: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ActCommand {
    #[command(name = "tea", about = "Perform a tea game action")]
    Tea {
        /// Action id, e.g. `brew_tea`. Random if omitted or unknown.
        #[arg(long)]
        action: Option<String>,

        /// Action value. Random in 1..=10 if omitted.
        #[arg(long)]
        value: Option<u64>,
    },

    #[command(name = "vote", about = "Vote for a tea option (0-3)")]
    Vote {
        /// Random if omitted.
        #[arg(allow_negative_numbers = true)]
        option: Option<i64>,
    },

    #[command(name = "chat", about = "Send a chat message")]
    Chat {
        /// Random if omitted.
        message: Option<String>,
    },

    #[command(name = "transfer", about = "Send a random amount to a random recipient")]
    Transfer,
}
