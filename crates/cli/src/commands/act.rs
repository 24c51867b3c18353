use super::ActCommand;
use crate::{error::CliError, util::bold};
use rand::{rngs::StdRng, SeedableRng};
use teabot_core::{
    adapters::{ExecutionResult, SimpleChat, VotingSystem},
    context::AppContext,
};

pub async fn act(ctx: &AppContext, command: ActCommand) -> Result<(), CliError> {
    let mut rng = StdRng::from_entropy();
    let result = match command {
        ActCommand::Tea { action, value } => {
            ctx.tea_game
                .perform(action.as_deref(), value, &mut rng)
                .await
        }
        ActCommand::Vote { option } => {
            let option =
                option.unwrap_or_else(|| VotingSystem::random_option(&mut rng).id() as i64);
            ctx.voting.vote(option).await
        }
        ActCommand::Chat { message } => {
            let message =
                message.unwrap_or_else(|| SimpleChat::generate_random_message(&mut rng));
            ctx.chat.send_message(&message).await
        }
        ActCommand::Transfer => ctx.transfer.transfer_token(&mut rng).await,
    };
    report(result)
}

/// Prints the outcome. Only a failure is an error; a skipped action exits cleanly.
fn report(result: ExecutionResult) -> Result<(), CliError> {
    match result {
        ExecutionResult::Failed { reason } => Err(CliError::ActionFailed(reason)),
        ExecutionResult::Success { tx_hash, params } => {
            println!("{} {params}", bold("sent"));
            println!("  tx: {tx_hash}");
            Ok(())
        }
        ExecutionResult::Skipped { reason } => {
            println!("{} {reason}", bold("skipped"));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_is_not_an_error() {
        assert!(report(ExecutionResult::skipped("Already voted")).is_ok());
        assert!(matches!(
            report(ExecutionResult::failed("reverted")),
            Err(CliError::ActionFailed(reason)) if reason == "reverted"
        ));
    }
}
