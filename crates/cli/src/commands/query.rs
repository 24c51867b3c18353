use crate::{error::CliError, util::bold};
use alloy::primitives::Address;
use teabot_core::{context::AppContext, recipients::parse_address, Error};

fn address_or_signer(ctx: &AppContext, address: Option<&str>) -> Result<Address, CliError> {
    match address {
        Some(input) => {
            parse_address(input.trim()).ok_or_else(|| Error::InvalidAddress(input.to_owned()).into())
        }
        None => Ok(ctx.signer),
    }
}

pub async fn score(ctx: &AppContext, address: Option<&str>) -> Result<(), CliError> {
    let player = address_or_signer(ctx, address)?;
    let score = ctx.tea_game.score(player).await?;
    println!("{} {}: {score}", bold("score"), player.to_checksum(None));
    Ok(())
}

pub async fn votes(ctx: &AppContext) -> Result<(), CliError> {
    let results = ctx.voting.results().await?;
    println!("{}", bold("votes"));
    for (option, votes) in results {
        println!("  {:>2}  {option:<12} {votes}", option.id());
    }
    let voted = ctx.voting.has_voted(ctx.signer).await?;
    println!("signer has voted: {voted}");
    Ok(())
}

pub async fn messages(ctx: &AppContext, count: u64) -> Result<(), CliError> {
    let total = ctx.chat.message_count().await?;
    let messages = ctx.chat.read_last_messages(count).await?;
    println!(
        "{} (latest {} of {total})",
        bold("messages"),
        messages.len()
    );
    for msg in messages {
        println!(
            "  [{}] {}: {}",
            msg.timestamp.to_rfc3339(),
            msg.sender.to_checksum(None),
            msg.content
        );
    }
    Ok(())
}

pub async fn token(ctx: &AppContext, address: Option<&str>) -> Result<(), CliError> {
    let holder = address_or_signer(ctx, address)?;
    let info = ctx.transfer.token_info().await?;
    let balance = ctx.transfer.balance_of(holder).await?;
    println!("{} {}", bold("token"), info.symbol);
    println!("  decimals:     {}", info.decimals);
    println!(
        "  total supply: {}",
        ctx.transfer.format(info.total_supply)
    );
    println!(
        "  balance of {}: {}",
        holder.to_checksum(None),
        ctx.transfer.format(balance)
    );
    Ok(())
}
