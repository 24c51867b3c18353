use crate::{error::CliError, util::bold};
use teabot_core::{context::BotSettings, recipients::RecipientBook};
use tracing::info;

pub fn recipients(settings: &BotSettings, add: Option<&str>) -> Result<(), CliError> {
    let book = RecipientBook::new(&settings.recipients_file);
    if let Some(input) = add {
        let address = book.add(input)?;
        info!(
            "Added recipient {} to {}",
            address.to_checksum(None),
            book.path().display()
        );
    }
    println!(
        "{} {} valid recipients in {}",
        bold("recipients"),
        book.count(),
        book.path().display()
    );
    Ok(())
}
