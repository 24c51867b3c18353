use crate::error::CliError;
use rand::{rngs::StdRng, SeedableRng};
use teabot_core::{
    context::{AppContext, BotSettings},
    scheduler::Bot,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Resolves on CTRL-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for CTRL-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

pub async fn run(ctx: &AppContext, settings: &BotSettings, seed: Option<u64>) -> Result<(), CliError> {
    let table = ctx.action_table(&settings.weights)?;
    let rng = match seed {
        Some(seed) => {
            info!("Using seed {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let weights = table
        .entries()
        .iter()
        .map(|e| format!("{}={}", e.name, e.weight))
        .collect::<Vec<_>>()
        .join(", ");
    info!("Bot started. Action weights: {weights}");
    info!(
        "{} recipients available in {}",
        ctx.transfer.recipients().count(),
        ctx.transfer.recipients().path().display()
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::task::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received, stopping bot...");
        on_signal.cancel();
    });

    let mut bot = Bot::new(table, settings.schedule.clone(), rng, cancel);
    bot.run().await?;
    info!("Bot stopped");
    Ok(())
}
