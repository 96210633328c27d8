use super::Relay;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;

/// Периодически удаляет альбомы, которые так и не собрались.
pub async fn run(relay: Relay, token: CancellationToken) {
    let period = relay.settings().sweep_interval();
    let mut interval = time::interval_at(Instant::now() + period, period);

    log::debug!("Media group sweeper started with period {period:?}");

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = interval.tick() => {
                let swept = relay.sweep().await;
                if swept > 0 {
                    log::debug!("Sweeper removed {swept} stale media groups");
                }
            }
        }
    }

    log::info!("Media group sweeper stopped");
}
