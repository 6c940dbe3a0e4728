//! Walks one player's session key through its lifecycle: issue, act,
//! auto-renew near expiry, hit the session limit, revoke.
//!
//! Usage: `quickstart [config.json]`. Log level follows `RUST_LOG`
//! (default `info`).

use std::sync::Arc;

use tether::prelude::*;
use tracing_subscriber::EnvFilter;

/// Demo clock start: 2026-01-01T00:00:00Z.
const START: Timestamp = 1_767_225_600;

/// Reads a JSON `SessionConfig` from `path`, or the defaults without one.
///
/// Fields left out of the file keep their defaults. An unreadable file
/// surfaces as the `io::Error` itself.
fn load_config(path: Option<String>) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(SessionConfig::default());
    };
    let bytes = std::fs::read(&path)?;
    let config: SessionConfig = JsonCodec.decode(&bytes)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = load_config(std::env::args().nth(1))?;
    let clock = Arc::new(ManualClock::new(START));
    let service = SessionService::builder()
        .config(config)
        .clock(Arc::clone(&clock))
        .build(MemorySessionStore::new())?;

    let player = PlayerAddress::new("0x5eed");
    let stranger = PlayerAddress::new("0xbad");

    // 1. Player authorizes a one-hour session key.
    let min_duration = service.validator().config().min_session_duration_secs;
    let session = service.issue(&player, min_duration, 10).await?;
    let id = session.session_id;

    // 2. A few actions go through and are counted.
    for _ in 0..3 {
        service.authorize(id, &player).await?;
    }

    // 3. Someone else presenting the key is turned away, even though the
    //    key itself is healthy.
    if let Err(e) = service.authorize(id, &stranger).await {
        tracing::info!(%stranger, error = %e, "stranger rejected");
    }
    let status = service.status(id, &stranger).await?;
    tracing::info!(%status, "status (owner-agnostic)");

    // 4. Close to expiry, the next action renews the key transparently.
    let remaining = session.expires_at - clock.now();
    clock.advance(remaining.saturating_sub(60));
    let renewed = service.authorize(id, &player).await?;
    tracing::info!(
        expires_at = renewed.expires_at,
        used = renewed.used_transactions,
        max = renewed.max_transactions,
        "after renewal"
    );

    // 5. Fill up the player's session allowance.
    let limit = service.validator().config().max_active_sessions_per_player;
    for _ in 1..limit {
        service.issue(&player, min_duration, 10).await?;
    }
    if let Err(e) = service.issue(&player, min_duration, 10).await {
        tracing::info!(error = %e, "admission refused");
    }

    // 6. Revocation is final.
    service.revoke(id).await?;
    if let Err(e) = service.authorize(id, &player).await {
        tracing::info!(error = %e, "revoked key rejected");
    }
    let status = service.status(id, &player).await?;
    tracing::info!(%status, "final status");

    Ok(())
}
