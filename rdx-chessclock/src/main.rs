use anyhow::Result;
use chessclock::prelude::*;
use std::time::Duration;
use tracing::info;

/// Development driver for the engine: plays both sides of a 3+2 blitz game
/// on a fixed cadence and logs every stream until Ctrl+C.
#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    // 2. Create the engine with a demo time control.
    let config = ClockConfig::fischer(180_000, 2_000);
    let engine = ClockEngine::new(config)?;

    // 3. Spawn concurrent tasks to listen to the event streams.
    spawn_event_listeners(&engine);

    // 4. Start the game and script some moves.
    engine.start(Player::White).await;
    let mover = engine.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(4)).await;
            mover.switch_player().await;
        }
    });

    info!(
        "{} v{} running a demo game. Press Ctrl+C to shut down.",
        chessclock::ENGINE_NAME,
        chessclock::VERSION
    );
    tokio::signal::ctrl_c().await?;

    engine.shutdown().await;
    info!("Demo finished.");
    Ok(())
}

/// Spawns several tasks, each subscribing to a different event stream from the engine.
fn spawn_event_listeners(engine: &ClockEngine) {
    let mut system_rx = engine.subscribe_system_events();
    tokio::spawn(async move {
        while let Ok(event) = system_rx.recv().await {
            info!("[SYSTEM] => {:?}", event);
        }
    });

    let mut timeout_rx = engine.subscribe_timeouts();
    tokio::spawn(async move {
        while let Ok(event) = timeout_rx.recv().await {
            info!("[TIMEOUT] => Flag fell for {}", event.player);
        }
    });

    let mut state_rx = engine.subscribe_state_changes();
    tokio::spawn(async move {
        while let Ok(state) = state_rx.recv().await {
            info!(
                "[STATE] => white {}s | black {}s | active: {:?}",
                state.white.time_remaining, state.black.time_remaining, state.active_player
            );
        }
    });
}
