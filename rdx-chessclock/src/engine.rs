//! The core engine that orchestrates the chess clock.
//!
//! This struct is the central point of control. It owns the authoritative
//! `TimerState`, the active time-control rule, and the 1-second tick loop,
//! and it broadcasts every mutation to subscribers. The `ClockEngine` is
//! designed to be cloned and shared across tasks, providing a handle to the
//! running instance.

use crate::common::Player;
use crate::config::ClockConfig;
use crate::error::ClockResult;
use crate::events::{SystemEvent, TimeoutEvent};
use crate::rules::{rule_for, TimeControlRule};
use crate::state::{TimerDisplayInfo, TimerState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, trace};

/// The clock advances in whole seconds.
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// The main chess clock engine.
///
/// Control calls with a mismatched source state (`start` while running,
/// `switch_player` while stopped, a second `pause`) are silent no-ops by
/// contract, so callers never need to guard their own view of the state.
#[derive(Clone)]
pub struct ClockEngine {
    state: Arc<RwLock<TimerState>>,
    rule: Arc<RwLock<Box<dyn TimeControlRule>>>,

    // --- Senders for each public event category ---
    state_sender: broadcast::Sender<Arc<TimerState>>,
    system_event_sender: broadcast::Sender<SystemEvent>,
    timeout_sender: broadcast::Sender<TimeoutEvent>,

    /// Shutdown handle of the live ticker task, if one exists. Taking it
    /// out and dropping/signalling it cancels the loop; taking from an
    /// empty slot is the idempotent second cancel.
    ticker_shutdown: Arc<RwLock<Option<broadcast::Sender<()>>>>,
    shutdown_flag: Arc<AtomicBool>,
}

// Core implementation block for internal logic.
impl ClockEngine {
    /// Creates a new engine for the given time control.
    ///
    /// Fails fast if the config is invalid for its mode; nothing is
    /// partially initialized on error.
    pub fn new(config: ClockConfig) -> ClockResult<Self> {
        const CHANNEL_CAPACITY: usize = 256;
        let rule = rule_for(&config)?;
        let (state_sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        let (system_event_sender, _) = broadcast::channel(64);
        let (timeout_sender, _) = broadcast::channel(16);

        Ok(Self {
            state: Arc::new(RwLock::new(TimerState::new(config))),
            rule: Arc::new(RwLock::new(rule)),
            state_sender,
            system_event_sender,
            timeout_sender,
            ticker_shutdown: Arc::new(RwLock::new(None)),
            shutdown_flag: Arc::new(AtomicBool::new(false)),
        })
    }

    fn is_shut_down(&self) -> bool {
        self.shutdown_flag.load(Ordering::SeqCst)
    }

    fn notify_state(&self, state: &TimerState) {
        self.state_sender.send(Arc::new(state.clone())).ok();
    }

    /// Spawns the 1-second tick loop. No-op if a ticker is already live —
    /// there is never more than one per engine.
    async fn spawn_ticker(&self) {
        let mut slot = self.ticker_shutdown.write().await;
        if slot.is_some() {
            return;
        }
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel(1);
        *slot = Some(shutdown_tx);
        drop(slot);

        let engine = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => break,
                    _ = ticker.tick() => {
                        if !engine.advance().await {
                            break;
                        }
                    }
                }
            }
            trace!("ticker task ended");
        });
    }

    /// Cancels the tick loop. Safe to call with no ticker live.
    async fn stop_ticker(&self) {
        if let Some(shutdown) = self.ticker_shutdown.write().await.take() {
            shutdown.send(()).ok();
        }
    }

    /// One tick of the running clock. Returns `false` when the loop should
    /// end (stopped, or the active player just timed out).
    ///
    /// The rule's tick hook runs first; a delta carrying a delay countdown
    /// means the grace period absorbed this second and main time stays
    /// untouched. Otherwise main time drops by exactly one second, except
    /// that reaching zero becomes a timeout: clamp, stop, notify, and emit
    /// one `TimeoutEvent` after the engine has already paused itself.
    async fn advance(&self) -> bool {
        let mut state = self.state.write().await;
        if !state.is_running {
            return false;
        }
        let Some(player) = state.active_player else {
            return false;
        };

        let delta = self.rule.read().await.on_tick(player, &state);
        let in_delay = delta.clock.delay_remaining.is_some();
        state.apply(player, delta);
        if in_delay {
            trace!(%player, "delay absorbed the tick");
            self.notify_state(&state);
            return true;
        }

        if state.clock(player).time_remaining <= 1 {
            state.clock_mut(player).time_remaining = 0;
            state.is_running = false;
            state.move_started = None;
            self.ticker_shutdown.write().await.take();
            info!(%player, "flag fell");
            self.notify_state(&state);
            self.timeout_sender.send(TimeoutEvent { player }).ok();
            return false;
        }

        state.clock_mut(player).time_remaining -= 1;
        trace!(%player, remaining = state.clock(player).time_remaining, "tick");
        self.notify_state(&state);
        true
    }
}

// Public API implementation block.
impl ClockEngine {
    /// Starts the clock for `player` and begins that player's move.
    /// No-op if the clock is already running.
    pub async fn start(&self, player: Player) {
        if self.is_shut_down() {
            return;
        }
        let mut state = self.state.write().await;
        if state.is_running {
            debug!("start ignored: clock already running");
            return;
        }
        state.is_running = true;
        state.active_player = Some(player);
        let delta = self.rule.read().await.on_move_start(player, &state);
        state.apply(player, delta);
        self.spawn_ticker().await;
        info!(%player, "clock started");
        self.system_event_sender
            .send(SystemEvent::ClockStarted { player })
            .ok();
        self.notify_state(&state);
    }

    /// Stops the tick loop, keeping the active player so `resume` continues
    /// the same move. No-op if not running.
    pub async fn pause(&self) {
        let mut state = self.state.write().await;
        if !state.is_running {
            return;
        }
        state.is_running = false;
        // The wall-clock anchor dies with the tick loop; `resume` re-arms
        // it through the move-start hook.
        state.move_started = None;
        self.stop_ticker().await;
        info!("clock paused");
        self.system_event_sender.send(SystemEvent::ClockPaused).ok();
        self.notify_state(&state);
    }

    /// Resumes ticking for the retained active player, re-running the
    /// move-start hook (the wall-clock anchor restarts, so paused time
    /// never counts toward refunds). No-op if already running, or if no
    /// player was ever set — the engine does not assume an opening side;
    /// callers choose one via `start`.
    pub async fn resume(&self) {
        if self.is_shut_down() {
            return;
        }
        let mut state = self.state.write().await;
        if state.is_running {
            return;
        }
        let Some(player) = state.active_player else {
            debug!("resume ignored: no active player yet");
            return;
        };
        state.is_running = true;
        let delta = self.rule.read().await.on_move_start(player, &state);
        state.apply(player, delta);
        self.spawn_ticker().await;
        info!(%player, "clock resumed");
        self.system_event_sender
            .send(SystemEvent::ClockResumed { player })
            .ok();
        self.notify_state(&state);
    }

    /// Completes the active player's move — applying increments, refunds,
    /// or stage bonuses per the rule — and starts the opponent's. No-op
    /// unless running with an active player.
    pub async fn switch_player(&self) {
        let mut state = self.state.write().await;
        if !state.is_running {
            return;
        }
        let Some(mover) = state.active_player else {
            return;
        };
        let elapsed_secs = state
            .move_started
            .map(|started| started.elapsed().as_secs())
            .unwrap_or(0);

        let rule = self.rule.read().await;
        let delta = rule.on_move_complete(mover, elapsed_secs, &state);
        state.apply(mover, delta);

        let next = mover.opponent();
        state.active_player = Some(next);
        let delta = rule.on_move_start(next, &state);
        state.apply(next, delta);

        debug!(from = %mover, to = %next, elapsed_secs, "player switched");
        self.system_event_sender
            .send(SystemEvent::PlayerSwitched {
                from: mover,
                to: next,
            })
            .ok();
        self.notify_state(&state);
    }

    /// Discards all state and rebuilds from `config`, or from the previous
    /// config when omitted. The tick loop stops and the state machine
    /// returns to idle. Fails (leaving everything untouched) if the new
    /// config is invalid.
    pub async fn reset(&self, config: Option<ClockConfig>) -> ClockResult<()> {
        if self.is_shut_down() {
            return Ok(());
        }
        let mut state = self.state.write().await;
        let config = config.unwrap_or_else(|| state.config.clone());
        let rule = rule_for(&config)?;
        self.stop_ticker().await;
        *self.rule.write().await = rule;
        *state = TimerState::new(config);
        info!(mode = ?state.config.mode, "clock reset");
        self.system_event_sender.send(SystemEvent::ClockReset).ok();
        self.notify_state(&state);
        Ok(())
    }

    /// Adds (or, negative, removes) seconds on one player's clock,
    /// flooring at zero. An operator-level mutation outside the move flow.
    pub async fn add_time(&self, player: Player, secs: i64) {
        if self.is_shut_down() {
            return;
        }
        let mut state = self.state.write().await;
        let time_remaining = {
            let clock = state.clock_mut(player);
            clock.time_remaining = (clock.time_remaining as i64)
                .saturating_add(secs)
                .max(0) as u64;
            clock.time_remaining
        };
        debug!(%player, time_remaining, "time adjusted");
        self.system_event_sender
            .send(SystemEvent::TimeAdjusted {
                player,
                time_remaining,
            })
            .ok();
        self.notify_state(&state);
    }

    /// Sets one player's clock outright. An operator-level mutation
    /// outside the move flow.
    pub async fn set_time(&self, player: Player, secs: u64) {
        if self.is_shut_down() {
            return;
        }
        let mut state = self.state.write().await;
        state.clock_mut(player).time_remaining = secs;
        debug!(%player, time_remaining = secs, "time set");
        self.system_event_sender
            .send(SystemEvent::TimeAdjusted {
                player,
                time_remaining: secs,
            })
            .ok();
        self.notify_state(&state);
    }

    /// An owned copy of the full authoritative state.
    pub async fn snapshot(&self) -> TimerState {
        self.state.read().await.clone()
    }

    /// The rule's presentation projection for one player.
    pub async fn display_info(&self, player: Player) -> TimerDisplayInfo {
        let state = self.state.read().await;
        self.rule.read().await.display_info(player, &state)
    }

    /// Completed moves for one player.
    pub async fn move_count(&self, player: Player) -> u32 {
        self.state.read().await.clock(player).move_count
    }

    /// The player's current multi-stage index (0 outside MultiStage).
    pub async fn current_stage(&self, player: Player) -> usize {
        self.state.read().await.clock(player).stage_index
    }

    /// Stops the tick loop and retires the engine. After this returns, no
    /// tick runs, no event fires, and every control call is a no-op.
    /// Idempotent.
    pub async fn shutdown(&self) {
        if self.shutdown_flag.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut state = self.state.write().await;
        state.is_running = false;
        state.move_started = None;
        self.stop_ticker().await;
        info!("engine shut down");
        self.system_event_sender
            .send(SystemEvent::EngineShutdown)
            .ok();
    }

    // --- Public API for Subscribing to Events ---

    /// Subscribes to full-state snapshots, sent after every mutation.
    pub fn subscribe_state_changes(&self) -> broadcast::Receiver<Arc<TimerState>> {
        self.state_sender.subscribe()
    }

    /// Subscribes to the `SystemEvent` stream.
    pub fn subscribe_system_events(&self) -> broadcast::Receiver<SystemEvent> {
        self.system_event_sender.subscribe()
    }

    /// Subscribes to the `TimeoutEvent` stream.
    pub fn subscribe_timeouts(&self) -> broadcast::Receiver<TimeoutEvent> {
        self.timeout_sender.subscribe()
    }
}
