//! Input sync loop with statum state machine
//!
//! # State Machine
//!
//! ```text
//! WaitingForConnection ──► Running ──► Stopped
//!   (session.connect())      │  ▲
//!                            └──┘ tick: terminate? → sample → map → apply → send
//! ```
//!
//! The loop suspends only while the session connects and while each
//! transmission completes, plus the optional tick-rate limiter. Transmissions
//! are serialized: a tick never starts before the previous send resolved.
//!
//! # Device policy
//!
//! Devices are processed in enumeration order every tick. When two devices
//! disagree on the same logical input, the last one processed wins.

use super::error::SyncError;
use super::termination::{TerminationSignal, TerminationSource};
use crate::controller::{DeviceSample, InputBackend, InputSampler};
use crate::mapping::{AxisMapper, ButtonMapper, StickCoordinate};
use crate::session::ControllerSession;
use crate::state::{ControllerState, StateApplier, StickSide};
use chrono::Local;
use statum::{machine, state};
use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

// Sync loop settings
#[derive(Clone, Debug)]
pub struct SyncSettings {
    /// Upper bound on ticks per second; `None` runs as fast as the session sends
    pub max_tick_rate_hz: Option<u32>,
    pub stats_interval_secs: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            max_tick_rate_hz: None,
            stats_interval_secs: 30,
        }
    }
}

/// Counters collected while running
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub ticks: u64,
    pub transmits: u64,
    pub devices_sampled: u64,
    pub stick_writes: u64,
    pub button_writes: u64,
    pub rejected_updates: u64,
    pub hotplug_events: u64,
}

/// What a single tick decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Terminated(TerminationSignal),
}

#[state]
#[derive(Debug, Clone)]
pub enum SyncState {
    WaitingForConnection,
    Running,
    Stopped,
}

#[machine]
pub struct InputSync<S: SyncState> {
    sampler: InputSampler,
    axis_mapper: AxisMapper,
    button_mapper: ButtonMapper,
    applier: StateApplier,
    termination: TerminationSource,
    settings: SyncSettings,
    stats: SyncStats,
}

impl<S: SyncState> InputSync<S> {
    pub fn stats(&self) -> SyncStats {
        SyncStats {
            stick_writes: self.applier.stick_writes(),
            button_writes: self.applier.button_writes(),
            rejected_updates: self.applier.rejected(),
            hotplug_events: self.sampler.hotplug_events(),
            ..self.stats.clone()
        }
    }
}

impl InputSync<WaitingForConnection> {
    /// Checks the session's controller type and prepares the loop.
    ///
    /// Fails before any suspension when the controller cannot take analog
    /// input.
    pub fn create<C: ControllerSession>(
        session: &C,
        backend: Box<dyn InputBackend>,
        termination: TerminationSource,
        settings: Option<SyncSettings>,
    ) -> Result<Self, SyncError<C::Error>> {
        let controller = session.controller();
        if !controller.supports_analog_input() {
            error!("Input sync cannot drive a {} session", controller);
            return Err(SyncError::UnsupportedController(controller));
        }

        let settings = settings.unwrap_or_default();
        debug!("Creating input sync for {} with settings: {:?}", controller, settings);

        Ok(Self::new(
            InputSampler::new(backend),
            AxisMapper::new(),
            ButtonMapper::new(),
            StateApplier::new(),
            termination,
            settings,
            SyncStats::default(),
        ))
    }

    /// Waits, without timeout, until the session reports connected
    pub async fn connect<C: ControllerSession>(
        self,
        session: &mut C,
    ) -> Result<InputSync<Running>, SyncError<C::Error>> {
        info!("Waiting for session to connect");
        session.connect().await.map_err(SyncError::Connect)?;
        info!("Session connected, transitioning to Running state");
        Ok(self.transition())
    }
}

impl InputSync<Running> {
    /// Runs one tick: termination check, then sample, map, apply and send.
    ///
    /// A pending termination signal ends the tick before any input is sampled
    /// or anything is transmitted.
    pub async fn tick<C: ControllerSession>(
        &mut self,
        session: &mut C,
    ) -> Result<TickOutcome, SyncError<C::Error>> {
        if let Some(signal) = self.termination.drain() {
            return Ok(TickOutcome::Terminated(signal));
        }

        let samples = self.sampler.sample();
        let state = session.state_mut();
        for sample in &samples {
            self.process_device(state, sample);
        }
        self.stats.devices_sampled += samples.len() as u64;

        session.send().await.map_err(SyncError::Transmit)?;
        self.stats.transmits += 1;
        self.stats.ticks += 1;
        Ok(TickOutcome::Continue)
    }

    fn process_device(&mut self, state: &mut ControllerState, sample: &DeviceSample) {
        let axes = self.axis_mapper.map(sample);
        let buttons = self.button_mapper.map(sample);

        self.apply_stick(state, StickSide::Left, axes.left_stick);
        self.apply_stick(state, StickSide::Right, axes.right_stick);
        self.applier.apply_buttons(state, &axes.triggers);
        self.applier.apply_buttons(state, &buttons);
    }

    fn apply_stick(
        &mut self,
        state: &mut ControllerState,
        side: StickSide,
        coordinate: Option<StickCoordinate>,
    ) {
        if let Some(coordinate) = coordinate {
            if let Err(e) = self.applier.apply_stick(state, side, coordinate) {
                warn!("Dropping {:?} stick update: {}", side, e);
            }
        }
    }

    /// Ticks until a termination signal arrives or the session fails
    pub async fn run_until_terminated<C: ControllerSession>(
        mut self,
        session: &mut C,
    ) -> Result<InputSync<Stopped>, SyncError<C::Error>> {
        info!("Starting input sync loop");

        let mut limiter = self.settings.max_tick_rate_hz.map(tick_limiter);
        let stats_period = stats_interval(self.settings.stats_interval_secs);
        let mut last_stats_time = Local::now();
        let mut last_stats = SyncStats::default();

        loop {
            match self.tick(session).await? {
                TickOutcome::Continue => {}
                TickOutcome::Terminated(signal) => {
                    info!("Termination signal received: {:?}", signal);
                    break;
                }
            }

            if let Some(limiter) = limiter.as_mut() {
                limiter.tick().await;
            }

            let now = Local::now();
            if now - last_stats_time > stats_period {
                let stats = self.stats();
                let elapsed_seconds = (now - last_stats_time).num_seconds().max(1);
                info!(
                    "Sync stats: {} ticks, {} transmits, {} stick writes in {} seconds ({:.2} ticks/sec), {} device(s) attached",
                    stats.ticks - last_stats.ticks,
                    stats.transmits - last_stats.transmits,
                    stats.stick_writes - last_stats.stick_writes,
                    elapsed_seconds,
                    (stats.ticks - last_stats.ticks) as f64 / elapsed_seconds as f64,
                    self.sampler.registry().len()
                );
                last_stats = stats;
                last_stats_time = now;
            }
        }

        info!("Transitioning to Stopped state");
        Ok(self.transition())
    }
}

fn stats_interval(secs: u64) -> chrono::Duration {
    let default_secs = SyncSettings::default().stats_interval_secs;
    i64::try_from(secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .unwrap_or_else(|| {
            warn!(
                "Stats interval of {} seconds is out of range, using {} seconds",
                secs, default_secs
            );
            chrono::Duration::seconds(default_secs as i64)
        })
}

fn tick_limiter(max_rate_hz: u32) -> Interval {
    let period = Duration::from_secs_f64(1.0 / f64::from(max_rate_hz.max(1)));
    debug!("Limiting sync loop to one tick per {:?}", period);
    let mut limiter = interval(period);
    limiter.set_missed_tick_behavior(MissedTickBehavior::Delay);
    limiter
}

/// Runs the input sync loop for `session` until a termination signal arrives.
///
/// Returns `Ok(())` on termination. Teardown of the session is left to the
/// caller.
pub async fn run_input_sync<C: ControllerSession>(
    session: &mut C,
    backend: Box<dyn InputBackend>,
    termination: TerminationSource,
    settings: Option<SyncSettings>,
) -> Result<(), SyncError<C::Error>> {
    let waiting = InputSync::create(session, backend, termination, settings)?;
    let running = waiting.connect(session).await?;
    let stopped = running.run_until_terminated(session).await?;

    let stats = stopped.stats();
    info!(
        "Input sync stopped after {} ticks ({} transmits, {} hot-plug events, {} rejected updates)",
        stats.ticks, stats.transmits, stats.hotplug_events, stats.rejected_updates
    );
    Ok(())
}
