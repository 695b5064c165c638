// Transport: play/stop state, the step cursor and the clock that moves it.

use std::time::Duration;

use thiserror::Error;

use crate::shared::{DEFAULT_BPM, MAX_BPM, MIN_BPM, NUM_STEPS};

#[derive(Debug, Error, PartialEq)]
pub enum BpmError {
    #[error("tempo must be a finite number, got {0}")]
    NotFinite(f32),
}

// Finite tempos are clamped into a range that keeps the step delay sane.
pub fn validate_bpm(bpm: f32) -> Result<f32, BpmError> {
    if !bpm.is_finite() {
        return Err(BpmError::NotFinite(bpm));
    }
    Ok(bpm.clamp(MIN_BPM, MAX_BPM))
}

// One 16th note: 60 / bpm / 4 seconds.
pub fn step_interval(bpm: f32) -> Duration {
    let bpm = validate_bpm(bpm).unwrap_or(DEFAULT_BPM);
    Duration::from_secs_f64(60.0 / bpm as f64 / 4.0)
}

// Recurring step timer. Owned by the Running state: dropping it is the cancel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepTimer {
    interval: Duration,
    elapsed: Duration,
}

impl StepTimer {
    pub fn arm(interval: Duration) -> Self {
        Self { interval, elapsed: Duration::ZERO }
    }

    // At most one step per call. After a stall (sleep, SIGSTOP, a hung
    // terminal) the missed steps are dropped, only the phase inside the
    // current interval is kept.
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed += dt;
        if self.elapsed < self.interval {
            return false;
        }
        let interval = self.interval.as_nanos().max(1);
        let phase = self.elapsed.as_nanos() % interval;
        self.elapsed = Duration::from_nanos(phase as u64);
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransportState {
    Stopped,
    Running(StepTimer),
}

#[derive(Clone, Debug)]
pub struct Transport {
    state: TransportState,
    current_step: u8,
    bpm: f32,
}

impl Transport {
    pub fn new(bpm: f32) -> Self {
        Self {
            state: TransportState::Stopped,
            current_step: 0,
            bpm: validate_bpm(bpm).unwrap_or(DEFAULT_BPM),
        }
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, TransportState::Running(_))
    }

    pub fn current_step(&self) -> u8 {
        self.current_step
    }

    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    pub fn interval(&self) -> Duration {
        step_interval(self.bpm)
    }

    // true if this actually started playback
    pub fn play(&mut self) -> bool {
        if self.is_playing() {
            return false;
        }
        self.state = TransportState::Running(StepTimer::arm(self.interval()));
        true
    }

    // true if this actually stopped playback; the cursor stays put
    pub fn pause(&mut self) -> bool {
        if !self.is_playing() {
            return false;
        }
        self.state = TransportState::Stopped;
        true
    }

    pub fn reset(&mut self) {
        self.state = TransportState::Stopped;
        self.current_step = 0;
    }

    // Re-arms a running timer so the new tempo applies from the next step on.
    pub fn set_bpm(&mut self, bpm: f32) -> Result<f32, BpmError> {
        self.bpm = validate_bpm(bpm)?;
        if let TransportState::Running(_) = self.state {
            self.state = TransportState::Running(StepTimer::arm(self.interval()));
        }
        Ok(self.bpm)
    }

    // The step reached during `dt`, if any. None while stopped.
    pub fn tick(&mut self, dt: Duration) -> Option<u8> {
        let TransportState::Running(timer) = &mut self.state else {
            return None;
        };
        if !timer.advance(dt) {
            return None;
        }
        self.current_step = (self.current_step + 1) % NUM_STEPS as u8;
        Some(self.current_step)
    }
}
