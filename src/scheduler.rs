//! Sampling cadence.
//!
//! `SamplingScheduler` decouples the raw frame rate from the inference rate:
//! each pipeline iteration asks whether this tick is an inference tick, and
//! the scheduler answers from its private counter alone. The decision never
//! depends on wall-clock time, so variable inference latency on earlier ticks
//! cannot drift the cadence.

use crate::error::ConfigError;

/// Counter-based inference cadence. Tick `t` is an inference tick iff
/// `t % skip_interval == 0`, so the very first tick always infers.
#[derive(Debug)]
pub struct SamplingScheduler {
    skip_interval: u64,
    tick: u64,
}

impl SamplingScheduler {
    /// A skip interval of 0 is a configuration error; 1 means "infer every tick".
    pub fn new(skip_interval: u64) -> Result<Self, ConfigError> {
        if skip_interval == 0 {
            return Err(ConfigError::InvalidSkipInterval);
        }
        Ok(Self {
            skip_interval,
            tick: 0,
        })
    }

    /// Advance the counter and report whether the tick just consumed is an
    /// inference tick. Infallible.
    pub fn next_tick_is_inference(&mut self) -> bool {
        let infer = self.tick % self.skip_interval == 0;
        self.tick += 1;
        infer
    }

    /// Total ticks consumed so far.
    pub fn ticks(&self) -> u64 {
        self.tick
    }
}
