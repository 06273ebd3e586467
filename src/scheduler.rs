//! Fixed-timestep accumulator
//!
//! The embedding renders at whatever rate the platform gives it; the
//! simulation only ever advances in whole [`crate::consts::TICK_DT`] steps.
//! Each frame feeds its wall-clock delta in and runs the returned number of
//! ticks. Catch-up is capped so a long hitch slows the game down instead of
//! freezing it in a tick storm.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_TICKS_PER_FRAME, TICK_DT};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FixedTimestep {
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one frame's delta, get the number of whole ticks to run.
    /// Excess time beyond the catch-up cap is discarded.
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        // A frame longer than 100 ms is a hitch, not gameplay
        self.accumulator += frame_dt.clamp(0.0, 0.1);

        let mut ticks = 0;
        while self.accumulator >= TICK_DT && ticks < MAX_TICKS_PER_FRAME {
            self.accumulator -= TICK_DT;
            ticks += 1;
        }
        if ticks == MAX_TICKS_PER_FRAME {
            self.accumulator = 0.0;
        }
        ticks
    }

    /// Fraction of a tick left in the accumulator, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / TICK_DT
    }
}
