// WireBench - Packet Core Verification Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::trace::{ControlLines, SignalTrace};
use crate::{HarnessError, HarnessResult, WaitPoint};

/// One synchronous clock domain's worth of device state.
///
/// `tick` settles everything the device does in a single clock: sampling the
/// control lines the harness drives, advancing internal engines, and driving
/// the device's own outputs. Callers only observe state between ticks, never
/// mid-tick.
pub trait TickDevice {
    fn tick(&mut self);

    /// Post-tick snapshot of the control lines, for trace capture.
    fn sample(&self) -> ControlLines;
}

/// Raised by [`Simulator::tick`] once the budget is spent. Polling waiters
/// convert this into a [`HarnessError::Timeout`] naming their suspension
/// point.
#[derive(Debug, thiserror::Error)]
#[error("tick budget of {0} exhausted")]
pub struct TickBudgetExhausted(pub u64);

/// Cooperative tick scheduler: owns the device under test and advances it
/// one discrete step at a time. All waiting in the harness is expressed as
/// "re-check a predicate once per tick" against this scheduler, so there is
/// exactly one logical thread of control and no mid-tick observation.
pub struct Simulator<D: TickDevice> {
    pub device: D,
    now: u64,
    budget: u64,
    trace: Option<SignalTrace>,
}

impl<D: TickDevice> Simulator<D> {
    pub fn new(device: D, budget: u64) -> Self {
        Self {
            device,
            now: 0,
            budget,
            trace: None,
        }
    }

    /// Record a control-line sample on every tick from now on.
    pub fn enable_trace(&mut self) {
        self.trace = Some(SignalTrace::default());
    }

    pub fn trace(&self) -> Option<&SignalTrace> {
        self.trace.as_ref()
    }

    /// Ticks elapsed since construction.
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn budget(&self) -> u64 {
        self.budget
    }

    /// Advance exactly one tick. The device settles first; any waiter
    /// re-checks its predicate only after this returns.
    pub fn tick(&mut self) -> Result<(), TickBudgetExhausted> {
        if self.now >= self.budget {
            return Err(TickBudgetExhausted(self.budget));
        }
        self.device.tick();
        self.now += 1;
        if let Some(trace) = &mut self.trace {
            trace.record(self.now, self.device.sample());
        }
        Ok(())
    }

    /// Advance while `cond` holds, re-checking once per tick. On budget
    /// exhaustion the resulting timeout names `point`.
    pub fn tick_while<F>(&mut self, point: WaitPoint, mut cond: F) -> HarnessResult<()>
    where
        F: FnMut(&D) -> bool,
    {
        while cond(&self.device) {
            self.tick().map_err(|e| HarnessError::Timeout {
                point,
                budget: e.0,
            })?;
        }
        Ok(())
    }

    /// Hold the system idle for `ticks` ticks.
    pub fn idle(&mut self, ticks: u64) -> Result<(), TickBudgetExhausted> {
        for _ in 0..ticks {
            self.tick()?;
        }
        Ok(())
    }
}
