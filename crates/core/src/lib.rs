// WireBench - Packet Core Verification Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

pub mod bus;
pub mod clock;
pub mod descriptor;
pub mod device;
pub mod harness;
pub mod trace;

mod tests;

use std::fmt;

/// Suspension points a waiter can block on. A timeout names the point that
/// never unblocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPoint {
    /// Bus acknowledge during a read/write handshake.
    BusAck,
    /// Descriptor completion-pending flag.
    Completion,
}

impl fmt::Display for WaitPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitPoint::BusAck => write!(f, "bus acknowledge"),
            WaitPoint::Completion => write!(f, "descriptor completion"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// A polling wait never observed its condition within the tick budget.
    #[error("tick budget of {budget} exhausted while waiting on {point}")]
    Timeout { point: WaitPoint, budget: u64 },
    /// The budget ran out during a fixed-length sequence (strobe pulse,
    /// turnaround, settle hold) rather than inside a polling wait.
    #[error("tick budget of {0} exhausted")]
    BudgetExhausted(u64),
    #[error("descriptor submitted for slot {slot} while the completion channel is {state:?}")]
    ChannelBusy {
        slot: u32,
        state: descriptor::ChannelState,
    },
    #[error("completion acknowledged while the channel is {state:?}")]
    NothingToAcknowledge { state: descriptor::ChannelState },
    #[error("invalid scenario: {0}")]
    InvalidScenario(String),
}

impl From<clock::TickBudgetExhausted> for HarnessError {
    fn from(err: clock::TickBudgetExhausted) -> Self {
        HarnessError::BudgetExhausted(err.0)
    }
}

pub type HarnessResult<T> = Result<T, HarnessError>;

pub use bus::{BusDirection, BusMaster, BusResult, BusTransaction, SelLanes, WishbonePort};
pub use clock::{Simulator, TickBudgetExhausted, TickDevice};
pub use descriptor::{ChannelState, DescriptorCommand, DescriptorDriver, DescriptorPort};
pub use device::LoopbackMac;
pub use harness::{Harness, TestReport};
pub use trace::{ControlLines, SignalTrace, TickSample};
