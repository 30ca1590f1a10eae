// WireBench - Packet Core Verification Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::clock::{Simulator, TickDevice};
use crate::{HarnessError, HarnessResult, WaitPoint};

/// Device-local descriptor control surface. The driver runs "on" the device
/// and drives these lines directly rather than going across the bus.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorPort {
    pub slot: u32,
    pub length: u32,
    pub start: bool,
    pub done_pending: bool,
    pub done_clear: bool,
}

/// One buffer-descriptor submission. Immutable once issued; its lifecycle
/// ends when the matching completion is observed and cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorCommand {
    pub slot: u32,
    /// Transfer length in bytes.
    pub length: u32,
}

/// Completion-channel lifecycle. At most one command may be outstanding at
/// a time; a pending completion must be acknowledged before the channel is
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelState {
    #[default]
    Idle,
    Armed,
    CompletionPending,
}

/// Sequences the three-phase descriptor command: configure fields, pulse
/// start, poll completion, pulse clear.
#[derive(Debug, Default)]
pub struct DescriptorDriver {
    state: ChannelState,
}

impl DescriptorDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Configure slot/length and pulse the start strobe for exactly one
    /// tick. Fire-and-forget: completion is observed separately.
    ///
    /// Submitting while a previous completion is pending-and-uncleared is a
    /// protocol violation and fails without touching the device.
    pub fn submit<D>(&mut self, sim: &mut Simulator<D>, cmd: DescriptorCommand) -> HarnessResult<()>
    where
        D: TickDevice + AsMut<DescriptorPort>,
    {
        if self.state != ChannelState::Idle {
            return Err(HarnessError::ChannelBusy {
                slot: cmd.slot,
                state: self.state,
            });
        }
        tracing::debug!("descriptor submit: slot={} length={}", cmd.slot, cmd.length);
        let port = sim.device.as_mut();
        port.slot = cmd.slot;
        port.length = cmd.length;
        port.start = true;
        sim.tick()?;
        // The strobe is edge-sensitive on the device side; holding it for
        // more than one tick is a protocol violation.
        sim.device.as_mut().start = false;
        sim.tick()?;
        self.state = ChannelState::Armed;
        Ok(())
    }

    /// Re-check the completion-pending flag once per tick until asserted.
    pub fn await_completion<D>(&mut self, sim: &mut Simulator<D>) -> HarnessResult<()>
    where
        D: TickDevice + AsRef<DescriptorPort> + AsMut<DescriptorPort>,
    {
        sim.tick_while(WaitPoint::Completion, |dev| !dev.as_ref().done_pending)?;
        self.state = ChannelState::CompletionPending;
        tracing::debug!("descriptor completion observed at tick {}", sim.now());
        Ok(())
    }

    /// Pulse the completion-clear strobe for exactly one tick, freeing the
    /// channel for the next submission.
    pub fn acknowledge_completion<D>(&mut self, sim: &mut Simulator<D>) -> HarnessResult<()>
    where
        D: TickDevice + AsMut<DescriptorPort>,
    {
        if self.state != ChannelState::CompletionPending {
            return Err(HarnessError::NothingToAcknowledge { state: self.state });
        }
        sim.device.as_mut().done_clear = true;
        sim.tick()?;
        sim.device.as_mut().done_clear = false;
        sim.tick()?;
        self.state = ChannelState::Idle;
        Ok(())
    }
}
