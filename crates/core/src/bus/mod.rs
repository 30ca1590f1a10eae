// WireBench - Packet Core Verification Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::clock::{Simulator, TickDevice};
use crate::{HarnessResult, WaitPoint};
use bitflags::bitflags;

bitflags! {
    /// Byte-enable lanes. Lane N selects data bits `[8N+7:8N]`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SelLanes: u8 {
        const LANE0 = 1 << 0;
        const LANE1 = 1 << 1;
        const LANE2 = 1 << 2;
        const LANE3 = 1 << 3;
        const ALL = 0b1111;
    }
}

/// Control and data lines of the handshaking bus, as driven by the master
/// and observed by the device between ticks.
#[derive(Debug, Clone)]
pub struct WishbonePort {
    pub cyc: bool,
    pub stb: bool,
    pub we: bool,
    pub sel: SelLanes,
    pub adr: u32,
    pub dat_w: u32,
    pub dat_r: u32,
    pub ack: bool,
}

impl Default for WishbonePort {
    fn default() -> Self {
        Self {
            cyc: false,
            stb: false,
            we: false,
            sel: SelLanes::empty(),
            adr: 0,
            dat_w: 0,
            dat_r: 0,
            ack: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusDirection {
    Read,
    Write,
}

/// A single-word bus access. Consumed by [`BusMaster::transact`]; nothing
/// outlives the handshake.
#[derive(Debug, Clone, Copy)]
pub struct BusTransaction {
    pub adr: u32,
    pub direction: BusDirection,
    pub dat_w: u32,
    pub sel: SelLanes,
}

impl BusTransaction {
    pub fn write(adr: u32, dat: u32) -> Self {
        Self {
            adr,
            direction: BusDirection::Write,
            dat_w: dat,
            sel: SelLanes::ALL,
        }
    }

    pub fn read(adr: u32) -> Self {
        Self {
            adr,
            direction: BusDirection::Read,
            // Write data is don't-care on reads; drive zero by convention.
            dat_w: 0,
            sel: SelLanes::ALL,
        }
    }
}

/// Valid only once the transaction's handshake has completed, and only
/// meaningful for reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusResult {
    pub dat_r: u32,
}

/// Single-master protocol engine: one transaction at a time, no pipelining,
/// no reordering.
///
/// Each call drives the full handshake: assert cyc/stb together with the
/// address and data lines, hold while the device inserts wait states, and on
/// acknowledge release the bus and spend one mandatory turnaround tick
/// before returning. Strict sequencing falls out of the synchronous call
/// shape; the next transaction cannot start before the previous one has
/// returned.
#[derive(Debug, Default)]
pub struct BusMaster {
    transactions: u64,
}

impl BusMaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed handshakes so far.
    pub fn transactions(&self) -> u64 {
        self.transactions
    }

    pub fn write<D>(&mut self, sim: &mut Simulator<D>, adr: u32, dat: u32) -> HarnessResult<()>
    where
        D: TickDevice + AsRef<WishbonePort> + AsMut<WishbonePort>,
    {
        self.transact(sim, BusTransaction::write(adr, dat))?;
        Ok(())
    }

    pub fn read<D>(&mut self, sim: &mut Simulator<D>, adr: u32) -> HarnessResult<u32>
    where
        D: TickDevice + AsRef<WishbonePort> + AsMut<WishbonePort>,
    {
        Ok(self.transact(sim, BusTransaction::read(adr))?.dat_r)
    }

    pub fn transact<D>(
        &mut self,
        sim: &mut Simulator<D>,
        txn: BusTransaction,
    ) -> HarnessResult<BusResult>
    where
        D: TickDevice + AsRef<WishbonePort> + AsMut<WishbonePort>,
    {
        tracing::trace!("bus {:?} adr={:#x}", txn.direction, txn.adr);
        {
            let port = sim.device.as_mut();
            port.cyc = true;
            port.stb = true;
            port.we = matches!(txn.direction, BusDirection::Write);
            port.sel = txn.sel;
            port.adr = txn.adr;
            port.dat_w = match txn.direction {
                BusDirection::Write => txn.dat_w,
                BusDirection::Read => 0,
            };
        }

        // The device may insert any number of wait states; re-check the
        // acknowledge line once per tick.
        sim.tick_while(WaitPoint::BusAck, |dev| !dev.as_ref().ack)?;

        // dat_r is only valid while the cycle is still active; sample it
        // before releasing the bus.
        let result = BusResult {
            dat_r: sim.device.as_ref().dat_r,
        };

        {
            let port = sim.device.as_mut();
            port.cyc = false;
            port.stb = false;
        }

        // Mandatory turnaround tick after every handshake.
        sim.tick()?;

        self.transactions += 1;
        Ok(result)
    }
}
