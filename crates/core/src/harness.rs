// WireBench - Packet Core Verification Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::bus::BusMaster;
use crate::clock::Simulator;
use crate::descriptor::{DescriptorCommand, DescriptorDriver};
use crate::device::{LoopbackMac, SLOT_CAPACITY};
use crate::trace::SignalTrace;
use crate::{HarnessError, HarnessResult};
use wirebench_config::{ResolvedSlotPair, Scenario, ScenarioConfig};

/// Outcome of a full scenario run. Any non-zero mismatch count is a test
/// failure, even though the protocol layer completed cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct TestReport {
    pub mismatches: u64,
    pub iterations: usize,
    pub ticks_used: u64,
}

/// End-to-end transfer test: fill the source slot over the bus, trigger the
/// descriptor engine, wait out the loopback transfer, then drain the
/// destination slot and compare byte-for-byte.
///
/// The three phases of each iteration are strictly ordered, never pipelined
/// across iterations. That keeps the single-outstanding-command invariant
/// trivially satisfied and makes integrity failures unambiguous.
pub struct Harness {
    sim: Simulator<LoopbackMac>,
    bus: BusMaster,
    driver: DescriptorDriver,
    scenario: Scenario,
}

impl Harness {
    pub fn new(scenario: Scenario) -> HarnessResult<Self> {
        if scenario.slots.is_empty() {
            return Err(HarnessError::InvalidScenario(
                "no slot pairs defined".to_string(),
            ));
        }
        if scenario.payload_len > SLOT_CAPACITY {
            return Err(HarnessError::InvalidScenario(format!(
                "payload length {} exceeds slot capacity {}",
                scenario.payload_len, SLOT_CAPACITY
            )));
        }
        let device = LoopbackMac::with_ack_latency(scenario.ack_latency);
        Ok(Self {
            sim: Simulator::new(device, scenario.tick_budget),
            bus: BusMaster::new(),
            driver: DescriptorDriver::new(),
            scenario,
        })
    }

    pub fn from_config(cfg: &ScenarioConfig) -> anyhow::Result<Self> {
        let scenario = cfg.resolve()?;
        Ok(Self::new(scenario)?)
    }

    pub fn enable_trace(&mut self) {
        self.sim.enable_trace();
    }

    pub fn trace(&self) -> Option<&SignalTrace> {
        self.sim.trace()
    }

    pub fn device(&self) -> &LoopbackMac {
        &self.sim.device
    }

    pub fn device_mut(&mut self) -> &mut LoopbackMac {
        &mut self.sim.device
    }

    /// Run every slot pair in order, then hold the system idle for the
    /// settle period before reporting.
    pub fn run(&mut self) -> HarnessResult<TestReport> {
        let payload = counter_payload(self.scenario.payload_len);
        let slots = self.scenario.slots.clone();

        let mut mismatches = 0u64;
        for (index, pair) in slots.iter().enumerate() {
            mismatches += self.run_iteration(index, *pair, &payload)?;
        }

        self.sim.idle(self.scenario.settle_ticks)?;

        let report = TestReport {
            mismatches,
            iterations: slots.len(),
            ticks_used: self.sim.now(),
        };
        tracing::info!(
            "scenario complete: {} mismatches over {} iterations in {} ticks",
            report.mismatches,
            report.iterations,
            report.ticks_used
        );
        Ok(report)
    }

    fn run_iteration(
        &mut self,
        index: usize,
        pair: ResolvedSlotPair,
        payload: &[u8],
    ) -> HarnessResult<u64> {
        tracing::debug!(
            "iteration {}: source={:#05x} dest={:#05x}",
            index,
            pair.source,
            pair.dest
        );

        // Fill phase: pack and write in ascending word order.
        let words = pack_words(payload);
        for (i, word) in words.iter().enumerate() {
            self.bus.write(&mut self.sim, pair.source + i as u32, *word)?;
        }

        // Trigger phase.
        self.driver.submit(
            &mut self.sim,
            DescriptorCommand {
                slot: index as u32,
                length: payload.len() as u32,
            },
        )?;
        self.driver.await_completion(&mut self.sim)?;
        self.driver.acknowledge_completion(&mut self.sim)?;

        // Drain phase: read back in ascending word order and compare the
        // first L bytes. Padding bytes are unconstrained.
        let mut readback = Vec::with_capacity(words.len());
        for i in 0..words.len() {
            readback.push(self.bus.read(&mut self.sim, pair.dest + i as u32)?);
        }
        let observed = unpack_words(&readback, payload.len());

        let mut mismatches = 0u64;
        for (i, (&expected, &got)) in payload.iter().zip(observed.iter()).enumerate() {
            if expected != got {
                tracing::warn!(
                    "iteration {}: mismatch at byte {}: expected {:#04x}, got {:#04x}",
                    index,
                    i,
                    expected,
                    got
                );
                mismatches += 1;
            }
        }
        Ok(mismatches)
    }
}

/// Deterministic repeating-counter payload.
pub fn counter_payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 255) as u8).collect()
}

/// Pack bytes into big-endian words, zero-padding the trailing word.
pub fn pack_words(bytes: &[u8]) -> Vec<u32> {
    bytes
        .chunks(4)
        .map(|chunk| {
            let mut word = 0u32;
            for (i, &b) in chunk.iter().enumerate() {
                word |= (b as u32) << (24 - 8 * i as u32);
            }
            word
        })
        .collect()
}

/// Unpack big-endian words back into `len` bytes.
pub fn unpack_words(words: &[u32], len: usize) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(words.len() * 4);
    for &word in words {
        bytes.push((word >> 24) as u8);
        bytes.push((word >> 16) as u8);
        bytes.push((word >> 8) as u8);
        bytes.push(word as u8);
    }
    bytes.truncate(len);
    bytes
}
