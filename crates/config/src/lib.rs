// WireBench - Packet Core Verification Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default schema version for YAML scenarios
fn default_schema_version() -> String {
    "1.0".to_string()
}

fn default_payload_len() -> usize {
    1498
}

fn default_tick_budget() -> u64 {
    16_000
}

fn default_settle_ticks() -> u64 {
    200
}

fn default_slot_pairs() -> Vec<SlotPair> {
    vec![
        SlotPair {
            source: "0x000".to_string(),
            dest: "0x400".to_string(),
        },
        SlotPair {
            source: "0x200".to_string(),
            dest: "0x600".to_string(),
        },
    ]
}

/// One source/destination buffer pairing, as word addresses on the bus.
///
/// Addresses are strings so scenarios can use the same hex notation as the
/// device documentation, e.g. `"0x400"`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SlotPair {
    pub source: String,
    pub dest: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScenarioConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Payload length in bytes per transfer.
    #[serde(default = "default_payload_len")]
    pub payload_len: usize,
    /// One harness iteration runs per slot pair, in order.
    #[serde(default = "default_slot_pairs")]
    pub slot_pairs: Vec<SlotPair>,
    /// Maximum scheduler advances before the run is declared hung.
    #[serde(default = "default_tick_budget")]
    pub tick_budget: u64,
    /// Idle ticks held after the last iteration before reporting.
    #[serde(default = "default_settle_ticks")]
    pub settle_ticks: u64,
    /// Wait states the device inserts before acknowledging a bus access.
    #[serde(default)]
    pub ack_latency: u32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            name: None,
            payload_len: default_payload_len(),
            slot_pairs: default_slot_pairs(),
            tick_budget: default_tick_budget(),
            settle_ticks: default_settle_ticks(),
            ack_latency: 0,
        }
    }
}

impl ScenarioConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario file {:?}", path))?;
        let cfg: Self = serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse scenario file {:?}", path))?;
        Ok(cfg)
    }

    /// Resolve string addresses into the numeric scenario the harness runs.
    pub fn resolve(&self) -> Result<Scenario> {
        if self.slot_pairs.is_empty() {
            bail!("Scenario must define at least one slot pair");
        }
        let mut slots = Vec::with_capacity(self.slot_pairs.len());
        for pair in &self.slot_pairs {
            slots.push(ResolvedSlotPair {
                source: parse_addr(&pair.source)?,
                dest: parse_addr(&pair.dest)?,
            });
        }
        Ok(Scenario {
            payload_len: self.payload_len,
            slots,
            tick_budget: self.tick_budget,
            settle_ticks: self.settle_ticks,
            ack_latency: self.ack_latency,
        })
    }
}

/// Fully numeric scenario, consumed by the core harness.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub payload_len: usize,
    pub slots: Vec<ResolvedSlotPair>,
    pub tick_budget: u64,
    pub settle_ticks: u64,
    pub ack_latency: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSlotPair {
    pub source: u32,
    pub dest: u32,
}

/// Parse a word address, accepting `0x` hex or plain decimal.
pub fn parse_addr(s: &str) -> Result<u32> {
    let trimmed = s.trim();
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).with_context(|| format!("Invalid hex address '{}'", s))
    } else {
        trimmed
            .parse::<u32>()
            .with_context(|| format!("Invalid address '{}'", s))
    }
}
