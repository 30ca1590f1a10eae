// WireBench - Packet Core Verification Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::bus::WishbonePort;
use crate::clock::TickDevice;
use crate::descriptor::DescriptorPort;
use crate::trace::ControlLines;

/// Number of 32-bit words in the packet SRAM.
pub const SRAM_WORDS: usize = 0x800;
/// Words per buffer slot window.
pub const SLOT_WORDS: usize = 0x200;
/// Byte capacity of one slot.
pub const SLOT_CAPACITY: usize = SLOT_WORDS * 4;

/// Source slot base word addresses, by descriptor slot index.
pub const SOURCE_SLOT_BASE: [u32; 2] = [0x000, 0x200];
/// Destination slot base word addresses, by descriptor slot index.
pub const DEST_SLOT_BASE: [u32; 2] = [0x400, 0x600];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum EngineState {
    #[default]
    Idle,
    Copying,
}

/// Register-mapped packet core with a loopback transport.
///
/// Bus side: word-addressed SRAM behind the handshaking port, with a
/// configurable number of wait states before acknowledge. Addresses outside
/// the SRAM never acknowledge, which surfaces upstream as a bus-ack timeout.
///
/// Descriptor side: a rising edge on `start` latches slot and length and the
/// engine copies `ceil(length / 4)` words from the slot's source window to
/// its destination window, one word per tick. The final word raises the
/// level-held `done_pending` flag; `done_clear` drops it again.
#[derive(Debug)]
pub struct LoopbackMac {
    pub wb: WishbonePort,
    pub desc: DescriptorPort,
    sram: Vec<u32>,
    engine: EngineState,
    src_cursor: u32,
    dst_cursor: u32,
    dst_base: u32,
    remaining_words: u32,
    wait_counter: u32,
    ack_latency: u32,
    withhold_ack: bool,
    start_prev: bool,
    fault_once: Option<u32>,
}

impl Default for LoopbackMac {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackMac {
    pub fn new() -> Self {
        Self::with_ack_latency(0)
    }

    /// `ack_latency` wait states are inserted before every acknowledge.
    pub fn with_ack_latency(ack_latency: u32) -> Self {
        Self {
            wb: WishbonePort::default(),
            desc: DescriptorPort::default(),
            sram: vec![0; SRAM_WORDS],
            engine: EngineState::Idle,
            src_cursor: 0,
            dst_cursor: 0,
            dst_base: 0,
            remaining_words: 0,
            wait_counter: 0,
            ack_latency,
            withhold_ack: false,
            start_prev: false,
            fault_once: None,
        }
    }

    /// Test hook: suppress the acknowledge line entirely, hanging every bus
    /// transaction.
    pub fn set_withhold_ack(&mut self, withhold: bool) {
        self.withhold_ack = withhold;
    }

    /// Test hook: flip one destination byte (big-endian byte `offset` into
    /// the destination buffer) when the next transfer completes. One-shot.
    pub fn corrupt_byte(&mut self, offset: u32) {
        self.fault_once = Some(offset);
    }

    /// Word peek, bypassing the bus handshake. Debug access only.
    pub fn peek_word(&self, adr: u32) -> Option<u32> {
        self.sram.get(adr as usize).copied()
    }

    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::json!({
            "bus": {
                "cyc": self.wb.cyc,
                "stb": self.wb.stb,
                "we": self.wb.we,
                "sel": self.wb.sel.bits(),
                "adr": self.wb.adr,
                "dat_w": self.wb.dat_w,
                "dat_r": self.wb.dat_r,
                "ack": self.wb.ack,
            },
            "descriptor": {
                "slot": self.desc.slot,
                "length": self.desc.length,
                "start": self.desc.start,
                "done_pending": self.desc.done_pending,
                "done_clear": self.desc.done_clear,
            },
            "engine": format!("{:?}", self.engine),
            "remaining_words": self.remaining_words,
        })
    }

    fn tick_bus(&mut self) {
        if !(self.wb.cyc && self.wb.stb) {
            self.wb.ack = false;
            self.wait_counter = 0;
            return;
        }
        if self.wb.ack {
            // Single-tick acknowledge; the master sampled it last tick.
            self.wb.ack = false;
            self.wait_counter = 0;
            return;
        }
        if self.withhold_ack {
            return;
        }
        if self.wait_counter < self.ack_latency {
            self.wait_counter += 1;
            return;
        }
        let word = self.wb.adr as usize;
        if word >= SRAM_WORDS {
            // No decode target: never acknowledge.
            return;
        }
        if self.wb.we {
            let mut current = self.sram[word];
            for lane in 0..4u32 {
                if self.wb.sel.bits() & (1u8 << lane) != 0 {
                    let mask = 0xFFu32 << (lane * 8);
                    current = (current & !mask) | (self.wb.dat_w & mask);
                }
            }
            self.sram[word] = current;
        } else {
            self.wb.dat_r = self.sram[word];
        }
        self.wb.ack = true;
        self.wait_counter = 0;
    }

    fn tick_engine(&mut self) {
        let start_edge = self.desc.start && !self.start_prev;
        self.start_prev = self.desc.start;

        if start_edge && self.engine == EngineState::Idle {
            let slot = self.desc.slot as usize;
            if slot >= SOURCE_SLOT_BASE.len() {
                tracing::warn!("start strobe with out-of-range slot {}", self.desc.slot);
            } else {
                let words = ((self.desc.length as usize + 3) / 4).min(SLOT_WORDS) as u32;
                self.src_cursor = SOURCE_SLOT_BASE[slot];
                self.dst_cursor = DEST_SLOT_BASE[slot];
                self.dst_base = DEST_SLOT_BASE[slot];
                self.remaining_words = words;
                self.engine = EngineState::Copying;
                tracing::debug!(
                    "transfer start: slot={} length={} words={}",
                    self.desc.slot,
                    self.desc.length,
                    words
                );
            }
        }

        if self.engine == EngineState::Copying {
            if self.remaining_words > 0 {
                self.sram[self.dst_cursor as usize] = self.sram[self.src_cursor as usize];
                self.src_cursor += 1;
                self.dst_cursor += 1;
                self.remaining_words -= 1;
            }
            if self.remaining_words == 0 {
                if let Some(offset) = self.fault_once.take() {
                    let word = (self.dst_base + offset / 4) as usize;
                    if let Some(w) = self.sram.get_mut(word) {
                        *w ^= 0xFFu32 << (24 - 8 * (offset % 4));
                        tracing::debug!("fault injected at destination byte {}", offset);
                    }
                }
                self.engine = EngineState::Idle;
                self.desc.done_pending = true;
                tracing::debug!("transfer complete");
            }
        }
    }
}

impl TickDevice for LoopbackMac {
    fn tick(&mut self) {
        self.tick_bus();
        self.tick_engine();
        if self.desc.done_clear {
            self.desc.done_pending = false;
        }
    }

    fn sample(&self) -> ControlLines {
        let mut lines = ControlLines::empty();
        lines.set(ControlLines::CYC, self.wb.cyc);
        lines.set(ControlLines::STB, self.wb.stb);
        lines.set(ControlLines::ACK, self.wb.ack);
        lines.set(ControlLines::START, self.desc.start);
        lines.set(ControlLines::DONE_PENDING, self.desc.done_pending);
        lines.set(ControlLines::DONE_CLEAR, self.desc.done_clear);
        lines
    }
}

impl AsRef<WishbonePort> for LoopbackMac {
    fn as_ref(&self) -> &WishbonePort {
        &self.wb
    }
}

impl AsMut<WishbonePort> for LoopbackMac {
    fn as_mut(&mut self) -> &mut WishbonePort {
        &mut self.wb
    }
}

impl AsRef<DescriptorPort> for LoopbackMac {
    fn as_ref(&self) -> &DescriptorPort {
        &self.desc
    }
}

impl AsMut<DescriptorPort> for LoopbackMac {
    fn as_mut(&mut self) -> &mut DescriptorPort {
        &mut self.desc
    }
}
