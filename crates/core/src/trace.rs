// WireBench - Packet Core Verification Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use bitflags::bitflags;

bitflags! {
    /// Control lines sampled once per tick, for waveform capture and
    /// handshake assertions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ControlLines: u8 {
        const CYC = 1 << 0;
        const STB = 1 << 1;
        const ACK = 1 << 2;
        const START = 1 << 3;
        const DONE_PENDING = 1 << 4;
        const DONE_CLEAR = 1 << 5;
    }
}

/// One sample per elapsed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSample {
    pub tick: u64,
    pub lines: ControlLines,
}

/// Per-tick control-line history of a run.
#[derive(Debug, Default)]
pub struct SignalTrace {
    samples: Vec<TickSample>,
}

impl SignalTrace {
    pub fn record(&mut self, tick: u64, lines: ControlLines) {
        self.samples.push(TickSample { tick, lines });
    }

    pub fn samples(&self) -> &[TickSample] {
        &self.samples
    }

    /// Contiguous intervals during which `line` stayed asserted, as
    /// inclusive `(first, last)` tick pairs.
    pub fn asserted_intervals(&self, line: ControlLines) -> Vec<(u64, u64)> {
        let mut intervals = Vec::new();
        let mut open: Option<(u64, u64)> = None;
        for s in &self.samples {
            if s.lines.contains(line) {
                open = match open {
                    Some((first, _)) => Some((first, s.tick)),
                    None => Some((s.tick, s.tick)),
                };
            } else if let Some(iv) = open.take() {
                intervals.push(iv);
            }
        }
        if let Some(iv) = open {
            intervals.push(iv);
        }
        intervals
    }
}
