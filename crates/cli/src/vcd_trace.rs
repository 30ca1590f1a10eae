// WireBench - Packet Core Verification Harness
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use vcd::{IdCode, TimescaleUnit, Value, Writer};
use wirebench_core::{ControlLines, SignalTrace};

/// Dump a captured control-line trace as a VCD waveform, one timestep per
/// tick.
pub fn write_vcd(trace: &SignalTrace, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = Writer::new(BufWriter::new(file));

    writer.timescale(1, TimescaleUnit::NS)?;
    writer.add_module("harness")?;

    writer.add_module("bus")?;
    let cyc = writer.add_wire(1, "cyc")?;
    let stb = writer.add_wire(1, "stb")?;
    let ack = writer.add_wire(1, "ack")?;
    writer.upscope()?;

    writer.add_module("descriptor")?;
    let start = writer.add_wire(1, "start")?;
    let done_pending = writer.add_wire(1, "done_pending")?;
    let done_clear = writer.add_wire(1, "done_clear")?;
    writer.upscope()?;

    writer.upscope()?;
    writer.enddefinitions()?;

    let wires: [(IdCode, ControlLines); 6] = [
        (cyc, ControlLines::CYC),
        (stb, ControlLines::STB),
        (ack, ControlLines::ACK),
        (start, ControlLines::START),
        (done_pending, ControlLines::DONE_PENDING),
        (done_clear, ControlLines::DONE_CLEAR),
    ];

    writer.timestamp(0)?;
    for (id, _) in &wires {
        writer.change_scalar(*id, Value::V0)?;
    }

    let mut last = ControlLines::empty();
    for sample in trace.samples() {
        let changed = sample.lines ^ last;
        if changed.is_empty() {
            continue;
        }
        writer.timestamp(sample.tick)?;
        for (id, line) in &wires {
            if changed.contains(*line) {
                let value = if sample.lines.contains(*line) {
                    Value::V1
                } else {
                    Value::V0
                };
                writer.change_scalar(*id, value)?;
            }
        }
        last = sample.lines;
    }

    Ok(())
}
