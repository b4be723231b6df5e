//! Rendering of run results: frame hex dumps, counters, and the link budget.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use caduceus_core::diagnostics::{watt_per_hz_to_dbm_per_hz, watt_to_dbm, LinkReport};
use caduceus_core::framing::TmFrame;
use caduceus_core::pipeline::RunReport;

/// Write the post-line-code bit stream as ASCII '0'/'1'.
pub fn write_bitstream(path: &Path, bits: &[u8]) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for &b in bits {
        out.write_all(if b != 0 { b"1" } else { b"0" })?;
    }
    out.flush()
}

/// Hex dump of each decoded transfer frame, 32 bytes per line.
pub fn print_frames(frames: &[TmFrame]) {
    for (idx, frame) in frames.iter().enumerate() {
        println!(
            "================== TM FRAME {} ==================",
            idx + 1
        );
        println!(
            "  sync at bit {}, {} RS corrections, {} bytes",
            frame.bit_offset,
            frame.corrected,
            frame.data.len()
        );
        for chunk in frame.data.chunks(32) {
            let line: Vec<String> = chunk.iter().map(|b| format!("{:02X}", b)).collect();
            println!("{}", line.join(" "));
        }
        println!("================================================\n");
    }
}

pub fn print_summary(report: &RunReport) {
    println!("\n--- FRAME PROCESSING SUMMARY ---");
    println!("Frames found:  {}", report.stats.found);
    println!("TM OK:         {}", report.stats.ok);
    println!("TM BAD:        {}", report.stats.bad);
    if report.stats.incomplete {
        println!("(last frame incomplete, skipped)");
    }
    println!(
        "Success rate:  {:.1}%",
        report.stats.success_rate() * 100.0
    );
}

pub fn print_power(report: &RunReport) {
    println!("\n=== POWER (measured from voltage samples) ===");
    println!(
        "Ptot_raw  : {:.6e} W ({:.2} dBm)",
        report.power_raw_w,
        watt_to_dbm(report.power_raw_w)
    );
    println!(
        "Ptot_post : {:.6e} W ({:.2} dBm)",
        report.power_post_w,
        watt_to_dbm(report.power_post_w)
    );
}

pub fn print_link_report(link: &LinkReport) {
    println!("\n=== EVM ===");
    println!("EVM: {:.4}% ({:.2} dB)", link.evm * 100.0, link.evm_db());

    println!("\n=== ENERGY / NOISE (est.) ===");
    println!("Rb            : {:.3e} bit/s", link.rb);
    println!("Rs            : {:.3e} sym/s", link.rs);
    println!("Bocc (est)    : {:.3e} Hz", link.bocc);
    println!(
        "Psig_post (est): {:.6e} W ({:.2} dBm)",
        link.psig_w,
        watt_to_dbm(link.psig_w)
    );
    println!(
        "Pn_inband (est): {:.6e} W ({:.2} dBm)",
        link.pn_w,
        watt_to_dbm(link.pn_w)
    );
    println!(
        "N0 (est)      : {:.6e} W/Hz ({:.2} dBm/Hz)",
        link.n0_w_per_hz,
        watt_per_hz_to_dbm_per_hz(link.n0_w_per_hz)
    );
    println!("Eb            : {:.6e} J/bit", link.eb_j);
    println!("Es            : {:.6e} J/sym", link.es_j);
    println!("Es/N0         : {:.2} dB", link.esn0_db);
    println!("Eb/N0         : {:.2} dB", link.ebn0_db);
    println!("SNR_inband    : {:.2} dB", link.snr_inband_db);
}
