mod banner;
mod report;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;

use caduceus_core::config::{DemodConfig, IqFormat, Modulation};
use caduceus_core::pipeline;

#[derive(Parser, Debug)]
#[command(
    name = "caduceus",
    version,
    about = "OQPSK/BPSK file demodulator with CCSDS frame sync and Reed-Solomon decoding",
    long_about = None
)]
struct Cli {
    /// Input IQ file path
    #[arg(short = 'i', value_name = "FILE")]
    input: Option<PathBuf>,

    /// Decimation factor
    #[arg(short = 'd', value_name = "NUM")]
    decim: Option<usize>,

    /// Samples per symbol
    #[arg(long, value_name = "NUM")]
    sps: Option<f64>,

    /// BPSK demodulation mode
    #[arg(long, conflicts_with = "oqpsk")]
    bpsk: bool,

    /// OQPSK demodulation mode (default)
    #[arg(long)]
    oqpsk: bool,

    /// 16-bit IQ input format (default)
    #[arg(long, conflicts_with = "iq32")]
    iq16: bool,

    /// 32-bit IQ input format
    #[arg(long)]
    iq32: bool,

    /// Costas loop proportional gain
    #[arg(long = "costas-alpha", value_name = "NUM")]
    costas_alpha: Option<f64>,

    /// Costas loop integral gain
    #[arg(long = "costas-beta", value_name = "NUM")]
    costas_beta: Option<f64>,

    /// Timing loop proportional gain
    #[arg(long = "timing-alpha", value_name = "NUM")]
    timing_alpha: Option<f64>,

    /// Timing loop integral gain
    #[arg(long = "timing-beta", value_name = "NUM")]
    timing_beta: Option<f64>,

    /// Enable the RRC matched filter
    #[arg(long = "rrc_enable", conflicts_with = "no_rrc")]
    rrc_enable: bool,

    /// Disable the RRC matched filter
    #[arg(long = "no-rrc")]
    no_rrc: bool,

    /// RRC roll-off factor
    #[arg(long = "rrc-alpha", value_name = "NUM")]
    rrc_alpha: Option<f64>,

    /// RRC span in symbols
    #[arg(long = "rrc-span", value_name = "NUM")]
    rrc_span: Option<usize>,
}

impl Cli {
    fn into_config(self) -> DemodConfig {
        let mut cfg = DemodConfig::default();

        if let Some(input) = self.input {
            cfg.input_file = input;
        }
        if let Some(decim) = self.decim {
            cfg.decim = decim;
        }
        if let Some(sps) = self.sps {
            cfg.sps = sps;
        }
        if self.bpsk {
            cfg.modulation = Modulation::Bpsk;
        } else if self.oqpsk {
            cfg.modulation = Modulation::Oqpsk;
        }
        if self.iq32 {
            cfg.input_format = IqFormat::Iq32;
        } else if self.iq16 {
            cfg.input_format = IqFormat::Iq16;
        }
        if let Some(v) = self.costas_alpha {
            cfg.costas.alpha = v;
        }
        if let Some(v) = self.costas_beta {
            cfg.costas.beta = v;
        }
        if let Some(v) = self.timing_alpha {
            cfg.timing.alpha = v;
        }
        if let Some(v) = self.timing_beta {
            cfg.timing.beta = v;
        }
        if self.rrc_enable {
            cfg.rrc.enable = true;
        } else if self.no_rrc {
            cfg.rrc.enable = false;
        }
        if let Some(v) = self.rrc_alpha {
            cfg.rrc.rolloff = v;
        }
        if let Some(v) = self.rrc_span {
            cfg.rrc.span = v;
        }
        cfg
    }
}

const OUTPUT_BITS_FILE: &str = "output_bits.txt";

fn main() -> Result<()> {
    color_eyre::install()?;
    let cfg = Cli::parse().into_config();

    banner::print_banner(&cfg);

    let run = pipeline::run(&cfg)?;

    for entry in run.log.entries() {
        println!("{}", entry);
    }

    report::print_power(&run);

    println!(
        "\n--- DEMODULATED ---\nSymbols: {} ({} bit/symbol)",
        run.symbol_count,
        cfg.modulation.bits_per_symbol()
    );

    match report::write_bitstream(std::path::Path::new(OUTPUT_BITS_FILE), &run.bits) {
        Ok(()) => println!("Saved {} bits to {}", run.bits.len(), OUTPUT_BITS_FILE),
        Err(e) => eprintln!("Warning: could not write {}: {}", OUTPUT_BITS_FILE, e),
    }

    println!("\n--- FRAME SYNC & RS DECODE (0x1ACFFC1D) ---");
    report::print_frames(&run.frames);
    report::print_summary(&run);

    if let Some(link) = &run.link {
        report::print_link_report(link);
    }

    Ok(())
}
