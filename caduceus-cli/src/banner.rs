//! Configuration banner printed before each run.

use caduceus_core::config::{DemodConfig, IqFormat, Modulation};

pub fn print_banner(cfg: &DemodConfig) {
    println!("===========================================");
    println!("       OQPSK/BPSK File Demodulator");
    println!("===========================================");

    println!("\n[Input Settings]");
    println!("  File:         {}", cfg.input_file.display());
    println!(
        "  Format:       {}",
        match cfg.input_format {
            IqFormat::Iq16 => "IQ16 (16-bit)",
            IqFormat::Iq32 => "IQ32 (32-bit)",
        }
    );
    println!(
        "  Modulation:   {}",
        match cfg.modulation {
            Modulation::Bpsk => "BPSK",
            Modulation::Oqpsk => "OQPSK",
        }
    );

    println!("\n[Sample Rate]");
    println!("  Decimation:   {}", cfg.decim);
    println!("  SPS:          {:.4}", cfg.sps);
    println!("  Bit Rate:     {:.3e} bit/s", cfg.rb);

    println!("\n[Costas Loop]");
    println!("  Alpha:        {:.6}", cfg.costas.alpha);
    println!("  Beta:         {:.6}", cfg.costas.beta);

    println!("\n[Timing Recovery]");
    println!("  Alpha:        {:.6}", cfg.timing.alpha);
    println!("  Beta:         {:.6}", cfg.timing.beta);

    println!("\n[RRC Filter]");
    println!("  Enabled:      {}", if cfg.rrc.enable { "Yes" } else { "No" });
    if cfg.rrc.enable {
        println!("  Roll-off:     {:.2}", cfg.rrc.rolloff);
        println!("  Span:         {} symbols", cfg.rrc.span);
    }

    println!("\n[Processing Toggles]");
    println!("  Low-pass:     {}", on_off(cfg.lowpass.enable));
    println!("  Viterbi:      {}", on_off(cfg.chain.viterbi));
    println!("  NRZ-M:        {}", on_off(cfg.chain.nrzm));
    println!("  Descramble:   {}", on_off(cfg.chain.descramble));
    println!("  Auto-tune:    {}", on_off(cfg.auto_tune));
    println!("  UDP Sender:   {}", on_off(cfg.udp.is_some()));

    println!("===========================================\n");
}

fn on_off(v: bool) -> &'static str {
    if v {
        "ON"
    } else {
        "OFF"
    }
}
