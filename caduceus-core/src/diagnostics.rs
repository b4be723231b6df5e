//! End-of-run signal quality diagnostics.
//!
//! The decision-directed EVM is turned into an energy/noise budget using
//! the usual AWGN assumption Es/N0 = 1/EVM^2. The measured post-filter
//! power is split into signal and noise parts from the implied in-band SNR,
//! and per-bit/per-symbol energies follow from the rates.

pub fn watt_to_dbm(w: f64) -> f64 {
    if w > 0.0 {
        10.0 * (w / 1e-3).log10()
    } else {
        f64::NEG_INFINITY
    }
}

pub fn watt_per_hz_to_dbm_per_hz(w_per_hz: f64) -> f64 {
    if w_per_hz > 0.0 {
        10.0 * (w_per_hz / 1e-3).log10()
    } else {
        f64::NEG_INFINITY
    }
}

fn db10(x: f64) -> f64 {
    10.0 * (x + 1e-30).log10()
}

/// Energy/noise estimates derived from EVM and the measured total power.
#[derive(Debug, Clone)]
pub struct LinkReport {
    /// EVM as a fraction.
    pub evm: f64,
    pub bits_per_sym: f64,
    /// Bit rate, bit/s.
    pub rb: f64,
    /// Symbol rate, sym/s.
    pub rs: f64,
    /// Occupied bandwidth estimate, Hz.
    pub bocc: f64,
    pub esn0_db: f64,
    pub ebn0_db: f64,
    pub snr_inband_db: f64,
    /// Estimated signal part of the measured power, W.
    pub psig_w: f64,
    /// Estimated in-band noise part, W.
    pub pn_w: f64,
    /// Noise spectral density, W/Hz.
    pub n0_w_per_hz: f64,
    /// Energy per bit, J.
    pub eb_j: f64,
    /// Energy per symbol, J.
    pub es_j: f64,
}

impl LinkReport {
    /// Derive the budget from an EVM estimate.
    ///
    /// `rrc_rolloff` is the matched-filter roll-off used for the occupied
    /// bandwidth (`Rs * (1 + alpha)`); pass 0.0 when the filter is off.
    pub fn from_evm(
        evm: f64,
        bits_per_sym: f64,
        rb: f64,
        rrc_rolloff: f64,
        power_post_w: f64,
    ) -> Self {
        let rs = rb / bits_per_sym;
        let bocc = rs * (1.0 + rrc_rolloff);

        let evm2 = evm * evm + 1e-30;
        let esn0 = 1.0 / evm2;
        let ebn0 = esn0 / bits_per_sym;
        let snr = ebn0 * (rb / (bocc + 1e-30));

        let psig = power_post_w * (snr / (1.0 + snr));
        let pn = power_post_w * (1.0 / (1.0 + snr));

        Self {
            evm,
            bits_per_sym,
            rb,
            rs,
            bocc,
            esn0_db: db10(esn0),
            ebn0_db: db10(ebn0),
            snr_inband_db: db10(snr),
            psig_w: psig,
            pn_w: pn,
            n0_w_per_hz: pn / (bocc + 1e-30),
            eb_j: psig / (rb + 1e-30),
            es_j: psig / (rs + 1e-30),
        }
    }

    /// EVM expressed in dB.
    pub fn evm_db(&self) -> f64 {
        20.0 * (self.evm + 1e-30).log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn dbm_conversions() {
        assert_relative_eq!(watt_to_dbm(1e-3), 0.0, epsilon = 1e-9);
        assert_relative_eq!(watt_to_dbm(1.0), 30.0, epsilon = 1e-9);
        assert!(watt_to_dbm(0.0).is_infinite());
        assert_relative_eq!(watt_per_hz_to_dbm_per_hz(1e-3), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn power_split_conserves_total() {
        let report = LinkReport::from_evm(0.1, 2.0, 2e6, 0.35, 1e-6);
        assert_relative_eq!(report.psig_w + report.pn_w, 1e-6, max_relative = 1e-9);
        assert!(report.psig_w > report.pn_w, "10% EVM implies strong signal");
    }

    #[test]
    fn esn0_matches_evm_definition() {
        // EVM of 10% -> Es/N0 = 100 -> 20 dB; OQPSK halves it per bit.
        let report = LinkReport::from_evm(0.1, 2.0, 1e6, 0.0, 1e-6);
        assert_relative_eq!(report.esn0_db, 20.0, epsilon = 1e-6);
        assert_relative_eq!(report.ebn0_db, 20.0 - db10(2.0), epsilon = 1e-6);
    }

    #[test]
    fn energies_follow_from_rates() {
        let report = LinkReport::from_evm(0.05, 1.0, 1e3, 0.5, 1e-3);
        assert_relative_eq!(report.eb_j, report.psig_w / 1e3, max_relative = 1e-9);
        assert_relative_eq!(report.es_j, report.eb_j, max_relative = 1e-9);
    }
}
