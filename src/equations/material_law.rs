//! Relative permeability and capillary pressure relations.
//!
//! The material law maps wetting saturation to relative permeabilities and
//! capillary pressure. Two closures are provided:
//!
//! - **Linear**: kr_w = Se, kr_n = 1 - Se, pc linear in Se. With zero entry
//!   pressure and no residual saturations this reduces to kr_w(S) = S, which
//!   analytic test cases rely on.
//! - **Brooks-Corey**: power-law kr curves with pore-size distribution
//!   parameter lambda, pc = p_e * Se^(-1/lambda).

/// Saturation floor used when evaluating singular capillary pressure curves.
const SE_MIN: f64 = 1e-6;

/// Saturation-dependent constitutive relations of the porous matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MaterialLaw {
    /// Linear relative permeabilities and linear capillary pressure.
    Linear {
        /// Capillary entry pressure [Pa], pc at Se = 0 scales with this.
        entry_pressure: f64,
        /// Residual wetting saturation [-].
        residual_sw: f64,
        /// Residual non-wetting saturation [-].
        residual_sn: f64,
    },
    /// Brooks-Corey power laws.
    BrooksCorey {
        /// Capillary entry pressure [Pa].
        entry_pressure: f64,
        /// Pore-size distribution parameter [-], typically 0.5 to 5.
        lambda: f64,
        /// Residual wetting saturation [-].
        residual_sw: f64,
        /// Residual non-wetting saturation [-].
        residual_sn: f64,
    },
}

/// Linear law with no entry pressure and no residual saturations.
pub const LINEAR_DEFAULT: MaterialLaw = MaterialLaw::Linear {
    entry_pressure: 0.0,
    residual_sw: 0.0,
    residual_sn: 0.0,
};

impl MaterialLaw {
    /// Linear law with no entry pressure and no residual saturations.
    pub fn linear() -> Self {
        LINEAR_DEFAULT
    }

    /// Linear law with entry pressure and residual saturations.
    pub fn linear_with(entry_pressure: f64, residual_sw: f64, residual_sn: f64) -> Self {
        assert!(
            residual_sw + residual_sn < 1.0,
            "Residual saturations must leave a mobile range, got Swr={} Snr={}",
            residual_sw,
            residual_sn
        );
        Self::Linear {
            entry_pressure,
            residual_sw,
            residual_sn,
        }
    }

    /// Brooks-Corey law without residual saturations.
    pub fn brooks_corey(entry_pressure: f64, lambda: f64) -> Self {
        Self::brooks_corey_with(entry_pressure, lambda, 0.0, 0.0)
    }

    /// Brooks-Corey law with residual saturations.
    pub fn brooks_corey_with(
        entry_pressure: f64,
        lambda: f64,
        residual_sw: f64,
        residual_sn: f64,
    ) -> Self {
        assert!(lambda > 0.0, "Lambda must be positive, got {}", lambda);
        assert!(
            residual_sw + residual_sn < 1.0,
            "Residual saturations must leave a mobile range, got Swr={} Snr={}",
            residual_sw,
            residual_sn
        );
        Self::BrooksCorey {
            entry_pressure,
            lambda,
            residual_sw,
            residual_sn,
        }
    }

    fn residuals(&self) -> (f64, f64) {
        match *self {
            Self::Linear {
                residual_sw,
                residual_sn,
                ..
            } => (residual_sw, residual_sn),
            Self::BrooksCorey {
                residual_sw,
                residual_sn,
                ..
            } => (residual_sw, residual_sn),
        }
    }

    /// Effective saturation Se = (S_w - Swr) / (1 - Swr - Snr), clamped to [0, 1].
    pub fn effective_saturation(&self, saturation_w: f64) -> f64 {
        let (swr, snr) = self.residuals();
        ((saturation_w - swr) / (1.0 - swr - snr)).clamp(0.0, 1.0)
    }

    /// Wetting-phase relative permeability kr_w(S_w).
    pub fn krw(&self, saturation_w: f64) -> f64 {
        let se = self.effective_saturation(saturation_w);
        match *self {
            Self::Linear { .. } => se,
            Self::BrooksCorey { lambda, .. } => se.powf((2.0 + 3.0 * lambda) / lambda),
        }
    }

    /// Non-wetting-phase relative permeability kr_n(S_w).
    pub fn krn(&self, saturation_w: f64) -> f64 {
        let se = self.effective_saturation(saturation_w);
        match *self {
            Self::Linear { .. } => 1.0 - se,
            Self::BrooksCorey { lambda, .. } => {
                let sn = 1.0 - se;
                sn * sn * (1.0 - se.powf((2.0 + lambda) / lambda))
            }
        }
    }

    /// Capillary pressure pc(S_w) = p_n - p_w.
    pub fn capillary_pressure(&self, saturation_w: f64) -> f64 {
        let se = self.effective_saturation(saturation_w);
        match *self {
            Self::Linear { entry_pressure, .. } => entry_pressure * (1.0 - se),
            Self::BrooksCorey {
                entry_pressure,
                lambda,
                ..
            } => {
                // Clamped away from zero so pc stays finite at Se = 0.
                entry_pressure * se.max(SE_MIN).powf(-1.0 / lambda)
            }
        }
    }
}
