//! Fluid phase properties.
//!
//! Both phases are treated as incompressible with constant viscosity, so a
//! phase is fully described by its density and dynamic viscosity.

/// Properties of one fluid phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FluidPhase {
    /// Density [kg/m^3].
    pub density: f64,
    /// Dynamic viscosity [Pa s].
    pub viscosity: f64,
}

impl FluidPhase {
    /// Create a phase from density and viscosity.
    pub fn new(density: f64, viscosity: f64) -> Self {
        assert!(density > 0.0, "Density must be positive, got {}", density);
        assert!(
            viscosity > 0.0,
            "Viscosity must be positive, got {}",
            viscosity
        );
        Self { density, viscosity }
    }

    /// Water at standard conditions (1000 kg/m^3, 1 mPa s).
    pub fn water() -> Self {
        Self {
            density: 1000.0,
            viscosity: 1e-3,
        }
    }

    /// A light non-aqueous phase liquid (800 kg/m^3, 2 mPa s).
    pub fn lnapl() -> Self {
        Self {
            density: 800.0,
            viscosity: 2e-3,
        }
    }

    /// Unit fluid (density 1, viscosity 1). Phase mobility then equals
    /// relative permeability, which keeps analytic test cases simple.
    pub fn unit() -> Self {
        Self {
            density: 1.0,
            viscosity: 1.0,
        }
    }
}

/// The wetting/non-wetting fluid pair of a two-phase system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TwoPhaseFluids {
    /// Wetting phase (typically water).
    pub wetting: FluidPhase,
    /// Non-wetting phase (typically oil or gas).
    pub nonwetting: FluidPhase,
}

impl TwoPhaseFluids {
    /// Create a fluid pair.
    pub fn new(wetting: FluidPhase, nonwetting: FluidPhase) -> Self {
        Self {
            wetting,
            nonwetting,
        }
    }

    /// Water displacing a light oil.
    pub fn water_lnapl() -> Self {
        Self {
            wetting: FluidPhase::water(),
            nonwetting: FluidPhase::lnapl(),
        }
    }

    /// Unit fluids for both phases.
    pub fn unit() -> Self {
        Self {
            wetting: FluidPhase::unit(),
            nonwetting: FluidPhase::unit(),
        }
    }

    /// Density difference rho_n - rho_w, the driver of buoyancy segregation.
    pub fn density_difference(&self) -> f64 {
        self.nonwetting.density - self.wetting.density
    }
}
