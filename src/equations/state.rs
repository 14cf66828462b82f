//! Per-vertex state types for porous-media flow.
//!
//! The vertex-centered scheme stores one [`PrimaryVariables`] entry per mesh
//! vertex. Models expand primary variables into [`VolumeVariables`], the full
//! set of secondary quantities (pressures, mobilities, densities) the residual
//! and flux routines read.

use std::ops::{Add, AddAssign, Index, IndexMut, Mul, Sub, SubAssign};

/// Primary unknowns at one vertex: one value per balance equation.
///
/// The const parameter `N` is the number of equations in the model
/// (1 for single-phase pressure, 2 for two-phase pressure/saturation).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PrimaryVariables<const N: usize>([f64; N]);

impl<const N: usize> PrimaryVariables<N> {
    /// Create from an array of values, one per equation.
    #[inline(always)]
    pub fn new(values: [f64; N]) -> Self {
        Self(values)
    }

    /// Create a zero state.
    #[inline(always)]
    pub fn zero() -> Self {
        Self([0.0; N])
    }

    /// Convert to array representation.
    #[inline(always)]
    pub fn to_array(&self) -> [f64; N] {
        self.0
    }

    /// True if every component is finite (no NaN, no infinity).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// Iterate over the components.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.0.iter()
    }
}

impl<const N: usize> Default for PrimaryVariables<N> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const N: usize> Index<usize> for PrimaryVariables<N> {
    type Output = f64;

    #[inline(always)]
    fn index(&self, eq: usize) -> &f64 {
        &self.0[eq]
    }
}

impl<const N: usize> IndexMut<usize> for PrimaryVariables<N> {
    #[inline(always)]
    fn index_mut(&mut self, eq: usize) -> &mut f64 {
        &mut self.0[eq]
    }
}

impl<const N: usize> Add for PrimaryVariables<N> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        let mut out = self.0;
        for (o, v) in out.iter_mut().zip(other.0.iter()) {
            *o += v;
        }
        Self(out)
    }
}

impl<const N: usize> Sub for PrimaryVariables<N> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        let mut out = self.0;
        for (o, v) in out.iter_mut().zip(other.0.iter()) {
            *o -= v;
        }
        Self(out)
    }
}

impl<const N: usize> AddAssign for PrimaryVariables<N> {
    fn add_assign(&mut self, other: Self) {
        for (o, v) in self.0.iter_mut().zip(other.0.iter()) {
            *o += v;
        }
    }
}

impl<const N: usize> SubAssign for PrimaryVariables<N> {
    fn sub_assign(&mut self, other: Self) {
        for (o, v) in self.0.iter_mut().zip(other.0.iter()) {
            *o -= v;
        }
    }
}

impl<const N: usize> Mul<f64> for PrimaryVariables<N> {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        let mut out = self.0;
        for o in out.iter_mut() {
            *o *= scalar;
        }
        Self(out)
    }
}

impl<const N: usize> Mul<PrimaryVariables<N>> for f64 {
    type Output = PrimaryVariables<N>;

    fn mul(self, vars: PrimaryVariables<N>) -> PrimaryVariables<N> {
        vars * self
    }
}

/// Secondary quantities at one sub-control volume, derived from the
/// primary variables by the model's constitutive relations.
///
/// A single-phase model fills the wetting-phase slots and leaves the
/// non-wetting slots at their trivial values (saturation 1, mobility 0).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeVariables<const N: usize> {
    /// Primary variables these secondary quantities were derived from.
    pub primary: PrimaryVariables<N>,
    /// Wetting-phase pressure [Pa].
    pub pressure_w: f64,
    /// Non-wetting-phase pressure [Pa].
    pub pressure_n: f64,
    /// Wetting-phase saturation [-].
    pub saturation_w: f64,
    /// Wetting-phase mobility kr_w / mu_w [1/(Pa s)].
    pub mobility_w: f64,
    /// Non-wetting-phase mobility kr_n / mu_n [1/(Pa s)].
    pub mobility_n: f64,
    /// Wetting-phase density [kg/m^3].
    pub density_w: f64,
    /// Non-wetting-phase density [kg/m^3].
    pub density_n: f64,
    /// Porosity of the surrounding matrix [-].
    pub porosity: f64,
}

impl<const N: usize> VolumeVariables<N> {
    /// Non-wetting-phase saturation, 1 - S_w.
    #[inline(always)]
    pub fn saturation_n(&self) -> f64 {
        1.0 - self.saturation_w
    }

    /// Total mobility of both phases.
    #[inline(always)]
    pub fn total_mobility(&self) -> f64 {
        self.mobility_w + self.mobility_n
    }

    /// True if every stored quantity is finite.
    pub fn is_finite(&self) -> bool {
        self.primary.is_finite()
            && self.pressure_w.is_finite()
            && self.pressure_n.is_finite()
            && self.saturation_w.is_finite()
            && self.mobility_w.is_finite()
            && self.mobility_n.is_finite()
            && self.density_w.is_finite()
            && self.density_n.is_finite()
            && self.porosity.is_finite()
    }
}
