//! Local mass-balance verification for computed velocity fields.
//!
//! The O-method is locally conservative by construction: for every cell the
//! signed face fluxes must balance the integrated source. A defect beyond
//! round-off points at an inconsistent boundary setup or a broken interaction
//! region, so the velocity driver checks each cell as it finishes and emits a
//! one-time warning.
//!
//! This module provides the shared check logic so callers can also run it as
//! a standalone diagnostic.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::types::CellIndex;

/// Configuration for the per-cell balance check.
#[derive(Debug, Clone, Copy)]
pub struct ConservationCheckConfig {
    /// Maximum allowed defect relative to the gross flux through the cell.
    /// Default: 1e-8
    pub relative_tolerance: f64,
}

impl Default for ConservationCheckConfig {
    fn default() -> Self {
        Self {
            relative_tolerance: 1e-8,
        }
    }
}

/// Result of the balance check for one cell.
#[derive(Debug, Clone, Copy)]
pub struct ConservationDefect {
    /// The checked cell.
    pub cell: CellIndex,

    /// Signed volumetric flux through each face, positive outward [m^2/s].
    pub face_fluxes: [f64; 4],

    /// Volumetric source integrated over the cell [m^2/s].
    pub source_volume: f64,

    /// Imbalance relative to the gross flux magnitude.
    pub relative_defect: f64,

    /// Whether the defect exceeds the configured tolerance.
    pub exceeds: bool,
}

impl ConservationDefect {
    /// Net outflow minus source, the absolute imbalance [m^2/s].
    pub fn net_imbalance(&self) -> f64 {
        self.face_fluxes.iter().sum::<f64>() - self.source_volume
    }
}

/// Check the discrete mass balance of one cell.
///
/// The defect is normalized with the gross flux so the check is insensitive
/// to the overall flow magnitude. A cell without any flow and without a
/// source is trivially balanced.
///
/// # Arguments
///
/// * `cell` - Cell being checked
/// * `face_fluxes` - Signed volumetric face fluxes, positive outward
/// * `source_volume` - Volumetric source rate integrated over the cell
/// * `config` - Check tolerances
pub fn check_cell_balance(
    cell: CellIndex,
    face_fluxes: [f64; 4],
    source_volume: f64,
    config: &ConservationCheckConfig,
) -> ConservationDefect {
    let net = face_fluxes.iter().sum::<f64>() - source_volume;
    let gross = face_fluxes.iter().map(|f| f.abs()).sum::<f64>() + source_volume.abs();

    let relative_defect = if gross > 0.0 { net.abs() / gross } else { 0.0 };

    ConservationDefect {
        cell,
        face_fluxes,
        source_volume,
        relative_defect,
        exceeds: relative_defect > config.relative_tolerance,
    }
}

/// Format a warning message for a violated cell balance.
pub fn format_conservation_warning(defect: &ConservationDefect) -> String {
    format!(
        "WARNING [MpfaOVelocity]: velocity field is not conservative in cell {}!\n\
         Relative defect = {:.3e} (net imbalance = {:.3e})\n\
         Face fluxes (outward): [{:.3e}, {:.3e}, {:.3e}, {:.3e}], source = {:.3e}\n\
         Check the boundary conditions around this cell's corners.",
        defect.cell,
        defect.relative_defect,
        defect.net_imbalance(),
        defect.face_fluxes[0],
        defect.face_fluxes[1],
        defect.face_fluxes[2],
        defect.face_fluxes[3],
        defect.source_volume,
    )
}

/// Check one cell and emit a one-time warning if its balance is violated.
///
/// The `warned` flag ensures only the first violated cell prints; all
/// defects remain available to callers through the return value.
pub fn warn_once_if_unbalanced(
    warned: &AtomicBool,
    cell: CellIndex,
    face_fluxes: [f64; 4],
    source_volume: f64,
    config: &ConservationCheckConfig,
) -> ConservationDefect {
    let defect = check_cell_balance(cell, face_fluxes, source_volume, config);

    if defect.exceeds && !warned.swap(true, Ordering::Relaxed) {
        eprintln!("{}", format_conservation_warning(&defect));
    }

    defect
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balanced_cell_passes() {
        let config = ConservationCheckConfig::default();
        let defect = check_cell_balance(
            CellIndex::new(0),
            [1.0, -0.5, -1.0, 0.5],
            0.0,
            &config,
        );
        assert!(!defect.exceeds);
        assert!(defect.relative_defect < 1e-15);
    }

    #[test]
    fn test_source_enters_balance() {
        let config = ConservationCheckConfig::default();
        // Net outflow 2.0 fed entirely by the source.
        let defect = check_cell_balance(CellIndex::new(3), [0.5, 0.5, 0.5, 0.5], 2.0, &config);
        assert!(!defect.exceeds);

        // Without the source the same fluxes violate the balance.
        let defect = check_cell_balance(CellIndex::new(3), [0.5, 0.5, 0.5, 0.5], 0.0, &config);
        assert!(defect.exceeds);
        assert!((defect.net_imbalance() - 2.0).abs() < 1e-15);
    }

    #[test]
    fn test_quiescent_cell_is_trivially_balanced() {
        let config = ConservationCheckConfig::default();
        let defect = check_cell_balance(CellIndex::new(1), [0.0; 4], 0.0, &config);
        assert!(!defect.exceeds);
        assert_eq!(defect.relative_defect, 0.0);
    }

    #[test]
    fn test_warning_message_format() {
        let defect = ConservationDefect {
            cell: CellIndex::new(12),
            face_fluxes: [1.0, 0.0, 0.0, 0.0],
            source_volume: 0.0,
            relative_defect: 1.0,
            exceeds: true,
        };

        let warning = format_conservation_warning(&defect);
        assert!(warning.contains("C12"));
        assert!(warning.contains("not conservative"));
    }

    #[test]
    fn test_warn_once_only_fires_once() {
        let warned = AtomicBool::new(false);
        let config = ConservationCheckConfig::default();

        let first = warn_once_if_unbalanced(&warned, CellIndex::new(0), [1.0, 0.0, 0.0, 0.0], 0.0, &config);
        assert!(first.exceeds);
        assert!(warned.load(Ordering::Relaxed));

        // Second violation is still reported in the result.
        let second = warn_once_if_unbalanced(&warned, CellIndex::new(1), [2.0, 0.0, 0.0, 0.0], 0.0, &config);
        assert!(second.exceeds);
    }
}
