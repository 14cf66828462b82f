//! Sub-control volume geometry for the vertex-centered scheme.
//!
//! Each quadrilateral cell is split into four sub-control volumes (scv), one
//! per corner, by connecting the face midpoints to the cell center:
//!
//! ```text
//!     P3 ------ M2 ------ P2
//!     |   scv3   |   scv2  |
//!     M3 ------- C ------- M1
//!     |   scv0   |   scv1  |
//!     P0 ------ M0 ------ P1
//! ```
//!
//! The four interior segments M_f -> C are the sub-control volume faces
//! (scvf). Scvf k separates scv k from scv (k+1)%4 and its unit normal points
//! from scv k toward scv (k+1)%4. Fluxes across scvf k therefore couple the
//! unknowns at corners k and k+1.
//!
//! Gradients at the scvf integration points come from the bilinear shape
//! functions of the cell, so a linear field is differentiated exactly on any
//! convex quadrilateral.

use crate::types::CellIndex;

use super::mesh2d::Mesh2D;

/// Reference coordinates of the scvf integration points, midpoints of the
/// segments from face midpoint to cell center on [-1, 1]^2.
const SCVF_IP_REF: [[f64; 2]; 4] = [[0.0, -0.5], [0.5, 0.0], [0.0, 0.5], [-0.5, 0.0]];

/// One corner sub-control volume.
#[derive(Clone, Copy, Debug)]
pub struct SubControlVolume {
    /// Global index of the vertex this sub-volume belongs to.
    pub vertex: usize,
    /// Area of the sub-volume [m^2].
    pub volume: f64,
}

/// Interior face between two sub-control volumes of the same cell.
#[derive(Clone, Copy, Debug)]
pub struct SubControlVolumeFace {
    /// Local index of the sub-volume the normal points away from.
    pub scv_i: usize,
    /// Local index of the sub-volume the normal points toward.
    pub scv_j: usize,
    /// Unit normal from scv_i toward scv_j.
    pub unit_normal: [f64; 2],
    /// Face length [m].
    pub area: f64,
    /// Integration point (physical coordinates).
    pub ip: [f64; 2],
    /// Gradients of the four bilinear shape functions at the integration
    /// point, shape_grads[corner] = [d/dx, d/dy].
    pub shape_grads: [[f64; 2]; 4],
}

/// Half of a boundary edge, associated with one corner sub-volume.
#[derive(Clone, Copy, Debug)]
pub struct BoundarySubFace {
    /// Local index of the sub-volume this boundary piece belongs to.
    pub scv: usize,
    /// Local cell face the piece lies on.
    pub face: usize,
    /// Outward unit normal of the cell face.
    pub unit_normal: [f64; 2],
    /// Length of the piece, half the edge length [m].
    pub area: f64,
}

/// Finite-volume geometry of one cell: sub-volumes, interior sub-faces and
/// boundary pieces.
#[derive(Clone, Debug)]
pub struct BoxGeometry {
    /// The cell this geometry describes.
    pub cell: CellIndex,
    /// Corner sub-volumes in local vertex order.
    pub scvs: [SubControlVolume; 4],
    /// Interior sub-faces; scv_faces[k] separates scv k from scv (k+1)%4.
    pub scv_faces: [SubControlVolumeFace; 4],
    /// Boundary pieces, two per boundary edge of the cell.
    pub boundary_faces: Vec<BoundarySubFace>,
}

impl BoxGeometry {
    /// Build the sub-control volume geometry for one cell.
    pub fn new(mesh: &Mesh2D, cell: CellIndex) -> Self {
        let k = cell.as_usize();
        let corners = mesh.cell_vertices(k);
        let vertex_indices = mesh.cell_vertex_indices(k);

        let center = mesh.cell_centroid(k);
        let midpoints: [[f64; 2]; 4] = std::array::from_fn(|f| mesh.face_midpoint(k, f));

        // Sub-volume f is the quad [P_f, M_f, C, M_{f-1}].
        let scvs = std::array::from_fn(|f| {
            let (px, py) = corners[f];
            let quad = [
                [px, py],
                midpoints[f],
                center,
                midpoints[(f + 3) % 4],
            ];
            let volume = shoelace(&quad);
            debug_assert!(volume > 0.0, "Sub-volume {} of cell {} collapsed", f, k);
            SubControlVolume {
                vertex: vertex_indices[f],
                volume,
            }
        });

        let scv_faces = std::array::from_fn(|f| {
            let m = midpoints[f];
            let t = [center[0] - m[0], center[1] - m[1]];
            let area = (t[0] * t[0] + t[1] * t[1]).sqrt();
            // Rotating the segment tangent clockwise points from scv f to scv f+1.
            let unit_normal = [t[1] / area, -t[0] / area];

            let [r, s] = SCVF_IP_REF[f];
            SubControlVolumeFace {
                scv_i: f,
                scv_j: (f + 1) % 4,
                unit_normal,
                area,
                ip: [0.5 * (m[0] + center[0]), 0.5 * (m[1] + center[1])],
                shape_grads: physical_shape_gradients(&corners, r, s),
            }
        });

        // Each boundary edge contributes half its length to each adjacent corner.
        let mut boundary_faces = Vec::new();
        for f in 0..4 {
            if !mesh.is_boundary_face(k, f) {
                continue;
            }
            let unit_normal = mesh.outward_unit_normal(k, f);
            let half = 0.5 * mesh.face_length(k, f);
            boundary_faces.push(BoundarySubFace {
                scv: f,
                face: f,
                unit_normal,
                area: half,
            });
            boundary_faces.push(BoundarySubFace {
                scv: (f + 1) % 4,
                face: f,
                unit_normal,
                area: half,
            });
        }

        Self {
            cell,
            scvs,
            scv_faces,
            boundary_faces,
        }
    }

    /// Total area of the four sub-volumes, equal to the cell area.
    pub fn total_volume(&self) -> f64 {
        self.scvs.iter().map(|scv| scv.volume).sum()
    }
}

/// Shoelace area of a quadrilateral given counter-clockwise.
fn shoelace(quad: &[[f64; 2]; 4]) -> f64 {
    let mut twice_area = 0.0;
    for i in 0..4 {
        let [xa, ya] = quad[i];
        let [xb, yb] = quad[(i + 1) % 4];
        twice_area += xa * yb - xb * ya;
    }
    0.5 * twice_area
}

/// Gradients of the bilinear shape functions in reference coordinates.
fn reference_shape_gradients(r: f64, s: f64) -> [[f64; 2]; 4] {
    [
        [-(1.0 - s) / 4.0, -(1.0 - r) / 4.0],
        [(1.0 - s) / 4.0, -(1.0 + r) / 4.0],
        [(1.0 + s) / 4.0, (1.0 + r) / 4.0],
        [-(1.0 + s) / 4.0, (1.0 - r) / 4.0],
    ]
}

/// Push the reference gradients through the inverse-transpose Jacobian of the
/// bilinear map at (r, s).
fn physical_shape_gradients(corners: &[(f64, f64); 4], r: f64, s: f64) -> [[f64; 2]; 4] {
    let ref_grads = reference_shape_gradients(r, s);

    // Jacobian of the bilinear map: columns d(x,y)/dr and d(x,y)/ds.
    let mut dx_dr = 0.0;
    let mut dx_ds = 0.0;
    let mut dy_dr = 0.0;
    let mut dy_ds = 0.0;
    for (i, &(x, y)) in corners.iter().enumerate() {
        dx_dr += x * ref_grads[i][0];
        dx_ds += x * ref_grads[i][1];
        dy_dr += y * ref_grads[i][0];
        dy_ds += y * ref_grads[i][1];
    }

    let det = dx_dr * dy_ds - dx_ds * dy_dr;
    debug_assert!(det.abs() > 0.0, "Bilinear map is singular at ({}, {})", r, s);
    let inv_det = 1.0 / det;

    // grad_x N = J^{-T} grad_ref N
    std::array::from_fn(|i| {
        let [dn_dr, dn_ds] = ref_grads[i];
        [
            (dy_ds * dn_dr - dy_dr * dn_ds) * inv_det,
            (-dx_ds * dn_dr + dx_dr * dn_ds) * inv_det,
        ]
    })
}
