//! 2D mesh representation for quadrilateral cells.
//!
//! The mesh stores:
//! - Vertex coordinates
//! - Cell-vertex connectivity (counter-clockwise ordering)
//! - Edge-based connectivity for cell-to-cell flux computation
//! - Boundary edge identification
//!
//! Face convention (counter-clockwise around the cell):
//! - Face 0 (bottom): from vertex 0 to vertex 1
//! - Face 1 (right):  from vertex 1 to vertex 2
//! - Face 2 (top):    from vertex 2 to vertex 3
//! - Face 3 (left):   from vertex 3 to vertex 0
//!
//! Consecutive faces f and (f+1)%4 always share local corner (f+1)%4. Flux
//! stencils that walk corner-adjacent face pairs rely on this index relation
//! instead of comparing coordinates.

use std::collections::HashMap;

use super::boundary_tags::BoundaryTag;
use super::errors::MeshError;

/// Reference to a cell and one of its faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellFace {
    /// Cell index
    pub cell: usize,
    /// Face index (0-3 for quads)
    pub face: usize,
}

impl CellFace {
    pub fn new(cell: usize, face: usize) -> Self {
        Self { cell, face }
    }
}

/// Information about an edge in the mesh.
#[derive(Clone, Debug)]
pub struct Edge {
    /// Vertex indices (v0, v1) with v0 < v1 for consistent ordering
    pub vertices: (usize, usize),
    /// Left cell-face (always present)
    pub left: CellFace,
    /// Right cell-face (None for boundary edges)
    pub right: Option<CellFace>,
    /// Boundary tag (only for boundary edges)
    pub boundary_tag: Option<BoundaryTag>,
}

impl Edge {
    /// Check if this is a boundary edge.
    pub fn is_boundary(&self) -> bool {
        self.right.is_none()
    }

    /// Check if this is an interior edge.
    pub fn is_interior(&self) -> bool {
        self.right.is_some()
    }

    /// Check if this edge touches the given vertex.
    pub fn touches_vertex(&self, vertex: usize) -> bool {
        self.vertices.0 == vertex || self.vertices.1 == vertex
    }
}

/// 2D mesh of quadrilateral cells.
#[derive(Clone, Debug)]
pub struct Mesh2D {
    /// Vertex coordinates: vertices[i] = (x, y)
    pub vertices: Vec<(f64, f64)>,

    /// Cell-vertex connectivity: cells[k] = [v0, v1, v2, v3]
    /// Vertices are in counter-clockwise order:
    /// - v0: bottom-left
    /// - v1: bottom-right
    /// - v2: top-right
    /// - v3: top-left
    pub cells: Vec<[usize; 4]>,

    /// Edge list with connectivity information
    pub edges: Vec<Edge>,

    /// Cell-to-edge mapping: cell_edges[k][f] = edge index for face f of cell k
    pub cell_edges: Vec<[usize; 4]>,

    /// Number of cells
    pub n_cells: usize,

    /// Number of edges
    pub n_edges: usize,

    /// Number of boundary edges
    pub n_boundary_edges: usize,

    /// Number of vertices
    pub n_vertices: usize,

    /// Vertex-to-cell connectivity: vertex_to_cells[v] = list of cell indices
    /// containing vertex v.
    ///
    /// For structured quad meshes:
    /// - Interior vertices have 4 cells
    /// - Edge boundary vertices have 2 cells
    /// - Corner boundary vertices have 1 cell
    pub vertex_to_cells: Vec<Vec<usize>>,
}

impl Mesh2D {
    /// Create a uniform rectangular mesh of [x0, x1] × [y0, y1].
    ///
    /// All boundary edges are tagged [`BoundaryTag::Wall`].
    ///
    /// # Arguments
    /// * `x0`, `x1` - x-coordinate bounds
    /// * `y0`, `y1` - y-coordinate bounds
    /// * `nx` - number of cells in x-direction
    /// * `ny` - number of cells in y-direction
    pub fn uniform_rectangle(x0: f64, x1: f64, y0: f64, y1: f64, nx: usize, ny: usize) -> Self {
        Self::uniform_rectangle_with_bc(x0, x1, y0, y1, nx, ny, BoundaryTag::Wall)
    }

    /// Create a uniform rectangular mesh with a specific boundary tag on all boundaries.
    pub fn uniform_rectangle_with_bc(
        x0: f64,
        x1: f64,
        y0: f64,
        y1: f64,
        nx: usize,
        ny: usize,
        bc_tag: BoundaryTag,
    ) -> Self {
        Self::uniform_rectangle_with_sides(x0, x1, y0, y1, nx, ny, [bc_tag; 4])
    }

    /// Create a uniform rectangular mesh with different boundary tags on each side.
    ///
    /// # Arguments
    /// * `x0`, `x1` - x-coordinate bounds
    /// * `y0`, `y1` - y-coordinate bounds
    /// * `nx` - number of cells in x-direction
    /// * `ny` - number of cells in y-direction
    /// * `bc_tags` - boundary tags for [south, east, north, west] sides
    pub fn uniform_rectangle_with_sides(
        x0: f64,
        x1: f64,
        y0: f64,
        y1: f64,
        nx: usize,
        ny: usize,
        bc_tags: [BoundaryTag; 4],
    ) -> Self {
        assert!(nx > 0 && ny > 0, "Need at least one cell in each direction");
        assert!(x1 > x0 && y1 > y0, "Invalid domain bounds");

        let dx = (x1 - x0) / nx as f64;
        let dy = (y1 - y0) / ny as f64;

        // Generate vertices: (nx+1) × (ny+1) grid
        let n_vertices = (nx + 1) * (ny + 1);
        let mut vertices = Vec::with_capacity(n_vertices);

        for j in 0..=ny {
            for i in 0..=nx {
                let x = x0 + i as f64 * dx;
                let y = y0 + j as f64 * dy;
                vertices.push((x, y));
            }
        }

        // Generate cells: nx × ny quads, counter-clockwise vertices
        let n_cells = nx * ny;
        let mut cells = Vec::with_capacity(n_cells);

        for j in 0..ny {
            for i in 0..nx {
                let v0 = j * (nx + 1) + i; // bottom-left
                let v1 = v0 + 1; // bottom-right
                let v2 = v1 + (nx + 1); // top-right
                let v3 = v0 + (nx + 1); // top-left
                cells.push([v0, v1, v2, v3]);
            }
        }

        Self::build_structured(vertices, cells, nx, ny, bc_tags)
    }

    /// Build edge connectivity for a structured grid with per-side tags.
    fn build_structured(
        vertices: Vec<(f64, f64)>,
        cells: Vec<[usize; 4]>,
        nx: usize,
        ny: usize,
        bc_tags: [BoundaryTag; 4],
    ) -> Self {
        let n_cells = cells.len();
        let n_vertices = vertices.len();

        // Horizontal edges: nx × (ny+1); vertical edges: (nx+1) × ny
        let n_edges = nx * (ny + 1) + (nx + 1) * ny;

        let mut edges = Vec::with_capacity(n_edges);
        let mut cell_edges = vec![[0usize; 4]; n_cells];

        let cell_idx = |i: usize, j: usize| -> usize { j * nx + i };

        // Horizontal edges (bottom/top faces)
        for j in 0..=ny {
            for i in 0..nx {
                let edge_idx = edges.len();
                let v0 = j * (nx + 1) + i;
                let v1 = v0 + 1;

                let below = if j > 0 {
                    // Top face of the cell below
                    let k = cell_idx(i, j - 1);
                    cell_edges[k][2] = edge_idx;
                    Some(CellFace::new(k, 2))
                } else {
                    None
                };

                let above = if j < ny {
                    // Bottom face of the cell above
                    let k = cell_idx(i, j);
                    cell_edges[k][0] = edge_idx;
                    Some(CellFace::new(k, 0))
                } else {
                    None
                };

                let (left, right, boundary) = match (below, above) {
                    (Some(l), Some(r)) => (l, Some(r), None),
                    (Some(l), None) => (l, None, Some(bc_tags[2])), // north boundary
                    (None, Some(r)) => (r, None, Some(bc_tags[0])), // south boundary
                    (None, None) => unreachable!(),
                };

                edges.push(Edge {
                    vertices: (v0.min(v1), v0.max(v1)),
                    left,
                    right,
                    boundary_tag: boundary,
                });
            }
        }

        // Vertical edges (left/right faces)
        for j in 0..ny {
            for i in 0..=nx {
                let edge_idx = edges.len();
                let v0 = j * (nx + 1) + i;
                let v1 = v0 + (nx + 1);

                let west = if i > 0 {
                    // Right face of the cell to the left
                    let k = cell_idx(i - 1, j);
                    cell_edges[k][1] = edge_idx;
                    Some(CellFace::new(k, 1))
                } else {
                    None
                };

                let east = if i < nx {
                    // Left face of the cell to the right
                    let k = cell_idx(i, j);
                    cell_edges[k][3] = edge_idx;
                    Some(CellFace::new(k, 3))
                } else {
                    None
                };

                let (left, right, boundary) = match (west, east) {
                    (Some(l), Some(r)) => (l, Some(r), None),
                    (Some(l), None) => (l, None, Some(bc_tags[1])), // east boundary
                    (None, Some(r)) => (r, None, Some(bc_tags[3])), // west boundary
                    (None, None) => unreachable!(),
                };

                edges.push(Edge {
                    vertices: (v0.min(v1), v0.max(v1)),
                    left,
                    right,
                    boundary_tag: boundary,
                });
            }
        }

        let n_boundary_edges = edges.iter().filter(|e| e.is_boundary()).count();
        let vertex_to_cells = Self::build_vertex_to_cells(&cells, n_vertices);

        Self {
            vertices,
            cells,
            edges,
            cell_edges,
            n_cells,
            n_edges,
            n_boundary_edges,
            n_vertices,
            vertex_to_cells,
        }
    }

    /// Build a mesh from raw vertex coordinates and cell connectivity.
    ///
    /// Every cell must list its four vertices counter-clockwise. All boundary
    /// edges receive `boundary_tag`. Topology defects (dangling vertex
    /// references, collapsed cells, edges shared by more than two cells) are
    /// reported as [`MeshError`] rather than silently producing a broken mesh.
    pub fn from_connectivity(
        vertices: Vec<(f64, f64)>,
        cells: Vec<[usize; 4]>,
        boundary_tag: BoundaryTag,
    ) -> Result<Self, MeshError> {
        let n_vertices = vertices.len();
        let n_cells = cells.len();

        for (k, cell) in cells.iter().enumerate() {
            for (a, &v) in cell.iter().enumerate() {
                if v >= n_vertices {
                    return Err(MeshError::VertexOutOfRange {
                        cell: k,
                        vertex: v,
                        n_vertices,
                    });
                }
                for &w in &cell[a + 1..] {
                    if v == w {
                        return Err(MeshError::DegenerateCell { cell: k, vertex: v });
                    }
                }
            }

            let area = Self::signed_area(&vertices, cell);
            if area <= 0.0 {
                return Err(MeshError::NonPositiveArea { cell: k, area });
            }
        }

        let mut edges: Vec<Edge> = Vec::with_capacity(2 * n_cells + 2);
        let mut cell_edges = vec![[0usize; 4]; n_cells];
        let mut edge_map: HashMap<(usize, usize), usize> = HashMap::new();

        for (k, cell) in cells.iter().enumerate() {
            for f in 0..4 {
                let a = cell[f];
                let b = cell[(f + 1) % 4];
                let key = (a.min(b), a.max(b));

                match edge_map.get(&key) {
                    None => {
                        let edge_idx = edges.len();
                        edge_map.insert(key, edge_idx);
                        cell_edges[k][f] = edge_idx;
                        edges.push(Edge {
                            vertices: key,
                            left: CellFace::new(k, f),
                            right: None,
                            boundary_tag: Some(boundary_tag),
                        });
                    }
                    Some(&edge_idx) => {
                        let edge = &mut edges[edge_idx];
                        if edge.right.is_some() {
                            return Err(MeshError::NonConformingEdge {
                                v0: key.0,
                                v1: key.1,
                            });
                        }
                        edge.right = Some(CellFace::new(k, f));
                        edge.boundary_tag = None;
                        cell_edges[k][f] = edge_idx;
                    }
                }
            }
        }

        let n_edges = edges.len();
        let n_boundary_edges = edges.iter().filter(|e| e.is_boundary()).count();
        let vertex_to_cells = Self::build_vertex_to_cells(&cells, n_vertices);

        Ok(Self {
            vertices,
            cells,
            edges,
            cell_edges,
            n_cells,
            n_edges,
            n_boundary_edges,
            n_vertices,
            vertex_to_cells,
        })
    }

    /// Signed shoelace area of one cell, positive for counter-clockwise winding.
    fn signed_area(vertices: &[(f64, f64)], cell: &[usize; 4]) -> f64 {
        let mut twice_area = 0.0;
        for f in 0..4 {
            let (xa, ya) = vertices[cell[f]];
            let (xb, yb) = vertices[cell[(f + 1) % 4]];
            twice_area += xa * yb - xb * ya;
        }
        0.5 * twice_area
    }

    /// Get the vertex coordinates of a cell.
    pub fn cell_vertices(&self, k: usize) -> [(f64, f64); 4] {
        let [v0, v1, v2, v3] = self.cells[k];
        [
            self.vertices[v0],
            self.vertices[v1],
            self.vertices[v2],
            self.vertices[v3],
        ]
    }

    /// Get the global vertex indices of a cell.
    #[inline]
    pub fn cell_vertex_indices(&self, k: usize) -> [usize; 4] {
        self.cells[k]
    }

    /// Centroid of a cell (vertex average).
    pub fn cell_centroid(&self, k: usize) -> [f64; 2] {
        let verts = self.cell_vertices(k);
        let mut c = [0.0, 0.0];
        for &(x, y) in &verts {
            c[0] += x;
            c[1] += y;
        }
        [c[0] / 4.0, c[1] / 4.0]
    }

    /// Area of a cell by the shoelace formula.
    pub fn cell_volume(&self, k: usize) -> f64 {
        Self::signed_area(&self.vertices, &self.cells[k])
    }

    /// Get the edge index for a given cell face.
    pub fn edge_for_face(&self, cell: usize, face: usize) -> usize {
        self.cell_edges[cell][face]
    }

    /// Midpoint of a cell face.
    pub fn face_midpoint(&self, cell: usize, face: usize) -> [f64; 2] {
        let verts = self.cell_vertices(cell);
        let (xa, ya) = verts[face];
        let (xb, yb) = verts[(face + 1) % 4];
        [0.5 * (xa + xb), 0.5 * (ya + yb)]
    }

    /// Length of a cell face.
    pub fn face_length(&self, cell: usize, face: usize) -> f64 {
        let verts = self.cell_vertices(cell);
        let (xa, ya) = verts[face];
        let (xb, yb) = verts[(face + 1) % 4];
        ((xb - xa).powi(2) + (yb - ya).powi(2)).sqrt()
    }

    /// Outward unit normal of a cell face.
    ///
    /// With counter-clockwise vertex ordering the outward normal of the
    /// directed face tangent (tx, ty) is (ty, -tx), normalized.
    pub fn outward_unit_normal(&self, cell: usize, face: usize) -> [f64; 2] {
        let verts = self.cell_vertices(cell);
        let (xa, ya) = verts[face];
        let (xb, yb) = verts[(face + 1) % 4];
        let (tx, ty) = (xb - xa, yb - ya);
        let len = (tx * tx + ty * ty).sqrt();
        [ty / len, -tx / len]
    }

    /// Get the neighbor cell across a face, if it exists.
    pub fn neighbor(&self, cell: usize, face: usize) -> Option<CellFace> {
        let edge_idx = self.cell_edges[cell][face];
        let edge = &self.edges[edge_idx];

        if edge.left.cell == cell && edge.left.face == face {
            edge.right
        } else {
            Some(edge.left)
        }
    }

    /// Check if a face is on the boundary.
    pub fn is_boundary_face(&self, cell: usize, face: usize) -> bool {
        let edge_idx = self.cell_edges[cell][face];
        self.edges[edge_idx].is_boundary()
    }

    /// Get the boundary tag for a face, if it's a boundary face.
    pub fn boundary_tag(&self, cell: usize, face: usize) -> Option<BoundaryTag> {
        let edge_idx = self.cell_edges[cell][face];
        self.edges[edge_idx].boundary_tag
    }

    /// Find the other face of `cell` touching `vertex`.
    ///
    /// Each vertex of a quad lies on exactly two of its faces, so excluding
    /// one face leaves a unique answer. Returns `None` only if `vertex` does
    /// not belong to the cell. Flux stencils use this to walk around a corner
    /// from one face to the adjacent one without coordinate comparisons.
    pub fn other_face_at_vertex(
        &self,
        cell: usize,
        vertex: usize,
        exclude_face: usize,
    ) -> Option<usize> {
        let cell_verts = self.cells[cell];
        for f in 0..4 {
            if f == exclude_face {
                continue;
            }
            let a = cell_verts[f];
            let b = cell_verts[(f + 1) % 4];
            if a == vertex || b == vertex {
                return Some(f);
            }
        }
        None
    }

    /// Get all cells sharing a given vertex.
    ///
    /// The vertex-centered scheme assembles one residual row per vertex from
    /// exactly these cells.
    #[inline]
    pub fn cells_at_vertex(&self, vertex: usize) -> &[usize] {
        &self.vertex_to_cells[vertex]
    }

    /// Build vertex-to-cell connectivity from cell-vertex connectivity.
    pub(crate) fn build_vertex_to_cells(
        cells: &[[usize; 4]],
        n_vertices: usize,
    ) -> Vec<Vec<usize>> {
        let mut v2c = vec![Vec::with_capacity(4); n_vertices];
        for (cell_idx, cell) in cells.iter().enumerate() {
            for &vertex in cell {
                v2c[vertex].push(cell_idx);
            }
        }
        v2c
    }
}
