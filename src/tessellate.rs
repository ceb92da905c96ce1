//! lyon tessellation of shapes that are not a single quad or fan: arbitrary
//! (possibly concave or self-intersecting) polygons and stroked polylines.
//!
//! The resulting meshes are fed to the batch engine one triangle at a time,
//! so a mesh larger than one batch is split between triangles, never inside
//! one.

use lyon::path::Path as LyonPath;
use lyon::tessellation::{
    BuffersBuilder, FillOptions, FillRule, FillTessellator, FillVertex, LineJoin,
    StrokeOptions, StrokeTessellator, StrokeVertex, VertexBuffers,
};

use crate::types::Point;

/// Flattening tolerance for curves and joins, in pixels.
const TOLERANCE: f32 = 0.01;

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Mesh vertices.
    pub vertices: Vec<Point>,
    /// Triangle list indices into [`vertices`](Self::vertices).
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// The mesh as a sequence of triangles.
    pub fn triangles(&self) -> impl Iterator<Item = [Point; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [0, 1, 2].map(|i| self.vertices[tri[i] as usize]))
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Build a lyon path through `points`.
fn polyline_path(points: &[Point], closed: bool) -> LyonPath {
    let mut builder = LyonPath::builder();
    builder.begin(points[0]);
    for &p in &points[1..] {
        builder.line_to(p);
    }
    builder.end(closed);
    builder.build()
}

/// Convert lyon output into a mesh, treating an empty result as no mesh.
fn into_mesh<E: std::fmt::Debug>(
    result: Result<(), E>,
    geometry: VertexBuffers<Point, u32>,
) -> Option<TriangleMesh> {
    match result {
        Ok(()) if !geometry.indices.is_empty() => Some(TriangleMesh {
            vertices: geometry.vertices,
            indices: geometry.indices,
        }),
        Ok(()) => None,
        Err(err) => {
            log::debug!("tessellation failed: {err:?}");
            None
        }
    }
}

/// Fill the polygon outlined by `points` with the non-zero rule.
///
/// Returns `None` for fewer than three points or a polygon without area.
#[must_use]
pub fn fill_polygon(points: &[Point]) -> Option<TriangleMesh> {
    if points.len() < 3 {
        return None;
    }

    let path = polyline_path(points, true);
    let mut geometry: VertexBuffers<Point, u32> = VertexBuffers::new();
    let result = FillTessellator::new().tessellate_path(
        &path,
        &FillOptions::tolerance(TOLERANCE).with_fill_rule(FillRule::NonZero),
        &mut BuffersBuilder::new(&mut geometry, |vertex: FillVertex| vertex.position()),
    );
    into_mesh(result, geometry)
}

/// Stroke the polyline through `points` with a line of `thickness`, closing
/// it back to the first point when `closed` is set. Joins are mitered.
///
/// Returns `None` for fewer than two points or a non-positive thickness.
#[must_use]
pub fn stroke_polyline(points: &[Point], thickness: f32, closed: bool) -> Option<TriangleMesh> {
    if points.len() < 2 || thickness <= 0.0 {
        return None;
    }

    let path = polyline_path(points, closed);
    let mut geometry: VertexBuffers<Point, u32> = VertexBuffers::new();
    let result = StrokeTessellator::new().tessellate_path(
        &path,
        &StrokeOptions::tolerance(TOLERANCE)
            .with_line_width(thickness)
            .with_line_join(LineJoin::Miter),
        &mut BuffersBuilder::new(&mut geometry, |vertex: StrokeVertex| vertex.position()),
    );
    into_mesh(result, geometry)
}
