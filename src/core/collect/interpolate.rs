//! Piecewise-linear interpolation on the mesh triangulation
//!
//! Maps a nodal field onto arbitrary points by barycentric interpolation
//! within the containing triangle. Points outside the mesh hull fall back
//! to the nearest node's value, so shoreline stations sitting just off the
//! triangulation still get an answer.

use crate::domain::mesh::Mesh;
use crate::domain::station::Station;
use crate::domain::{Result, TiderunError};

/// Barycentric tolerance for containment tests
const EDGE_TOLERANCE: f64 = 1e-12;

/// Interpolates a nodal field onto station locations
///
/// `values` is indexed by 0-based node index and must cover the whole mesh.
pub fn interpolate_to_stations(
    mesh: &Mesh,
    values: &[f64],
    stations: &[Station],
) -> Result<Vec<f64>> {
    if values.len() != mesh.node_count() {
        return Err(TiderunError::Collect(format!(
            "Field has {} values for a {}-node mesh",
            values.len(),
            mesh.node_count()
        )));
    }

    let mut results = Vec::with_capacity(stations.len());
    for station in stations {
        results.push(interpolate_point(mesh, values, station.x, station.y)?);
    }
    Ok(results)
}

/// Interpolates a nodal field at one point
pub fn interpolate_point(mesh: &Mesh, values: &[f64], x: f64, y: f64) -> Result<f64> {
    for element in &mesh.elements {
        let [a, b, c] = element.nodes;
        let (na, nb, nc) = (
            mesh.node(a).expect("validated mesh"),
            mesh.node(b).expect("validated mesh"),
            mesh.node(c).expect("validated mesh"),
        );
        if let Some((wa, wb, wc)) = barycentric(na.x, na.y, nb.x, nb.y, nc.x, nc.y, x, y) {
            return Ok(wa * values[a.index()] + wb * values[b.index()] + wc * values[c.index()]);
        }
    }

    // outside the hull: nearest node
    let nearest = mesh
        .nearest_node(x, y)
        .ok_or_else(|| TiderunError::Collect("Cannot interpolate on an empty mesh".to_string()))?;
    Ok(values[nearest.index()])
}

/// Barycentric weights of (px, py) in the triangle, if it contains the point
#[allow(clippy::too_many_arguments)]
fn barycentric(
    ax: f64,
    ay: f64,
    bx: f64,
    by: f64,
    cx: f64,
    cy: f64,
    px: f64,
    py: f64,
) -> Option<(f64, f64, f64)> {
    let det = (by - cy) * (ax - cx) + (cx - bx) * (ay - cy);
    if det.abs() < EDGE_TOLERANCE {
        return None;
    }
    let wa = ((by - cy) * (px - cx) + (cx - bx) * (py - cy)) / det;
    let wb = ((cy - ay) * (px - cx) + (ax - cx) * (py - cy)) / det;
    let wc = 1.0 - wa - wb;
    let tol = -1e-9;
    if wa >= tol && wb >= tol && wc >= tol {
        Some((wa, wb, wc))
    } else {
        None
    }
}
