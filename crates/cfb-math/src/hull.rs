//! 2-D convex hull.
//!
//! The purple-line tangent points are the endpoints of the one convex-hull
//! edge of the spectral locus that is not part of the locus itself. The
//! hull of an ordered polyline is computed with the monotone-chain
//! algorithm; callers keep working in original point indices.

/// Cross product of `(b - a) x (c - a)`.
#[inline]
fn cross(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

/// Computes the convex hull of a point set.
///
/// Returns indices into `points` in counter-clockwise order, without
/// repeating the first point. Collinear points on an edge are excluded.
/// Fewer than three distinct points yield an empty result.
///
/// # Example
///
/// ```rust
/// use cfb_math::convex_hull;
///
/// let points = vec![(0.0, 0.0), (1.0, 0.0), (0.5, 0.2), (1.0, 1.0), (0.0, 1.0)];
/// let hull = convex_hull(&points);
/// assert_eq!(hull.len(), 4);
/// assert!(!hull.contains(&2)); // interior point
/// ```
pub fn convex_hull(points: &[(f64, f64)]) -> Vec<usize> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| {
        points[i]
            .partial_cmp(&points[j])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut hull: Vec<usize> = Vec::with_capacity(2 * n);

    // Lower hull.
    for &i in &order {
        while hull.len() >= 2
            && cross(
                points[hull[hull.len() - 2]],
                points[hull[hull.len() - 1]],
                points[i],
            ) <= 0.0
        {
            hull.pop();
        }
        hull.push(i);
    }

    // Upper hull.
    let lower_len = hull.len() + 1;
    for &i in order.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(
                points[hull[hull.len() - 2]],
                points[hull[hull.len() - 1]],
                points[i],
            ) <= 0.0
        {
            hull.pop();
        }
        hull.push(i);
    }

    hull.pop(); // last point repeats the first
    if hull.len() < 3 { Vec::new() } else { hull }
}

/// Consecutive hull edges as index pairs, including the closing edge.
pub fn hull_edges(hull: &[usize]) -> Vec<(usize, usize)> {
    if hull.len() < 2 {
        return Vec::new();
    }
    let mut edges: Vec<(usize, usize)> = hull.windows(2).map(|w| (w[0], w[1])).collect();
    edges.push((hull[hull.len() - 1], hull[0]));
    edges
}
