//! Interpolating cubic splines.
//!
//! The base colorimetric tables are tabulated at 0.1 nm; every other grid
//! the engine works on is produced by evaluating an interpolating spline of
//! those tables. The spline is C2 with not-a-knot end conditions, so it
//! reproduces the tabulated values exactly at the knots and any cubic
//! polynomial exactly everywhere.

/// An interpolating cubic spline over strictly increasing knots.
///
/// # Example
///
/// ```rust
/// use cfb_math::CubicSpline;
///
/// let x = vec![0.0, 1.0, 2.0, 3.0];
/// let y = vec![0.0, 1.0, 8.0, 27.0]; // x^3
/// let spline = CubicSpline::new(&x, &y).unwrap();
/// assert!((spline.eval(1.5) - 3.375).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Second derivatives at the knots.
    m: Vec<f64>,
}

impl CubicSpline {
    /// Fits an interpolating spline through `(x, y)` pairs.
    ///
    /// `x` must be strictly increasing with at least two points and the
    /// same length as `y`; returns `None` otherwise.
    pub fn new(x: &[f64], y: &[f64]) -> Option<Self> {
        let n = x.len();
        if n < 2 || y.len() != n {
            return None;
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return None;
        }

        let m = match n {
            // Two points: linear segment, zero curvature.
            2 => vec![0.0; 2],
            // Three points: the single parabola through them.
            3 => {
                let h0 = x[1] - x[0];
                let h1 = x[2] - x[1];
                let d0 = (y[1] - y[0]) / h0;
                let d1 = (y[2] - y[1]) / h1;
                let m_mid = 2.0 * (d1 - d0) / (h0 + h1);
                vec![m_mid; 3]
            }
            _ => Self::solve_not_a_knot(x, y)?,
        };

        Some(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            m,
        })
    }

    /// Solves the tridiagonal system for the interior second derivatives
    /// with the not-a-knot conditions eliminated into the first and last
    /// interior rows.
    fn solve_not_a_knot(x: &[f64], y: &[f64]) -> Option<Vec<f64>> {
        let n = x.len();
        let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
        let d: Vec<f64> = (0..n - 1).map(|i| (y[i + 1] - y[i]) / h[i]).collect();

        // Unknowns m[1..=n-2]; k interior equations.
        let k = n - 2;
        let mut sub = vec![0.0; k];
        let mut diag = vec![0.0; k];
        let mut sup = vec![0.0; k];
        let mut rhs = vec![0.0; k];

        for (eq, i) in (1..n - 1).enumerate() {
            sub[eq] = h[i - 1];
            diag[eq] = 2.0 * (h[i - 1] + h[i]);
            sup[eq] = h[i];
            rhs[eq] = 6.0 * (d[i] - d[i - 1]);
        }

        // Left not-a-knot: m0 = (1 + h0/h1) m1 - (h0/h1) m2.
        let r0 = h[0] / h[1];
        diag[0] += h[0] * (1.0 + r0);
        sup[0] -= h[0] * r0;
        // Right not-a-knot: m_{n-1} = (1 + h_{n-2}/h_{n-3}) m_{n-2}
        //                           - (h_{n-2}/h_{n-3}) m_{n-3}.
        let r1 = h[n - 2] / h[n - 3];
        diag[k - 1] += h[n - 2] * (1.0 + r1);
        sub[k - 1] -= h[n - 2] * r1;

        // Thomas algorithm.
        for i in 1..k {
            let w = sub[i] / diag[i - 1];
            if !w.is_finite() {
                return None;
            }
            diag[i] -= w * sup[i - 1];
            rhs[i] -= w * rhs[i - 1];
        }
        let mut interior = vec![0.0; k];
        interior[k - 1] = rhs[k - 1] / diag[k - 1];
        for i in (0..k - 1).rev() {
            interior[i] = (rhs[i] - sup[i] * interior[i + 1]) / diag[i];
        }

        let mut m = vec![0.0; n];
        m[1..n - 1].copy_from_slice(&interior);
        m[0] = (1.0 + r0) * m[1] - r0 * m[2];
        m[n - 1] = (1.0 + r1) * m[n - 2] - r1 * m[n - 3];
        Some(m)
    }

    /// Evaluates the spline at `t`.
    ///
    /// Outside the knot range the end polynomial is continued; callers in
    /// the engine clamp their grids to the tabulated range before asking.
    pub fn eval(&self, t: f64) -> f64 {
        let n = self.x.len();
        // Interval index: the segment [x[i], x[i+1]] containing t.
        let i = match self.x.partition_point(|&xi| xi <= t) {
            0 => 0,
            p if p >= n => n - 2,
            p => p - 1,
        };
        let h = self.x[i + 1] - self.x[i];
        let dx = t - self.x[i];
        let slope = (self.y[i + 1] - self.y[i]) / h - h * (2.0 * self.m[i] + self.m[i + 1]) / 6.0;
        self.y[i]
            + slope * dx
            + self.m[i] * dx * dx / 2.0
            + (self.m[i + 1] - self.m[i]) * dx * dx * dx / (6.0 * h)
    }

    /// Evaluates the spline over a slice of abscissae.
    pub fn eval_many(&self, ts: &[f64]) -> Vec<f64> {
        ts.iter().map(|&t| self.eval(t)).collect()
    }

    /// Sum of spline values over a slice of abscissae.
    pub fn sum_over(&self, ts: &[f64]) -> f64 {
        ts.iter().map(|&t| self.eval(t)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_identity_at_knots() {
        let x: Vec<f64> = (0..20).map(|i| 390.0 + i as f64 * 0.5).collect();
        let y: Vec<f64> = x.iter().map(|&xi| (xi / 40.0).sin()).collect();
        let spline = CubicSpline::new(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(&y) {
            assert_abs_diff_eq!(spline.eval(*xi), *yi, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_reproduces_cubic_polynomial() {
        // Not-a-knot conditions make the interpolant exact for cubics.
        let p = |t: f64| 2.0 - t + 0.5 * t * t - 0.25 * t * t * t;
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|&xi| p(xi)).collect();
        let spline = CubicSpline::new(&x, &y).unwrap();
        for i in 0..90 {
            let t = i as f64 * 0.1;
            assert_abs_diff_eq!(spline.eval(t), p(t), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_smooth_function_accuracy() {
        let x: Vec<f64> = (0..=100).map(|i| i as f64 * 0.1).collect();
        let y: Vec<f64> = x.iter().map(|&xi| xi.sin()).collect();
        let spline = CubicSpline::new(&x, &y).unwrap();
        for i in 0..1000 {
            let t = i as f64 * 0.01;
            assert_abs_diff_eq!(spline.eval(t), t.sin(), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_two_points_linear() {
        let spline = CubicSpline::new(&[0.0, 2.0], &[1.0, 5.0]).unwrap();
        assert_abs_diff_eq!(spline.eval(1.0), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_three_points_parabola() {
        // y = x^2 through (0,0), (1,1), (3,9).
        let spline = CubicSpline::new(&[0.0, 1.0, 3.0], &[0.0, 1.0, 9.0]).unwrap();
        assert_abs_diff_eq!(spline.eval(2.0), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(CubicSpline::new(&[0.0], &[1.0]).is_none());
        assert!(CubicSpline::new(&[0.0, 0.0, 1.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(CubicSpline::new(&[0.0, 1.0], &[1.0]).is_none());
    }
}
