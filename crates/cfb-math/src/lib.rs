//! # cfb-math
//!
//! Math utilities for cone-fundamental-based colorimetry.
//!
//! This crate provides the numerical primitives the computation engine is
//! built on:
//!
//! - [`Mat3`] - 3x3 double-precision matrices for LMS/XYZ transforms
//! - [`CubicSpline`] - interpolating cubic splines (not-a-knot) for
//!   resampling tabulated spectral functions
//! - [`search_min`] - deterministic bounded scalar minimization
//! - [`convex_hull`] - 2-D convex hull of a chromaticity locus
//! - CIE rounding rules ([`round_dp`], [`round_sf`], [`chop`])
//!
//! # Design
//!
//! All matrix operations assume **row-major** storage and **column vectors**:
//!
//! ```text
//! result = matrix * vector
//! ```
//!
//! Everything is `f64`: the published colorimetric tables carry up to nine
//! significant figures and transform matrices are specified to eight
//! decimals, which single precision cannot represent.
//!
//! # Usage
//!
//! ```rust
//! use cfb_math::Mat3;
//!
//! // LMS to XYZ (CIE 2 deg cone-fundamental-based)
//! let lms_to_xyz = Mat3::from_rows([
//!     [1.94735469, -1.41445123, 0.36476327],
//!     [0.68990272, 0.34832189, 0.0],
//!     [0.0, 0.0, 1.93485343],
//! ]);
//!
//! let xyz = lms_to_xyz.transform([1.0, 1.0, 1.0]);
//! assert!(xyz[0] > 0.89 && xyz[0] < 0.90);
//! ```
//!
//! # Used By
//!
//! - `cfb-data` - resampling of tabulated ocular-media data
//! - `cfb-engine` - the computation pipeline

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod hull;
mod mat3;
mod minimize;
mod round;
mod spline;

pub use hull::*;
pub use mat3::*;
pub use minimize::*;
pub use round::*;
pub use spline::*;
