//! Observer parameters.

use crate::{EngineError, EngineResult};

/// Smallest supported field size, degrees.
pub const FIELD_SIZE_MIN: f64 = 1.0;
/// Largest supported field size, degrees.
pub const FIELD_SIZE_MAX: f64 = 10.0;
/// Youngest supported observer age, years.
pub const AGE_MIN: u32 = 20;
/// Oldest supported observer age, years.
pub const AGE_MAX: u32 = 70;

/// A validated (field size, age) pair.
///
/// Uniquely determines the base cone fundamentals; everything else in a
/// computation depends only on the wavelength grid.
///
/// # Example
///
/// ```rust
/// use cfb_engine::Observer;
///
/// let obs = Observer::new(2.0, 32).unwrap();
/// assert_eq!(obs.field_size, 2.0);
/// assert!(Observer::new(0.5, 32).is_err());
/// assert!(Observer::new(2.0, 19).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observer {
    /// Field size in degrees.
    pub field_size: f64,
    /// Age in years.
    pub age: u32,
}

impl Observer {
    /// Validates and constructs an observer.
    pub fn new(field_size: f64, age: u32) -> EngineResult<Self> {
        if !field_size.is_finite() || !(FIELD_SIZE_MIN..=FIELD_SIZE_MAX).contains(&field_size) {
            return Err(EngineError::Domain(format!(
                "field size {field_size} deg outside [{FIELD_SIZE_MIN}, {FIELD_SIZE_MAX}]"
            )));
        }
        if !(AGE_MIN..=AGE_MAX).contains(&age) {
            return Err(EngineError::Domain(format!(
                "age {age} outside [{AGE_MIN}, {AGE_MAX}]"
            )));
        }
        Ok(Self { field_size, age })
    }

    /// True for the observers whose functions are published as tables
    /// (2 deg and 10 deg at age 32); those are looked up, not re-derived.
    pub fn tabulated_field_size(&self) -> Option<TabulatedField> {
        if self.age != 32 {
            return None;
        }
        if self.field_size == 2.0 {
            Some(TabulatedField::TwoDeg)
        } else if self.field_size == 10.0 {
            Some(TabulatedField::TenDeg)
        } else {
            None
        }
    }

    /// Cache key; field size is keyed by its exact bit pattern.
    pub(crate) fn cache_key(&self) -> (u64, u32) {
        (self.field_size.to_bits(), self.age)
    }
}

/// The two observers with published tabulations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabulatedField {
    /// 2 degree field, age 32.
    TwoDeg,
    /// 10 degree field, age 32.
    TenDeg,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_range() {
        assert!(Observer::new(1.0, 20).is_ok());
        assert!(Observer::new(10.0, 70).is_ok());
        assert!(Observer::new(5.5, 45).is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(Observer::new(0.99, 32).is_err());
        assert!(Observer::new(10.01, 32).is_err());
        assert!(Observer::new(f64::NAN, 32).is_err());
        assert!(Observer::new(2.0, 19).is_err());
        assert!(Observer::new(2.0, 71).is_err());
    }

    #[test]
    fn test_tabulated_detection() {
        assert_eq!(
            Observer::new(2.0, 32).unwrap().tabulated_field_size(),
            Some(TabulatedField::TwoDeg)
        );
        assert_eq!(
            Observer::new(10.0, 32).unwrap().tabulated_field_size(),
            Some(TabulatedField::TenDeg)
        );
        assert_eq!(Observer::new(2.0, 33).unwrap().tabulated_field_size(), None);
        assert_eq!(Observer::new(3.0, 32).unwrap().tabulated_field_size(), None);
    }
}
