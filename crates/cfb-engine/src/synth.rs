//! Base-function synthesis.
//!
//! Builds the age- and field-size-dependent cone fundamentals on the
//! 0.1 nm reference grid: optical-density corrections applied to the
//! tabulated low-density photopigment absorbances, quantal-to-energy
//! conversion, peak normalization, and the luminous-efficiency function
//! V(lambda) synthesized as a weighted sum of the L and M fundamentals.
//!
//! The 2 deg and 10 deg observers at age 32 have published tabulations;
//! those are returned as-is instead of being re-derived, so the canonical
//! cases reproduce the published digits exactly.

use cfb_data::VisualData;
use cfb_math::{round_dp, round_sf};

use crate::observer::{Observer, TabulatedField};
use crate::{MAT_DP, V_SIGNFIG};

/// The published V(lambda) synthesis weights for the 2 deg, age-32 observer.
const V_WEIGHTS_2DEG: [f64; 2] = [0.68990272, 0.34832189];
/// The published V(lambda) synthesis weights for the 10 deg, age-32 observer.
const V_WEIGHTS_10DEG: [f64; 2] = [0.69283932, 0.34967567];

/// The synthesized base functions for one observer, on the reference grid.
///
/// Immutable once built; the engine caches one instance per observer.
#[derive(Debug, Clone)]
pub struct BaseFunctions {
    /// The observer these functions belong to.
    pub observer: Observer,
    /// Reference grid wavelengths, nm.
    pub wavelengths: Vec<f64>,
    /// Energy cone fundamentals at 9 significant figures, [L, M, S].
    pub lms: [Vec<f64>; 3],
    /// Energy cone fundamentals at 6 significant figures ("standard").
    pub lms_std: [Vec<f64>; 3],
    /// Luminous efficiency V(lambda), energy scale.
    pub v: Vec<f64>,
    /// V(lambda) synthesis weights (a21, a22).
    pub v_weights: [f64; 2],
    /// Peak of s/V over the reference grid; the MacLeod-Boynton
    /// s-axis normalization constant.
    pub mb_s_max: f64,
}

/// Peak optical density of the macular pigment as a function of field size.
pub fn macular_peak_density(field_size: f64) -> f64 {
    round_dp(0.485 * (-field_size / 6.132).exp(), 3)
}

/// Peak optical density of the L/M-cone photopigment.
pub fn lm_pigment_peak_density(field_size: f64) -> f64 {
    round_dp(0.38 + 0.54 * (-field_size / 1.333).exp(), 3)
}

/// Peak optical density of the S-cone photopigment.
pub fn s_pigment_peak_density(field_size: f64) -> f64 {
    round_dp(0.30 + 0.45 * (-field_size / 1.333).exp(), 3)
}

/// Optical density of the ocular media as a function of age.
///
/// A weighted sum of the age-dependent and age-independent components of
/// the 32-year tabulation.
fn ocular_density(data: &VisualData, age: u32) -> Vec<f64> {
    let age = age as f64;
    let k = if age < 60.0 {
        1.0 + 0.02 * (age - 32.0)
    } else {
        1.56 + 0.0667 * (age - 60.0)
    };
    data.docul1_fine
        .iter()
        .zip(&data.docul2_fine)
        .map(|(d1, d2)| k * d1 + d2)
        .collect()
}

/// Quantal absorptance of the three cone types for a field size.
fn absorptance(data: &VisualData, field_size: f64) -> [Vec<f64>; 3] {
    let densities = [
        lm_pigment_peak_density(field_size),
        lm_pigment_peak_density(field_size),
        s_pigment_peak_density(field_size),
    ];
    let mut out: [Vec<f64>; 3] = Default::default();
    for c in 0..3 {
        out[c] = data.tables.absorbance[c]
            .iter()
            .map(|a| 1.0 - 10f64.powf(-densities[c] * 10f64.powf(*a)))
            .collect();
    }
    out
}

/// Quantal cone fundamentals: absorptance corrected for macular pigment
/// and ocular media, peak-normalized per channel.
fn lms_quantal(data: &VisualData, field_size: f64, age: u32) -> [Vec<f64>; 3] {
    let abt = absorptance(data, field_size);
    let ocul = ocular_density(data, age);
    let d_mac = macular_peak_density(field_size);
    let mut out: [Vec<f64>; 3] = Default::default();
    for c in 0..3 {
        let mut q: Vec<f64> = abt[c]
            .iter()
            .zip(&data.macula_rel)
            .zip(&ocul)
            .map(|((a, mac), oc)| a * 10f64.powf(-d_mac * mac - oc))
            .collect();
        let peak = q.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        q.iter_mut().for_each(|v| *v /= peak);
        out[c] = q;
    }
    out
}

/// Energy cone fundamentals from the quantal ones, peak-normalized and
/// rounded to 9 significant figures. Returns the pre-normalization peaks,
/// which the V(lambda) synthesis needs.
fn energy_base(data: &VisualData, observer: Observer) -> ([Vec<f64>; 3], [f64; 3]) {
    let quantal = lms_quantal(data, observer.field_size, observer.age);
    let mut out: [Vec<f64>; 3] = Default::default();
    let mut peaks = [0.0; 3];
    for c in 0..3 {
        let mut e: Vec<f64> = quantal[c]
            .iter()
            .zip(&data.wavelengths)
            .map(|(q, wl)| q * wl)
            .collect();
        let peak = e.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        peaks[c] = peak;
        e.iter_mut().for_each(|v| *v = round_sf(*v / peak, 9));
        out[c] = e;
    }
    (out, peaks)
}

/// Weighting factor of the L fundamental in the V(lambda) synthesis,
/// quantal scale.
///
/// The field size is pinned at 2 deg in this weight; only the age
/// varies the constant.
fn l_cone_weight(data: &VisualData, age: u32) -> f64 {
    let abt = absorptance(data, 2.0);
    let q_age = lms_quantal(data, 2.0, age);
    let q_32 = lms_quantal(data, 2.0, 32);
    let const_age = abt[0][0] * q_age[1][0] / (abt[1][0] * q_age[0][0]);
    let const_32 = abt[0][0] * q_32[1][0] / (abt[1][0] * q_32[0][0]);
    1.89 * const_age / const_32
}

/// V(lambda) and its synthesis weights from the energy fundamentals.
fn v_lambda(
    data: &VisualData,
    observer: Observer,
    lms: &[Vec<f64>; 3],
    peaks: [f64; 3],
) -> (Vec<f64>, [f64; 2]) {
    let weight = l_cone_weight(data, observer.age);
    let raw: Vec<f64> = lms[0]
        .iter()
        .zip(&lms[1])
        .map(|(l, m)| weight * peaks[0] * l + peaks[1] * m)
        .collect();
    let v_peak = raw.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let a21 = round_dp(weight * peaks[0] / v_peak, MAT_DP);
    let a22 = round_dp(peaks[1] / v_peak, MAT_DP);
    let v = lms[0]
        .iter()
        .zip(&lms[1])
        .map(|(l, m)| round_sf(a21 * l + a22 * m, V_SIGNFIG))
        .collect();
    (v, [a21, a22])
}

/// Synthesizes the base functions for an observer.
pub fn synthesize(data: &VisualData, observer: Observer) -> BaseFunctions {
    let t = &data.tables;
    let (lms, lms_std, v, v_weights) = match observer.tabulated_field_size() {
        Some(TabulatedField::TwoDeg) => (
            t.lms2_energy.clone(),
            t.lms2_energy_std.clone(),
            t.v2_energy.clone(),
            V_WEIGHTS_2DEG,
        ),
        Some(TabulatedField::TenDeg) => (
            t.lms10_energy.clone(),
            t.lms10_energy_std.clone(),
            t.v10_energy.clone(),
            V_WEIGHTS_10DEG,
        ),
        None => {
            let (lms, peaks) = energy_base(data, observer);
            let lms_std = [
                lms[0].iter().map(|x| round_sf(*x, 6)).collect(),
                lms[1].iter().map(|x| round_sf(*x, 6)).collect(),
                lms[2].iter().map(|x| round_sf(*x, 6)).collect(),
            ];
            let (v, weights) = v_lambda(data, observer, &lms, peaks);
            (lms, lms_std, v, weights)
        }
    };

    let mb_s_max = lms[2]
        .iter()
        .zip(&v)
        .map(|(s, v)| s / v)
        .fold(f64::NEG_INFINITY, f64::max);

    BaseFunctions {
        observer,
        wavelengths: data.wavelengths.clone(),
        lms,
        lms_std,
        v,
        v_weights,
        mb_s_max,
    }
}
