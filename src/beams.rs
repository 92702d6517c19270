use itertools_num::linspace;

use num::traits::{Float, FloatConst};

use crate::utils::{deg2rad, rad2deg};

/// Steering angles (deg) of the trigger beams, from `+fov_deg` down to `-fov_deg`.
///
/// The points are evenly spaced in sin(angle), which is the quantity sample
/// delays are linear in, so beams crowd around broadside.
pub fn beam_angles<T>(nbeams: usize, fov_deg: T) -> Vec<T>
where
    T: Float + FloatConst,
{
    let s = deg2rad(fov_deg).sin();
    linspace(s, -s, nbeams)
        .map(|x| rad2deg(x.asin()))
        .collect()
}

/// evenly spaced angles (deg) for the diagnostic scan
pub fn scan_angles<T>(lo_deg: T, hi_deg: T, npts: usize) -> Vec<T>
where
    T: Float,
{
    linspace(lo_deg, hi_deg, npts).collect()
}
