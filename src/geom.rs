use num::traits::{Float, FloatConst};

use serde::{Deserialize, Serialize};

use crate::{
    constants::{light_speed, refr_index, NS_PER_S},
    utils::deg2rad,
};

/// propagation medium of the plane wave crossing the string
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
#[serde(default, bound(deserialize = "T: Float + Deserialize<'de>"))]
pub struct Medium<T> {
    pub light_speed: T,
    pub refr_index: T,
}

impl<T> Medium<T>
where
    T: Float,
{
    pub fn ice() -> Self {
        Medium {
            light_speed: light_speed(),
            refr_index: refr_index(),
        }
    }
}

impl<T> Default for Medium<T>
where
    T: Float,
{
    fn default() -> Self {
        Medium::ice()
    }
}

/// Arrival-time difference (seconds) of `ch` relative to the reference channel
/// for a plane wave from `angle_deg` off the array normal, corrected for the
/// analog-chain latency of `ch`.
///
/// Total over all reals: angles outside [-90, 90] are the caller's business.
pub fn arrival_delay<T>(
    depth_ref: T,
    depth_ch: T,
    cable_delay_ns: T,
    angle_deg: T,
    medium: &Medium<T>,
) -> T
where
    T: Float + FloatConst,
{
    (depth_ref - depth_ch) * deg2rad(angle_deg).sin() * medium.refr_index / medium.light_speed
        - cable_delay_ns / T::from(NS_PER_S).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadside_is_cable_only() {
        let m = Medium::<f64>::ice();
        let d = arrival_delay(0.0, -10.0, 5.0, 0.0, &m);
        assert_eq!(d, -5.0 / 1e9);
    }

    #[test]
    fn geometric_term_follows_sine() {
        let m = Medium::<f64>::ice();
        let d = arrival_delay(0.0, -10.0, 0.0, 30.0, &m);
        let expected = 10.0 * 0.5 * 1.75 / 2.99792458e8;
        assert!((d - expected).abs() < 1e-18);
        let mirrored = arrival_delay(0.0, -10.0, 0.0, -30.0, &m);
        assert!((d + mirrored).abs() < 1e-18);
    }

    #[test]
    fn same_inputs_give_same_bits() {
        let m = Medium::<f64>::ice();
        let a = arrival_delay(-95.3, -97.1, 231.7, 17.25, &m);
        let b = arrival_delay(-95.3, -97.1, 231.7, 17.25, &m);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn out_of_range_angles_do_not_panic() {
        let m = Medium::<f64>::ice();
        for angle in [-720.0, -135.0, 95.0, 1e6] {
            assert!(arrival_delay(0.0, -1.0, 1.0, angle, &m).is_finite());
        }
    }

    #[test]
    fn works_in_single_precision() {
        let m = Medium::<f32>::ice();
        let d = arrival_delay(0.0f32, -10.0, 5.0, 0.0, &m);
        assert!((d + 5e-9).abs() < 1e-12);
    }
}
