use ndarray::{Array2, ArrayView2, Axis};

#[derive(Debug, Clone, PartialEq)]
pub struct Quantized {
    /// `[channel][beam]` whole-sample lookbacks, each beam column has a 0
    pub lookback: Array2<u32>,
    /// `(channel, beam)` entries that were NaN/Inf and were replaced by 0 s
    pub non_finite: Vec<(usize, usize)>,
}

/// Converts a `[channel][beam]` delay matrix (s) into sample lookbacks.
///
/// Delays are scaled to samples at `sample_rate * oversample`, then each beam
/// has its smallest channel subtracted, and only then is the result rounded
/// to nearest with ties away from zero.
pub fn quantize(delays: ArrayView2<f64>, sample_rate: f64, oversample: u32) -> Quantized {
    let rate = sample_rate * oversample as f64;
    let mut non_finite = Vec::new();
    let samples = Array2::from_shape_fn(delays.dim(), |(ch, beam)| {
        let s = delays[(ch, beam)] * rate;
        if s.is_finite() {
            s
        } else {
            non_finite.push((ch, beam));
            0.0
        }
    });

    let mut lookback = Array2::<u32>::zeros(samples.dim());
    for (col, mut out) in samples
        .axis_iter(Axis(1))
        .zip(lookback.axis_iter_mut(Axis(1)))
    {
        let min = col.fold(f64::INFINITY, |m, &x| m.min(x));
        for (&x, o) in col.iter().zip(out.iter_mut()) {
            *o = (x - min).round() as u32;
        }
    }
    Quantized {
        lookback,
        non_finite,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn every_column_is_anchored_at_zero() {
        let d = array![
            [1.2e-9, -3.7e-9, 0.0],
            [-2.0e-9, 4.4e-9, 0.3e-9],
            [0.6e-9, 0.0, -8.1e-9]
        ];
        let q = quantize(d.view(), 1e9, 1);
        for col in q.lookback.axis_iter(Axis(1)) {
            assert_eq!(col.iter().min(), Some(&0));
        }
        assert_eq!(q.lookback, array![[3, 0, 8], [0, 8, 8], [3, 4, 0]]);
    }

    #[test]
    fn oversampling_scales_before_rounding() {
        let d = array![[0.0], [1.3e-9]];
        assert_eq!(quantize(d.view(), 1e9, 1).lookback, array![[0], [1]]);
        assert_eq!(quantize(d.view(), 1e9, 4).lookback, array![[0], [5]]);
    }

    #[test]
    fn ties_round_away_from_zero_after_subtraction() {
        // unit rate keeps the half-sample offsets exact
        let d = array![[-1.0], [-0.5], [1.5]];
        let q = quantize(d.view(), 1.0, 1);
        assert_eq!(q.lookback, array![[0], [1], [3]]);
    }

    #[test]
    fn non_finite_entries_become_zero_delay() {
        let d = array![[f64::NAN, 2.0e-9], [3.0e-9, f64::INFINITY]];
        let q = quantize(d.view(), 1e9, 1);
        assert_eq!(q.non_finite, vec![(0, 0), (1, 1)]);
        assert_eq!(q.lookback, array![[0, 2], [3, 0]]);
    }

    #[test]
    fn zero_delays_stay_zero() {
        let d = Array2::<f64>::zeros((4, 12));
        let q = quantize(d.view(), 1e9, 1);
        assert!(q.lookback.iter().all(|&x| x == 0));
    }
}
