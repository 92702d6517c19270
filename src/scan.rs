use ndarray::{Array2, ArrayView1, Axis};

/// delays of every channel evaluated on a dense angle grid
#[derive(Debug, Clone)]
pub struct DenseScan {
    pub angles: Vec<f64>,
    /// `[channel][angle]`, s
    pub delays: Array2<f64>,
}

fn monotonic(x: &[f64]) -> bool {
    x.windows(2).all(|w| w[1] >= w[0]) || x.windows(2).all(|w| w[1] <= w[0])
}

impl DenseScan {
    pub fn nch(&self) -> usize {
        self.delays.nrows()
    }

    /// true if the delay of `ch` never changes direction on either side of broadside
    pub fn is_monotonic(&self, ch: usize) -> bool {
        let row = self.delays.row(ch);
        let side = |keep: fn(f64) -> bool| -> Vec<f64> {
            self.angles
                .iter()
                .zip(row.iter())
                .filter(|&(&a, _)| keep(a))
                .map(|(_, &d)| d)
                .collect()
        };
        monotonic(&side(|a| a <= 0.0)) && monotonic(&side(|a| a >= 0.0))
    }

    /// Continuous lookback (samples at `rate`) per angle, normalized like the
    /// beam table but left unrounded.
    pub fn lookback_samples(&self, rate: f64) -> Array2<f64> {
        let mut result = &self.delays * rate;
        for mut col in result.axis_iter_mut(Axis(1)) {
            let min = col.fold(f64::INFINITY, |m, &x| m.min(x));
            col.mapv_inplace(|x| x - min);
        }
        result
    }

    pub fn channel(&self, ch: usize) -> ArrayView1<f64> {
        self.delays.row(ch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        beams::scan_angles,
        calib::{ChannelCalib, StationCalib, Tier},
        geom::Medium,
        station::Station,
    };

    fn station() -> Station {
        let depths = [-96.0, -97.0, -98.0, -92.5];
        let cables = [231.0, 236.5, 240.2, 219.9];
        let channels = depths
            .iter()
            .zip(cables.iter())
            .map(|(&antenna_depth_m, &cable_delay_ns)| ChannelCalib {
                cable_delay_ns,
                antenna_depth_m,
            })
            .collect();
        Station::new(3, StationCalib::from_channels(21, channels, Tier::Calibrated))
    }

    #[test]
    fn delays_monotonic_on_each_side() {
        let scan = station().scan(&scan_angles(-80.0, 80.0, 1280), &Medium::ice());
        assert_eq!(scan.delays.dim(), (4, 1280));
        for ch in 0..scan.nch() {
            assert!(scan.is_monotonic(ch), "ch {ch}");
        }
    }

    #[test]
    fn detects_direction_change() {
        let scan = DenseScan {
            angles: vec![-2.0, -1.0, 0.0, 1.0, 2.0, 3.0],
            delays: Array2::from_shape_vec((1, 6), vec![2.0, 1.0, 0.0, 1.0, 0.5, 2.0]).unwrap(),
        };
        assert!(!scan.is_monotonic(0));
    }

    #[test]
    fn geometric_part_changes_sign_at_broadside() {
        // equal cables isolate the geometric term
        let mut st = station();
        for c in st.calib.channels.iter_mut() {
            c.cable_delay_ns = 0.0;
        }
        let scan = st.scan(&[-30.0, 0.0, 30.0], &Medium::ice());
        let d = scan.channel(0);
        assert!(d[0] < 0.0 && d[1] == 0.0 && d[2] > 0.0);
    }

    #[test]
    fn lookback_columns_start_at_zero() {
        let scan = station().scan(&scan_angles(-80.0, 80.0, 64), &Medium::ice());
        let lb = scan.lookback_samples(1e9);
        for col in lb.axis_iter(Axis(1)) {
            assert_eq!(col.fold(f64::INFINITY, |m, &x| m.min(x)), 0.0);
            assert!(col.iter().all(|&x| x >= 0.0));
        }
    }
}
