use ndarray::Array2;

use crate::{
    calib::{StationCalib, StationId},
    cfg::RunCfg,
    error::Error,
    geom::{arrival_delay, Medium},
    quantize::quantize,
    scan::DenseScan,
    table::StationLookback,
};

#[derive(Debug, Clone)]
pub struct Station {
    pub id: StationId,
    /// channel every other channel's delay is measured against
    pub ref_ch: usize,
    pub calib: StationCalib,
}

impl Station {
    pub fn new(ref_ch: usize, calib: StationCalib) -> Self {
        Station {
            id: calib.station,
            ref_ch,
            calib,
        }
    }

    pub fn nch(&self) -> usize {
        self.calib.nch()
    }

    /// delay of `ch` relative to the reference channel, s
    pub fn delay(&self, ch: usize, angle_deg: f64, medium: &Medium<f64>) -> f64 {
        let r = &self.calib.channels[self.ref_ch];
        let c = &self.calib.channels[ch];
        arrival_delay(
            r.antenna_depth_m,
            c.antenna_depth_m,
            c.cable_delay_ns,
            angle_deg,
            medium,
        )
    }

    /// `[channel][angle]` matrix of delays in s
    pub fn delay_matrix(&self, angles: &[f64], medium: &Medium<f64>) -> Array2<f64> {
        Array2::from_shape_fn((self.nch(), angles.len()), |(ch, i)| {
            self.delay(ch, angles[i], medium)
        })
    }

    pub fn scan(&self, angles: &[f64], medium: &Medium<f64>) -> DenseScan {
        DenseScan {
            angles: angles.to_vec(),
            delays: self.delay_matrix(angles, medium),
        }
    }
}

/// Lookback table of one station at the given beam angles.
///
/// Depends on nothing but its arguments, so stations can be processed in any
/// order or in parallel.
pub fn compute_station_table(station: &Station, beams: &[f64], cfg: &RunCfg) -> StationLookback {
    let delays = station.delay_matrix(beams, &cfg.medium);
    let q = quantize(delays.view(), cfg.sample_rate, cfg.oversample);
    for &(ch, beam) in &q.non_finite {
        let e = Error::NonFiniteDelay {
            station: station.id,
            channel: ch,
            beam,
        };
        log::warn!("{}, using zero", e);
    }
    StationLookback {
        id: station.id,
        lookback: q.lookback,
        sources: station.calib.sources.clone(),
        non_finite: q.non_finite,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        beams::beam_angles,
        calib::{ChannelCalib, Tier},
    };

    fn two_channel() -> Station {
        let calib = StationCalib::from_channels(
            24,
            vec![
                ChannelCalib {
                    cable_delay_ns: 5.0,
                    antenna_depth_m: -10.0,
                },
                ChannelCalib {
                    cable_delay_ns: 0.0,
                    antenna_depth_m: 0.0,
                },
            ],
            Tier::Fallback,
        );
        Station::new(1, calib)
    }

    #[test]
    fn broadside_two_channel_scenario() {
        let st = two_channel();
        let m = Medium::ice();
        assert_eq!(st.delay(0, 0.0, &m), -5.0 / 1e9);
        assert_eq!(st.delay(1, 0.0, &m), 0.0);

        let cfg = RunCfg {
            nch: 2,
            ref_ch: 1,
            ..RunCfg::default()
        };
        let t = compute_station_table(&st, &[0.0], &cfg);
        assert_eq!(t.lookback.column(0).to_vec(), vec![0, 5]);
        assert!(t.non_finite.is_empty());
    }

    #[test]
    fn reference_row_is_cable_only() {
        let st = two_channel();
        let beams = beam_angles(12, 60.0);
        let d = st.delay_matrix(&beams, &Medium::ice());
        assert_eq!(d.dim(), (2, 12));
        assert!(d.row(1).iter().all(|&x| x == 0.0));
        assert!(d[(0, 0)] > d[(0, 11)]);
    }

    #[test]
    fn malformed_calibration_is_zeroed() {
        let mut st = two_channel();
        st.calib.channels[0].antenna_depth_m = f64::INFINITY;
        let cfg = RunCfg {
            nch: 2,
            ref_ch: 1,
            ..RunCfg::default()
        };
        let beams = beam_angles(4, 60.0);
        let t = compute_station_table(&st, &beams, &cfg);
        assert_eq!(t.non_finite.len(), 4);
        assert!(t.is_degraded());
        assert!(t.lookback.iter().all(|&x| x == 0));
    }

    #[test]
    fn non_finite_delay_message() {
        let e = Error::NonFiniteDelay {
            station: 24,
            channel: 1,
            beam: 3,
        };
        assert_eq!(e.to_string(), "station 24 ch 1 beam 3: non-finite delay");
    }
}
