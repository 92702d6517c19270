use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    calib::StationId,
    constants::{SAMPLE_RATE, STATIONS},
    error::{Error, Result},
    geom::Medium,
};

/// dense angle grid used for diagnostics only
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct ScanCfg {
    pub lo_deg: f64,
    pub hi_deg: f64,
    pub npts: usize,
}

impl Default for ScanCfg {
    fn default() -> Self {
        ScanCfg {
            lo_deg: -80.0,
            hi_deg: 80.0,
            npts: 160 * 8,
        }
    }
}

/// calibration inputs, in tier order; any of them may be absent
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct CalibCfg {
    pub database: Option<PathBuf>,
    pub group_delays: Option<PathBuf>,
    pub calibrated: Option<PathBuf>,
    pub fallback: Option<PathBuf>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct RunCfg {
    /// tag used in output file names
    pub version: String,
    pub stations: Vec<StationId>,
    pub nch: usize,
    pub ref_ch: usize,
    pub nbeams: usize,
    pub fov_deg: f64,
    pub sample_rate: f64,
    pub oversample: u32,
    pub medium: Medium<f64>,
    pub scan: ScanCfg,
    pub calib: CalibCfg,
}

impl Default for RunCfg {
    fn default() -> Self {
        RunCfg {
            version: "didaq_v0".to_string(),
            stations: STATIONS.to_vec(),
            nch: 4,
            ref_ch: 3,
            nbeams: 12,
            fov_deg: 60.0,
            sample_rate: SAMPLE_RATE,
            oversample: 1,
            medium: Medium::ice(),
            scan: ScanCfg::default(),
            calib: CalibCfg::default(),
        }
    }
}

impl RunCfg {
    pub fn from_yaml<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Ok(serde_yaml::from_reader(std::fs::File::open(path)?)?)
    }

    /// rate the delays are quantized at
    pub fn working_rate(&self) -> f64 {
        self.sample_rate * self.oversample as f64
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| -> Result<()> { Err(Error::Config(msg)) };
        if self.stations.is_empty() {
            return fail("station list is empty".to_string());
        }
        if self.nch == 0 {
            return fail("nch must be > 0".to_string());
        }
        if self.ref_ch >= self.nch {
            return fail(format!("ref_ch {} out of range for {} channels", self.ref_ch, self.nch));
        }
        if self.nbeams == 0 {
            return fail("nbeams must be > 0".to_string());
        }
        if !(self.fov_deg > 0.0 && self.fov_deg < 90.0) {
            return fail(format!("fov_deg {} not in (0, 90)", self.fov_deg));
        }
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return fail(format!("sample_rate {} must be positive", self.sample_rate));
        }
        if self.oversample == 0 {
            return fail("oversample must be >= 1".to_string());
        }
        let m = &self.medium;
        if !(m.light_speed.is_finite() && m.light_speed > 0.0) {
            return fail(format!("light_speed {} must be positive", m.light_speed));
        }
        if !(m.refr_index.is_finite() && m.refr_index > 0.0) {
            return fail(format!("refr_index {} must be positive", m.refr_index));
        }
        let s = &self.scan;
        if s.npts < 2 || !(s.lo_deg < s.hi_deg) {
            return fail(format!(
                "scan grid {}..{} with {} points is empty",
                s.lo_deg, s.hi_deg, s.npts
            ));
        }
        Ok(())
    }
}
