//! Group delay of the trigger signal chain, folded into the cable delay of the
//! database and calibrated-file tiers.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use num::complex::Complex;

use serde::{Deserialize, Serialize};

use crate::{
    calib::StationId,
    error::{Error, Result},
    utils::{gradient, unwrap_phase},
};

/// frequency window (GHz) the group delay is averaged over
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Band {
    pub fmin_ghz: f64,
    pub fmax_ghz: f64,
}

impl Default for Band {
    fn default() -> Self {
        Band {
            fmin_ghz: 0.15,
            fmax_ghz: 0.2,
        }
    }
}

/// complex response of one channel sampled on a frequency grid (GHz)
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ChannelResponse {
    pub freq_ghz: Vec<f64>,
    pub re: Vec<f64>,
    pub im: Vec<f64>,
}

impl ChannelResponse {
    pub fn samples(&self) -> Result<Vec<Complex<f64>>> {
        if self.re.len() != self.freq_ghz.len() || self.im.len() != self.freq_ghz.len() {
            return Err(Error::GroupDelay(format!(
                "{} frequencies but {} re / {} im samples",
                self.freq_ghz.len(),
                self.re.len(),
                self.im.len()
            )));
        }
        Ok(self
            .re
            .iter()
            .zip(self.im.iter())
            .map(|(&re, &im)| Complex::new(re, im))
            .collect())
    }

    pub fn mean_group_delay(&self, band: Band) -> Result<f64> {
        mean_group_delay(&self.freq_ghz, &self.samples()?, band)
    }
}

pub type Responses = BTreeMap<StationId, BTreeMap<usize, ChannelResponse>>;

/// Mean of `-dφ/df / 2π` over `fmin < f < fmax`; ns for a GHz grid.
pub fn mean_group_delay(freq: &[f64], response: &[Complex<f64>], band: Band) -> Result<f64> {
    if freq.len() != response.len() {
        return Err(Error::GroupDelay(format!(
            "{} frequencies for {} samples",
            freq.len(),
            response.len()
        )));
    }
    let phase: Vec<f64> = response.iter().map(|z| z.arg()).collect();
    let dphi = gradient(&unwrap_phase(&phase));
    let df = gradient(freq);

    let in_band: Vec<f64> = dphi
        .iter()
        .zip(df.iter())
        .zip(freq.iter())
        .filter(|&(_, &f)| f > band.fmin_ghz && f < band.fmax_ghz)
        .map(|((&dp, &d), _)| -dp / (2.0 * std::f64::consts::PI * d))
        .collect();
    if in_band.is_empty() {
        return Err(Error::GroupDelay(format!(
            "no samples inside {}-{} GHz",
            band.fmin_ghz, band.fmax_ghz
        )));
    }
    Ok(in_band.iter().sum::<f64>() / in_band.len() as f64)
}

/// group delay corrections in ns, keyed station -> channel
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupDelays {
    pub stations: BTreeMap<StationId, BTreeMap<usize, f64>>,
}

impl GroupDelays {
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(serde_json::from_reader(BufReader::new(File::open(path)?))?)
    }

    pub fn to_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), self)?;
        Ok(())
    }

    pub fn insert(&mut self, station: StationId, ch: usize, ns: f64) {
        self.stations.entry(station).or_default().insert(ch, ns);
    }

    /// correction for one channel; 0 ns when the station was never measured
    pub fn correction(&self, station: StationId, ch: usize) -> f64 {
        match self.stations.get(&station).and_then(|s| s.get(&ch)) {
            Some(&ns) => ns,
            None => {
                log::debug!("station {} ch {}: no group delay, using 0 ns", station, ch);
                0.0
            }
        }
    }

    /// Estimates every channel of every station; a channel that cannot be
    /// estimated gets 0 ns.
    pub fn from_responses(responses: &Responses, band: Band) -> Self {
        let mut result = GroupDelays::default();
        for (&station, channels) in responses {
            for (&ch, resp) in channels {
                let ns = resp.mean_group_delay(band).unwrap_or_else(|e| {
                    log::warn!("station {} ch {}: {}, using 0 ns", station, ch, e);
                    0.0
                });
                log::info!("station {} ch {}: group delay {:.3} ns", station, ch, ns);
                result.insert(station, ch, ns);
            }
        }
        result
    }
}
