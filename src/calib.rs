//! Calibration provider: cable delay and antenna depth per station/channel.
//!
//! Values come from an ordered list of [`CalibSource`] tiers. A channel is
//! taken from the first tier that can supply finite values; when none can,
//! zeros are substituted and the channel is marked as unresolved so the
//! station is still emitted.

use std::{collections::BTreeMap, fmt, fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    cfg::CalibCfg,
    error::{Error, Result},
    group_delay::GroupDelays,
};

pub type StationId = u32;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Tier {
    /// detector database combined with the measured group-delay correction
    Database,
    /// previously calibrated detector file
    Calibrated,
    /// static geometry/delay file
    Fallback,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::Database => "database",
            Tier::Calibrated => "calibrated-file",
            Tier::Fallback => "fallback-file",
        };
        f.write_str(name)
    }
}

#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ChannelCalib {
    pub cable_delay_ns: f64,
    pub antenna_depth_m: f64,
}

impl ChannelCalib {
    pub fn is_finite(&self) -> bool {
        self.cable_delay_ns.is_finite() && self.antenna_depth_m.is_finite()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct StationCalib {
    pub station: StationId,
    pub channels: Vec<ChannelCalib>,
    /// tier that supplied each channel, `None` when zeros were substituted
    pub sources: Vec<Option<Tier>>,
}

impl StationCalib {
    /// every channel taken from `tier`
    pub fn from_channels(station: StationId, channels: Vec<ChannelCalib>, tier: Tier) -> Self {
        let sources = vec![Some(tier); channels.len()];
        StationCalib {
            station,
            channels,
            sources,
        }
    }

    pub fn nch(&self) -> usize {
        self.channels.len()
    }

    pub fn is_degraded(&self) -> bool {
        self.sources.iter().any(Option::is_none)
    }
}

pub trait CalibSource: Send + Sync {
    fn tier(&self) -> Tier;
    fn lookup(&self, station: StationId, ch: usize) -> Result<ChannelCalib>;
}

/// Access to the live detector database.
pub trait DetectorDb: Send + Sync {
    /// trigger-path cable delay in ns
    fn cable_delay(&self, station: StationId, ch: usize) -> Result<f64>;
    /// antenna position relative to the station reference, m
    fn relative_position(&self, station: StationId, ch: usize) -> Result<[f64; 3]>;
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DbChannel {
    pub trigger_cable_delay: f64,
    pub relative_position: [f64; 3],
}

/// JSON snapshot of the database, keyed station -> channel
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DbSnapshot {
    pub stations: BTreeMap<StationId, BTreeMap<usize, DbChannel>>,
}

impl DbSnapshot {
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(serde_json::from_reader(BufReader::new(File::open(path)?))?)
    }

    fn channel(&self, station: StationId, ch: usize) -> Result<&DbChannel> {
        self.stations
            .get(&station)
            .ok_or_else(|| Error::unavailable(station, ch, Tier::Database, "station not in db"))?
            .get(&ch)
            .ok_or_else(|| Error::unavailable(station, ch, Tier::Database, "channel not in db"))
    }
}

impl DetectorDb for DbSnapshot {
    fn cable_delay(&self, station: StationId, ch: usize) -> Result<f64> {
        self.channel(station, ch).map(|c| c.trigger_cable_delay)
    }

    fn relative_position(&self, station: StationId, ch: usize) -> Result<[f64; 3]> {
        self.channel(station, ch).map(|c| c.relative_position)
    }
}

pub struct DbSource<D> {
    pub db: D,
    pub group_delays: GroupDelays,
}

impl<D> CalibSource for DbSource<D>
where
    D: DetectorDb,
{
    fn tier(&self) -> Tier {
        Tier::Database
    }

    fn lookup(&self, station: StationId, ch: usize) -> Result<ChannelCalib> {
        let cable = self.db.cable_delay(station, ch)?;
        let pos = self.db.relative_position(station, ch)?;
        Ok(ChannelCalib {
            cable_delay_ns: cable + self.group_delays.correction(station, ch),
            antenna_depth_m: pos[2],
        })
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct DetectorChannel {
    pub station_id: StationId,
    pub channel_id: usize,
    pub cab_time_delay: f64,
    pub ant_position_z: f64,
}

/// Detector description file; only the per-channel table is read.
#[derive(Debug, PartialEq, Clone, Default, Serialize, Deserialize)]
pub struct DetectorFile {
    pub channels: BTreeMap<String, DetectorChannel>,
}

impl DetectorFile {
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(serde_json::from_reader(BufReader::new(File::open(path)?))?)
    }

    /// The file is expected to hold one entry per station/channel; with
    /// duplicates the first in key order is used and a warning is logged.
    pub fn channel(&self, station: StationId, ch: usize) -> Option<&DetectorChannel> {
        let mut matches = self
            .channels
            .iter()
            .filter(|(_, c)| c.station_id == station && c.channel_id == ch);
        let (key, first) = matches.next()?;
        let others: Vec<&str> = matches.map(|(k, _)| k.as_str()).collect();
        if !others.is_empty() {
            log::warn!(
                "station {} ch {}: {} entries in detector file, using \"{}\" over {:?}",
                station,
                ch,
                others.len() + 1,
                key,
                others
            );
        }
        Some(first)
    }
}

pub struct FileSource {
    pub tier: Tier,
    pub file: DetectorFile,
    /// added to the stored cable delay when present
    pub group_delays: Option<GroupDelays>,
}

impl CalibSource for FileSource {
    fn tier(&self) -> Tier {
        self.tier
    }

    fn lookup(&self, station: StationId, ch: usize) -> Result<ChannelCalib> {
        let c = self
            .file
            .channel(station, ch)
            .ok_or_else(|| Error::unavailable(station, ch, self.tier, "channel not in file"))?;
        let correction = self
            .group_delays
            .as_ref()
            .map_or(0.0, |g| g.correction(station, ch));
        Ok(ChannelCalib {
            cable_delay_ns: c.cab_time_delay + correction,
            antenna_depth_m: c.ant_position_z,
        })
    }
}

#[derive(Default)]
pub struct Calibrator {
    pub sources: Vec<Box<dyn CalibSource>>,
}

impl Calibrator {
    pub fn new(sources: Vec<Box<dyn CalibSource>>) -> Self {
        Calibrator { sources }
    }

    /// Builds the tier chain from the run cfg. A file that cannot be loaded
    /// drops its tier with a warning.
    pub fn from_cfg(cfg: &CalibCfg) -> Self {
        let group_delays = cfg.group_delays.as_ref().and_then(|p| {
            GroupDelays::from_json(p)
                .map_err(|e| log::warn!("group delays {}: {}", p.display(), e))
                .ok()
        });
        let group_delays_or_zero = || {
            group_delays.clone().unwrap_or_else(|| {
                log::warn!("no group delay corrections, using 0 ns");
                GroupDelays::default()
            })
        };

        let mut sources: Vec<Box<dyn CalibSource>> = Vec::new();
        if let Some(p) = &cfg.database {
            match DbSnapshot::from_json(p) {
                Ok(db) => sources.push(Box::new(DbSource {
                    db,
                    group_delays: group_delays_or_zero(),
                })),
                Err(e) => log::warn!("database snapshot {}: {}, tier disabled", p.display(), e),
            }
        }
        for (path, tier) in [
            (&cfg.calibrated, Tier::Calibrated),
            (&cfg.fallback, Tier::Fallback),
        ] {
            if let Some(p) = path {
                match DetectorFile::from_json(p) {
                    Ok(file) => sources.push(Box::new(FileSource {
                        tier,
                        file,
                        group_delays: (tier == Tier::Calibrated).then(group_delays_or_zero),
                    })),
                    Err(e) => log::warn!("{} {}: {}, tier disabled", tier, p.display(), e),
                }
            }
        }
        Calibrator::new(sources)
    }

    pub fn resolve_channel(&self, station: StationId, ch: usize) -> (ChannelCalib, Option<Tier>) {
        for src in &self.sources {
            match src.lookup(station, ch) {
                Ok(c) if c.is_finite() => return (c, Some(src.tier())),
                Ok(c) => log::debug!(
                    "station {} ch {}: {} gave non-finite {:?}, trying next tier",
                    station,
                    ch,
                    src.tier(),
                    c
                ),
                Err(e) => log::debug!("{}, trying next tier", e),
            }
        }
        let tried: Vec<String> = self.sources.iter().map(|s| s.tier().to_string()).collect();
        log::warn!(
            "station {} ch {}: no calibration from [{}], substituting zero delay and depth",
            station,
            ch,
            tried.join(", ")
        );
        (ChannelCalib::default(), None)
    }

    pub fn resolve(&self, station: StationId, nch: usize) -> StationCalib {
        let (channels, sources): (Vec<_>, Vec<_>) = (0..nch)
            .map(|ch| self.resolve_channel(station, ch))
            .unzip();
        let calib = StationCalib {
            station,
            channels,
            sources,
        };
        if calib.is_degraded() {
            log::warn!("station {} calibration is degraded, check before deploying", station);
        }
        calib
    }
}
