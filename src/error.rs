//! Error types shared by the calibration chain, the delay engine and the binaries.

use std::io;

use thiserror::Error;

use crate::calib::Tier;

#[derive(Error, Debug)]
pub enum Error {
    /// One calibration tier could not supply a channel.
    #[error("station {station} ch {channel}: {tier} calibration unavailable: {reason}")]
    CalibrationUnavailable {
        station: u32,
        channel: usize,
        tier: Tier,
        reason: String,
    },

    /// The delay model produced NaN/Inf for an entry of the delay matrix.
    #[error("station {station} ch {channel} beam {beam}: non-finite delay")]
    NonFiniteDelay {
        station: u32,
        channel: usize,
        beam: usize,
    },

    /// Invalid run parameters, fatal before any station is processed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A sampled response cannot yield a group delay (shape mismatch, empty band).
    #[error("group delay estimate failed: {0}")]
    GroupDelay(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn unavailable(
        station: u32,
        channel: usize,
        tier: Tier,
        reason: impl Into<String>,
    ) -> Self {
        Error::CalibrationUnavailable {
            station,
            channel,
            tier,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
