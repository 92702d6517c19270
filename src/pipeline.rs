use rayon::prelude::*;

use crate::{
    beams::beam_angles,
    calib::Calibrator,
    cfg::RunCfg,
    error::Result,
    station::{compute_station_table, Station},
    table::{assemble, LookbackTable},
};

/// Calibrates every configured station and builds the lookback table.
///
/// The cfg is validated first; an invalid cfg aborts before any station is
/// touched. Missing calibration only degrades the affected stations.
pub fn run(cfg: &RunCfg, calibrator: &Calibrator) -> Result<LookbackTable> {
    cfg.validate()?;
    let beams = beam_angles(cfg.nbeams, cfg.fov_deg);
    log::info!(
        "{} beams over +/-{} deg, {} stations at {} Hz",
        beams.len(),
        cfg.fov_deg,
        cfg.stations.len(),
        cfg.working_rate()
    );

    let stations: Vec<_> = cfg
        .stations
        .par_iter()
        .map(|&id| {
            let station = Station::new(cfg.ref_ch, calibrator.resolve(id, cfg.nch));
            compute_station_table(&station, &beams, cfg)
        })
        .collect();

    let table = assemble(beams, stations);
    for id in table.degraded() {
        log::warn!("station {} emitted with degraded delays", id);
    }
    Ok(table)
}
