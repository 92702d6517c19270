use pa_lookback::{
    beams::{beam_angles, scan_angles},
    calib::Calibrator,
    cfg::RunCfg,
    station::{compute_station_table, Station},
};

use std::fs::create_dir_all;

use clap::Parser;

use ndarray_npy::write_npy;

use ndarray::ArrayView1;

use rayon::prelude::*;

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    #[clap(short = 'c', long = "cfg", value_name = "run cfg")]
    run_cfg: String,

    #[clap(short = 'o', long = "out", value_name = "outdir")]
    outdir: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let run_cfg = RunCfg::from_yaml(&args.run_cfg)?;
    run_cfg.validate()?;
    let calibrator = Calibrator::from_cfg(&run_cfg.calib);

    let out_dir = std::path::PathBuf::from(args.outdir);
    create_dir_all(&out_dir)?;

    let beams = beam_angles(run_cfg.nbeams, run_cfg.fov_deg);
    let angs = scan_angles(run_cfg.scan.lo_deg, run_cfg.scan.hi_deg, run_cfg.scan.npts);
    write_npy(out_dir.join("beam_angles.npy"), &ArrayView1::from(&beams))?;
    write_npy(out_dir.join("scan_angles.npy"), &ArrayView1::from(&angs))?;

    run_cfg
        .stations
        .par_iter()
        .map(|&id| -> anyhow::Result<()> {
            let station = Station::new(run_cfg.ref_ch, calibrator.resolve(id, run_cfg.nch));
            let scan = station.scan(&angs, &run_cfg.medium);
            for ch in 0..scan.nch() {
                if !scan.is_monotonic(ch) {
                    log::warn!("station {} ch {}: delay is not monotonic per side", id, ch);
                }
            }
            let table = compute_station_table(&station, &beams, &run_cfg);

            write_npy(out_dir.join(format!("{}_arrival_times.npy", id)), &scan.delays)?;
            write_npy(
                out_dir.join(format!("{}_lookback_samples.npy", id)),
                &scan.lookback_samples(run_cfg.working_rate()),
            )?;
            write_npy(
                out_dir.join(format!("{}_beam_lookback_samples.npy", id)),
                &table.lookback,
            )?;
            log::info!("station {} dumped", id);
            Ok(())
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(())
}
