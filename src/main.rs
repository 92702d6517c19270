use pa_lookback::{calib::Calibrator, cfg::RunCfg, pipeline};

use std::{fs::create_dir_all, io::Write};

use clap::Parser;

use anyhow::Context;

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    #[clap(
        short = 'c',
        long = "cfg",
        value_name = "run cfg",
        default_value = "lookback.yaml"
    )]
    run_cfg: String,

    #[clap(short = 'o', long = "out", value_name = "outdir", default_value = "data")]
    outdir: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let run_cfg = RunCfg::from_yaml(&args.run_cfg)
        .with_context(|| format!("reading {}", args.run_cfg))?;
    log::debug!("{:?}", run_cfg);

    let calibrator = Calibrator::from_cfg(&run_cfg.calib);
    let table = pipeline::run(&run_cfg, &calibrator)?;

    let out_dir = std::path::PathBuf::from(args.outdir);
    create_dir_all(&out_dir)?;

    let q_path = out_dir.join(format!("{}_quartus_delays.txt", run_cfg.version));
    std::fs::File::create(&q_path)?.write_all(table.vhdl().to_string().as_bytes())?;

    let json_path = out_dir.join(format!("{}_lookbacks.json", run_cfg.version));
    serde_json::to_writer_pretty(std::fs::File::create(&json_path)?, &table.nested())?;

    print!("{}", table.hardware());
    log::info!("wrote {} and {}", q_path.display(), json_path.display());
    Ok(())
}
