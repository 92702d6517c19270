use pa_lookback::group_delay::{Band, GroupDelays, Responses};

use clap::Parser;

use anyhow::Context;

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    #[clap(short = 'i', long = "in", value_name = "sampled responses json")]
    responses: String,

    #[clap(short = 'o', long = "out", value_name = "group delay json")]
    output: String,

    #[clap(long = "fmin", value_name = "GHz", default_value = "0.15")]
    fmin: f64,

    #[clap(long = "fmax", value_name = "GHz", default_value = "0.2")]
    fmax: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let responses: Responses = serde_json::from_reader(std::io::BufReader::new(
        std::fs::File::open(&args.responses).with_context(|| args.responses.clone())?,
    ))?;
    let band = Band {
        fmin_ghz: args.fmin,
        fmax_ghz: args.fmax,
    };
    anyhow::ensure!(band.fmin_ghz < band.fmax_ghz, "empty band {:?}", band);

    let gd = GroupDelays::from_responses(&responses, band);
    gd.to_json(&args.output)?;
    log::info!("wrote {}", args.output);
    Ok(())
}
