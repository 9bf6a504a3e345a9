use fxt_regions::{run::load_runs, run_all, ColumnMapping, Mode, RunConfig};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "fxt-regions",
    about = "DS9 region files for EP/FXT source catalogs",
    after_help = r#"
Without target coordinates, detection_<ins>.reg marks all the sources of <obs>/fxt/products/src_<ins>.csv.
With target coordinates, s1_<ins>.reg and bak_<ins>.reg hold the source and background regions
and the background to source area ratio is printed."#
)]
struct Opt {
    /// Observation folder
    #[structopt(long, required_unless = "runs")]
    obs: Option<String>,
    /// Instrument: a or b
    #[structopt(long, required_unless = "runs")]
    ins: Option<String>,
    /// Target right ascension [deg]
    #[structopt(long, requires = "dec", allow_hyphen_values = true)]
    ra: Option<f64>,
    /// Target declination [deg]
    #[structopt(long, requires = "ra", allow_hyphen_values = true)]
    dec: Option<f64>,
    /// Run list CSV file with the columns: observation,instrument,ra,dec
    #[structopt(long, conflicts_with_all = &["obs", "ins", "ra", "dec"])]
    runs: Option<PathBuf>,
    /// Folder the observation folders are in
    #[structopt(long, default_value = ".")]
    root: PathBuf,
    /// Catalog right ascension column
    #[structopt(long)]
    ra_column: Option<String>,
    /// Catalog declination column
    #[structopt(long)]
    dec_column: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    log::debug!("{:?}", opt);

    let columns = ColumnMapping {
        ra: opt.ra_column,
        dec: opt.dec_column,
    };
    let configs = match (opt.runs, opt.obs, opt.ins) {
        (Some(runs), _, _) => load_runs(runs)?,
        (None, Some(obs), Some(ins)) => {
            let mode = Mode::try_from((opt.ra, opt.dec))?;
            vec![RunConfig::new(obs, ins).mode(mode)]
        }
        _ => anyhow::bail!("either a run list or an observation and an instrument must be given"),
    };
    let configs: Vec<_> = configs
        .into_iter()
        .map(|config| config.root(&opt.root).columns(columns.clone()))
        .collect();
    run_all(&configs)?;

    Ok(())
}
