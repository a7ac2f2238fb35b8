use std::process::ExitCode;

use itp2ffxml::{ForceFieldXml, ItpParams};
use log::{error, info};

mod cli;

fn run(cli: &cli::Cli) -> itp2ffxml::Result<()> {
    let params = ItpParams::load(&cli.input_itp, cli.atomtypes_path())?;
    info!(
        "Loaded {} bonds, {} angles, {} dihedrals, and {} atom types",
        params.bonds.len(),
        params.angles.len(),
        params.dihedrals.len(),
        params.nonbonded.len()
    );

    let mut ff = ForceFieldXml::load(&cli.input_xml)?;
    ff.merge_all(&params);

    ff.save(&cli.output_xml, !cli.compact)?;
    info!("Wrote {}", cli.output_xml.display());

    Ok(())
}

fn main() -> ExitCode {
    let cli = cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli.log_level().as_str()),
    )
    .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}
