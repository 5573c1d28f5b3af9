use clap::Parser;
use miette::Result;
use loam_pack::cli::{self, Cli, Mode};
use loam_pack::config::PipelineConfig;
use loam_pack::output::Printer;

fn main() -> Result<()> {
    let cli = Cli::parse();
    loam_pack::logging::init(cli.options.verbose);

    let printer = if cli.options.no_color {
        Printer::plain()
    } else {
        Printer::new()
    };

    let Some(mode) = cli.mode() else {
        return Ok(());
    };

    match mode {
        Mode::Build(manifest) => cli::build::run(&manifest, &cli.options, &printer)?,
        Mode::SetupFileDir => {
            let config = PipelineConfig::load(cli.options.config_overrides())?;
            cli::setup::run(&config, &printer)?
        }
        Mode::CreateJsonExample => {
            let config = PipelineConfig::load(cli.options.config_overrides())?;
            cli::example::run(&config, cli.options.force, &printer)?
        }
        Mode::Completions(shell) => cli::completions::run(shell)?,
    }

    Ok(())
}
