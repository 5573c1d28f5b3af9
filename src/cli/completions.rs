//! Shell completions generation.

use clap::CommandFactory;
use clap_complete::Shell;

pub fn run(shell: Shell) -> crate::error::Result<()> {
    let mut cmd = super::Cli::command();
    clap_complete::generate(shell, &mut cmd, "loam-pack", &mut std::io::stdout());
    Ok(())
}
