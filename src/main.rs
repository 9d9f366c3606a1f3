//! The `reqif` command line tool: inspect and convert ReqIF documents.

use clap::Parser;

mod cli;

fn main() -> anyhow::Result<()> {
    cli::Cli::parse().run()
}
