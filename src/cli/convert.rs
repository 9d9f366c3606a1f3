use std::path::PathBuf;

use clap::Parser;
use reqif::{Config, DeserializeOptions, ReqIfDeserializer, ReqIfSerializer, SerializeOptions};
use tracing::{info, instrument};

#[derive(Debug, Parser)]
#[command(about = "Read documents and write them back out")]
pub struct Convert {
    /// The .reqif or .reqifz file to read
    input: PathBuf,

    /// The .reqif or .reqifz file to write
    output: PathBuf,

    /// Write compact XML without indentation
    #[arg(long)]
    compact: bool,
}

impl Convert {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, mut config: Config) -> anyhow::Result<()> {
        if self.compact {
            config.set_indent(0);
        }

        let documents =
            ReqIfDeserializer::new().deserialize(&self.input, &DeserializeOptions::default())?;
        info!(documents = documents.len(), "read {}", self.input.display());

        ReqIfSerializer::new(config).serialize(
            &documents,
            &self.output,
            &SerializeOptions::default(),
        )?;

        println!(
            "Wrote {} document(s) to {}",
            documents.len(),
            self.output.display()
        );
        Ok(())
    }
}
