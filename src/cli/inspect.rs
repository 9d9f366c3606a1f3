use std::path::PathBuf;

use clap::Parser;
use reqif::{
    DeserializeOptions, Identifiable, ReqIf, ReqIfDeserializer, Severity, ValidationIssue,
};
use tracing::instrument;

#[derive(Debug, Parser)]
#[command(about = "Summarize the documents in a ReqIF file")]
pub struct Inspect {
    /// The .reqif or .reqifz file to read
    path: PathBuf,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Check document structure before reading and report the findings
    #[arg(long)]
    validate: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Inspect {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self) -> anyhow::Result<()> {
        let mut options = DeserializeOptions::default();
        if self.validate {
            options = options.with_validation_callback(report_issue);
        }
        let documents = ReqIfDeserializer::new().deserialize(&self.path, &options)?;

        match self.output {
            OutputFormat::Table => {
                for document in &documents {
                    Self::output_table(document);
                }
            }
            OutputFormat::Json => Self::output_json(&documents)?,
        }
        Ok(())
    }

    fn output_table(document: &ReqIf) {
        let header = &document.header;
        let content = &document.content;

        println!(
            "# {}",
            header.title.as_deref().unwrap_or("(untitled document)")
        );
        println!("  Identifier:      {}", header.identifier);
        if let Some(tool) = &header.source_tool_id {
            println!("  Source tool:     {tool}");
        }
        if let Some(lang) = document.lang() {
            println!("  Language:        {lang}");
        }
        println!();
        println!("  Datatypes:       {}", content.datatypes.len());
        println!("  Spec types:      {}", content.spec_types.len());
        println!("  Spec objects:    {}", content.spec_objects.len());
        println!("  Spec relations:  {}", content.spec_relations.len());
        println!("  Specifications:  {}", content.specifications.len());
        println!("  Relation groups: {}", content.relation_groups.len());

        for specification in &content.specifications {
            println!();
            println!(
                "  {}",
                specification
                    .long_name()
                    .unwrap_or_else(|| specification.identifier())
            );
            for (depth, node) in specification.walk() {
                let object = node.object.as_ref().map_or("?", |object| object.identifier());
                println!("  {}- {object}", "  ".repeat(depth + 1));
            }
        }
        println!();
    }

    fn output_json(documents: &[ReqIf]) -> anyhow::Result<()> {
        use serde_json::json;

        let documents: Vec<_> = documents
            .iter()
            .map(|document| {
                let header = &document.header;
                let content = &document.content;
                let specifications: Vec<_> = content
                    .specifications
                    .iter()
                    .map(|specification| {
                        json!({
                            "identifier": specification.identifier(),
                            "long_name": specification.long_name(),
                            "nodes": specification.walk().count(),
                        })
                    })
                    .collect();
                json!({
                    "identifier": header.identifier,
                    "title": header.title,
                    "source_tool_id": header.source_tool_id,
                    "creation_time": header.creation_time.map(|time| time.to_rfc3339()),
                    "counts": {
                        "datatypes": content.datatypes.len(),
                        "spec_types": content.spec_types.len(),
                        "spec_objects": content.spec_objects.len(),
                        "spec_relations": content.spec_relations.len(),
                        "specifications": content.specifications.len(),
                        "relation_groups": content.relation_groups.len(),
                    },
                    "specifications": specifications,
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&documents)?);
        Ok(())
    }
}

fn report_issue(issue: &ValidationIssue) {
    let location = match (issue.line, issue.column) {
        (Some(line), Some(column)) => format!("{line}:{column}: "),
        (Some(line), None) => format!("{line}: "),
        _ => String::new(),
    };
    let severity = match issue.severity {
        Severity::Warning => "warning",
        Severity::Error => "error",
    };
    eprintln!("{severity}: {location}{}", issue.message);
}
