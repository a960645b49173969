use anyhow::{bail, Context};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use vellum_dom::{parse_document, serialize_document, Schema};

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Input HTML file
    pub input: PathBuf,
}

pub fn run(args: CheckArgs) -> Result<(), anyhow::Error> {
    let html = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let schema = Schema::editor_default();

    let doc = match parse_document(&schema, &html) {
        Ok(doc) => doc,
        Err(error) => {
            eprintln!("{} {error}", "✗".red().bold());
            bail!("content is not parseable");
        }
    };

    if let Err(error) = schema.validate_node(&doc) {
        eprintln!("{} {error}", "✗".red().bold());
        bail!("content violates its content model");
    }

    let serialized = serialize_document(&schema, &doc);
    let reparsed = parse_document(&schema, &serialized)
        .context("serialized output failed to parse back")?;
    if reparsed != doc {
        eprintln!(
            "{} canonical serialization is not stable for this document",
            "✗".red().bold()
        );
        bail!("round-trip mismatch");
    }

    println!(
        "{} {} ({} top-level blocks)",
        "✓".green().bold(),
        args.input.display(),
        doc.content.len()
    );
    Ok(())
}
