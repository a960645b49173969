use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use vellum_dom::{extract_headings, Schema};

#[derive(Args, Debug)]
pub struct HeadingsArgs {
    /// Input HTML file
    pub input: PathBuf,
}

pub fn run(args: HeadingsArgs) -> Result<(), anyhow::Error> {
    let html = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let schema = Schema::editor_default();
    let headings = extract_headings(&schema, &html)
        .with_context(|| format!("parsing {}", args.input.display()))?;

    println!("{}", serde_json::to_string_pretty(&headings)?);
    Ok(())
}
