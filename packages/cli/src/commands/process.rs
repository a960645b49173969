use anyhow::Context;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use vellum_dom::{process_content_for_display, Schema};

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Input HTML file
    pub input: PathBuf,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Rewrite the input file in place
    #[arg(long, conflicts_with = "output")]
    pub in_place: bool,
}

pub fn run(args: ProcessArgs) -> Result<(), anyhow::Error> {
    let html = std::fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let schema = Schema::editor_default();
    let processed = process_content_for_display(&schema, &html)
        .with_context(|| format!("processing {}", args.input.display()))?;

    if args.in_place {
        std::fs::write(&args.input, &processed)
            .with_context(|| format!("writing {}", args.input.display()))?;
        eprintln!(
            "{} {}",
            "Processed".green().bold(),
            args.input.display()
        );
    } else if let Some(output) = &args.output {
        std::fs::write(output, &processed)
            .with_context(|| format!("writing {}", output.display()))?;
        eprintln!("{} {}", "Wrote".green().bold(), output.display());
    } else {
        println!("{processed}");
    }

    Ok(())
}
