use std::path::Path;

use anyhow::{anyhow, bail, Context};
use colored::Colorize;
use optreg_persist::{read_document, write_document, Format, StoreDocument};
use tracing::debug;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Show(args) => cmd_show(args, cli.output_format),
        Command::Get(args) => cmd_get(args),
        Command::Set(args) => cmd_set(args),
        Command::Unset(args) => cmd_unset(args),
        Command::Convert(args) => cmd_convert(args),
    }
}

fn cmd_show(args: ShowArgs, output: OutputFormat) -> anyhow::Result<()> {
    let format = resolve_format(&args.file, args.format)?;
    let document = open(&args.file, format)?;
    print!("{}", render_document(&document, output)?);
    Ok(())
}

fn cmd_get(args: GetArgs) -> anyhow::Result<()> {
    let format = resolve_format(&args.file, args.format)?;
    let document = open(&args.file, format)?;
    match document.values.get(&args.key) {
        Some(value) => {
            println!("{value}");
            Ok(())
        }
        None => bail!(
            "no value for key '{}' in {}",
            args.key,
            args.file.display()
        ),
    }
}

fn cmd_set(args: SetArgs) -> anyhow::Result<()> {
    let format = resolve_format(&args.file, args.format)?;
    let mut document = open(&args.file, format)?;
    let previous = document.values.insert(args.key.clone(), args.value.clone());
    write_document(&document, &args.file, format)
        .with_context(|| format!("failed to write {}", args.file.display()))?;

    match previous {
        Some(previous) => println!(
            "{} {} = {} (was {})",
            "✓".green(),
            args.key.bold(),
            args.value,
            previous.dimmed()
        ),
        None => println!("{} {} = {}", "✓".green(), args.key.bold(), args.value),
    }
    Ok(())
}

fn cmd_unset(args: UnsetArgs) -> anyhow::Result<()> {
    let format = resolve_format(&args.file, args.format)?;
    let mut document = open(&args.file, format)?;
    if document.values.remove(&args.key).is_none() {
        bail!(
            "no value for key '{}' in {}",
            args.key,
            args.file.display()
        );
    }
    write_document(&document, &args.file, format)
        .with_context(|| format!("failed to write {}", args.file.display()))?;
    println!("{} removed {}", "✓".green(), args.key.bold());
    Ok(())
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let from = resolve_format(&args.input, args.from)?;
    let to = resolve_format(&args.output, args.to)?;
    let document = open(&args.input, from)?;
    write_document(&document, &args.output, to)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    debug!(input = %args.input.display(), output = %args.output.display(), "converted document");
    println!(
        "{} {} -> {} ({} values)",
        "✓".green().bold(),
        args.input.display(),
        args.output.display(),
        document.values.len()
    );
    Ok(())
}

fn open(path: &Path, format: Format) -> anyhow::Result<StoreDocument> {
    read_document(path, format).with_context(|| format!("failed to read {}", path.display()))
}

/// Explicit format first, then the file extension.
fn resolve_format(path: &Path, explicit: Option<FileFormat>) -> anyhow::Result<Format> {
    explicit
        .map(Format::from)
        .or_else(|| Format::from_path(path))
        .ok_or_else(|| {
            anyhow!(
                "cannot tell the format of {}; pass --format json|toml",
                path.display()
            )
        })
}

fn render_document(document: &StoreDocument, output: OutputFormat) -> anyhow::Result<String> {
    match output {
        OutputFormat::Json => Ok(format!("{}\n", serde_json::to_string_pretty(document)?)),
        OutputFormat::Text => {
            let mut out = format!("Definition: {}\n", document.definition.cyan());
            if document.values.is_empty() {
                out.push_str("  (no values)\n");
            }
            for (key, value) in &document.values {
                out.push_str(&format!("  {} = {}\n", key.bold(), value));
            }
            Ok(out)
        }
    }
}
