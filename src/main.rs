//! Main entry point for the munpack CLI application.
//!
//! This binary unpacks an MHTML archive into a folder holding the rewritten
//! page as `index.html` next to its extracted resources.

use anyhow::{Context, Result};
use clap::Parser;

use munpack::{Cli, LocalFileReader, MhtmlExtractor};

/// Application entry point.
///
/// Parses command-line arguments, sets up logging and either lists or
/// extracts the archive. A wrong argument count is reported by clap, which
/// prints the usage and exits with a failure status.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    log::info!("Extract multi-part of {:?} ...", cli.file);
    let reader = LocalFileReader::new(&cli.file)?;
    log::debug!("{} is {}", cli.file.display(), format_size(reader.size()));
    let extractor = MhtmlExtractor::open(&reader, cli.extract_options())
        .await
        .with_context(|| format!("failed to unpack {}", cli.file.display()))?;

    // List mode: display derived filenames and exit
    if cli.list || cli.verbose {
        list_files(&extractor, cli.verbose);
        return Ok(());
    }

    let report = extractor.save(&cli.extract_dir).await?;

    if !cli.is_quiet() {
        for file in &report.files {
            println!("  extracting: {}", file);
        }
        println!(
            "{} ({} files, {} links rewritten, {} warnings)",
            report.folder.display(),
            report.files.len() + 1,
            report.rewritten,
            report.warnings.len()
        );
    } else if !cli.is_very_quiet() {
        println!("{}", report.folder.display());
    }

    Ok(())
}

/// List resources of the archive.
///
/// Supports two output formats:
/// - Simple format (`-l`): derived file names, one per line
/// - Verbose format (`-v`): table with size, content type and source URI
fn list_files(extractor: &MhtmlExtractor, verbose: bool) {
    if verbose {
        println!("{:>10}  {:<24}  {:<28}  URI", "Length", "Type", "Name");
        println!("{}", "-".repeat(90));
    }

    let mut total = 0u64;
    for entry in extractor.resources() {
        if verbose {
            println!(
                "{:>10}  {:<24}  {:<28}  {}",
                entry.payload.len(),
                entry.content_type.to_string(),
                entry.filename,
                entry.original_uri
            );
            total += entry.payload.len() as u64;
        } else {
            println!("{}", entry.filename);
        }
    }

    if verbose {
        println!("{}", "-".repeat(90));
        let folder = extractor
            .document()
            .map(|d| d.folder_name().to_string())
            .unwrap_or_else(|| "<no document>".to_string());
        println!(
            "{:>10}  {:<24}  {} files into {}",
            format_size(total),
            "",
            extractor.resources().len(),
            folder
        );
    }
}

/// Archive and payload sizes in binary units, two decimals above 1 KB.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_use_binary_units() {
        assert_eq!(format_size(500), "500 bytes");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
    }
}
