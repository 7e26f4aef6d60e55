use clap::Parser;
use std::path::PathBuf;

use crate::mhtml::{CollisionPolicy, DocumentPolicy, ExtractOptions, MissingLocationPolicy};

#[derive(Parser, Debug)]
#[command(name = "munpack")]
#[command(version)]
#[command(about = "Unpack an MHTML web-page archive into a folder of files", long_about = None)]
#[command(after_help = "Examples:\n  \
  munpack page.mht                 extract into ./<page name>/index.html\n  \
  munpack -d out page.mhtml        extract below out/\n  \
  munpack -v page.mht              list resources without extracting")]
pub struct Cli {
    /// MHTML archive path
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// List derived filenames (short format)
    #[arg(short = 'l')]
    pub list: bool,

    /// List verbosely with content types and source URIs
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Extract below DIR instead of the current directory
    #[arg(short = 'd', value_name = "DIR", default_value = ".")]
    pub extract_dir: PathBuf,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Write a timestamped snapshot of the parsed document
    #[arg(long)]
    pub debug_snapshot: bool,

    /// Directory for document snapshots
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub snapshot_dir: PathBuf,

    /// Rewrite every element referencing a resource, not just the first
    #[arg(long)]
    pub rewrite_all: bool,

    /// What to do when two resources derive the same filename
    #[arg(long, value_enum, default_value_t = CollisionPolicy::Overwrite)]
    pub on_collision: CollisionPolicy,

    /// What to do with a resource that has no Content-Location
    #[arg(long, value_enum, default_value_t = MissingLocationPolicy::Skip)]
    pub on_missing_location: MissingLocationPolicy,

    /// What to do when the archive holds more than one HTML part
    #[arg(long, value_enum, default_value_t = DocumentPolicy::Replace)]
    pub on_extra_document: DocumentPolicy,
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }

    /// Default log filter, overridden by `RUST_LOG`
    pub fn log_filter(&self) -> &'static str {
        match self.quiet {
            0 => "info",
            1 => "warn",
            _ => "error",
        }
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            collision: self.on_collision,
            missing_location: self.on_missing_location,
            extra_document: self.on_extra_document,
            rewrite_all: self.rewrite_all,
            snapshot_dir: self.debug_snapshot.then(|| self.snapshot_dir.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_exactly_one_archive() {
        assert!(Cli::try_parse_from(["munpack"]).is_err());
        assert!(Cli::try_parse_from(["munpack", "a.mht", "b.mht"]).is_err());
    }

    #[test]
    fn defaults_match_plain_extraction() {
        let cli = Cli::try_parse_from(["munpack", "page.mht"]).unwrap();
        assert_eq!(cli.extract_dir, PathBuf::from("."));
        assert_eq!(cli.log_filter(), "info");

        let options = cli.extract_options();
        assert_eq!(options.collision, CollisionPolicy::Overwrite);
        assert_eq!(options.missing_location, MissingLocationPolicy::Skip);
        assert_eq!(options.extra_document, DocumentPolicy::Replace);
        assert!(!options.rewrite_all);
        assert!(options.snapshot_dir.is_none());
    }

    #[test]
    fn policies_and_snapshot_flags() {
        let cli = Cli::try_parse_from([
            "munpack",
            "-qq",
            "--on-collision",
            "suffix",
            "--on-missing-location",
            "fail",
            "--debug-snapshot",
            "--snapshot-dir",
            "/tmp/snaps",
            "page.mht",
        ])
        .unwrap();
        assert!(cli.is_very_quiet());
        assert_eq!(cli.log_filter(), "error");

        let options = cli.extract_options();
        assert_eq!(options.collision, CollisionPolicy::Suffix);
        assert_eq!(options.missing_location, MissingLocationPolicy::Fail);
        assert_eq!(options.snapshot_dir, Some(PathBuf::from("/tmp/snaps")));
    }
}
