use crate::core::profile::SourceKind;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "storefront-etl")]
#[command(about = "Normalizes Steam, Epic Games Store and IGDB exports into CSV")]
pub struct CliConfig {
    /// Which storefront export to clean
    #[arg(value_enum)]
    pub source: SourceKind,

    /// Input file (defaults to the source's standard export name)
    #[arg(short, long)]
    pub input: Option<String>,

    /// Output CSV file (defaults to the source's standard output name)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Optional TOML file overriding paths, year window, tag labels and rates
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Show the resolved configuration without reading or writing any file
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_and_overrides() {
        let cli = CliConfig::try_parse_from([
            "storefront-etl",
            "epic-full",
            "-i",
            "dump.json",
            "--output",
            "clean.csv",
            "--dry-run",
        ])
        .unwrap();
        assert_eq!(cli.source, SourceKind::EpicFull);
        assert_eq!(cli.input.as_deref(), Some("dump.json"));
        assert_eq!(cli.output.as_deref(), Some("clean.csv"));
        assert!(cli.dry_run);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_unknown_source_is_rejected() {
        assert!(CliConfig::try_parse_from(["storefront-etl", "gog"]).is_err());
        assert!(CliConfig::try_parse_from(["storefront-etl"]).is_err());
    }
}
