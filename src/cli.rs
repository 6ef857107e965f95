use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "tocsplit",
    version,
    about = "Infer a PDF's table of contents from its links and split it by section"
)]
pub struct Cli {
    #[arg(long, global = true, default_value_t = 60)]
    pub http_timeout_secs: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover and print the table of contents.
    Toc(TocArgs),
    /// Extract selected entries into separate PDFs plus a merged copy.
    Split(SplitArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TocArgs {
    #[arg(long)]
    pub input: String,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct SplitArgs {
    #[arg(long)]
    pub input: String,

    #[arg(long = "entry", required_unless_present = "all", conflicts_with = "all")]
    pub entries: Vec<usize>,

    #[arg(long, default_value_t = false)]
    pub all: bool,

    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    #[arg(long)]
    pub archive: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn split_accepts_repeated_entries() {
        let cli = Cli::try_parse_from([
            "tocsplit", "split", "--input", "a.pdf", "--entry", "3", "--entry", "1",
        ])
        .expect("args should parse");
        let Commands::Split(args) = cli.command else {
            panic!("expected split command");
        };
        assert_eq!(args.entries, vec![3, 1]);
        assert!(!args.all);
        assert_eq!(cli.http_timeout_secs, 60);
    }

    #[test]
    fn split_requires_entries_or_all() {
        assert!(Cli::try_parse_from(["tocsplit", "split", "--input", "a.pdf"]).is_err());
        assert!(
            Cli::try_parse_from(["tocsplit", "split", "--input", "a.pdf", "--all", "--entry", "2"])
                .is_err()
        );
    }

    #[test]
    fn timeout_is_global() {
        let cli = Cli::try_parse_from([
            "tocsplit", "toc", "--input", "https://example.com/a.pdf", "--http-timeout-secs", "5",
        ])
        .expect("args should parse");
        assert_eq!(cli.http_timeout_secs, 5);
        assert!(matches!(cli.command, Commands::Toc(ref args) if !args.json));
    }
}
