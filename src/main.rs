use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use nucleotide_aligner::{Aligner, AlignerConfig, AlignmentMode};

#[derive(Parser)]
#[command(name = "nucleotide_aligner")]
#[command(about = "Affine-gap pairwise alignment of nucleotide sequences")]
#[command(version)]
struct Cli {
    /// First sequence (the one padded in frame mode)
    seq1: String,

    /// Second sequence (the frame in frame mode)
    seq2: String,

    /// Alignment mode: global or frame
    #[arg(short, long, default_value = "global")]
    mode: AlignmentMode,

    /// TOML file overriding the scoring scheme and limits
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the score in frame mode as well
    #[arg(long)]
    show_score: bool,

    /// Verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match &cli.config {
        Some(path) => AlignerConfig::from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AlignerConfig::default(),
    };
    let aligner = Aligner::from_config(&config)?;
    log::info!("aligning in {} mode", cli.mode);

    match cli.mode {
        AlignmentMode::Global => {
            let alignment = aligner
                .align(cli.seq1.as_bytes(), cli.seq2.as_bytes())
                .context("global alignment failed")?;
            println!("{}", alignment);
            println!("cigar: {}", alignment.cigar());
        }
        AlignmentMode::FrameFit => {
            let frame = aligner
                .align_to_frame(cli.seq1.as_bytes(), cli.seq2.as_bytes())
                .context("frame alignment failed")?;
            println!("{}", frame);
            if cli.show_score {
                println!("score: {}", frame.score);
            }
        }
    }

    Ok(())
}
