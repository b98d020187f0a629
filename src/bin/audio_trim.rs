// src/bin/audio_trim.rs

use std::path::PathBuf;

use clap::Parser;
use clipwav::{
    probe_info, AudioSource, DirectoryUploader, PipelineConfig, TrimPipeline, TrimRequest, Uploader,
};

/// Command-line tool for trimming audio files into WAV clips
#[derive(Parser, Debug)]
#[command(name = "audio-trim")]
#[command(about = "Trim audio files to a time range and store them as 16-bit WAV", long_about = None)]
struct Args {
    /// Input audio file (MP3, FLAC, WAV, OGG, etc.)
    #[arg(short, long)]
    input: PathBuf,

    /// Directory the WAV clip is stored in
    #[arg(short, long)]
    out_dir: PathBuf,

    /// Start time (seconds, or milliseconds above 1000); defaults to the beginning
    #[arg(short, long, allow_hyphen_values = true)]
    start: Option<f64>,

    /// End time (seconds, or milliseconds above 1000); defaults to the end
    #[arg(short, long, allow_hyphen_values = true)]
    end: Option<f64>,

    /// Name for the clip; the extension is always replaced with .wav
    #[arg(short, long)]
    name: Option<String>,

    /// JSON file overriding the pipeline settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show detailed information
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "clipwav=debug" } else { "clipwav=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    let source = AudioSource::from_path(&args.input)?;
    if !source.is_audio() {
        tracing::warn!(mime = source.mime_type(), "input does not look like an audio file");
    }

    let info = probe_info(&source)?;
    println!("Input File: {}", args.input.display());
    println!("   Duration: {:.2} seconds", info.duration_seconds);
    println!("   Sample Rate: {} Hz", info.sample_rate);
    println!("   Channels: {}", info.channels);
    println!("   Format: {}", info.format);

    let request = TrimRequest {
        start: args.start,
        end: args.end,
        target_name: args.name,
    };

    let start_time = std::time::Instant::now();
    let pipeline = TrimPipeline::new(config);
    let clip = pipeline.trim(&source, &request).await?;

    let window = clip.window();
    println!("\nTrim Range:");
    println!("   Start: {:.2}s", window.start_seconds());
    println!("   End: {:.2}s", window.end_seconds());
    println!("   Duration: {:.2}s", window.span_seconds());

    let uploader = DirectoryUploader::new(&args.out_dir);
    let receipt = uploader.create(clip).await?;

    println!(
        "\nDone! Saved {} ({} bytes) to {}",
        receipt.name,
        receipt.size,
        args.out_dir.display()
    );
    if args.verbose {
        println!("   Total time: {:.2}s", start_time.elapsed().as_secs_f64());
    }

    Ok(())
}
