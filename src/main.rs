use anyhow::Result;
use clap::Parser;
use std::io;
use std::path::PathBuf;

use goes_timelapse::config::TimelapseConfig;
use goes_timelapse::fetch::{fetch_images, ConsoleProgress};
use goes_timelapse::filenames::generate_and_record;
use goes_timelapse::http::CdnSource;
use goes_timelapse::layout::{prompt_base_dir, Layout};
use goes_timelapse::logging;
use goes_timelapse::video::{make_video, Ffmpeg};

/// Download GOES satellite imagery for a time range and stitch it into a time-lapse video.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Base directory for the csv, images and video subdirectories. Prompted for if omitted.
    #[arg(short, long)]
    base_dir: Option<PathBuf>,

    /// TOML run configuration. The built-in GOES-19 CONUS configuration is used if omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// First capture time-code (YYYYDDDHHMM), overriding the configuration
    #[arg(long)]
    start: Option<String>,

    /// Last capture time-code (YYYYDDDHHMM), overriding the configuration
    #[arg(long)]
    end: Option<String>,

    /// Write the built-in configuration to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;
    let args = Args::parse();

    if let Some(path) = args.write_config {
        TimelapseConfig::template().write(&path)?;
        println!("Configuration written → {}", path.display());
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => TimelapseConfig::read(path)?,
        None => TimelapseConfig::template(),
    };
    if let Some(start) = args.start {
        config.start_code = start;
    }
    if let Some(end) = args.end {
        config.end_code = end;
    }
    config.validate()?;

    let base_dir = match args.base_dir {
        Some(dir) => dir,
        None => prompt_base_dir(&mut io::stdin().lock(), &mut io::stdout())?,
    };
    let layout = Layout::create(&base_dir, &config.layout)?;

    let encoder = Ffmpeg::default();
    if !encoder.available() {
        tracing::warn!("'ffmpeg' binary not found, the video will not be encoded");
    }

    tracing::info!("{}: {} to {}", config.name, config.start_code, config.end_code);
    let filenames = generate_and_record(
        &config.start_code,
        &config.end_code,
        &config.suffix,
        &layout.record_path,
    )?;

    let source = CdnSource::new(&config.base_url, config.timeout())?;
    let mut progress = ConsoleProgress::new()?;
    fetch_images(&source, &filenames, &layout.image_dir, &mut progress).await?;
    progress.finish();

    make_video(
        &encoder,
        &layout.image_dir,
        &layout.video_path,
        &config.video_settings(),
    )?;

    Ok(())
}
