use crate::error::FetchError;
use crate::http::{Body, ImageSource, Retrieval};
use anyhow::{Context, Result};
use futures_util::TryStreamExt;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use reqwest::StatusCode;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// Buffer size used when writing a response body to disk.
pub const CHUNK_SIZE: usize = 8192;

#[derive(Debug)]
pub enum FetchOutcome {
    Retrieved { bytes: u64 },
    Missing { status: StatusCode },
    Error(FetchError),
}

impl FetchOutcome {
    /// Short label shown on the progress line.
    pub fn label(&self) -> String {
        match self {
            FetchOutcome::Retrieved { .. } => "OK".to_string(),
            FetchOutcome::Missing { .. } => "Missing".to_string(),
            FetchOutcome::Error(e) => format!("Err:{e}"),
        }
    }
}

#[derive(Debug)]
pub struct FetchResult {
    pub filename: String,
    pub outcome: FetchOutcome,
}

#[derive(Debug, Default)]
pub struct FetchReport {
    pub results: Vec<FetchResult>,
}

impl FetchReport {
    pub fn retrieved(&self) -> usize {
        self.count(|o| matches!(o, FetchOutcome::Retrieved { .. }))
    }

    pub fn missing(&self) -> usize {
        self.count(|o| matches!(o, FetchOutcome::Missing { .. }))
    }

    pub fn errors(&self) -> usize {
        self.count(|o| matches!(o, FetchOutcome::Error(_)))
    }

    fn count(&self, f: impl Fn(&FetchOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| f(&r.outcome)).count()
    }
}

/// Running mean of the time taken per download.
#[derive(Debug, Default, Clone, Copy)]
pub struct RollingAverage {
    total: Duration,
    count: u32,
}

impl RollingAverage {
    /// Add a sample and return the updated mean.
    pub fn record(&mut self, elapsed: Duration) -> Duration {
        self.total += elapsed;
        self.count += 1;
        self.mean()
    }

    pub fn mean(&self) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }
        self.total / self.count
    }

    /// Estimated time for `remaining` more downloads at the current mean.
    pub fn eta(&self, remaining: usize) -> Duration {
        self.mean().mul_f64(remaining as f64)
    }
}

/// Emitted once per attempted filename, in order.
#[derive(Debug)]
pub struct FetchProgress<'a> {
    /// 1-based position in the filename list.
    pub index: usize,
    pub total: usize,
    pub filename: &'a str,
    pub outcome: &'a FetchOutcome,
    pub eta: Duration,
}

pub trait FetchObserver {
    fn on_progress(&mut self, progress: &FetchProgress<'_>);
}

impl<F> FetchObserver for F
where
    F: FnMut(&FetchProgress<'_>),
{
    fn on_progress(&mut self, progress: &FetchProgress<'_>) {
        self(progress)
    }
}

/// Renders progress on a single overwritten stdout line.
pub struct ConsoleProgress {
    style: ProgressStyle,
    pb: Option<ProgressBar>,
}

impl ConsoleProgress {
    pub fn new() -> Result<Self> {
        let style = ProgressStyle::with_template("[{pos}/{len}] {msg}")?;
        Ok(Self { style, pb: None })
    }

    pub fn finish(&self) {
        if let Some(pb) = &self.pb {
            pb.finish();
        }
        println!("\nDownload complete.");
    }
}

impl FetchObserver for ConsoleProgress {
    fn on_progress(&mut self, progress: &FetchProgress<'_>) {
        let pb = self.pb.get_or_insert_with(|| {
            ProgressBar::with_draw_target(
                Some(progress.total as u64),
                ProgressDrawTarget::stdout(),
            )
            .with_style(self.style.clone())
        });
        pb.set_position(progress.index as u64);
        pb.set_message(progress_message(progress.outcome, progress.eta));
    }
}

/// Text after the `[i/total]` counter: outcome label and time remaining.
pub fn progress_message(outcome: &FetchOutcome, eta: Duration) -> String {
    format!("{} | ETA {}", outcome.label(), format_eta(eta))
}

/// `MM:SS`, truncated to whole seconds.
pub fn format_eta(eta: Duration) -> String {
    let secs = eta.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Download every filename in order into `save_dir`.
///
/// Individual failures are recorded in the report and never abort the run. Only failing to
/// create `save_dir` is an error.
pub async fn fetch_images(
    source: &impl ImageSource,
    filenames: &[String],
    save_dir: &Path,
    observer: &mut impl FetchObserver,
) -> Result<FetchReport> {
    fs::create_dir_all(save_dir)
        .with_context(|| format!("Unable to create image directory {}", save_dir.display()))?;

    let total = filenames.len();
    let mut average = RollingAverage::default();
    let mut report = FetchReport::default();

    for (i, filename) in filenames.iter().enumerate() {
        let started = Instant::now();
        let outcome = match try_fetch(source, filename, save_dir).await {
            Ok(outcome) => outcome,
            Err(e) => FetchOutcome::Error(e),
        };
        average.record(started.elapsed());
        tracing::debug!("{filename}: {}", outcome.label());

        observer.on_progress(&FetchProgress {
            index: i + 1,
            total,
            filename,
            outcome: &outcome,
            eta: average.eta(total - (i + 1)),
        });
        report.results.push(FetchResult {
            filename: filename.clone(),
            outcome,
        });
    }

    tracing::info!(
        "Fetched {} of {} images ({} missing, {} errors)",
        report.retrieved(),
        total,
        report.missing(),
        report.errors()
    );
    Ok(report)
}

async fn try_fetch(
    source: &impl ImageSource,
    filename: &str,
    save_dir: &Path,
) -> Result<FetchOutcome, FetchError> {
    let body = match source.open(filename).await? {
        Retrieval::Found(body) => body,
        Retrieval::Missing(status) => return Ok(FetchOutcome::Missing { status }),
    };

    let dst = save_dir.join(filename);
    let partial = save_dir.join(format!("{filename}.partial"));

    let written = write_body(body, &partial)
        .await
        .and_then(|bytes| {
            fs::rename(&partial, &dst)
                .map(|_| bytes)
                .map_err(FetchError::from)
        });
    match written {
        Ok(bytes) => Ok(FetchOutcome::Retrieved { bytes }),
        Err(e) => {
            let _ = fs::remove_file(&partial);
            Err(e)
        }
    }
}

async fn write_body(mut body: Body, path: &Path) -> Result<u64, FetchError> {
    let mut out = BufWriter::with_capacity(CHUNK_SIZE, File::create(path)?);
    let mut byte_count = 0_u64;
    while let Some(bytes) = body.try_next().await? {
        out.write_all(&bytes)?;
        byte_count += bytes.len() as u64;
    }
    out.flush()?;
    Ok(byte_count)
}
