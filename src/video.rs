//! Assembly of downloaded frames into a video through ffmpeg's concat demuxer.
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

#[derive(Debug, Clone, PartialEq)]
pub struct VideoSettings {
    pub fps: u32,
    /// Extension of the frames to include, without the dot. Matched case-insensitively.
    pub image_extension: String,
    /// Name of the frame-list descriptor written inside the image directory.
    pub frame_list: String,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            fps: 30,
            image_extension: "jpg".to_string(),
            frame_list: "imagelist.txt".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderExit {
    pub success: bool,
    pub code: Option<i32>,
}

pub trait Encoder {
    /// Encode the frames described by `frame_list` into `output`, waiting for completion.
    fn encode(&self, frame_list: &Path, output: &Path) -> std::io::Result<EncoderExit>;
}

pub struct Ffmpeg {
    program: PathBuf,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
        }
    }
}

impl Ffmpeg {
    pub fn args(frame_list: &Path, output: &Path) -> Vec<String> {
        let mut args: Vec<String> = [
            "-y", "-f", "concat", "-safe", "0", "-i",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(frame_list.display().to_string());
        args.extend(
            ["-vsync", "vfr", "-pix_fmt", "yuv420p"]
                .iter()
                .map(|s| s.to_string()),
        );
        args.push(output.display().to_string());
        args
    }

    /// Whether the ffmpeg binary can be spawned at all.
    pub fn available(&self) -> bool {
        Command::new(&self.program)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }
}

impl Encoder for Ffmpeg {
    fn encode(&self, frame_list: &Path, output: &Path) -> std::io::Result<EncoderExit> {
        let status = Command::new(&self.program)
            .args(Self::args(frame_list, output))
            .status()?;
        Ok(EncoderExit {
            success: status.success(),
            code: status.code(),
        })
    }
}

#[derive(Debug, PartialEq)]
pub enum Assembly {
    NoImages,
    Encoded {
        frames: usize,
        frame_list: PathBuf,
        /// `None` when the encoder could not be started.
        exit: Option<EncoderExit>,
    },
}

/// Files in `dir` with the given extension, sorted by filename. Symlinks to files count.
pub fn collect_frames(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut frames = vec![];
    for entry in fs::read_dir(dir).with_context(|| format!("Unable to read {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if matches {
            frames.push(path);
        }
    }
    frames.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(frames)
}

/// Concat demuxer descriptor showing every frame for `1/fps` seconds.
pub fn frame_list(frames: &[PathBuf], fps: u32) -> String {
    let duration = 1.0 / fps as f64;
    let mut content = String::new();
    for frame in frames {
        let _ = writeln!(content, "file '{}'", frame.display());
        let _ = writeln!(content, "duration {:.2}", duration);
    }
    content
}

pub fn write_frame_list<P: AsRef<Path>>(path: P, frames: &[PathBuf], fps: u32) -> Result<()> {
    fs::write(&path, frame_list(frames, fps))
        .with_context(|| format!("Unable to write {}", path.as_ref().display()))?;
    Ok(())
}

/// Encode every matching image in `image_dir` into `output`.
///
/// The encoder's own failures are logged and never returned as errors.
pub fn make_video(
    encoder: &impl Encoder,
    image_dir: &Path,
    output: &Path,
    settings: &VideoSettings,
) -> Result<Assembly> {
    // The concat demuxer resolves relative entries against the list file's directory
    let image_dir = fs::canonicalize(image_dir)
        .with_context(|| format!("Unable to resolve {}", image_dir.display()))?;
    let frames = collect_frames(&image_dir, &settings.image_extension)?;
    if frames.is_empty() {
        println!("No images found.");
        return Ok(Assembly::NoImages);
    }

    let list_path = image_dir.join(&settings.frame_list);
    write_frame_list(&list_path, &frames, settings.fps)?;
    tracing::info!(
        "Encoding {} frames at {} fps from {}",
        frames.len(),
        settings.fps,
        list_path.display()
    );

    let exit = match encoder.encode(&list_path, output) {
        Ok(exit) => {
            if !exit.success {
                tracing::warn!("Encoder exited with status {:?}", exit.code);
            }
            Some(exit)
        }
        Err(e) => {
            tracing::warn!("Unable to start encoder: {e}");
            None
        }
    };

    println!("Video saved → {}", output.display());
    Ok(Assembly::Encoded {
        frames: frames.len(),
        frame_list: list_path,
        exit,
    })
}
