use crate::config;
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Ask for the base directory on `output` and read the answer from `input`.
pub fn prompt_base_dir(input: &mut impl BufRead, output: &mut impl Write) -> Result<PathBuf> {
    write!(output, "Enter base directory path: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let answer = line.trim();
    if answer.is_empty() {
        return Err(anyhow!("No base directory given"));
    }
    Ok(PathBuf::from(answer))
}

/// Directories and artifact paths derived from the base directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub base_dir: PathBuf,
    pub csv_dir: PathBuf,
    pub image_dir: PathBuf,
    pub video_dir: PathBuf,
    pub record_path: PathBuf,
    pub video_path: PathBuf,
}

impl Layout {
    pub fn new<P: AsRef<Path>>(base_dir: P, names: &config::Layout) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let csv_dir = base_dir.join(&names.csv_dir);
        let image_dir = base_dir.join(&names.image_dir);
        let video_dir = base_dir.join(&names.video_dir);
        Self {
            record_path: csv_dir.join(&names.record_file),
            video_path: video_dir.join(&names.video_file),
            base_dir,
            csv_dir,
            image_dir,
            video_dir,
        }
    }

    /// Build the layout and create every directory that does not exist yet.
    pub fn create<P: AsRef<Path>>(base_dir: P, names: &config::Layout) -> Result<Self> {
        let layout = Self::new(base_dir, names);
        for dir in [
            &layout.base_dir,
            &layout.csv_dir,
            &layout.image_dir,
            &layout.video_dir,
        ] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Unable to create directory {}", dir.display()))?;
        }
        tracing::debug!("Using base directory {}", layout.base_dir.display());
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimelapseConfig;
    use std::io::Cursor;

    #[test]
    fn test_prompt_trims_answer() {
        let mut input = Cursor::new("  /data/goes  \n");
        let mut output = Vec::<u8>::new();
        let dir = prompt_base_dir(&mut input, &mut output).unwrap();
        assert_eq!(dir, PathBuf::from("/data/goes"));
        assert_eq!(output, b"Enter base directory path: ");
    }

    #[test]
    fn test_prompt_rejects_empty_answer() {
        let mut input = Cursor::new("\n");
        assert!(prompt_base_dir(&mut input, &mut Vec::<u8>::new()).is_err());

        let mut input = Cursor::new("");
        assert!(prompt_base_dir(&mut input, &mut Vec::<u8>::new()).is_err());
    }

    #[test]
    fn test_create_directories() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("run");
        let config = TimelapseConfig::template();

        let layout = Layout::create(&base, &config.layout).unwrap();
        assert!(layout.csv_dir.is_dir());
        assert!(layout.image_dir.is_dir());
        assert!(layout.video_dir.is_dir());
        assert_eq!(layout.record_path, base.join("csv").join("goes19_filenames.csv"));
        assert_eq!(layout.video_path, base.join("video").join("goes19_timelapse.mp4"));

        // Existing directories are reused
        assert_eq!(Layout::create(&base, &config.layout).unwrap(), layout);
    }
}
