use crate::time_code::TimeCode;
use crate::video::VideoSettings;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct TimelapseConfig {
    pub name: String,
    pub start_code: String,
    pub end_code: String,
    pub suffix: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub video: Video,
    pub layout: Layout,
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Video {
    pub fps: u32,
    pub image_extension: String,
    pub frame_list: String,
}

/// Names of the directories and files created under the base directory.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Layout {
    pub csv_dir: String,
    pub image_dir: String,
    pub video_dir: String,
    pub record_file: String,
    pub video_file: String,
}

/// GOES-19 ABI CONUS GeoColor imagery, 1250x750.
pub fn goes19_conus_toml() -> toml::Table {
    toml::toml! {
        name = "GOES-19 ABI CONUS GeoColor"

        // Time-codes are YYYYDDDHHMM, as listed at the CDN index
        start_code = "20252991716"
        end_code = "20253021046"

        suffix = "_GOES19-ABI-CONUS-GEOCOLOR-1250x750.jpg"

        base_url = "https://cdn.star.nesdis.noaa.gov/GOES19/ABI/CONUS/GEOCOLOR/"

        timeout_secs = 20

        [video]
        fps = 30
        image_extension = "jpg"
        frame_list = "imagelist.txt"

        [layout]
        csv_dir = "csv"
        image_dir = "images"
        video_dir = "video"
        record_file = "goes19_filenames.csv"
        video_file = "goes19_timelapse.mp4"
    }
}

impl TimelapseConfig {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn write<P: AsRef<Path>>(self: &Self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn from_template(table: &toml::Table) -> Result<Self> {
        let config: Self = toml::from_str(&table.to_string())?;
        Ok(config)
    }

    pub fn template() -> Self {
        Self::from_template(&goes19_conus_toml()).expect("Built-in template should always parse")
    }

    /// Check everything that would otherwise only fail part way through a run.
    pub fn validate(self: &Self) -> Result<()> {
        TimeCode::parse(&self.start_code)?;
        TimeCode::parse(&self.end_code)?;
        Url::parse(&self.base_url)
            .map_err(|e| anyhow!("Invalid base_url '{}': {}", self.base_url, e))?;
        if self.video.fps == 0 {
            return Err(anyhow!("video.fps must be greater than zero"));
        }
        Ok(())
    }

    pub fn timeout(self: &Self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn video_settings(self: &Self) -> VideoSettings {
        VideoSettings {
            fps: self.video.fps,
            image_extension: self.video.image_extension.clone(),
            frame_list: self.video.frame_list.clone(),
        }
    }
}
