//! Layered configuration: explicit CLI flags beat `RECTCAST_*` environment
//! variables, which beat the TOML config file, which beats built-in defaults.

use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::cli::{CliArgs, CliSources};
use rectcast_source::{EnvOverrides, SegmenterKind, DEFAULT_LUMA_THRESHOLD};

pub const DEFAULT_OUTPUT: &str = "out.rcast";
pub const DEFAULT_DUMP_INTERVAL: u64 = 60;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value '{value}' for '{field}'")]
    InvalidValue { field: &'static str, value: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    backend: Option<String>,
    output: Option<String>,
    segmenter: Option<String>,
    threshold: Option<u8>,
    fps: Option<u16>,
    width: Option<u32>,
    height: Option<u32>,
    dump_dir: Option<String>,
    dump_interval: Option<u64>,
    channel_capacity: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct EffectiveSettings {
    pub backend: Option<String>,
    pub input: Option<PathBuf>,
    pub output: PathBuf,
    pub segmenter: SegmenterKind,
    pub threshold: u8,
    pub fps: Option<u16>,
    pub target_size: Option<(u32, u32)>,
    pub dump_dir: Option<PathBuf>,
    pub dump_interval: u64,
    pub report_json: Option<PathBuf>,
    pub channel_capacity: Option<usize>,
}

impl EffectiveSettings {
    pub fn resolve(
        args: &CliArgs,
        sources: &CliSources,
        env: &EnvOverrides,
    ) -> Result<Self, SettingsError> {
        let file = match args.config.as_deref() {
            Some(path) => load_file(path)?,
            None => FileConfig::default(),
        };

        let segmenter = if sources.segmenter_from_cli {
            args.segmenter.into()
        } else {
            match file.segmenter.as_deref() {
                Some(value) => {
                    SegmenterKind::from_str(value).map_err(|_| SettingsError::InvalidValue {
                        field: "segmenter",
                        value: value.to_string(),
                    })?
                }
                None => args.segmenter.into(),
            }
        };

        let threshold = if sources.threshold_from_cli {
            args.threshold
        } else {
            file.threshold.unwrap_or(DEFAULT_LUMA_THRESHOLD)
        };

        let env_fps = env
            .fps
            .map(|fps| fps.round().clamp(1.0, f64::from(u16::MAX)) as u16);
        let fps = if sources.fps_from_cli {
            args.fps
        } else {
            env_fps.or(file.fps)
        };

        let dump_interval = if sources.dump_interval_from_cli {
            args.dump_interval
        } else {
            file.dump_interval.unwrap_or(DEFAULT_DUMP_INTERVAL)
        };
        if dump_interval == 0 {
            return Err(SettingsError::InvalidValue {
                field: "dump_interval",
                value: "0".into(),
            });
        }

        let target_size = match (args.width, args.height) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => match (file.width, file.height) {
                (Some(w), Some(h)) => Some((w, h)),
                _ => None,
            },
        };

        Ok(Self {
            backend: args
                .backend
                .clone()
                .or_else(|| env.backend.map(|backend| backend.as_str().to_string()))
                .or(file.backend),
            input: args.input.clone().or_else(|| env.input.clone()),
            output: args
                .output
                .clone()
                .or(file.output.map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            segmenter,
            threshold,
            fps,
            target_size,
            dump_dir: args.dump_dir.clone().or(file.dump_dir.map(PathBuf::from)),
            dump_interval,
            report_json: args.report_json.clone(),
            channel_capacity: args
                .channel_capacity
                .or(env.channel_capacity.map(NonZeroUsize::get))
                .or(file.channel_capacity),
        })
    }
}

fn load_file(path: &Path) -> Result<FileConfig, SettingsError> {
    let contents = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
