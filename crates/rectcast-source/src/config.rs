use std::env;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;

use crate::core::{DynFrameProvider, SourceError, SourceResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Mock,
    ImageDir,
}

impl FromStr for Backend {
    type Err = SourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mock" => Ok(Backend::Mock),
            "image-dir" | "imagedir" | "images" => Ok(Backend::ImageDir),
            other => Err(SourceError::configuration(format!(
                "unknown backend '{other}'"
            ))),
        }
    }
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Mock => "mock",
            Backend::ImageDir => "image-dir",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values picked up from `RECTCAST_*` environment variables, before any
/// defaults are applied. Kept separate from `Configuration` so callers that
/// layer configuration sources can tell "env says mock" apart from "nothing
/// said anything and mock is the default".
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub backend: Option<Backend>,
    pub input: Option<PathBuf>,
    pub fps: Option<f64>,
    pub channel_capacity: Option<NonZeroUsize>,
}

impl EnvOverrides {
    pub fn from_env() -> SourceResult<Self> {
        let mut overrides = EnvOverrides::default();
        if let Ok(backend) = env::var("RECTCAST_BACKEND") {
            overrides.backend = Some(Backend::from_str(&backend)?);
        }
        if let Ok(path) = env::var("RECTCAST_INPUT") {
            overrides.input = Some(PathBuf::from(path));
        }
        if let Ok(fps) = env::var("RECTCAST_FPS") {
            let parsed: f64 = fps.parse().map_err(|_| {
                SourceError::configuration(format!(
                    "failed to parse RECTCAST_FPS='{fps}' as a number"
                ))
            })?;
            if parsed <= 0.0 {
                return Err(SourceError::configuration(
                    "RECTCAST_FPS must be greater than zero",
                ));
            }
            overrides.fps = Some(parsed);
        }
        if let Ok(capacity) = env::var("RECTCAST_CHANNEL_CAPACITY") {
            let parsed: usize = capacity.parse().map_err(|_| {
                SourceError::configuration(format!(
                    "failed to parse RECTCAST_CHANNEL_CAPACITY='{capacity}' as a positive integer"
                ))
            })?;
            let Some(value) = NonZeroUsize::new(parsed) else {
                return Err(SourceError::configuration(
                    "RECTCAST_CHANNEL_CAPACITY must be greater than zero",
                ));
            };
            overrides.channel_capacity = Some(value);
        }
        Ok(overrides)
    }
}

#[derive(Debug, Clone)]
pub struct Configuration {
    pub backend: Backend,
    pub input: Option<PathBuf>,
    pub fps: Option<f64>,
    pub target_size: Option<(u32, u32)>,
    pub channel_capacity: Option<NonZeroUsize>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            backend: Backend::ImageDir,
            input: None,
            fps: None,
            target_size: None,
            channel_capacity: None,
        }
    }
}

impl Configuration {
    pub fn from_env() -> SourceResult<Self> {
        Ok(Configuration::default().apply(EnvOverrides::from_env()?))
    }

    pub fn apply(mut self, overrides: EnvOverrides) -> Self {
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
        if overrides.input.is_some() {
            self.input = overrides.input;
        }
        if overrides.fps.is_some() {
            self.fps = overrides.fps;
        }
        if overrides.channel_capacity.is_some() {
            self.channel_capacity = overrides.channel_capacity;
        }
        self
    }

    pub fn available_backends() -> Vec<Backend> {
        vec![Backend::ImageDir, Backend::Mock]
    }

    pub fn create_provider(&self) -> SourceResult<DynFrameProvider> {
        let channel_capacity = self.channel_capacity.map(NonZeroUsize::get);

        match self.backend {
            Backend::Mock => Ok(crate::backends::mock::boxed_mock()),
            Backend::ImageDir => {
                let path = self.input.clone().ok_or_else(|| {
                    SourceError::configuration(
                        "image-dir backend requires an input frame directory",
                    )
                })?;
                crate::backends::image_dir::boxed_image_dir(
                    path,
                    self.target_size,
                    self.fps,
                    channel_capacity,
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_round_trips_through_str() {
        for backend in Configuration::available_backends() {
            assert_eq!(Backend::from_str(backend.as_str()).unwrap(), backend);
        }
        assert!(Backend::from_str("gstreamer").is_err());
    }

    #[test]
    fn overrides_only_replace_what_they_carry() {
        let overrides = EnvOverrides {
            backend: Some(Backend::Mock),
            fps: Some(23.976),
            ..Default::default()
        };
        let config = Configuration::default().apply(overrides);
        assert_eq!(config.backend, Backend::Mock);
        assert_eq!(config.fps, Some(23.976));
        assert_eq!(config.input, None);
        assert_eq!(config.channel_capacity, None);
    }

    #[test]
    fn image_dir_without_input_is_a_configuration_error() {
        let config = Configuration {
            backend: Backend::ImageDir,
            ..Default::default()
        };
        assert!(matches!(
            config.create_provider(),
            Err(SourceError::Configuration { .. })
        ));
    }
}
