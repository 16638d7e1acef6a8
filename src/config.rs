// config.rs — viewer settings from defaults, an optional JSON file, env and CLI
//
// Precedence (low to high):
//   defaults -> --config <file> / PANORAMA_CONFIG -> PANORAMA_LANG -> CLI flags
//
// CLI:
//   --config <path>       JSON file with any subset of the fields below
//   --lang <code>         UI language (en, zh-Hans, ...)
//   --pan-speed <x,y>     radians per dragged pixel
//   --start-angle <rad>   initial yaw
//   --no-compass          hide the compass indicator
//   <path>                image to open on start

use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_LANG: &str = "en";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for {flag}: {value}")]
    Invalid { flag: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub lang: String,
    pub pan_speed: [f32; 2],
    pub start_angle: f32,
    pub image: Option<PathBuf>,
    pub show_compass: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            lang: DEFAULT_LANG.to_string(),
            pan_speed: [0.005, 0.005],
            start_angle: 0.0,
            image: None,
            show_compass: true,
        }
    }
}

impl ViewerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve from the process arguments and environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::resolve(
            std::env::args().skip(1),
            |key| std::env::var(key).ok(),
        )
    }

    /// `args` excludes the program name; `env` looks up an environment variable.
    pub fn resolve<I, F>(args: I, env: F) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let args: Vec<String> = args.into_iter().collect();

        let config_path = flag_value(&args, "--config")
            .map(PathBuf::from)
            .or_else(|| non_empty(env("PANORAMA_CONFIG")).map(PathBuf::from));

        let mut config = match config_path {
            Some(path) => {
                log::info!("reading config from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };

        if let Some(lang) = non_empty(env("PANORAMA_LANG")) {
            config.lang = lang;
        }

        let mut it = args.into_iter();
        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--config" => {
                    it.next();
                }
                "--lang" => {
                    if let Some(v) = it.next() {
                        config.lang = v;
                    }
                }
                "--pan-speed" => {
                    let v = it.next().unwrap_or_default();
                    config.pan_speed = parse_pair(&v).ok_or(ConfigError::Invalid {
                        flag: "--pan-speed",
                        value: v,
                    })?;
                }
                "--start-angle" => {
                    let v = it.next().unwrap_or_default();
                    config.start_angle = v.trim().parse().map_err(|_| ConfigError::Invalid {
                        flag: "--start-angle",
                        value: v.clone(),
                    })?;
                }
                "--no-compass" => config.show_compass = false,
                other if other.starts_with("--") => {
                    log::warn!("ignoring unknown flag {other}");
                }
                path => config.image = Some(PathBuf::from(path)),
            }
        }

        Ok(config)
    }
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

fn parse_pair(v: &str) -> Option<[f32; 2]> {
    let (x, y) = v.split_once(',')?;
    let x: f32 = x.trim().parse().ok()?;
    let y: f32 = y.trim().parse().ok()?;
    (x.is_finite() && y.is_finite()).then_some([x, y])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::resolve(Vec::new(), no_env).unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.pan_speed, [0.005, 0.005]);
        assert!(config.show_compass);
    }

    #[test]
    fn test_cli_flags() {
        let config = ViewerConfig::resolve(
            args(&[
                "--lang",
                "zh-Hans",
                "--pan-speed",
                "0.01, 0.002",
                "--start-angle",
                "1.5",
                "--no-compass",
                "pano.jpg",
            ]),
            no_env,
        )
        .unwrap();

        assert_eq!(config.lang, "zh-Hans");
        assert_eq!(config.pan_speed, [0.01, 0.002]);
        assert_eq!(config.start_angle, 1.5);
        assert!(!config.show_compass);
        assert_eq!(config.image, Some(PathBuf::from("pano.jpg")));
    }

    #[test]
    fn test_env_lang_loses_to_cli() {
        let env = |key: &str| (key == "PANORAMA_LANG").then(|| "ja".to_string());

        let config = ViewerConfig::resolve(Vec::new(), env).unwrap();
        assert_eq!(config.lang, "ja");

        let config = ViewerConfig::resolve(args(&["--lang", "fr"]), env).unwrap();
        assert_eq!(config.lang, "fr");
    }

    #[test]
    fn test_bad_values_rejected() {
        let err = ViewerConfig::resolve(args(&["--pan-speed", "fast"]), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { flag: "--pan-speed", .. }));

        let err = ViewerConfig::resolve(args(&["--start-angle", "north"]), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { flag: "--start-angle", .. }));
    }

    #[test]
    fn test_config_file_then_cli_override() {
        let path = std::env::temp_dir().join("panorama_view_config_test.json");
        std::fs::write(&path, r#"{ "start_angle": 0.25, "lang": "ko" }"#).unwrap();

        let config = ViewerConfig::resolve(
            args(&["--config", path.to_str().unwrap(), "--lang", "ru"]),
            no_env,
        )
        .unwrap();
        assert_eq!(config.start_angle, 0.25);
        assert_eq!(config.lang, "ru");
        assert_eq!(config.pan_speed, [0.005, 0.005]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_and_broken_config_files() {
        let err = ViewerConfig::resolve(args(&["--config", "/no/such/config.json"]), no_env)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let path = std::env::temp_dir().join("panorama_view_config_broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        let env = |key: &str| {
            (key == "PANORAMA_CONFIG").then(|| path.to_string_lossy().into_owned())
        };
        let err = ViewerConfig::resolve(Vec::new(), env).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        let _ = std::fs::remove_file(&path);
    }
}
