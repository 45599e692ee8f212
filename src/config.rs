//! Line-oriented `RenderConfig` file: one `key value...` pair per line,
//! blank lines and `#`-comments ignored.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::Int;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightDistributionKind {
    Uniform,
    Power,
    Spatial,
}

impl Default for LightDistributionKind {
    fn default() -> Self {
        LightDistributionKind::Spatial
    }
}

impl FromStr for LightDistributionKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "uniform" => Ok(LightDistributionKind::Uniform),
            "power" => Ok(LightDistributionKind::Power),
            "spatial" => Ok(LightDistributionKind::Spatial),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub resolution: (Int, Int),
    pub samples_per_pixel: u32,
    pub max_depth: u16,
    pub output: String,
    pub tile_size: Int,
    pub light_distribution: LightDistributionKind,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            resolution: (640, 480),
            samples_per_pixel: 16,
            max_depth: 5,
            output: "render.exr".to_string(),
            tile_size: 16,
            light_distribution: LightDistributionKind::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    UnknownKey(String),
    MissingValue(String),
    InvalidValue { key: String, value: String },
    Io(std::io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::UnknownKey(key) => write!(f, "unknown config key `{}`", key),
            ConfigError::MissingValue(key) => write!(f, "missing value for `{}`", key),
            ConfigError::InvalidValue { key, value } => {
                write!(f, "invalid value `{}` for `{}`", value, key)
            }
            ConfigError::Io(e) => write!(f, "could not read config file: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl RenderConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut config = RenderConfig::default();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut tokens = line.split_whitespace();
            let key = tokens.next().expect("non-empty line has a first token");
            let rest: Vec<&str> = tokens.collect();

            match key {
                "resolution" => {
                    let w = parse_value(key, rest.get(0))?;
                    let h = parse_value(key, rest.get(1))?;
                    if w <= 0 || h <= 0 {
                        return Err(ConfigError::InvalidValue {
                            key: key.to_string(),
                            value: format!("{} {}", w, h),
                        });
                    }
                    config.resolution = (w, h);
                }
                "samples" => {
                    let n: i64 = parse_value(key, rest.get(0))?;
                    if n <= 0 {
                        return Err(ConfigError::InvalidValue {
                            key: key.to_string(),
                            value: n.to_string(),
                        });
                    }
                    config.samples_per_pixel = n as u32;
                }
                "bounces" => {
                    let n: i64 = parse_value(key, rest.get(0))?;
                    if n < 0 {
                        return Err(ConfigError::InvalidValue {
                            key: key.to_string(),
                            value: n.to_string(),
                        });
                    }
                    config.max_depth = n as u16;
                }
                "output" => {
                    let path = rest.get(0).ok_or_else(|| ConfigError::MissingValue("output".to_string()))?;
                    config.output = path.to_string();
                }
                "tile_size" => {
                    let n: Int = parse_value(key, rest.get(0))?;
                    if n <= 0 {
                        return Err(ConfigError::InvalidValue {
                            key: key.to_string(),
                            value: n.to_string(),
                        });
                    }
                    config.tile_size = n;
                }
                "light_distribution" => {
                    let value = rest.get(0).ok_or_else(|| ConfigError::MissingValue("light_distribution".to_string()))?;
                    config.light_distribution = value.parse().map_err(|_| ConfigError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    })?;
                }
                _ => return Err(ConfigError::UnknownKey(key.to_string())),
            }
        }

        Ok(config)
    }
}

fn parse_value<T: FromStr>(key: &str, token: Option<&&str>) -> Result<T, ConfigError> {
    let token = token.ok_or_else(|| ConfigError::MissingValue(key.to_string()))?;
    token.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_recognized_keys() {
        let text = "\
            # a comment\n\
            resolution 320 240\n\
            samples 64\n\
            bounces 8\n\
            output out\n\
            tile_size 32\n\
            light_distribution power\n";
        let config = RenderConfig::parse(text).unwrap();
        assert_eq!(config.resolution, (320, 240));
        assert_eq!(config.samples_per_pixel, 64);
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.output, "out");
        assert_eq!(config.tile_size, 32);
        assert_eq!(config.light_distribution, LightDistributionKind::Power);
    }

    #[test]
    fn blank_lines_and_comments_are_ignored() {
        let config = RenderConfig::parse("\n# nothing here\n\nsamples 4\n").unwrap();
        assert_eq!(config.samples_per_pixel, 4);
    }

    #[test]
    fn defaults_when_empty() {
        let config = RenderConfig::parse("").unwrap();
        assert_eq!(config.resolution, (640, 480));
        assert_eq!(config.light_distribution, LightDistributionKind::Spatial);
    }

    #[test]
    fn unknown_key_is_an_error() {
        match RenderConfig::parse("bogus 1") {
            Err(ConfigError::UnknownKey(k)) => assert_eq!(k, "bogus"),
            other => panic!("expected UnknownKey, got {:?}", other),
        }
    }

    #[test]
    fn non_positive_samples_is_invalid() {
        match RenderConfig::parse("samples 0") {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, "samples"),
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn missing_value_is_an_error() {
        match RenderConfig::parse("samples") {
            Err(ConfigError::MissingValue(key)) => assert_eq!(key, "samples"),
            other => panic!("expected MissingValue, got {:?}", other),
        }
    }
}
