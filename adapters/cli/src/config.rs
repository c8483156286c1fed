//! Run settings resolved from defaults, an optional TOML file, and CLI flags.

use std::fs;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::Args;

const DEFAULT_WAVES: u32 = 3;
const DEFAULT_MAX_TICKS: u64 = 600_000;

/// Settings accepted from a `--config` TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    seed: Option<u64>,
    waves: Option<u32>,
    max_ticks: Option<u64>,
    render_every: Option<u64>,
}

/// Fully resolved settings for one simulation run.
///
/// Precedence: CLI flag, then config file, then built-in default. The seed
/// defaults to fresh entropy so repeated runs differ unless pinned.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RunConfig {
    pub(crate) seed: u64,
    pub(crate) waves: u32,
    pub(crate) max_ticks: u64,
    pub(crate) render_every: Option<u64>,
}

impl RunConfig {
    pub(crate) fn resolve(args: &Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                toml::from_str::<FileConfig>(&text)
                    .with_context(|| format!("failed to parse config file {}", path.display()))?
            }
            None => FileConfig::default(),
        };

        Ok(Self {
            seed: args
                .seed
                .or(file.seed)
                .unwrap_or_else(rand::random::<u64>),
            waves: args.waves.or(file.waves).unwrap_or(DEFAULT_WAVES),
            max_ticks: args.max_ticks.or(file.max_ticks).unwrap_or(DEFAULT_MAX_TICKS),
            render_every: args.render_every.or(file.render_every),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_file_rejects_unknown_keys() {
        let parsed = toml::from_str::<FileConfig>("unknown = 1");
        assert!(parsed.is_err());
    }

    #[test]
    fn config_file_accepts_partial_settings() {
        let parsed: FileConfig = toml::from_str("seed = 7\nwaves = 5").expect("valid config");
        assert_eq!(parsed.seed, Some(7));
        assert_eq!(parsed.waves, Some(5));
        assert_eq!(parsed.max_ticks, None);
    }
}
