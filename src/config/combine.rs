use crate::combine::{CleanParams, CombineParams, MatchParams, RefitParams, SplitParams};
use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Runtime configuration of the `combine_demo` tool.
#[derive(Debug, Deserialize)]
pub struct CombineToolConfig {
    /// Event file (see [`crate::io::EventFile`]).
    #[serde(rename = "input")]
    pub input: PathBuf,
    #[serde(default)]
    pub mode: ModeConfig,
    #[serde(default)]
    pub matching: Option<MatchParams>,
    #[serde(default)]
    pub refit: Option<RefitParams>,
    #[serde(default)]
    pub split: Option<SplitParams>,
    #[serde(default)]
    pub clean: Option<CleanParams>,
    #[serde(default)]
    pub output: CombineOutputConfig,
}

/// Optional overrides of the combiner switches; unset fields keep the
/// defaults of [`CombineParams`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    pub use_cosmics: Option<bool>,
    pub split_patterns: Option<bool>,
    pub best_phi_match: Option<bool>,
    pub use_tight_association: Option<bool>,
    pub max_size_phi_pattern_loose: Option<usize>,
    pub max_size_eta_pattern_loose: Option<usize>,
    pub flip_direction_for_cosmics: Option<bool>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Both,
}

impl OutputFormat {
    pub fn includes_text(self) -> bool {
        matches!(self, OutputFormat::Text | OutputFormat::Both)
    }

    pub fn includes_json(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CombineOutputConfig {
    pub format: OutputFormat,
    pub json_out: Option<PathBuf>,
}

impl CombineToolConfig {
    /// Applies the overrides onto the default parameters.
    pub fn resolve(&self) -> CombineParams {
        let mut params = if self.mode.use_cosmics.unwrap_or(false) {
            CombineParams::cosmics()
        } else {
            CombineParams::default()
        };
        let mode = &self.mode;
        if let Some(v) = mode.use_cosmics {
            params.use_cosmics = v;
        }
        if let Some(v) = mode.split_patterns {
            params.split_patterns = v;
        }
        if let Some(v) = mode.best_phi_match {
            params.best_phi_match = v;
        }
        if let Some(v) = mode.use_tight_association {
            params.use_tight_association = v;
        }
        if let Some(v) = mode.max_size_phi_pattern_loose {
            params.max_size_phi_pattern_loose = v;
        }
        if let Some(v) = mode.max_size_eta_pattern_loose {
            params.max_size_eta_pattern_loose = v;
        }
        if let Some(v) = mode.flip_direction_for_cosmics {
            params.flip_direction_for_cosmics = v;
        }
        if let Some(m) = &self.matching {
            params.matching = m.clone();
        }
        if let Some(r) = &self.refit {
            params.refit = r.clone();
        }
        if let Some(s) = &self.split {
            params.split = s.clone();
        }
        if let Some(c) = &self.clean {
            params.clean = c.clone();
        }
        params
    }
}

pub fn load_config(path: &Path) -> Result<CombineToolConfig, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosmic_override_enables_splitting_defaults() {
        let json = r#"{
            "input": "event.json",
            "mode": { "use_cosmics": true, "flip_direction_for_cosmics": true },
            "clean": { "max_rz_distance": 900.0 }
        }"#;
        let config: CombineToolConfig = serde_json::from_str(json).expect("config");
        let params = config.resolve();
        assert!(params.use_cosmics);
        assert!(params.split_patterns);
        assert!(params.flip_direction_for_cosmics);
        assert_eq!(params.clean.max_rz_distance, 900.0);
        assert_eq!(params.clean.max_xy_distance, 3500.0);
        assert_eq!(config.output.format, OutputFormat::Text);
    }

    #[test]
    fn explicit_switch_beats_cosmic_preset() {
        let json = r#"{
            "input": "event.json",
            "mode": { "use_cosmics": true, "split_patterns": false },
            "output": { "format": "both", "json_out": "out/report.json" }
        }"#;
        let config: CombineToolConfig = serde_json::from_str(json).expect("config");
        let params = config.resolve();
        assert!(!params.split_patterns);
        assert!(config.output.format.includes_json());
        assert!(config.output.format.includes_text());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_config(Path::new("/nonexistent/combine.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
