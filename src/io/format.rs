//! Output format selection.

use serde::{Deserialize, Serialize};

/// How command results are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text (default)
    #[default]
    Text,
    /// Pretty-printed JSON for scripts and tooling
    Json,
}

impl OutputFormat {
    /// `--json` flag wins; otherwise fall back to the configured format.
    pub fn from_json_flag_or(json: bool, configured: OutputFormat) -> Self {
        if json { OutputFormat::Json } else { configured }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_flag_overrides_config() {
        assert_eq!(
            OutputFormat::from_json_flag_or(true, OutputFormat::Text),
            OutputFormat::Json
        );
        assert_eq!(
            OutputFormat::from_json_flag_or(false, OutputFormat::Json),
            OutputFormat::Json
        );
        assert_eq!(
            OutputFormat::from_json_flag_or(false, OutputFormat::Text),
            OutputFormat::Text
        );
    }
}
