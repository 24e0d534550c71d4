//! Styling and timing configuration
//!
//! Every field is optional in serialized form; missing fields fall back to the
//! defaults below. Field names are camelCase so the same object can be handed
//! over from JavaScript unchanged.

use crate::error::HighlightError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Visual style of a highlight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightStyle {
    /// Fill color for canvas and overlay highlights (default: translucent amber)
    #[serde(default = "default_fill_color")]
    pub fill_color: String,
    /// Border color (default: amber, more opaque than the fill)
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,
    /// Border width in surface units (default: 2)
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    /// Fade-in duration for overlay markers; 0 disables the animation
    #[serde(default)]
    pub animation_duration_ms: u64,
    /// Class applied to the inline element that wraps highlighted text
    #[serde(default = "default_mark_class")]
    pub mark_class: String,
}

fn default_fill_color() -> String {
    "rgba(255, 193, 7, 0.3)".to_string()
}

fn default_stroke_color() -> String {
    "rgba(255, 193, 7, 0.8)".to_string()
}

fn default_stroke_width() -> f64 {
    2.0
}

fn default_mark_class() -> String {
    "source-highlight".to_string()
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            fill_color: default_fill_color(),
            stroke_color: default_stroke_color(),
            stroke_width: default_stroke_width(),
            animation_duration_ms: 0,
            mark_class: default_mark_class(),
        }
    }
}

impl HighlightStyle {
    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    pub fn validate(&self) -> Result<(), HighlightError> {
        if !self.stroke_width.is_finite() || self.stroke_width < 0.0 {
            return Err(HighlightError::InvalidConfig(format!(
                "strokeWidth must be a non-negative number, got {}",
                self.stroke_width
            )));
        }
        if self.fill_color.trim().is_empty() || self.stroke_color.trim().is_empty() {
            return Err(HighlightError::InvalidConfig(
                "fillColor and strokeColor must not be empty".to_string(),
            ));
        }
        if self.mark_class.trim().is_empty() || self.mark_class.contains(char::is_whitespace) {
            return Err(HighlightError::InvalidConfig(format!(
                "markClass must be a single class name, got {:?}",
                self.mark_class
            )));
        }
        Ok(())
    }
}

/// Engine-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default)]
    pub style: HighlightStyle,
    /// Delay between consecutive references in a batch (default: 100)
    #[serde(default = "default_stagger_delay_ms")]
    pub stagger_delay_ms: u64,
    /// Lifetime of an auto-fading highlight (default: 2000)
    #[serde(default = "default_fade_duration_ms")]
    pub fade_duration_ms: u64,
}

fn default_stagger_delay_ms() -> u64 {
    100
}

fn default_fade_duration_ms() -> u64 {
    2000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            style: HighlightStyle::default(),
            stagger_delay_ms: default_stagger_delay_ms(),
            fade_duration_ms: default_fade_duration_ms(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration object
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a field fails validation
    pub fn from_json(s: &str) -> Result<Self, HighlightError> {
        let config: Self =
            serde_json::from_str(s).map_err(|e| HighlightError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HighlightError> {
        self.style.validate()
    }

    pub fn stagger_delay(&self) -> Duration {
        Duration::from_millis(self.stagger_delay_ms)
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.style.stroke_width, 2.0);
        assert_eq!(config.style.animation_duration_ms, 0);
        assert_eq!(config.fade_duration(), Duration::from_millis(2000));
        assert_eq!(config.stagger_delay(), Duration::from_millis(100));
        assert!(config.style.fill_color.starts_with("rgba(255, 193, 7"));
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_style_override() {
        let config = EngineConfig::from_json(
            r#"{"style": {"strokeWidth": 3.5, "animationDurationMs": 250}, "fadeDurationMs": 500}"#,
        )
        .unwrap();
        assert_eq!(config.style.stroke_width, 3.5);
        assert_eq!(config.style.animation_duration(), Duration::from_millis(250));
        assert_eq!(config.style.fill_color, default_fill_color());
        assert_eq!(config.fade_duration_ms, 500);
    }

    #[test]
    fn test_rejects_negative_stroke() {
        let err = EngineConfig::from_json(r#"{"style": {"strokeWidth": -1}}"#).unwrap_err();
        assert!(matches!(err, HighlightError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_multi_word_class() {
        let style = HighlightStyle {
            mark_class: "two classes".to_string(),
            ..HighlightStyle::default()
        };
        assert!(style.validate().is_err());
    }

    #[test]
    fn test_malformed_json() {
        let err = EngineConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, HighlightError::Parse(_)));
    }
}
