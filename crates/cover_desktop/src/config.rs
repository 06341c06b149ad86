//! Session configuration supplied by the host game, with TOML parsing and validation.

use std::collections::HashSet;

use cover_app_contract::{ApplicationId, InvalidApplicationId};
use serde::Deserialize;
use thiserror::Error;

use crate::model::{DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH};

#[derive(Debug, Error)]
/// Configuration rejected by [`DesktopConfig::from_toml_str`].
pub enum ConfigError {
    /// The TOML document could not be parsed into a [`DesktopConfig`].
    #[error("desktop config parse failed: {0}")]
    Parse(#[from] toml::de::Error),
    /// The JSON document could not be parsed into a [`DesktopConfig`].
    #[error("desktop config JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),
    /// A catalog entry or login shortcut names a malformed application id.
    #[error(transparent)]
    InvalidAppId(#[from] InvalidApplicationId),
    /// Two catalog entries share an id.
    #[error("duplicate app `{0}` in catalog")]
    DuplicateApp(String),
    /// The login shortcut points at an app missing from the catalog.
    #[error("login shortcut app `{0}` is not in the catalog")]
    UnknownShortcutApp(String),
    /// A duration that must be positive is zero.
    #[error("`{0}` must be greater than zero")]
    ZeroDuration(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Presentation-only skin. Never changes controller behavior.
pub enum DesktopSkin {
    #[default]
    Modern,
    Classic,
    Terminal,
}

impl DesktopSkin {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Modern => "modern",
            Self::Classic => "classic",
            Self::Terminal => "terminal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    /// Input that routes to the crash screen instead of the desktop.
    pub crash_code: String,
    /// Input that routes to the desktop with [`LoginConfig::shortcut_app`] pre-opened.
    pub shortcut_code: String,
    pub shortcut_app: String,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            crash_code: "666".to_string(),
            shortcut_code: "4242".to_string(),
            shortcut_app: "minesweeper".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
/// Default placement stagger for new windows.
pub struct CascadeConfig {
    pub origin_x: i32,
    pub origin_y: i32,
    pub step: i32,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            origin_x: 50,
            origin_y: 50,
            step: 30,
        }
    }
}

impl CascadeConfig {
    /// Position for a window opened while `open_count` windows are live.
    pub fn position(self, open_count: usize) -> (i32, i32) {
        let offset = i32::try_from(open_count)
            .unwrap_or(i32::MAX)
            .saturating_mul(self.step);
        (
            self.origin_x.saturating_add(offset),
            self.origin_y.saturating_add(offset),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub enabled: bool,
    pub interval_ms: u64,
    pub tips: Vec<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 15_000,
            tips: [
                "It looks like you're pretending to work.",
                "I can make this spreadsheet look 20% more boring.",
                "Your boss is approaching. Look busy!",
                "Don't forget to leverage the synergy.",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// One catalog entry.
pub struct AppEntry {
    pub id: String,
    pub title: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
    #[serde(default)]
    pub pinned: bool,
}

fn default_icon() -> String {
    "window".to_string()
}

fn default_width() -> i32 {
    DEFAULT_WINDOW_WIDTH
}

fn default_height() -> i32 {
    DEFAULT_WINDOW_HEIGHT
}

impl AppEntry {
    fn new(id: &str, title: &str, icon: &str, width: i32, height: i32, pinned: bool) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            icon: icon.to_string(),
            width,
            height,
            pinned,
        }
    }
}

fn default_apps() -> Vec<AppEntry> {
    vec![
        AppEntry::new("excel", "Excel - Financials.xlsx", "file-excel", 900, 600, true),
        AppEntry::new("word", "Word - Report.docx", "file-word", 700, 800, true),
        AppEntry::new("ppt", "PowerPoint - Deck.pptx", "file-powerpoint", 900, 600, true),
        AppEntry::new("email", "Outlook - Inbox", "envelope", 800, 550, true),
        AppEntry::new("chat", "Teams - General", "comments", 700, 500, true),
        AppEntry::new("terminal", "Command Prompt", "terminal", 600, 400, true),
        AppEntry::new("minesweeper", "Minesweeper", "bomb", 320, 400, false),
        AppEntry::new("snake", "Q3 Pipeline.xlsx", "file-excel", 480, 420, false),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
/// Desktop session configuration. Every field has a default.
pub struct DesktopConfig {
    /// Simulated boot duration before the login screen.
    pub boot_delay_ms: u64,
    pub login: LoginConfig,
    pub cascade: CascadeConfig,
    pub assistant: AssistantConfig,
    pub skin: DesktopSkin,
    pub apps: Vec<AppEntry>,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            boot_delay_ms: 3_000,
            login: LoginConfig::default(),
            cascade: CascadeConfig::default(),
            assistant: AssistantConfig::default(),
            skin: DesktopSkin::default(),
            apps: default_apps(),
        }
    }
}

impl DesktopConfig {
    /// Parses and validates a TOML document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the document does not parse or fails validation.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON document, as passed by a web page embedding the desktop.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the document does not parse or fails validation.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks catalog ids, the login shortcut, and timer durations.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.boot_delay_ms == 0 {
            return Err(ConfigError::ZeroDuration("boot_delay_ms"));
        }
        if self.assistant.enabled && self.assistant.interval_ms == 0 {
            return Err(ConfigError::ZeroDuration("assistant.interval_ms"));
        }

        let mut seen = HashSet::new();
        for entry in &self.apps {
            ApplicationId::new(entry.id.as_str())?;
            if !seen.insert(entry.id.as_str()) {
                return Err(ConfigError::DuplicateApp(entry.id.clone()));
            }
        }

        ApplicationId::new(self.login.shortcut_app.as_str())?;
        if !seen.contains(self.login.shortcut_app.as_str()) {
            return Err(ConfigError::UnknownShortcutApp(
                self.login.shortcut_app.clone(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DesktopConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.boot_delay_ms, 3_000);
        assert_eq!(config.cascade.position(0), (50, 50));
        assert_eq!(config.cascade.position(2), (110, 110));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = DesktopConfig::from_toml_str(
            r#"
            boot_delay_ms = 500
            skin = "classic"

            [login]
            crash_code = "0000"
            "#,
        )
        .expect("parse config");

        assert_eq!(config.boot_delay_ms, 500);
        assert_eq!(config.skin, DesktopSkin::Classic);
        assert_eq!(config.login.crash_code, "0000");
        assert_eq!(config.login.shortcut_code, "4242");
        assert_eq!(config.apps, default_apps());
    }

    #[test]
    fn custom_catalog_must_contain_shortcut_app() {
        let err = DesktopConfig::from_toml_str(
            r#"
            [[apps]]
            id = "excel"
            title = "Excel"
            "#,
        )
        .expect_err("shortcut app missing");
        assert!(matches!(err, ConfigError::UnknownShortcutApp(app) if app == "minesweeper"));
    }

    #[test]
    fn malformed_and_duplicate_ids_are_rejected() {
        let bad = DesktopConfig::from_toml_str(
            r#"
            [[apps]]
            id = "Excel Sheet"
            title = "Excel"
            "#,
        );
        assert!(matches!(bad, Err(ConfigError::InvalidAppId(_))));

        let duplicate = DesktopConfig::from_toml_str(
            r#"
            [login]
            shortcut_app = "excel"

            [[apps]]
            id = "excel"
            title = "Excel"

            [[apps]]
            id = "excel"
            title = "Excel again"
            "#,
        );
        assert!(matches!(duplicate, Err(ConfigError::DuplicateApp(id)) if id == "excel"));
    }

    #[test]
    fn json_config_from_the_embedding_page() {
        let config = DesktopConfig::from_json_str(
            r#"{ "skin": "terminal", "assistant": { "enabled": false } }"#,
        )
        .expect("parse json config");
        assert_eq!(config.skin, DesktopSkin::Terminal);
        assert!(!config.assistant.enabled);
        assert_eq!(config.assistant.interval_ms, 15_000);

        let err = DesktopConfig::from_json_str(r#"{ "boot_delay_ms": "soon" }"#)
            .expect_err("wrong type");
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn zero_boot_delay_is_rejected() {
        let err = DesktopConfig::from_toml_str("boot_delay_ms = 0").expect_err("zero delay");
        assert!(matches!(err, ConfigError::ZeroDuration("boot_delay_ms")));
    }
}
