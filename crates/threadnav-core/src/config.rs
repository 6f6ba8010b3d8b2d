//! Navigator configuration.
//!
//! [`NavigatorConfig`] is the editable, string-based form; [`resolve`]
//! parses every selector once and yields a [`ResolvedConfig`] that the
//! engine runs on.
//!
//! [`resolve`]: NavigatorConfig::resolve

use std::fmt;
use std::time::Duration;

use crate::classifier::OverlayMarkers;
use crate::document::RoleAttribute;
use crate::mutation::ObserveOptions;
use crate::render_key::DisplayMode;
use crate::selector::{Selector, SelectorError};
use crate::text::TextLimits;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(120);
pub const DEFAULT_HIGHLIGHT: Duration = Duration::from_millis(900);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigatorConfig {
    /// Message queries, most specific first.
    pub message_strategies: Vec<String>,
    /// Elements whose text and attribute changes matter.
    pub container_selector: String,
    /// Elements that are overlay roots themselves.
    pub overlay_roots: String,
    /// Elements whose subtree belongs to the overlay.
    pub overlay_scopes: String,
    /// Preferred observation root; the document root is used when absent.
    pub observe_root: String,
    pub role_attribute: String,
    /// Attribute names the host reports changes for.
    pub observed_attributes: Vec<String>,
    pub identity_prefix: String,
    pub debounce: Duration,
    pub highlight: Duration,
    pub text_limits: TextLimits,
    pub initial_mode: DisplayMode,
    pub start_collapsed: bool,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            message_strategies: vec![
                r#"article[data-testid="conversation-turn"]"#.to_string(),
                "[data-message-author-role]".to_string(),
                "main article".to_string(),
            ],
            container_selector: "article, [data-message-author-role], main".to_string(),
            overlay_roots: "#ctn-panel, #ctn-launcher, #ctn-list, .ctn-preview, .ctn-collapsed-list"
                .to_string(),
            overlay_scopes: "#ctn-panel, .ctn-preview".to_string(),
            observe_root: "main".to_string(),
            role_attribute: "data-message-author-role".to_string(),
            observed_attributes: vec![
                "data-message-author-role".to_string(),
                "data-testid".to_string(),
            ],
            identity_prefix: "ctn-".to_string(),
            debounce: DEFAULT_DEBOUNCE,
            highlight: DEFAULT_HIGHLIGHT,
            text_limits: TextLimits::default(),
            initial_mode: DisplayMode::default(),
            start_collapsed: true,
        }
    }
}

impl NavigatorConfig {
    pub fn with_strategies<I, S>(mut self, strategies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.message_strategies = strategies.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_identity_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.identity_prefix = prefix.into();
        self
    }

    pub fn with_initial_mode(mut self, mode: DisplayMode) -> Self {
        self.initial_mode = mode;
        self
    }

    pub fn with_start_collapsed(mut self, collapsed: bool) -> Self {
        self.start_collapsed = collapsed;
        self
    }

    pub fn with_preview_chars(mut self, max_chars: usize) -> Self {
        self.text_limits.max_chars = max_chars;
        self
    }

    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        if self.message_strategies.is_empty() {
            return Err(ConfigError::NoStrategies);
        }
        if self.identity_prefix.is_empty() {
            return Err(ConfigError::EmptyPrefix);
        }
        if self.text_limits.max_chars == 0 {
            return Err(ConfigError::ZeroPreviewLength);
        }
        if self.role_attribute.is_empty() {
            return Err(ConfigError::EmptyRoleAttribute);
        }

        let strategies = self
            .message_strategies
            .iter()
            .map(|source| parse_field("message_strategies", source))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ResolvedConfig {
            strategies,
            containers: parse_field("container_selector", &self.container_selector)?,
            overlay: OverlayMarkers::new(
                parse_field("overlay_roots", &self.overlay_roots)?,
                parse_field("overlay_scopes", &self.overlay_scopes)?,
            ),
            observe_root: parse_field("observe_root", &self.observe_root)?,
            roles: RoleAttribute::new(self.role_attribute.clone()),
            observe: ObserveOptions {
                attribute_filter: Some(self.observed_attributes.clone()),
                ..ObserveOptions::default()
            },
            identity_prefix: self.identity_prefix.clone(),
            debounce: self.debounce,
            highlight: self.highlight,
            text_limits: self.text_limits.clone(),
            initial_mode: self.initial_mode,
            start_collapsed: self.start_collapsed,
        })
    }
}

fn parse_field(field: &'static str, source: &str) -> Result<Selector, ConfigError> {
    Selector::parse(source).map_err(|source| ConfigError::InvalidSelector { field, source })
}

/// Validated configuration with parsed selectors.
#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub strategies: Vec<Selector>,
    pub containers: Selector,
    pub overlay: OverlayMarkers,
    pub observe_root: Selector,
    pub roles: RoleAttribute,
    pub observe: ObserveOptions,
    pub identity_prefix: String,
    pub debounce: Duration,
    pub highlight: Duration,
    pub text_limits: TextLimits,
    pub initial_mode: DisplayMode,
    pub start_collapsed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    InvalidSelector {
        field: &'static str,
        source: SelectorError,
    },
    NoStrategies,
    EmptyPrefix,
    EmptyRoleAttribute,
    ZeroPreviewLength,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSelector { field, source } => {
                write!(f, "invalid selector in `{field}`: {source}")
            }
            ConfigError::NoStrategies => write!(f, "at least one message strategy is required"),
            ConfigError::EmptyPrefix => write!(f, "identity prefix must not be empty"),
            ConfigError::EmptyRoleAttribute => write!(f, "role attribute must not be empty"),
            ConfigError::ZeroPreviewLength => write!(f, "preview length must be positive"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidSelector { source, .. } => Some(source),
            _ => None,
        }
    }
}
