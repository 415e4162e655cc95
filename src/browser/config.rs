//! Backend configuration
//!
//! A [`BackendConfig`] is fixed when a backend is constructed and moved into
//! it by value. Only `user_agent` and `timeout_secs` matter to every backend;
//! the remaining fields are launch settings for the full renderer.

use crate::error::{BrowserError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Default per-invocation timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: f64 = 30.0;

/// Longest accepted per-invocation timeout in seconds (one day)
pub const MAX_TIMEOUT_SECS: f64 = 86_400.0;

/// User agent sent when none is configured
pub fn default_user_agent() -> String {
    format!("{}/{}", crate::NAME, crate::VERSION)
}

/// Configuration shared by every backend variant
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    /// Client identification sent to remote servers
    pub user_agent: String,
    /// Timeout budget per top-level invocation, in seconds (always > 0)
    pub timeout_secs: f64,
    /// Run the renderer without a window (default: true)
    pub headless: bool,
    /// Keep the renderer's sandbox enabled (default: true)
    pub sandbox: bool,
    /// Renderer viewport width (default: 1920)
    pub width: u32,
    /// Renderer viewport height (default: 1080)
    pub height: u32,
    /// Path to a Chrome/Chromium executable (None = auto-detect)
    pub chrome_path: Option<PathBuf>,
    /// Inject anti-detection scripts into renderer pages (default: false)
    pub stealth: bool,
    /// Additional renderer command-line arguments
    pub extra_args: Vec<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            headless: true,
            sandbox: true,
            width: 1920,
            height: 1080,
            chrome_path: None,
            stealth: false,
            extra_args: Vec::new(),
        }
    }
}

impl BackendConfig {
    /// Create a new config builder
    pub fn builder() -> BackendConfigBuilder {
        BackendConfigBuilder::default()
    }

    /// Timeout budget as a [`Duration`].
    ///
    /// Out-of-range values on an unvalidated config are clamped into
    /// `[0, MAX_TIMEOUT_SECS]`; NaN falls back to the default.
    pub fn timeout(&self) -> Duration {
        let secs = if self.timeout_secs.is_nan() {
            DEFAULT_TIMEOUT_SECS
        } else {
            self.timeout_secs.clamp(0.0, MAX_TIMEOUT_SECS)
        };
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::from_secs(MAX_TIMEOUT_SECS as u64))
    }

    /// Check the invariants every backend relies on
    pub fn validate(&self) -> Result<()> {
        if !self.timeout_secs.is_finite() || self.timeout_secs <= 0.0 {
            return Err(BrowserError::InvalidConfig(format!(
                "timeout must be a positive number of seconds, got {}",
                self.timeout_secs
            ))
            .into());
        }
        if self.timeout_secs > MAX_TIMEOUT_SECS
            || Duration::try_from_secs_f64(self.timeout_secs).is_err()
        {
            return Err(BrowserError::InvalidConfig(format!(
                "timeout must be at most {} seconds, got {}",
                MAX_TIMEOUT_SECS, self.timeout_secs
            ))
            .into());
        }
        if self.user_agent.trim().is_empty() {
            return Err(BrowserError::InvalidConfig("user agent cannot be empty".to_string()).into());
        }
        if self.width == 0 || self.height == 0 {
            return Err(BrowserError::InvalidConfig(format!(
                "viewport must be non-empty, got {}x{}",
                self.width, self.height
            ))
            .into());
        }
        Ok(())
    }
}

/// Builder for BackendConfig
#[derive(Default)]
pub struct BackendConfigBuilder {
    config: BackendConfig,
}

impl BackendConfigBuilder {
    /// Set user agent
    pub fn user_agent<S: Into<String>>(mut self, ua: S) -> Self {
        self.config.user_agent = ua.into();
        self
    }

    /// Set timeout in seconds
    pub fn timeout_secs(mut self, secs: f64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    /// Enable/disable sandbox
    pub fn sandbox(mut self, sandbox: bool) -> Self {
        self.config.sandbox = sandbox;
        self
    }

    /// Set viewport dimensions
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    /// Set Chrome path
    pub fn chrome_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    /// Enable/disable stealth scripts
    pub fn stealth(mut self, stealth: bool) -> Self {
        self.config.stealth = stealth;
        self
    }

    /// Add extra renderer argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.config.extra_args.push(arg.into());
        self
    }

    /// Validate and build the config
    pub fn build(self) -> Result<BackendConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_config_default() {
        let config = BackendConfig::default();
        assert!(config.headless);
        assert!(config.sandbox);
        assert!(!config.stealth);
        assert_eq!(config.width, 1920);
        assert_eq!(config.height, 1080);
        assert_eq!(config.timeout_secs, 30.0);
        assert!(config.user_agent.starts_with("pagedrive/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backend_config_builder() {
        let config = BackendConfig::builder()
            .user_agent("TestBot/1.0")
            .timeout_secs(5.0)
            .headless(false)
            .sandbox(false)
            .viewport(1280, 720)
            .stealth(true)
            .arg("--disable-gpu")
            .build()
            .unwrap();

        assert_eq!(config.user_agent, "TestBot/1.0");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert!(!config.headless);
        assert!(!config.sandbox);
        assert_eq!((config.width, config.height), (1280, 720));
        assert!(config.stealth);
        assert_eq!(config.extra_args, vec!["--disable-gpu"]);
    }

    #[test]
    fn test_fractional_timeout() {
        let config = BackendConfig::builder().timeout_secs(0.25).build().unwrap();
        assert_eq!(config.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_rejects_non_positive_timeout() {
        for secs in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = BackendConfig::builder().timeout_secs(secs).build();
            assert!(result.is_err(), "timeout {} should be rejected", secs);
        }
    }

    #[test]
    fn test_rejects_oversized_timeout() {
        for secs in [MAX_TIMEOUT_SECS + 1.0, 1e19, 1e20, f64::MAX] {
            let err = BackendConfig::builder().timeout_secs(secs).build().unwrap_err();
            assert!(err.to_string().contains("at most"), "timeout {} should be rejected", secs);
        }
        let config = BackendConfig::builder()
            .timeout_secs(MAX_TIMEOUT_SECS)
            .build()
            .unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_unvalidated_timeout_is_clamped() {
        let mut config = BackendConfig::default();
        config.timeout_secs = 1e20;
        assert_eq!(config.timeout(), Duration::from_secs(86_400));
        config.timeout_secs = -3.0;
        assert_eq!(config.timeout(), Duration::ZERO);
        config.timeout_secs = f64::NAN;
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_rejects_blank_user_agent() {
        let err = BackendConfig::builder().user_agent("  ").build().unwrap_err();
        assert!(err.to_string().contains("user agent"));
    }

    #[test]
    fn test_rejects_empty_viewport() {
        assert!(BackendConfig::builder().viewport(0, 600).build().is_err());
    }
}
