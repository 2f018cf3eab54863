use std::path::PathBuf;

use crate::error::{Error, Result};

/// Side of one module in pixels.
pub const MODULE_SIZE: u32 = 10;
/// Exclusion radius in modules; tuned for error correction level High.
pub const RADIUS_MODULES: u32 = 4;
/// Side of a version 40 symbol, the largest QR code.
pub const MAX_QR_SIDE: u32 = 177;

/// Rendering options for [`composite`](crate::helper::composite).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Side of one module in pixels.
    pub module_size: u32,
    /// Radius of the logo hole in pixels.
    pub radius: f64,
    /// Fill color of dark modules.
    pub fill: String,
    /// Also write the QR code without the hole, for debugging.
    pub write_diagnostic_artifact: bool,
    /// Where the diagnostic artifact goes; the system temp directory if unset.
    pub diagnostic_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            module_size: MODULE_SIZE,
            radius: MODULE_SIZE as f64 * RADIUS_MODULES as f64,
            fill: "black".to_string(),
            write_diagnostic_artifact: false,
            diagnostic_dir: None,
        }
    }
}

impl Config {
    /// Sets the module size and resets the radius to four modules.
    pub fn with_module_size(mut self, module_size: u32) -> Self {
        self.module_size = module_size;
        self.radius = module_size as f64 * RADIUS_MODULES as f64;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = fill.into();
        self
    }

    pub fn with_diagnostic_artifact(mut self, dir: Option<PathBuf>) -> Self {
        self.write_diagnostic_artifact = true;
        self.diagnostic_dir = dir;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.module_size == 0 {
            return Err(Error::Config("module size must be at least 1 pixel".into()));
        }
        if self.module_size.checked_mul(MAX_QR_SIDE).is_none() {
            return Err(Error::Config(format!(
                "module size {}px is too large for a {MAX_QR_SIDE}-module QR code",
                self.module_size
            )));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(Error::Config(format!(
                "radius must be a non-negative number of pixels, got {}",
                self.radius
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.module_size, 10);
        assert_eq!(config.radius, 40.0);
        assert_eq!(config.fill, "black");
        assert!(!config.write_diagnostic_artifact);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_module_size_scales_radius() {
        let config = Config::default().with_module_size(6);
        assert_eq!(config.radius, 24.0);
        let config = config.with_radius(30.0);
        assert_eq!((config.module_size, config.radius), (6, 30.0));
    }

    #[test]
    fn test_validate() {
        assert!(matches!(
            Config::default().with_module_size(0).validate(),
            Err(Error::Config(_))
        ));
        assert!(Config::default().with_radius(-1.0).validate().is_err());
        assert!(Config::default().with_radius(f64::NAN).validate().is_err());
        assert!(Config::default().with_radius(0.0).validate().is_ok());
    }

    #[test]
    fn test_huge_module_size() {
        let config = Config::default().with_module_size(2_000_000_000);
        assert_eq!(config.radius, 8_000_000_000.0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        let largest = u32::MAX / MAX_QR_SIDE;
        assert!(Config::default().with_module_size(largest).validate().is_ok());
        assert!(Config::default().with_module_size(largest + 1).validate().is_err());
    }
}
