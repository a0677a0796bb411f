//! Configuration validation.

use crate::config::Config;
use crate::constants::confidence;
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    let defaults = &config.defaults;

    check_unit_range("min_conf", defaults.min_conf)?;
    check_unit_range("relevance_floor", defaults.relevance_floor)?;

    if defaults.overlap < 0.0 {
        return Err(Error::ConfigValidation {
            message: format!("overlap must be non-negative, got {}", defaults.overlap),
        });
    }

    if config.inference.top_k == 0 {
        return Err(Error::ConfigValidation {
            message: "top_k must be at least 1".to_string(),
        });
    }

    if let Some(lat) = defaults.latitude
        && !(-90.0..=90.0).contains(&lat)
    {
        return Err(Error::ConfigValidation {
            message: format!("latitude must be between -90.0 and 90.0, got {lat}"),
        });
    }

    if let Some(lon) = defaults.longitude
        && !(-180.0..=180.0).contains(&lon)
    {
        return Err(Error::ConfigValidation {
            message: format!("longitude must be between -180.0 and 180.0, got {lon}"),
        });
    }

    Ok(())
}

fn check_unit_range(name: &str, value: f32) -> Result<()> {
    if (confidence::MIN..=confidence::MAX).contains(&value) {
        Ok(())
    } else {
        Err(Error::ConfigValidation {
            message: format!(
                "{name} must be between {} and {}, got {value}",
                confidence::MIN,
                confidence::MAX
            ),
        })
    }
}
