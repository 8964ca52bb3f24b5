//! CLI argument validation functions
//!
//! This module provides custom validation functions for CLI arguments
//! that go beyond what clap can validate automatically.

use std::fs;
use std::path::PathBuf;

/// Validate that a file path is accessible (exists and is readable)
pub fn validate_config_file_path(path_str: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(path_str);

    if !path.exists() {
        return Err(format!("Configuration file does not exist: '{}'", path_str));
    }

    if !path.is_file() {
        return Err(format!("Configuration path is not a file: '{}'", path_str));
    }

    match fs::File::open(&path) {
        Ok(_) => Ok(path),
        Err(e) => Err(format!(
            "Cannot read configuration file '{}': {}",
            path_str, e
        )),
    }
}

/// Validate that a price is a positive, finite number
pub fn validate_price(price_str: &str) -> Result<f64, String> {
    let price: f64 = price_str
        .parse()
        .map_err(|_| format!("Price must be a valid number, got: '{}'", price_str))?;

    if !price.is_finite() || price <= 0.0 {
        return Err(format!(
            "Price must be greater than zero, got: '{}'",
            price_str
        ));
    }

    Ok(price)
}

/// Validate that a list limit is a positive number with a sane upper bound
pub fn validate_limit(limit_str: &str) -> Result<u64, String> {
    let limit: u64 = limit_str
        .parse()
        .map_err(|_| format!("Limit must be a valid positive number, got: '{}'", limit_str))?;

    if limit == 0 {
        return Err("Limit must be greater than 0".to_string());
    }

    if limit > 100 {
        return Err("Limit cannot exceed 100".to_string());
    }

    Ok(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_price() {
        assert_eq!(validate_price("1.5"), Ok(1.5));
        assert!(validate_price("0").is_err());
        assert!(validate_price("-2").is_err());
        assert!(validate_price("inf").is_err());
        assert!(validate_price("cheap").is_err());
    }

    #[test]
    fn test_validate_limit() {
        assert_eq!(validate_limit("30"), Ok(30));
        assert!(validate_limit("0").is_err());
        assert!(validate_limit("101").is_err());
        assert!(validate_limit("many").is_err());
    }

    #[test]
    fn test_validate_config_file_path_rejects_missing() {
        assert!(validate_config_file_path("/nonexistent/vitrine.toml").is_err());
    }

    #[test]
    fn test_validate_config_file_path_rejects_directory() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        assert!(validate_config_file_path(temp_dir.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_validate_config_file_path_accepts_readable_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[api]\n").unwrap();
        assert!(validate_config_file_path(path.to_str().unwrap()).is_ok());
    }
}
