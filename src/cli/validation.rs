//! CLI argument validation functions
//!
//! Custom value parsers for arguments clap cannot check on its own.

use std::fs;
use std::path::PathBuf;

/// Validate that a row id is a positive integer
pub fn validate_id(id_str: &str) -> Result<i32, String> {
    let id: i32 = id_str
        .trim()
        .parse()
        .map_err(|_| format!("Id must be a positive whole number, got: '{}'", id_str))?;

    if id <= 0 {
        return Err(format!("Id must be greater than 0, got: {}", id));
    }

    Ok(id)
}

/// Validate that a name (username, tag) is not blank
pub fn validate_non_empty(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        return Err("Value cannot be empty".to_string());
    }
    Ok(value.to_string())
}

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
