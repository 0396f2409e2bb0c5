//! Env file persistence
//!
//! Vendor answers live in a dotenv-style file. Loading never overrides
//! variables already present in the process environment.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    error::{Result, VendorError},
    services::Vendor,
};

/// Default env file location (`<config dir>/lmstudio/.env`)
#[must_use]
pub fn default_env_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lmstudio")
        .join(".env")
}

/// Load variables from `path` into the process environment
///
/// A missing file is not an error. Returns true if the file was read.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be parsed
pub fn load_env_file(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }

    dotenv::from_path(path).map_err(|e| VendorError::EnvFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(true)
}

/// Render the env file content for `vendors`
#[must_use]
pub fn env_file_content(vendors: &[&dyn Vendor]) -> String {
    let mut buffer = String::new();
    for vendor in vendors {
        vendor.fill_env_file_content(&mut buffer);
    }
    buffer
}

/// Write the env file for `vendors` to `path`, replacing any previous content
///
/// # Errors
///
/// Returns an error if the file cannot be written
pub fn save_env_file(path: &Path, vendors: &[&dyn Vendor]) -> Result<()> {
    // Ensure directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, env_file_content(vendors))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::lmstudio::LmStudioClient;
    use tempfile::TempDir;

    #[test]
    fn test_default_env_file_path() {
        assert!(default_env_file_path().ends_with("lmstudio/.env"));
    }

    #[test]
    fn test_load_missing_env_file() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = load_env_file(&temp_dir.path().join("missing.env")).unwrap();
        assert!(!loaded);
    }

    #[test]
    fn test_save_and_load_env_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join(".env");

        let mut client = LmStudioClient::compatible("Settings Roundtrip Vendor", "", None);
        client.set_base_url("http://127.0.0.1:4321/v1");

        save_env_file(&path, &[&client]).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "SETTINGS_ROUNDTRIP_VENDOR_API_BASE_URL=http://127.0.0.1:4321/v1\n"
        );

        assert!(load_env_file(&path).unwrap());
        assert_eq!(
            std::env::var("SETTINGS_ROUNDTRIP_VENDOR_API_BASE_URL").unwrap(),
            "http://127.0.0.1:4321/v1"
        );
        std::env::remove_var("SETTINGS_ROUNDTRIP_VENDOR_API_BASE_URL");
    }

    #[test]
    fn test_env_file_content_concatenates_vendors() {
        let first = LmStudioClient::new();
        let second = LmStudioClient::compatible("Other Server", "http://localhost:8080/v1", None);

        let content = env_file_content(&[&first, &second]);
        assert_eq!(
            content,
            "LM_STUDIO_API_BASE_URL=http://localhost:1234/v1\n\
             OTHER_SERVER_API_BASE_URL=http://localhost:8080/v1\n"
        );
    }
}
