//! Generic configuration I/O utilities
//!
//! Provides generic XML configuration loading and saving that works
//! with any serializable configuration type. Fields renamed with an `@`
//! prefix are stored as attributes of the root element.

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Load configuration from an XML file
///
/// If the file doesn't exist, returns default config.
/// If the file exists but is invalid or has a different root tag,
/// logs a warning and returns default config.
///
/// # Example
///
/// ```ignore
/// let settings: Settings = load_config(Path::new("settings.xml"), "DX10Settings");
/// ```
pub fn load_config<T>(path: &Path, root_tag: &str) -> T
where
    T: DeserializeOwned + Default,
{
    log::info!("load_config: Loading from {:?}", path);

    if !path.is_file() {
        log::info!("load_config: Config file doesn't exist, using defaults");
        return T::default();
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            log::warn!(
                "load_config: Failed to read config file: {}, using defaults",
                e
            );
            return T::default();
        }
    };

    match root_tag_of(&contents) {
        Some(tag) if tag == root_tag => {}
        Some(tag) => {
            log::warn!(
                "load_config: Unexpected root <{}> (wanted <{}>), using defaults",
                tag,
                root_tag
            );
            return T::default();
        }
        None => {
            log::warn!("load_config: No root element found, using defaults");
            return T::default();
        }
    }

    match quick_xml::de::from_str::<T>(&contents) {
        Ok(config) => {
            log::info!("load_config: Successfully loaded config from {:?}", path);
            config
        }
        Err(e) => {
            log::warn!("load_config: Failed to parse config: {}, using defaults", e);
            T::default()
        }
    }
}

/// Save configuration to an XML file
///
/// Creates parent directories if they don't exist.
pub fn save_config<T>(config: &T, path: &Path, root_tag: &str) -> Result<()>
where
    T: Serialize,
{
    log::info!("save_config: Saving to {:?}", path);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let body = quick_xml::se::to_string_with_root(root_tag, config)
        .context("Failed to serialize config to XML")?;

    std::fs::write(path, format!("{}{}\n", XML_DECLARATION, body))
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    log::info!("save_config: Config saved successfully");
    Ok(())
}

/// Name of the first element in `xml`, or `None` if the text is malformed
/// before any element starts.
fn root_tag_of(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct TestConfig {
        #[serde(rename = "@value", default)]
        value: i32,
        #[serde(rename = "@name", default)]
        name: String,
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let config: TestConfig = load_config(Path::new("/nonexistent/path/config.xml"), "Test");
        assert_eq!(config, TestConfig::default());
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("test-config.xml");

        let config = TestConfig {
            value: 42,
            name: "test".to_string(),
        };

        save_config(&config, &path, "Test").unwrap();
        let loaded: TestConfig = load_config(&path, "Test");

        assert_eq!(loaded.value, 42);
        assert_eq!(loaded.name, "test");
    }

    #[test]
    fn test_wrong_root_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.xml");
        std::fs::write(&path, r#"<Other value="7" name="x"/>"#).unwrap();

        let loaded: TestConfig = load_config(&path, "Test");
        assert_eq!(loaded, TestConfig::default());
    }

    #[test]
    fn test_garbage_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.xml");
        std::fs::write(&path, "this is not xml at all").unwrap();

        let loaded: TestConfig = load_config(&path, "Test");
        assert_eq!(loaded, TestConfig::default());
    }
}
