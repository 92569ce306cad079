use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::ConfigError;

/// Storefront country codes and the language their reviews are written in.
const DEFAULT_COUNTRY_LANGUAGES: &[(&str, &str)] = &[
    ("fr", "fr"),
    ("us", "en"),
    ("de", "de"),
    ("se", "sv"),
    ("gb", "en"),
    ("ca", "en"),
    ("it", "it"),
    ("es", "es"),
];

/// Shape of the optional country map YAML file:
///
/// ```yaml
/// countries:
///   se: sv
///   mx: es
/// ```
#[derive(Debug, Deserialize)]
pub struct CountryMapFile {
    pub countries: HashMap<String, String>,
}

/// The built-in country → language map.
#[must_use]
pub fn default_country_map() -> HashMap<String, String> {
    DEFAULT_COUNTRY_LANGUAGES
        .iter()
        .map(|&(country, language)| (country.to_string(), language.to_string()))
        .collect()
}

/// Load a country map file and layer it over [`default_country_map`].
///
/// Codes are lowercased; entries in the file win over the defaults.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_country_map(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CountryMapIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: CountryMapFile =
        serde_yaml::from_str(&content).map_err(ConfigError::CountryMapParse)?;

    let mut map = default_country_map();
    for (country, language) in file.countries {
        let country = normalize_code(&country, "country")?;
        let language = normalize_code(&language, "language")?;
        map.insert(country, language);
    }
    Ok(map)
}

fn normalize_code(raw: &str, kind: &str) -> Result<String, ConfigError> {
    let code = raw.trim().to_lowercase();
    if code.is_empty() {
        return Err(ConfigError::Validation(format!(
            "{kind} code must be non-empty"
        )));
    }
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ConfigError::Validation(format!(
            "{kind} code '{raw}' must be two ASCII letters"
        )));
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_yaml(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn default_map_sends_sweden_to_swedish() {
        let map = default_country_map();
        assert_eq!(map.get("se").map(String::as_str), Some("sv"));
        assert_eq!(map.get("ca").map(String::as_str), Some("en"));
    }

    #[test]
    fn file_entries_extend_and_override_defaults() {
        let file = write_yaml("countries:\n  MX: es\n  ca: FR\n");
        let map = load_country_map(file.path()).unwrap();
        assert_eq!(map.get("mx").map(String::as_str), Some("es"));
        assert_eq!(map.get("ca").map(String::as_str), Some("fr"));
        assert_eq!(map.get("us").map(String::as_str), Some("en"));
    }

    #[test]
    fn rejects_long_codes() {
        let file = write_yaml("countries:\n  brazil: pt\n");
        let err = load_country_map(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)), "got: {err:?}");
    }

    #[test]
    fn rejects_empty_language() {
        let file = write_yaml("countries:\n  br: \"\"\n");
        let err = load_country_map(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)), "got: {err:?}");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_country_map(Path::new("/nonexistent/countries.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::CountryMapIo { .. }), "got: {err:?}");
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let file = write_yaml("countries: [se, sv]\n");
        let err = load_country_map(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::CountryMapParse(_)), "got: {err:?}");
    }
}
