//! File selection rule
//!
//! A selector decides which discovered URLs are files to download. It is either
//! an explicit set of extensions or the catch-all "anything with an extension".

use crate::ConfigError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Extension used for synthesized filenames in catch-all mode
const FALLBACK_EXTENSION: &str = ".bin";

/// Which discovered URLs count as downloadable files
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "SelectorSpec")]
pub enum FileSelector {
    /// Lowercase extensions, each with a leading dot (e.g. `.gif`)
    Extensions(Vec<String>),

    /// Any URL whose final path segment contains a `.`
    All,
}

/// Raw TOML form: either `files = "all"` / `files = ".gif,.png"` or a list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SelectorSpec {
    One(String),
    Many(Vec<String>),
}

impl TryFrom<SelectorSpec> for FileSelector {
    type Error = ConfigError;

    fn try_from(spec: SelectorSpec) -> Result<Self, Self::Error> {
        match spec {
            SelectorSpec::One(raw) => raw.parse(),
            SelectorSpec::Many(list) => FileSelector::from_extensions(list),
        }
    }
}

impl FileSelector {
    /// Builds an extension selector from user-supplied extensions
    ///
    /// Extensions are lowercased and given a leading dot if missing, so
    /// `"GIF"`, `"gif"` and `".gif"` are equivalent. Duplicates are dropped.
    pub fn from_extensions<I, S>(extensions: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();

        for raw in extensions {
            let ext = normalize_extension(raw.as_ref())?;
            if !normalized.contains(&ext) {
                normalized.push(ext);
            }
        }

        if normalized.is_empty() {
            return Err(ConfigError::InvalidSelector(
                "at least one file extension is required".to_string(),
            ));
        }

        Ok(Self::Extensions(normalized))
    }

    /// Returns true if a URL's final path segment is selected
    pub fn matches_url(&self, url: &Url) -> bool {
        url.path_segments()
            .and_then(|mut segments| segments.next_back())
            .map(|segment| self.matches_segment(segment))
            .unwrap_or(false)
    }

    /// Returns true if a single path segment is selected
    ///
    /// Extension matching is case-insensitive and suffix based, so `.tar.gz`
    /// can be selected as well as `.gz`.
    pub fn matches_segment(&self, segment: &str) -> bool {
        match self {
            Self::All => segment.contains('.'),
            Self::Extensions(extensions) => {
                let lower = segment.to_ascii_lowercase();
                extensions
                    .iter()
                    .any(|ext| lower.len() > ext.len() && lower.ends_with(ext.as_str()))
            }
        }
    }

    /// Name of the output subdirectory for this selector
    ///
    /// `.gif` becomes `gif`, `[.jpg, .png]` becomes `jpg_png`, catch-all is `all`.
    pub fn dir_name(&self) -> String {
        match self {
            Self::All => "all".to_string(),
            Self::Extensions(extensions) => extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.'))
                .collect::<Vec<_>>()
                .join("_"),
        }
    }

    /// Extension appended to synthesized filenames
    pub fn default_extension(&self) -> &str {
        match self {
            Self::All => FALLBACK_EXTENSION,
            Self::Extensions(extensions) => extensions
                .first()
                .map(String::as_str)
                .unwrap_or(FALLBACK_EXTENSION),
        }
    }
}

impl FromStr for FileSelector {
    type Err = ConfigError;

    /// Parses `all`, `*`, or a comma-separated list such as `.gif,jpg`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "*" || trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }

        Self::from_extensions(trimmed.split(',').filter(|part| !part.trim().is_empty()))
    }
}

impl fmt::Display for FileSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all files"),
            Self::Extensions(extensions) => write!(f, "{}", extensions.join(", ")),
        }
    }
}

fn normalize_extension(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_start_matches('.');

    if trimmed.is_empty() {
        return Err(ConfigError::InvalidSelector(format!(
            "empty extension in '{}'",
            raw
        )));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    {
        return Err(ConfigError::InvalidSelector(format!(
            "extension '{}' contains invalid characters",
            raw
        )));
    }

    Ok(format!(".{}", trimmed.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_parse_single_extension() {
        let selector: FileSelector = ".gif".parse().unwrap();
        assert_eq!(selector, FileSelector::Extensions(vec![".gif".to_string()]));
    }

    #[test]
    fn test_parse_adds_dot_and_lowercases() {
        let selector: FileSelector = "JPG, png".parse().unwrap();
        assert_eq!(
            selector,
            FileSelector::Extensions(vec![".jpg".to_string(), ".png".to_string()])
        );
    }

    #[test]
    fn test_parse_all() {
        assert_eq!("all".parse::<FileSelector>().unwrap(), FileSelector::All);
        assert_eq!("*".parse::<FileSelector>().unwrap(), FileSelector::All);
        assert_eq!("ALL".parse::<FileSelector>().unwrap(), FileSelector::All);
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!("".parse::<FileSelector>().is_err());
        assert!(" , ".parse::<FileSelector>().is_err());
        assert!(".".parse::<FileSelector>().is_err());
    }

    #[test]
    fn test_parse_rejects_invalid_characters() {
        let result = "gif/../x".parse::<FileSelector>();
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidSelector(_)));
    }

    #[test]
    fn test_extension_match_case_insensitive() {
        let selector: FileSelector = ".gif".parse().unwrap();
        assert!(selector.matches_url(&url("https://example.com/img/Cat.GIF")));
        assert!(!selector.matches_url(&url("https://example.com/img/cat.png")));
    }

    #[test]
    fn test_extension_match_uses_path_not_query() {
        let selector: FileSelector = ".gif".parse().unwrap();
        assert!(selector.matches_url(&url("https://example.com/cat.gif?v=2")));
        assert!(!selector.matches_url(&url("https://example.com/view?file=cat.gif")));
    }

    #[test]
    fn test_bare_extension_is_not_a_file() {
        let selector: FileSelector = ".gif".parse().unwrap();
        assert!(!selector.matches_segment(".gif"));
        assert!(!selector.matches_segment("gif"));
    }

    #[test]
    fn test_multi_part_extension() {
        let selector: FileSelector = ".tar.gz".parse().unwrap();
        assert!(selector.matches_segment("release.tar.gz"));
        assert!(!selector.matches_segment("release.gz"));
    }

    #[test]
    fn test_all_mode_requires_dot_in_final_segment() {
        let selector = FileSelector::All;
        assert!(selector.matches_url(&url("https://example.com/docs/report.pdf")));
        assert!(!selector.matches_url(&url("https://example.com/docs/")));
        assert!(!selector.matches_url(&url("https://example.com/v1.2/about")));
    }

    #[test]
    fn test_dir_name() {
        assert_eq!(".gif".parse::<FileSelector>().unwrap().dir_name(), "gif");
        assert_eq!(
            "jpg,png".parse::<FileSelector>().unwrap().dir_name(),
            "jpg_png"
        );
        assert_eq!(FileSelector::All.dir_name(), "all");
    }

    #[test]
    fn test_default_extension() {
        assert_eq!(
            "png,jpg".parse::<FileSelector>().unwrap().default_extension(),
            ".png"
        );
        assert_eq!(FileSelector::All.default_extension(), ".bin");
    }

    #[test]
    fn test_deserialize_string_and_list() {
        #[derive(Deserialize)]
        struct Wrapper {
            files: FileSelector,
        }

        let one: Wrapper = toml::from_str(r#"files = "all""#).unwrap();
        assert_eq!(one.files, FileSelector::All);

        let many: Wrapper = toml::from_str(r#"files = ["GIF", ".png"]"#).unwrap();
        assert_eq!(
            many.files,
            FileSelector::Extensions(vec![".gif".to_string(), ".png".to_string()])
        );

        let bad: Result<Wrapper, _> = toml::from_str(r#"files = []"#);
        assert!(bad.is_err());
    }
}
