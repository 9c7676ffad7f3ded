use crate::config::selector::FileSelector;
use crate::url::output_dir_name;
use crate::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Main configuration structure for Trawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// URL the crawl starts from (depth 0)
    pub seed: String,

    /// Which discovered URLs are downloaded
    pub files: FileSelector,

    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum link hops from the seed (0 = seed page only)
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of page fetches started over the whole crawl
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// Maximum number of page fetches in flight at once
    #[serde(rename = "max-concurrent", default = "default_max_concurrent")]
    pub max_concurrent: u32,

    /// Pause after each page fetch (seconds)
    #[serde(default = "default_delay")]
    pub delay: f64,

    /// Only follow links on the seed's host
    #[serde(rename = "same-domain-only", default = "default_true")]
    pub same_domain_only: bool,

    /// Consult the seed host's robots.txt before fetching
    #[serde(rename = "respect-robots", default)]
    pub respect_robots: bool,

    /// Timeout for a single page fetch (seconds)
    #[serde(rename = "page-timeout", default = "default_page_timeout")]
    pub page_timeout: u64,

    /// Timeout for a single file download (seconds)
    #[serde(rename = "download-timeout", default = "default_download_timeout")]
    pub download_timeout: u64,

    /// Stop claiming new pages after this many seconds, then drain
    #[serde(rename = "crawl-timeout", default)]
    pub crawl_timeout: Option<u64>,
}

/// Content matching configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentConfig {
    /// Case-insensitive, multi-line regular expression; matching pages are saved
    pub pattern: Option<String>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler, also used as the robots.txt product token
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Root directory; each crawl writes under `<root>/<site>/<selector>/`
    #[serde(default = "default_output_root")]
    pub root: String,

    /// Optional path of a markdown summary written when the crawl ends
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

impl Config {
    /// Creates a configuration with default crawler settings
    pub fn new(seed: impl Into<String>, files: FileSelector) -> Self {
        Self {
            seed: seed.into(),
            files,
            crawler: CrawlerConfig::default(),
            content: ContentConfig::default(),
            user_agent: UserAgentConfig::default(),
            output: OutputConfig::default(),
        }
    }

    /// Parses the seed URL
    pub fn seed_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", self.seed, e)))
    }

    /// Directory downloaded files are written to
    ///
    /// Layout: `<root>/<sanitized host and path>/<selector name>/`
    pub fn output_dir(&self) -> Result<PathBuf, ConfigError> {
        let seed = self.seed_url()?;
        Ok(PathBuf::from(&self.output.root)
            .join(output_dir_name(&seed))
            .join(self.files.dir_name()))
    }
}

impl CrawlerConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay.max(0.0))
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout)
    }

    pub fn crawl_timeout(&self) -> Option<Duration> {
        self.crawl_timeout.map(Duration::from_secs)
    }
}

impl UserAgentConfig {
    /// Formats the User-Agent header: `Name/Version` or `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_pages: default_max_pages(),
            max_concurrent: default_max_concurrent(),
            delay: default_delay(),
            same_domain_only: true,
            respect_robots: false,
            page_timeout: default_page_timeout(),
            download_timeout: default_download_timeout(),
            crawl_timeout: None,
        }
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root: default_output_root(),
            summary_path: None,
        }
    }
}

fn default_max_depth() -> u32 {
    2
}

fn default_max_pages() -> u32 {
    100
}

fn default_max_concurrent() -> u32 {
    10
}

fn default_delay() -> f64 {
    0.1
}

fn default_true() -> bool {
    true
}

fn default_page_timeout() -> u64 {
    10
}

fn default_download_timeout() -> u64 {
    30
}

fn default_crawler_name() -> String {
    "trawler".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_output_root() -> String {
    "output".to_string()
}
