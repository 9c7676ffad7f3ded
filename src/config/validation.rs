use crate::config::selector::FileSelector;
use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on the inter-request delay (seconds)
const MAX_DELAY_SECONDS: f64 = 3600.0;

/// Validates the entire configuration
///
/// The content pattern is deliberately not checked here: an invalid pattern
/// only disables content matching, it never prevents a crawl.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_seed(&config.seed)?;
    validate_selector(&config.files)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the seed URL: parseable, http(s), with a host
fn validate_seed(seed: &str) -> Result<(), ConfigError> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use HTTP or HTTPS",
            seed
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            seed
        )));
    }

    Ok(())
}

fn validate_selector(selector: &FileSelector) -> Result<(), ConfigError> {
    if let FileSelector::Extensions(extensions) = selector {
        if extensions.is_empty() {
            return Err(ConfigError::InvalidSelector(
                "at least one file extension is required".to_string(),
            ));
        }
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_concurrent < 1 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent must be >= 1, got {}",
            config.max_concurrent
        )));
    }

    if !config.delay.is_finite() || config.delay < 0.0 || config.delay > MAX_DELAY_SECONDS {
        return Err(ConfigError::Validation(format!(
            "delay must be between 0 and {} seconds, got {}",
            MAX_DELAY_SECONDS, config.delay
        )));
    }

    if config.page_timeout < 1 {
        return Err(ConfigError::Validation(
            "page_timeout must be >= 1 second".to_string(),
        ));
    }

    if config.download_timeout < 1 {
        return Err(ConfigError::Validation(
            "download_timeout must be >= 1 second".to_string(),
        ));
    }

    if config.crawl_timeout == Some(0) {
        return Err(ConfigError::Validation(
            "crawl_timeout must be >= 1 second when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output root cannot be empty".to_string(),
        ));
    }

    if let Some(summary) = &config.summary_path {
        if summary.trim().is_empty() {
            return Err(ConfigError::Validation(
                "summary_path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}
