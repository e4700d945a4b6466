use anyhow::{Result, anyhow};
use url::Url;

/// Validation results with specific error messages
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self { is_valid: true, error: None }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self { is_valid: false, error: Some(msg.into()) }
    }

    pub fn to_result(&self) -> Result<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(anyhow!(self.error.clone().unwrap_or_else(|| "Validation failed".to_string())))
        }
    }
}

/// Validate a URL before registering it as a site
pub fn validate_site_url(target: &str) -> ValidationResult {
    if target.trim().is_empty() {
        return ValidationResult::err("Url cannot be empty");
    }

    match Url::parse(target) {
        Ok(url) => {
            let scheme = url.scheme();
            if scheme != "http" && scheme != "https" {
                return ValidationResult::err(format!(
                    "Invalid scheme '{scheme}'. Must be http or https"
                ));
            }

            if url.host_str().is_none() {
                return ValidationResult::err("Url must have a valid host");
            }

            ValidationResult::ok()
        }
        Err(e) => {
            if !target.contains("://") {
                ValidationResult::err("Url must include scheme (http:// or https://)")
            } else {
                ValidationResult::err(format!("Invalid url: {e}"))
            }
        }
    }
}

/// Whether a URL is served over TLS
pub fn is_https(target: &str) -> bool {
    Url::parse(target).map(|url| url.scheme() == "https").unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_url_validation() {
        assert!(validate_site_url("http://example.com").is_valid);
        assert!(validate_site_url("https://example.com").is_valid);
        assert!(validate_site_url("http://192.168.1.1").is_valid);
        assert!(validate_site_url("https://example.com:8443/path").is_valid);

        assert!(!validate_site_url("").is_valid);
        assert!(!validate_site_url("   ").is_valid);
        assert!(!validate_site_url("example.com").is_valid);
        assert!(!validate_site_url("ftp://example.com").is_valid);
    }

    #[test]
    fn test_missing_scheme_message() {
        let result = validate_site_url("example.com");
        assert_eq!(result.error.as_deref(), Some("Url must include scheme (http:// or https://)"));
        assert!(result.to_result().is_err());
    }

    #[test]
    fn test_is_https() {
        assert!(is_https("https://example.com"));
        assert!(!is_https("http://example.com"));
        assert!(!is_https("not a url"));
    }
}
