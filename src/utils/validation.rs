use crate::utils::error::{ProxyError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ProxyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ProxyError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ProxyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(ProxyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ProxyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ProxyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// A URL that request paths are appended to: no query, no fragment.
pub fn validate_base_url(field_name: &str, url_str: &str) -> Result<()> {
    validate_url(field_name, url_str)?;

    let url = Url::parse(url_str).map_err(|e| ProxyError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: url_str.to_string(),
        reason: format!("Invalid URL format: {}", e),
    })?;
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ProxyError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "Base URL cannot carry a query string or fragment".to_string(),
        });
    }
    Ok(())
}

/// Rejects values that still carry an unresolved `${VAR}` placeholder.
pub fn validate_resolved(field_name: &str, value: &str) -> Result<()> {
    if value.contains("${") {
        return Err(ProxyError::ConfigValidationError {
            field: field_name.to_string(),
            message: format!("unresolved environment placeholder in '{}'", value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("upstream.base_url", "https://markerapi.com/api/v2/trademarks").is_ok());
        assert!(validate_url("upstream.base_url", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("upstream.base_url", "").is_err());
        assert!(validate_url("upstream.base_url", "markerapi.com").is_err());
        assert!(validate_url("upstream.base_url", "ftp://markerapi.com").is_err());
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("upstream.base_url", "https://markerapi.com/api/v2/trademarks").is_ok());
        assert!(validate_base_url("upstream.base_url", "https://h/api?k=1").is_err());
        assert!(validate_base_url("upstream.base_url", "https://h/api#top").is_err());
        assert!(validate_base_url("upstream.base_url", "not a url").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("upstream.max_redirects", 5, 0, 20).is_ok());
        assert!(validate_range("upstream.max_redirects", 21, 0, 20).is_err());
    }

    #[test]
    fn test_validate_resolved() {
        assert!(validate_resolved("upstream.password", "secret").is_ok());
        assert!(validate_resolved("upstream.password", "${MARKER_API_PASSWORD}").is_err());
    }
}
