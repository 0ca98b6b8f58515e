use crate::utils::error::{FinderError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> FinderError {
    FinderError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_catalog_path(field_name: &str, path: &str, allowed_extensions: &[&str]) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    match std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(ext) if allowed_extensions.contains(&ext.to_ascii_lowercase().as_str()) => Ok(()),
        Some(ext) => Err(invalid(
            field_name,
            path,
            format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                ext,
                allowed_extensions.join(", ")
            ),
        )),
        None => Err(invalid(
            field_name,
            path,
            "File has no extension or invalid filename",
        )),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be at least {}", min_value),
        ));
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| FinderError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    // NaN 也會落在這裡
    if !(value >= min && value <= max) {
        return Err(invalid(
            field_name,
            value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("recommendation.endpoint", "https://example.com").is_ok());
        assert!(validate_url("recommendation.endpoint", "http://localhost:8080/score").is_ok());
        assert!(validate_url("recommendation.endpoint", "").is_err());
        assert!(validate_url("recommendation.endpoint", "invalid-url").is_err());
        assert!(validate_url("recommendation.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_catalog_path() {
        assert!(validate_catalog_path("catalog.path", "data/atms.csv", &["csv", "json"]).is_ok());
        assert!(validate_catalog_path("catalog.path", "data/ATMS.JSON", &["csv", "json"]).is_ok());
        assert!(validate_catalog_path("catalog.path", "data/atms.xlsx", &["csv", "json"]).is_err());
        assert!(validate_catalog_path("catalog.path", "data/atms", &["csv", "json"]).is_err());
        assert!(validate_catalog_path("catalog.path", "  ", &["csv", "json"]).is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("ranking.shortlist_size", 5, 1).is_ok());
        assert!(validate_positive_number("ranking.shortlist_size", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range_rejects_nan() {
        assert!(validate_range("location.latitude", 39.87, -90.0, 90.0).is_ok());
        assert!(validate_range("location.latitude", 91.0, -90.0, 90.0).is_err());
        assert!(validate_range("location.latitude", f64::NAN, -90.0, 90.0).is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let token: Option<String> = None;
        assert!(matches!(
            validate_required_field("routing.access_token", &token),
            Err(FinderError::MissingConfigError { .. })
        ));
    }
}
