use regex::Regex;

use crate::errors::{CoreError, CoreResult};

pub const MAX_NAME_LENGTH: usize = 255;
pub const MAX_EMAIL_LENGTH: usize = 320;
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Static validators applied before any repository call.
pub struct ValidationService;

impl ValidationService {
    /// Trim and bound a required display name or title.
    pub fn validate_name(field: &str, value: &str) -> CoreResult<String> {
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(CoreError::invalid_field(field, format!("{} cannot be empty", field)));
        }

        if trimmed.chars().count() > MAX_NAME_LENGTH {
            return Err(CoreError::invalid_field(
                field,
                format!("{} is too long (max {} characters)", field, MAX_NAME_LENGTH),
            ));
        }

        Ok(trimmed.to_string())
    }

    pub fn validate_slug(slug: &str) -> CoreResult<String> {
        let trimmed = slug.trim();

        if trimmed.len() > MAX_NAME_LENGTH {
            return Err(CoreError::invalid_field(
                "slug",
                format!("slug is too long (max {} characters)", MAX_NAME_LENGTH),
            ));
        }

        let regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$")
            .map_err(|e| CoreError::internal(format!("Failed to compile slug regex: {}", e)))?;
        if !regex.is_match(trimmed) {
            return Err(CoreError::invalid_field(
                "slug",
                "slug may only contain lowercase letters, digits and single hyphens",
            ));
        }

        Ok(trimmed.to_string())
    }

    pub fn validate_email(email: &str) -> CoreResult<String> {
        let email = email.trim();

        if email.is_empty() {
            return Err(CoreError::invalid_field("email", "Email cannot be empty"));
        }

        if email.len() > MAX_EMAIL_LENGTH {
            return Err(CoreError::invalid_field("email", "Email is too long"));
        }

        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() != 2 {
            return Err(CoreError::invalid_field(
                "email",
                "Invalid email format: must contain exactly one @",
            ));
        }

        let (local_part, domain_part) = (parts[0], parts[1]);

        if local_part.is_empty() || domain_part.is_empty() {
            return Err(CoreError::invalid_field(
                "email",
                "Invalid email format: local and domain parts are required",
            ));
        }

        if !domain_part.contains('.') || domain_part.starts_with('.') || domain_part.ends_with('.')
        {
            return Err(CoreError::invalid_field(
                "email",
                "Invalid email format: domain must be dotted",
            ));
        }

        Ok(email.to_string())
    }

    pub fn validate_amount(field: &str, amount: f64) -> CoreResult<f64> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(CoreError::invalid_field(
                field,
                format!("{} must be a non-negative number", field),
            ));
        }
        Ok(amount)
    }

    /// Rates and occupancy are percentages.
    pub fn validate_percentage(field: &str, value: f64) -> CoreResult<f64> {
        if !value.is_finite() || !(0.0..=100.0).contains(&value) {
            return Err(CoreError::invalid_field(
                field,
                format!("{} must be between 0 and 100", field),
            ));
        }
        Ok(value)
    }

    pub fn validate_layer_order(order: i32) -> CoreResult<i32> {
        if order < 1 {
            return Err(CoreError::invalid_field("layer_order", "layer_order must be at least 1"));
        }
        Ok(order)
    }

    pub fn validate_funded_amount(funded_amount: f64, amount: f64) -> CoreResult<()> {
        Self::validate_amount("funded_amount", funded_amount)?;
        if funded_amount > amount {
            return Err(CoreError::invalid_field(
                "funded_amount",
                "funded_amount cannot exceed amount",
            ));
        }
        Ok(())
    }

    pub fn validate_investment_bounds(minimum: Option<f64>, maximum: Option<f64>) -> CoreResult<()> {
        if let Some(min) = minimum {
            Self::validate_amount("minimum_investment", min)?;
        }
        if let Some(max) = maximum {
            Self::validate_amount("maximum_investment", max)?;
        }
        if let (Some(min), Some(max)) = (minimum, maximum) {
            if min > max {
                return Err(CoreError::invalid_field(
                    "minimum_investment",
                    "minimum_investment cannot exceed maximum_investment",
                ));
            }
        }
        Ok(())
    }

    pub fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> CoreResult<()> {
        if let Some(lat) = latitude {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(CoreError::invalid_field("latitude", "latitude out of range"));
            }
        }
        if let Some(lng) = longitude {
            if !(-180.0..=180.0).contains(&lng) {
                return Err(CoreError::invalid_field("longitude", "longitude out of range"));
            }
        }
        Ok(())
    }

    pub fn validate_upload(bytes: &[u8]) -> CoreResult<()> {
        if bytes.is_empty() {
            return Err(CoreError::invalid_field("file", "file cannot be empty"));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(CoreError::invalid_field("file", "file exceeds the 25 MiB limit"));
        }
        Ok(())
    }

    /// Lower-case, hyphen-separated form of a title for storage keys.
    pub fn slugify(value: &str) -> String {
        let mut slug = String::with_capacity(value.len());
        let mut pending_hyphen = false;

        for c in value.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(c.to_ascii_lowercase());
            } else {
                pending_hyphen = true;
            }
        }

        if slug.is_empty() {
            "file".to_string()
        } else {
            slug
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CoreErrorKind;

    #[test]
    fn slugs() {
        assert!(ValidationService::validate_slug("riverside-lofts-2").is_ok());
        assert!(ValidationService::validate_slug("Riverside").is_err());
        assert!(ValidationService::validate_slug("double--hyphen").is_err());
        assert!(ValidationService::validate_slug("-leading").is_err());
        assert!(ValidationService::validate_slug(&"a".repeat(256)).is_err());
    }

    #[test]
    fn emails() {
        assert_eq!(
            ValidationService::validate_email(" ops@example.com ").expect("valid"),
            "ops@example.com"
        );
        assert!(ValidationService::validate_email("no-at.example.com").is_err());
        assert!(ValidationService::validate_email("a@b@c.com").is_err());
        assert!(ValidationService::validate_email("ops@localhost").is_err());
        assert!(ValidationService::validate_email("ops@.example.com").is_err());
    }

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(
            ValidationService::validate_name("name", "  Harbor Point ").expect("valid"),
            "Harbor Point"
        );
        let err = ValidationService::validate_name("name", "   ").unwrap_err();
        assert_eq!(err.kind(), CoreErrorKind::InvalidInput);
        assert_eq!(err.fields().and_then(|f| f.get("field")).map(String::as_str), Some("name"));
        assert!(ValidationService::validate_name("name", &"x".repeat(256)).is_err());
    }

    #[test]
    fn numeric_bounds() {
        assert!(ValidationService::validate_amount("amount", -1.0).is_err());
        assert!(ValidationService::validate_amount("amount", f64::NAN).is_err());
        assert!(ValidationService::validate_percentage("interest_rate", 100.5).is_err());
        assert!(ValidationService::validate_layer_order(0).is_err());
        assert!(ValidationService::validate_funded_amount(500.0, 400.0).is_err());
        assert!(ValidationService::validate_funded_amount(400.0, 400.0).is_ok());
        assert!(ValidationService::validate_investment_bounds(Some(10.0), Some(5.0)).is_err());
        assert!(ValidationService::validate_investment_bounds(Some(5.0), None).is_ok());
    }

    #[test]
    fn uploads_are_bounded() {
        assert!(ValidationService::validate_upload(&[]).is_err());
        assert!(ValidationService::validate_upload(b"%PDF").is_ok());
    }

    #[test]
    fn slugify_titles() {
        assert_eq!(ValidationService::slugify("Q3 Financial Report (Final)"), "q3-financial-report-final");
        assert_eq!(ValidationService::slugify("***"), "file");
    }
}
