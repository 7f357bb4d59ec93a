use crate::utils::error::{EtlError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_ordered<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    lower: T,
    upper: T,
) -> Result<()> {
    if lower > upper {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("{}..={}", lower, upper),
            reason: format!("Lower bound {} is greater than upper bound {}", lower, upper),
        });
    }
    Ok(())
}

pub fn validate_positive_rate(field_name: &str, rate: f64) -> Result<()> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: rate.to_string(),
            reason: "Rate must be a positive, finite number".to_string(),
        });
    }
    Ok(())
}
