use crate::utils::error::{InteractionError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(InteractionError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Each entry must be strictly greater than the one before it.
pub fn validate_ascending(field_name: &str, values: &[(&str, u32)]) -> Result<()> {
    for pair in values.windows(2) {
        let (lower_name, lower) = pair[0];
        let (upper_name, upper) = pair[1];
        if upper <= lower {
            return Err(InteractionError::InvalidConfigValueError {
                field: format!("{}.{}", field_name, upper_name),
                value: upper.to_string(),
                reason: format!("Must be greater than {} ({})", lower_name, lower),
            });
        }
    }
    Ok(())
}

pub fn validate_log_format(field_name: &str, value: &str) -> Result<()> {
    match value {
        "compact" | "json" => Ok(()),
        other => Err(InteractionError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: other.to_string(),
            reason: "Supported formats: compact, json".to_string(),
        }),
    }
}
