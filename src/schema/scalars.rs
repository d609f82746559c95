/// Custom scalars for the executable schema
///
/// `Date` and `DateTime` validate ISO 8601 strings when a schema uses them
/// without declaring them. Any other scalar or unknown type name is an
/// opaque pass-through scalar, since column values already arrive as
/// strings, numbers or booleans.

use async_graphql::dynamic::Scalar;
use async_graphql::Value;
use chrono::{DateTime as ChronoDateTime, NaiveDate};

pub const DATE: &str = "Date";
pub const DATE_TIME: &str = "DateTime";

const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

pub fn is_builtin_scalar(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name)
}

/// Scalar registered for `name` when the schema references it
pub fn scalar_for(name: &str) -> Scalar {
    match name {
        DATE => date_scalar(),
        DATE_TIME => datetime_scalar(),
        _ => Scalar::new(name),
    }
}

/// ISO 8601 date scalar (YYYY-MM-DD)
fn date_scalar() -> Scalar {
    Scalar::new(DATE)
        .description("ISO 8601 date format (YYYY-MM-DD)")
        .validator(|value| match value {
            Value::String(s) => is_valid_date(s),
            _ => false,
        })
}

/// ISO 8601 datetime scalar with timezone
fn datetime_scalar() -> Scalar {
    Scalar::new(DATE_TIME)
        .description("ISO 8601 datetime format with timezone")
        .validator(|value| match value {
            Value::String(s) => is_valid_datetime(s),
            _ => false,
        })
}

pub fn is_valid_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

pub fn is_valid_datetime(s: &str) -> bool {
    ChronoDateTime::parse_from_rfc3339(s).is_ok()
}
