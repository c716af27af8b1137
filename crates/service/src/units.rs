//! Human-friendly durations and byte sizes for flags and config files

use std::time::Duration;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UnitError {
    #[error("empty value")]
    Empty,
    #[error("invalid number: {0}")]
    InvalidNumber(String),
    #[error("unknown unit {0:?} (use {1})")]
    UnknownUnit(String, &'static str),
    #[error("value must be greater than zero")]
    NotPositive,
}

/// Parse a duration such as `90s`, `15m`, `1h` or `7d`
///
/// A bare number is taken as seconds.
pub fn parse_duration(value: &str) -> Result<Duration, UnitError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(UnitError::Empty);
    }

    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (num_str, unit) = value.split_at(split);
    let amount: u64 = num_str
        .parse()
        .map_err(|_| UnitError::InvalidNumber(num_str.to_string()))?;

    let multiplier = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        other => return Err(UnitError::UnknownUnit(other.to_string(), "s, m, h or d")),
    };

    let secs = amount
        .checked_mul(multiplier)
        .ok_or_else(|| UnitError::InvalidNumber(num_str.to_string()))?;
    if secs == 0 {
        return Err(UnitError::NotPositive);
    }
    Ok(Duration::from_secs(secs))
}

/// Parse a byte size such as `512KB`, `1.5MB` or `1G` (binary multiples, case-insensitive)
pub fn parse_byte_size(value: &str) -> Result<usize, UnitError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(UnitError::Empty);
    }

    let split = value
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(value.len());
    let (num_str, unit) = value.split_at(split);
    if num_str.is_empty() {
        return Err(UnitError::InvalidNumber(value.to_string()));
    }
    let amount: f64 = num_str
        .parse()
        .map_err(|_| UnitError::InvalidNumber(num_str.to_string()))?;

    let multiplier: f64 = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1.0,
        "K" | "KB" => 1024.0,
        "M" | "MB" => 1024.0 * 1024.0,
        "G" | "GB" => 1024.0 * 1024.0 * 1024.0,
        other => return Err(UnitError::UnknownUnit(other.to_string(), "B, KB, MB or GB")),
    };

    let bytes = (amount * multiplier) as usize;
    if bytes == 0 {
        return Err(UnitError::NotPositive);
    }
    Ok(bytes)
}

/// Render a byte count the way people read it: `512 B`, `1.5 KB`, `10.0 MB`
pub fn format_bytes(bytes: usize) -> String {
    const UNIT: usize = 1024;
    if bytes < UNIT {
        return format!("{} B", bytes);
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT && exp < 4 {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }
    let prefix = ['K', 'M', 'G', 'T', 'P'][exp];
    format!("{:.1} {}B", bytes as f64 / div as f64, prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        let cases = [
            ("30", 30),
            ("30s", 30),
            ("15m", 15 * 60),
            ("1h", 3600),
            ("1H", 3600),
            ("2d", 2 * 86400),
            (" 5m ", 300),
            ("10 m", 600),
        ];
        for (input, secs) in cases {
            assert_eq!(
                parse_duration(input).unwrap(),
                Duration::from_secs(secs),
                "{input:?}"
            );
        }
    }

    #[test]
    fn test_parse_duration_errors() {
        assert_eq!(parse_duration(""), Err(UnitError::Empty));
        assert_eq!(parse_duration("   "), Err(UnitError::Empty));
        assert_eq!(parse_duration("0h"), Err(UnitError::NotPositive));
        assert!(matches!(parse_duration("h"), Err(UnitError::InvalidNumber(_))));
        assert!(matches!(parse_duration("-5m"), Err(UnitError::InvalidNumber(_))));
        assert!(matches!(parse_duration("5w"), Err(UnitError::UnknownUnit(..))));
        assert!(matches!(parse_duration("1h30m"), Err(UnitError::UnknownUnit(..))));
    }

    #[test]
    fn test_parse_byte_size() {
        let cases = [
            ("100B", 100),
            ("100", 100),
            ("1KB", 1024),
            ("1K", 1024),
            ("10MB", 10 * 1024 * 1024),
            ("10M", 10 * 1024 * 1024),
            ("1GB", 1024 * 1024 * 1024),
            ("1G", 1024 * 1024 * 1024),
            ("1.5MB", (1.5 * 1024.0 * 1024.0) as usize),
            ("0.5KB", 512),
            ("10mb", 10 * 1024 * 1024),
            ("10Mb", 10 * 1024 * 1024),
            ("512kb", 512 * 1024),
            ("  10MB", 10 * 1024 * 1024),
            ("10MB  ", 10 * 1024 * 1024),
            ("10 MB", 10 * 1024 * 1024),
        ];
        for (input, bytes) in cases {
            assert_eq!(parse_byte_size(input).unwrap(), bytes, "{input:?}");
        }
    }

    #[test]
    fn test_parse_byte_size_errors() {
        for input in ["", "   ", "MB", "10TB", "10PB", "abc", "0", "0MB", "1.2.3MB"] {
            assert!(parse_byte_size(input).is_err(), "{input:?} should fail");
        }
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(10 * 1024 * 1024), "10.0 MB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GB");
    }
}
