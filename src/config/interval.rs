use super::ConfigError;

/// Suffixes accepted by `--interval`, largest first
const UNITS: [(char, u64); 4] = [('d', 86_400), ('h', 3_600), ('m', 60), ('s', 1)];

/// Parse `"30s"`, `"2m"`, `"1h"` or bare seconds into a number of seconds.
pub fn parse_interval(raw: &str) -> Result<u64, ConfigError> {
    let text = raw.trim().to_ascii_lowercase();
    let invalid = || ConfigError::Invalid(format!("bad interval {:?}, expected e.g. 30s or 1m", raw));

    let (digits, scale) = UNITS
        .iter()
        .find_map(|&(suffix, scale)| text.strip_suffix(suffix).map(|d| (d, scale)))
        .unwrap_or((text.as_str(), 1));

    let secs = digits
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(scale))
        .ok_or_else(invalid)?;

    if secs == 0 {
        return Err(invalid());
    }
    Ok(secs)
}

/// Shortest exact rendering of `secs`
pub fn format_interval(secs: u64) -> String {
    UNITS
        .iter()
        .find(|&&(_, scale)| secs >= scale && secs % scale == 0)
        .map(|&(suffix, scale)| format!("{}{}", secs / scale, suffix))
        .unwrap_or_else(|| format!("{}s", secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval_units() {
        assert_eq!(parse_interval("30s").unwrap(), 30);
        assert_eq!(parse_interval("2m").unwrap(), 120);
        assert_eq!(parse_interval("1h").unwrap(), 3_600);
        assert_eq!(parse_interval("45").unwrap(), 45);
        assert_eq!(parse_interval(" 10S ").unwrap(), 10);
    }

    #[test]
    fn test_parse_interval_rejects_garbage_and_zero() {
        assert!(parse_interval("soon").is_err());
        assert!(parse_interval("m").is_err());
        assert!(parse_interval("0s").is_err());
        assert!(parse_interval("-5").is_err());
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(30), "30s");
        assert_eq!(format_interval(60), "1m");
        assert_eq!(format_interval(90), "90s");
        assert_eq!(format_interval(7_200), "2h");
        assert_eq!(format_interval(0), "0s");
    }
}
