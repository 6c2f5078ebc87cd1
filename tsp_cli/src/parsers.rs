use std::time::Duration;

use jiff::{SignedDuration, SpanRelativeTo};

fn parse_signed_duration(input: &str) -> Option<SignedDuration> {
    if let Ok(duration) = input.parse::<SignedDuration>() {
        return Some(duration);
    }

    if let Ok(duration) = input
        .parse::<jiff::Span>()
        .and_then(|span| span.to_duration(SpanRelativeTo::days_are_24_hours()))
    {
        return Some(duration);
    }

    input.parse::<i64>().ok().map(SignedDuration::from_secs)
}

/// Accepts `"10s"`, `"1m 30s"`, ISO 8601 (`"PT1M"`) or plain seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let duration = parse_signed_duration(input.trim())
        .ok_or_else(|| format!("Invalid duration '{}'", input))?;

    Duration::try_from(duration).map_err(|_| format!("Duration '{}' must not be negative", input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("10s"), Ok(Duration::from_secs(10)));
        assert_eq!(parse_duration("PT1M"), Ok(Duration::from_secs(60)));
        assert_eq!(parse_duration("45"), Ok(Duration::from_secs(45)));
        assert_eq!(parse_duration("500ms"), Ok(Duration::from_millis(500)));
    }

    #[test]
    fn test_parse_duration_rejects_garbage_and_negative() {
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("-5").is_err());
    }
}
