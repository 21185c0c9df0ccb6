use std::time::Duration;

use promql_parser::util::{display_duration, parse_duration as parse_promql_duration};

use crate::ValidationError;

/// Parses a Prometheus-style duration (`90s`, `1h30m`, `250ms`) or a plain
/// number of seconds (`15`, `0.5`).
pub fn parse_duration(input: &str) -> Result<Duration, ValidationError> {
    let value = input.trim();
    let invalid = || ValidationError::InvalidDuration {
        value: input.to_owned(),
    };

    if let Ok(seconds) = value.parse::<f64>() {
        return Duration::try_from_secs_f64(seconds).map_err(|_| invalid());
    }

    parse_promql_duration(value).map_err(|_| invalid())
}

/// Renders a duration in the compact form accepted by [`parse_duration`].
pub fn format_duration(duration: Duration) -> String {
    display_duration(&duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compound_duration() {
        let parsed = parse_duration("1h30m").expect("must parse");
        assert_eq!(parsed, Duration::from_secs(5_400));
    }

    #[test]
    fn parses_float_seconds() {
        let parsed = parse_duration("0.5").expect("must parse");
        assert_eq!(parsed, Duration::from_millis(500));
    }

    #[test]
    fn rejects_unknown_unit() {
        let err = parse_duration("5x").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidDuration { .. }));
    }

    #[test]
    fn rejects_negative_seconds() {
        assert!(parse_duration("-3").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn rejects_out_of_range_and_non_finite_seconds() {
        for raw in ["1e30", "inf", "NaN"] {
            let err = parse_duration(raw).expect_err("must fail");
            assert_eq!(
                err,
                ValidationError::InvalidDuration {
                    value: raw.to_owned()
                }
            );
        }
    }

    #[test]
    fn formats_largest_units_first() {
        assert_eq!(format_duration(Duration::from_secs(600)), "10m");
        assert_eq!(format_duration(Duration::from_secs(5_400)), "1h30m");
        assert_eq!(format_duration(Duration::from_millis(1_250)), "1s250ms");
        assert_eq!(format_duration(Duration::ZERO), "0s");
    }
}
