//! `<number> <unit>` duration arguments, e.g. `timer 1 hr 5 min 2 sec`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationError {
    /// Empty input or an odd number of arguments.
    Unpaired,
    /// Negative, non-numeric, or non-finite amount.
    InvalidNumber(String),
    /// Finite amount with a fractional part.
    NonInteger(String),
    UnknownUnit(String),
    /// Sum of all pairs is zero.
    NotPositive,
    /// Sum does not fit in a `u64` second count.
    TooLarge,
}

impl fmt::Display for DurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationError::Unpaired => write!(f, "Duration must be in <number> <unit> pairs."),
            DurationError::InvalidNumber(text) => write!(f, "Invalid duration number: {text}"),
            DurationError::NonInteger(text) => {
                write!(f, "Duration number must be an integer: {text}")
            }
            DurationError::UnknownUnit(text) => write!(f, "Unknown unit: {text}"),
            DurationError::NotPositive => write!(f, "Total duration must be greater than zero."),
            DurationError::TooLarge => write!(f, "Total duration is too large."),
        }
    }
}

impl std::error::Error for DurationError {}

fn unit_seconds(unit: &str) -> Option<u64> {
    match unit.to_lowercase().as_str() {
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(3600),
        "m" | "min" | "mins" | "minute" | "minutes" => Some(60),
        "s" | "sec" | "secs" | "second" | "seconds" => Some(1),
        _ => None,
    }
}

fn parse_amount(text: &str) -> Result<u64, DurationError> {
    if let Ok(value) = text.trim().parse::<u64>() {
        return Ok(value);
    }
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| DurationError::InvalidNumber(text.to_string()))?;
    if !value.is_finite() || value < 0.0 {
        return Err(DurationError::InvalidNumber(text.to_string()));
    }
    if value.fract() != 0.0 {
        return Err(DurationError::NonInteger(text.to_string()));
    }
    if value > u64::MAX as f64 {
        return Err(DurationError::TooLarge);
    }
    Ok(value as u64)
}

/// Sum `<number> <unit>` pairs into total seconds.
pub fn parse_duration_args<S: AsRef<str>>(args: &[S]) -> Result<u64, DurationError> {
    if args.is_empty() || args.len() % 2 != 0 {
        return Err(DurationError::Unpaired);
    }
    let mut total: u64 = 0;
    for pair in args.chunks(2) {
        let amount = parse_amount(pair[0].as_ref())?;
        let unit = pair[1].as_ref();
        let multiplier =
            unit_seconds(unit).ok_or_else(|| DurationError::UnknownUnit(unit.to_string()))?;
        total = amount
            .checked_mul(multiplier)
            .and_then(|seconds| total.checked_add(seconds))
            .ok_or(DurationError::TooLarge)?;
    }
    if total == 0 {
        return Err(DurationError::NotPositive);
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<u64, DurationError> {
        let args: Vec<&str> = input.split_whitespace().collect();
        parse_duration_args(&args)
    }

    #[test]
    fn sums_pairs() {
        assert_eq!(parse("5 min 2 sec"), Ok(302));
        assert_eq!(parse("1 hr 1 m 1 s"), Ok(3661));
        assert_eq!(parse("2 HOURS"), Ok(7200));
        assert_eq!(parse("3.0 secs"), Ok(3));
    }

    #[test]
    fn rejects_zero_total() {
        assert_eq!(parse("0 sec"), Err(DurationError::NotPositive));
        assert_eq!(
            DurationError::NotPositive.to_string(),
            "Total duration must be greater than zero."
        );
    }

    #[test]
    fn rejects_unknown_unit() {
        assert_eq!(parse("5 mln"), Err(DurationError::UnknownUnit("mln".into())));
    }

    #[test]
    fn rejects_unpaired_arguments() {
        assert_eq!(parse(""), Err(DurationError::Unpaired));
        assert_eq!(parse("5 min 2"), Err(DurationError::Unpaired));
    }

    #[test]
    fn rejects_bad_amounts() {
        assert_eq!(parse("-1 sec"), Err(DurationError::InvalidNumber("-1".into())));
        assert_eq!(parse("five sec"), Err(DurationError::InvalidNumber("five".into())));
        assert_eq!(parse("1.5 min"), Err(DurationError::NonInteger("1.5".into())));
    }

    #[test]
    fn rejects_overflow() {
        let huge = format!("{} hours", u64::MAX);
        assert_eq!(parse(&huge), Err(DurationError::TooLarge));
    }
}
