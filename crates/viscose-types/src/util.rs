/// Render a score the way a spreadsheet user typed it: integral values without
/// a fractional part, everything else as-is.
pub fn format_score(value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() <= 1e-6 && rounded.abs() < 1e15 {
        format!("{}", rounded as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(120.0), "120");
        assert_eq!(format_score(119.9999999), "120");
        assert_eq!(format_score(87.5), "87.5");
        assert_eq!(format_score(-3.0), "-3");
    }
}
