pub fn format_distance(distance: f64) -> String {
    format!("{distance:.3}")
}

pub fn format_rate(rate: f64) -> String {
    format!("{rate:.2}")
}

/// Formats a 0..1 fraction as a percentage with one decimal.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_numbers_for_display() {
        assert_eq!(format_distance(0.1234), "0.123");
        assert_eq!(format_rate(0.85), "0.85");
        assert_eq!(format_rate(1.0), "1.00");
        assert_eq!(format_percent(0.9), "90.0%");
        assert_eq!(format_percent(0.0), "0.0%");
    }
}
