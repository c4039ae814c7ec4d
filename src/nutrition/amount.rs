/// Whole numbers print without a decimal part, anything else with two.
pub fn format_amount(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(540.0), "540");
        assert_eq!(format_amount(-901.0), "-901");
        assert_eq!(format_amount(10.4), "10.40");
        assert_eq!(format_amount(0.0), "0");
    }
}
