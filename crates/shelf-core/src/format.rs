//! Display formatting for prices, percentages and stock quantities.

/// `1234.5` → `"1 234.50 ₽"`. An empty currency omits the suffix.
pub fn format_amount(value: f64, currency: &str) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    let amount = format!("{sign}{}.{frac_part}", group_thousands(int_part));
    if currency.is_empty() {
        amount
    } else {
        format!("{amount} {currency}")
    }
}

/// `12.5` → `"12.5%"`, `20.0` → `"20%"`. The value is already a percentage.
pub fn format_percent(value: f64) -> String {
    format!("{}%", trim_decimal(value, 2))
}

/// `3.000` → `"3"`, `2.5` → `"2.5"`.
pub fn format_quantity(value: f64) -> String {
    trim_decimal(value, 3)
}

fn trim_decimal(value: f64, places: usize) -> String {
    let s = format!("{value:.places$}");
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    };
    if s == "-0" {
        "0".to_string()
    } else {
        s
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, "0.00 ₽")]
    #[case(5.0, "5.00 ₽")]
    #[case(999.999, "1 000.00 ₽")]
    #[case(1234.5, "1 234.50 ₽")]
    #[case(1234567.891, "1 234 567.89 ₽")]
    #[case(-42.1, "-42.10 ₽")]
    #[case(-0.001, "0.00 ₽")]
    fn amounts(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_amount(value, "₽"), expected);
    }

    #[test]
    fn amount_without_currency() {
        assert_eq!(format_amount(10.0, ""), "10.00");
    }

    #[rstest]
    #[case(12.5, "12.5%")]
    #[case(20.0, "20%")]
    #[case(33.333, "33.33%")]
    #[case(0.0, "0%")]
    fn percents(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_percent(value), expected);
    }

    #[rstest]
    #[case(3.0, "3")]
    #[case(2.5, "2.5")]
    #[case(0.125, "0.125")]
    #[case(-0.0, "0")]
    fn quantities(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_quantity(value), expected);
    }
}
