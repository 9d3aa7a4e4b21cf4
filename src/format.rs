//! Display formatting for money and dates. Pure functions, no locale state;
//! numerals are grouped en-US style and dates rendered "Jan 05, 2024".

use chrono::NaiveDate;

/// Group an integer with thousands separators.
fn format_grouped_int(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Integer-rounded grouped numeral. Missing values render as "0".
pub fn format_currency(value: Option<f64>) -> String {
    let Some(v) = value else {
        return "0".to_string();
    };
    format_grouped_int(v.round() as i64)
}

/// Grouped numeral fixed to exactly two fractional digits. Missing values
/// render as "0.00".
pub fn format_currency_with_decimals(value: Option<f64>) -> String {
    let Some(v) = value else {
        return "0.00".to_string();
    };

    let rounded = format!("{:.2}", v);
    let (whole, frac) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let negative = whole.starts_with('-');
    let digits = if negative { &whole[1..] } else { whole };
    let grouped = format_grouped_int(digits.parse::<i64>().unwrap_or(0));

    if negative {
        format!("-{}.{}", grouped, frac)
    } else {
        format!("{}.{}", grouped, frac)
    }
}

/// Render a `YYYY-MM-DD` date in short form. Empty input yields the empty
/// string; unparseable input is echoed back unchanged.
pub fn format_date(date: &str) -> String {
    if date.is_empty() {
        return String::new();
    }
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => d.format("%b %d, %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Strip a phone number down to its digits, e.g. for wa.me-style links.
pub fn format_phone_number(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

pub fn calculate_percentage(value: f64, percentage: f64) -> f64 {
    value * percentage / 100.0
}

/// Round to two decimal places by rounding the scaled integer. Exactness is
/// bounded by IEEE-754: `round_to_two(1.005)` is `1.0` because the scaled
/// value is just below 100.5. Exact halves round away from zero, so
/// `round_to_two(-0.125)` is `-0.13`, not `-0.12`.
pub fn round_to_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
