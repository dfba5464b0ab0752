//! Formatting for whole-unit amounts
//!
//! Amounts are plain `i64` whole currency units; this module only renders them
//! for people (terminal tables, insights, CSV exports).

/// Render with a currency symbol and thousands separators, e.g. `-$1,250`
pub fn format_amount(amount: i64, symbol: &str) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    format!("{}{}{}", sign, symbol, group_thousands(amount.unsigned_abs()))
}

/// Render a percentage with one decimal, e.g. `42.5%`
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
