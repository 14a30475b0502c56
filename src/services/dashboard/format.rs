//! pt-BR rendering for KPI values.

/// `R$ 15.000,00`
pub fn currency(value: f64) -> String {
    let (negative, body) = localized(value, 2, false);
    if negative {
        format!("-R$ {}", body)
    } else {
        format!("R$ {}", body)
    }
}

/// Ratio rendered as a percentage with one decimal, e.g. `0.125` -> `12.5%`.
pub fn percentage(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// Up to three decimals, trailing zeros dropped, `.` as thousands separator.
pub fn number(value: f64) -> String {
    let (negative, body) = localized(value, 3, true);
    if negative {
        format!("-{}", body)
    } else {
        body
    }
}

fn localized(value: f64, decimals: usize, trim_zeros: bool) -> (bool, String) {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let frac = if trim_zeros {
        frac_part.trim_end_matches('0')
    } else {
        frac_part
    };
    let is_zero = int_part.chars().all(|c| c == '0') && frac.chars().all(|c| c == '0');

    let grouped = group_thousands(int_part);
    let body = if frac.is_empty() {
        grouped
    } else {
        format!("{},{}", grouped, frac)
    };
    (value < 0.0 && !is_zero, body)
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
