//! Phone number normalization.
//!
//! Contact keys are stored in national format so that one caller always
//! maps to one conversation thread regardless of how the telephony layer
//! formatted the number.

/// Normalize a raw phone number into a contact key.
///
/// Keeps digits and a leading `+`, then converts Japanese international
/// format (`+81…`) to national format (`0…`). Any other leading `+` is
/// stripped so country-coded numbers store without the symbol.
pub fn normalize_phone(raw: &str) -> String {
    let s: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if let Some(rest) = s.strip_prefix("+81") {
        if rest.is_empty() {
            return s;
        }
        if rest.starts_with('0') {
            return rest.to_string();
        }
        return format!("0{rest}");
    }

    s.strip_prefix('+').map(str::to_string).unwrap_or(s)
}
