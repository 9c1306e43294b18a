//! Parsing of raw vote inputs.
//!
//! Inputs come straight from a text field. They are normalized, never rejected:
//! the leading integer of the text wins and anything without one is `None`.

/// Parse the integer prefix of `raw`.
///
/// Leading whitespace and one sign character are accepted, then decimal digits
/// up to the first non-digit. Values outside `i64` saturate.
///
/// ```
/// use srvote_core::input::parse_vote_input;
/// assert_eq!(parse_vote_input(" 12abc"), Some(12));
/// assert_eq!(parse_vote_input("3.9"), Some(3));
/// assert_eq!(parse_vote_input("-5"), Some(-5));
/// assert_eq!(parse_vote_input("abc"), None);
/// assert_eq!(parse_vote_input(""), None);
/// ```
pub fn parse_vote_input(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        seen = true;
        let d = i64::from(b - b'0');
        value = value.saturating_mul(10).saturating_add(d);
    }

    if !seen {
        return None;
    }
    Some(if negative { -value } else { value })
}
