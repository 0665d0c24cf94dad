/*!
Decimal rounding of sensor values.

Values are rounded half-up (ties away from zero) on the shortest decimal
text that round-trips the `f32`, so a sensor reading of `1.2345` rounds to
`1.235` at three places even though its binary value is slightly off.
*/

/// Round a sensor value to `places` decimal digits.
///
/// Non-finite values are returned unchanged.
pub fn round_half_up(value: f32, places: u32) -> f64 {
    if !value.is_finite() {
        return f64::from(value);
    }

    let rounded = round_decimal_text(&value.to_string(), places as usize)
        .parse::<f64>()
        .unwrap_or_else(|_| f64::from(value));

    // No negative zero in the output
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Round a plain decimal string (no exponent) to `places` fractional digits
fn round_decimal_text(text: &str, places: usize) -> String {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));

    if frac_part.len() <= places {
        return text.to_string();
    }

    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(places))
        .collect();

    if frac_part.as_bytes()[places] >= b'5' {
        let mut i = kept.len();
        loop {
            if i == 0 {
                kept.insert(0, b'1');
                break;
            }
            i -= 1;
            if kept[i] == b'9' {
                kept[i] = b'0';
            } else {
                kept[i] += 1;
                break;
            }
        }
    }

    let int_len = kept.len() - places;
    let mut out = String::with_capacity(kept.len() + 2);
    if negative {
        out.push('-');
    }
    out.extend(kept[..int_len].iter().map(|&d| d as char));
    if places > 0 {
        out.push('.');
        out.extend(kept[int_len..].iter().map(|&d| d as char));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_up_boundary() {
        assert_eq!(round_half_up(1.2345, 3), 1.235);
        assert_eq!(round_half_up(1.2344, 3), 1.234);
        assert_eq!(round_half_up(-1.2345, 3), -1.235);
    }

    #[test]
    fn test_carry_propagation() {
        assert_eq!(round_half_up(9.9996, 3), 10.0);
        assert_eq!(round_half_up(0.9995, 3), 1.0);
        assert_eq!(round_half_up(2.5, 0), 3.0);
    }

    #[test]
    fn test_short_values_unchanged() {
        assert_eq!(round_half_up(42.0, 3), 42.0);
        assert_eq!(round_half_up(0.1, 6), 0.1);
        assert_eq!(round_half_up(36.6, 3), 36.6);
    }

    #[test]
    fn test_precision_is_respected() {
        assert_eq!(round_half_up(3.1415927, 6), 3.141593);
        assert_eq!(round_half_up(3.1415927, 3), 3.142);
        assert_eq!(round_half_up(3.1415927, 0), 3.0);
    }

    #[test]
    fn test_no_negative_zero() {
        let rounded = round_half_up(-0.0001, 3);
        assert_eq!(rounded, 0.0);
        assert!(rounded.is_sign_positive());
    }

    #[test]
    fn test_non_finite_passthrough() {
        assert!(round_half_up(f32::NAN, 3).is_nan());
        assert_eq!(round_half_up(f32::INFINITY, 3), f64::INFINITY);
    }

    #[test]
    fn test_round_decimal_text() {
        assert_eq!(round_decimal_text("1.2345", 3), "1.235");
        assert_eq!(round_decimal_text("99.95", 1), "100.0");
        assert_eq!(round_decimal_text("-0.05", 1), "-0.1");
        assert_eq!(round_decimal_text("7", 2), "7");
    }
}
