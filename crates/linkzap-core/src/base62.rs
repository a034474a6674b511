//! Fixed-width base62 codec used to turn counter values into short codes.

use crate::error::CoreError;

/// Symbols in ascending digit order. The first symbol doubles as the pad character.
pub const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Default width of an encoded short code.
pub const DEFAULT_LENGTH: usize = 7;

const BASE: u64 = ALPHABET.len() as u64;

/// Encodes `value` in base62, left-padded with [`ALPHABET`]'s zero symbol to `length`.
///
/// Values that need more than `length` digits are emitted in full rather than
/// truncated, so the output is longer than `length` in that case. Zero encodes
/// as `length` zero symbols.
///
/// # Examples
///
/// ```
/// use linkzap_core::base62;
///
/// assert_eq!(base62::encode(0, 7), "0000000");
/// assert_eq!(base62::encode(61, 7), "000000z");
/// assert_eq!(base62::encode(62, 3), "010");
/// ```
pub fn encode(value: u64, length: usize) -> String {
    let mut digits = Vec::with_capacity(length.max(11));
    let mut rest = value;
    while rest > 0 {
        digits.push(ALPHABET[(rest % BASE) as usize]);
        rest /= BASE;
    }

    while digits.len() < length {
        digits.push(ALPHABET[0]);
    }
    digits.reverse();

    // Every byte comes from ALPHABET, which is ASCII.
    digits.into_iter().map(char::from).collect()
}

/// Decodes a base62 string produced by [`encode`]. Leading zero symbols are ignored.
pub fn decode(code: &str) -> Result<u64, CoreError> {
    if code.is_empty() {
        return Err(CoreError::InvalidShortCode(
            "cannot decode an empty code".to_string(),
        ));
    }

    code.bytes().try_fold(0u64, |acc, byte| {
        let digit = digit_of(byte).ok_or_else(|| {
            CoreError::InvalidShortCode(format!(
                "'{}' is not a base62 symbol in '{}'",
                char::from(byte),
                code
            ))
        })?;
        acc.checked_mul(BASE)
            .and_then(|shifted| shifted.checked_add(digit))
            .ok_or_else(|| CoreError::InvalidShortCode(format!("'{code}' overflows u64")))
    })
}

/// Returns `true` if every byte of `code` belongs to [`ALPHABET`].
pub fn is_base62(code: &str) -> bool {
    code.bytes().all(|b| digit_of(b).is_some())
}

fn digit_of(byte: u8) -> Option<u64> {
    let digit = match byte {
        b'0'..=b'9' => byte - b'0',
        b'A'..=b'Z' => byte - b'A' + 10,
        b'a'..=b'z' => byte - b'a' + 36,
        _ => return None,
    };
    Some(u64::from(digit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_all_pad_symbols() {
        assert_eq!(encode(0, 7), "0000000");
        assert_eq!(encode(0, 3), "000");
    }

    #[test]
    fn digit_boundaries() {
        assert_eq!(encode(9, 1), "9");
        assert_eq!(encode(10, 1), "A");
        assert_eq!(encode(35, 1), "Z");
        assert_eq!(encode(36, 1), "a");
        assert_eq!(encode(61, 1), "z");
        assert_eq!(encode(62, 1), "10");
    }

    #[test]
    fn seeded_counter_values_are_seven_symbols() {
        let first = encode(1_000_000_001, DEFAULT_LENGTH);
        let second = encode(1_000_000_002, DEFAULT_LENGTH);

        assert_eq!(first, "015ftgH");
        assert_eq!(second, "015ftgI");
        assert_eq!(first.len(), 7);
    }

    #[test]
    fn largest_fixed_width_value_fits() {
        let max = BASE.pow(7) - 1;
        assert_eq!(encode(max, 7), "zzzzzzz");
        assert_eq!(decode("zzzzzzz").unwrap(), max);
    }

    #[test]
    fn overflowing_width_emits_longer_code() {
        let code = encode(BASE.pow(7), 7);
        assert_eq!(code, "10000000");
        assert_eq!(decode(&code).unwrap(), BASE.pow(7));
    }

    #[test]
    fn round_trip_across_range() {
        let samples = [
            0,
            1,
            61,
            62,
            3_843,
            1_000_000_000,
            9_999_999_999,
            BASE.pow(6),
            BASE.pow(7) - 1,
        ];

        for n in samples {
            let code = encode(n, DEFAULT_LENGTH);
            assert_eq!(code.len(), DEFAULT_LENGTH, "width of {n}");
            assert_eq!(decode(&code).unwrap(), n, "round trip of {n}");
        }
    }

    #[test]
    fn decode_rejects_foreign_symbols() {
        assert!(decode("abc-123").is_err());
        assert!(decode("").is_err());
        assert!(decode("zzzzzzzzzzzzzzzzzzzz").is_err());
    }

    #[test]
    fn encoding_preserves_order_at_fixed_width() {
        let a = encode(1_000_000_001, 7);
        let b = encode(1_000_000_002, 7);
        assert!(a < b);
    }
}
