//! Short pairing code generation and normalization.
//!
//! Codes are 6-character strings over Crockford's Base32 alphabet, chosen so
//! they survive being read aloud or typed from a partner's screen. Lookup is
//! forgiving: input is uppercased and the easily-confused letters are folded
//! onto the digits they resemble before comparison.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::user::ShortCode;

const CROCKFORD: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ"; // no I, L, O, U

/// Length of a pairing code in characters.
pub const CODE_LEN: usize = 6;

/// Generate a random pairing code.
///
/// Uniqueness is not guaranteed here; the registry checks the generated code
/// against the store and regenerates on collision.
pub fn generate() -> ShortCode {
    let mut rng = StdRng::from_os_rng();
    let mut s = String::with_capacity(CODE_LEN);
    for _ in 0..CODE_LEN {
        let idx = rng.random_range(0..CROCKFORD.len());
        s.push(CROCKFORD[idx] as char);
    }
    ShortCode::from_normalized(s)
}

/// Normalize user-entered code text for lookup.
///
/// Uppercases, trims surrounding whitespace, and folds O to 0 and I/L to 1.
/// Characters outside the alphabet are kept as-is; they simply will not match
/// any issued code.
pub fn normalize(input: &str) -> ShortCode {
    let folded: String = input
        .trim()
        .chars()
        .map(|c| match c.to_ascii_uppercase() {
            'O' => '0',
            'I' | 'L' => '1',
            upper => upper,
        })
        .collect();
    ShortCode::from_normalized(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_differ() {
        let one = generate();
        let two = generate();
        assert_ne!(one, two);
    }

    #[test]
    fn generated_codes_have_correct_length_and_alphabet() {
        let code = generate();
        assert_eq!(code.as_str().len(), CODE_LEN);
        for c in code.as_str().bytes() {
            assert!(CROCKFORD.contains(&c), "unexpected character {c}");
        }
    }

    #[test]
    fn generated_codes_are_already_normalized() {
        for _ in 0..32 {
            let code = generate();
            assert_eq!(normalize(code.as_str()), code);
        }
    }

    #[test]
    fn normalize_uppercases_and_trims() {
        assert_eq!(normalize("  ab12cd "), ShortCode::from_normalized("AB12CD"));
    }

    #[test]
    fn normalize_folds_confusable_letters() {
        assert_eq!(normalize("oil2cd"), ShortCode::from_normalized("0112CD"));
        assert_eq!(normalize("OIL2CD"), ShortCode::from_normalized("0112CD"));
    }
}
