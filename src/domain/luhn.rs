//! Checksum arithmetic for card numbers.
//!
//! This is the exact variant used for all issued cards: digits at positions
//! -2, -4, ... from the right are doubled (a doubled value of ten or more is
//! replaced by the sum of its digits), the remaining digits left of the check
//! digit are added as-is, and the check digit is `(total * 9) % 10`. Numbers
//! generated under this formula stay valid across reimplementations, so the
//! formula itself must not drift.

/// Computes the check digit for a digit sequence whose final position is the
/// (ignored) check-digit slot.
pub fn checksum(digits: &[u8]) -> u8 {
    let doubled_sum: u32 = digits
        .iter()
        .rev()
        .skip(1)
        .step_by(2)
        .map(|&d| {
            let doubled = u32::from(d) * 2;
            if doubled >= 10 { doubled - 9 } else { doubled }
        })
        .sum();
    let other_sum: u32 = digits
        .iter()
        .rev()
        .skip(2)
        .step_by(2)
        .map(|&d| u32::from(d))
        .sum();

    (((doubled_sum + other_sum) * 9) % 10) as u8
}

/// Checks a full card number against its trailing check digit.
///
/// Non-digit input or anything shorter than two characters is simply
/// invalid; length and shape policing beyond that belongs to the caller.
pub fn validate(number: &str) -> bool {
    let Some(digits) = digits_of(number) else {
        return false;
    };
    match digits.split_last() {
        Some((last, rest)) if !rest.is_empty() => checksum(&digits) == *last,
        _ => false,
    }
}

fn digits_of(s: &str) -> Option<Vec<u8>> {
    s.chars()
        .map(|c| c.to_digit(10).map(|d| d as u8))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_known_numbers() {
        // 400000 + 844943340 + check digit 3
        let digits: Vec<u8> = "4000008449433403"
            .chars()
            .map(|c| c.to_digit(10).unwrap() as u8)
            .collect();
        assert_eq!(checksum(&digits), 3);

        // All-zero account identifier
        let digits: Vec<u8> = "4000000000000000"
            .chars()
            .map(|c| c.to_digit(10).unwrap() as u8)
            .collect();
        assert_eq!(checksum(&digits), 2);
    }

    #[test]
    fn test_validate_accepts_issued_numbers() {
        assert!(validate("4000008449433403"));
        assert!(validate("4000000000000002"));
    }

    #[test]
    fn test_validate_rejects_wrong_check_digit() {
        assert!(!validate("4000008449433404"));
        assert!(!validate("4000000000000000"));
    }

    #[test]
    fn test_validate_rejects_mutated_digit() {
        // Flipping any single non-check digit shifts the total by a nonzero
        // amount mod 10 for this number.
        let valid = "4000008449433403";
        for (i, c) in valid.char_indices().take(valid.len() - 1) {
            let flipped = if c == '9' { '0' } else { (c as u8 + 1) as char };
            let mut mutated: Vec<char> = valid.chars().collect();
            mutated[i] = flipped;
            let mutated: String = mutated.into_iter().collect();
            assert!(!validate(&mutated), "mutation at {i} slipped through");
        }
    }

    #[test]
    fn test_validate_tolerates_malformed_input() {
        assert!(!validate(""));
        assert!(!validate("7"));
        assert!(!validate("4000-0084-4943-3403"));
        assert!(!validate("not a card number"));
    }
}
