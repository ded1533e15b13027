//! Pure card-data checks run before any payment is authorized.
//!
//! Card numbers are normalized (spaces and dashes stripped) before the
//! length, digit, and Luhn checks. Nothing here touches the database; the
//! raw card data never leaves this module except as the last four digits.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CardValidationError {
    #[error("Invalid card number")]
    InvalidCardNumber,
    #[error("Invalid or expired card")]
    InvalidExpiryDate,
    #[error("Invalid CVV")]
    InvalidCvv,
}

/// Strips spaces and dashes so formatted numbers like "4532 0151 1283 0366"
/// validate the same as the bare digit string.
pub fn normalize_card_number(card_number: &str) -> String {
    card_number
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect()
}

/// Validates a card number: 13-19 digits after normalization, digits only,
/// and a passing Luhn checksum.
pub fn validate_card_number(card_number: &str) -> Result<(), CardValidationError> {
    let normalized = normalize_card_number(card_number);

    if normalized.len() < 13 || normalized.len() > 19 {
        return Err(CardValidationError::InvalidCardNumber);
    }
    if !normalized.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CardValidationError::InvalidCardNumber);
    }
    if !luhn_check(&normalized) {
        return Err(CardValidationError::InvalidCardNumber);
    }

    Ok(())
}

/// Validates an expiry date in MM/YY or MM/YYYY form. The month must be a
/// two-digit value in 01-12; the year must be two or four digits. Whether the
/// date lies in the past is not checked here.
pub fn validate_expiry_date(expiry_date: &str) -> Result<(), CardValidationError> {
    let (month, year) = expiry_date
        .split_once('/')
        .ok_or(CardValidationError::InvalidExpiryDate)?;

    let month = month.trim();
    let year = year.trim();

    if month.len() != 2 || !month.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CardValidationError::InvalidExpiryDate);
    }
    match month.parse::<u32>() {
        Ok(m) if (1..=12).contains(&m) => {}
        _ => return Err(CardValidationError::InvalidExpiryDate),
    }

    if year.len() != 2 && year.len() != 4 {
        return Err(CardValidationError::InvalidExpiryDate);
    }
    if !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CardValidationError::InvalidExpiryDate);
    }

    Ok(())
}

/// Validates a CVV: 3 or 4 digits.
pub fn validate_cvv(cvv: &str) -> Result<(), CardValidationError> {
    if cvv.len() < 3 || cvv.len() > 4 {
        return Err(CardValidationError::InvalidCvv);
    }
    if !cvv.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CardValidationError::InvalidCvv);
    }
    Ok(())
}

/// Last four digits of the normalized card number, for receipts and lookups.
pub fn card_last_four(card_number: &str) -> String {
    let normalized = normalize_card_number(card_number);
    let start = normalized.len().saturating_sub(4);
    normalized[start..].to_string()
}

/// Luhn checksum. Doubles every second digit counting from the right, which
/// for left-to-right iteration means positions whose index parity matches
/// the parity of the total length.
fn luhn_check(card_number: &str) -> bool {
    let parity = card_number.len() % 2;
    let total: u32 = card_number
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let mut digit = u32::from(b - b'0');
            if i % 2 == parity {
                digit *= 2;
                if digit > 9 {
                    digit -= 9;
                }
            }
            digit
        })
        .sum();

    total % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_good_card_number() {
        assert_eq!(validate_card_number("4532015112830366"), Ok(()));
    }

    #[test]
    fn rejects_luhn_failure() {
        assert_eq!(
            validate_card_number("4532015112830367"),
            Err(CardValidationError::InvalidCardNumber)
        );
    }

    #[test]
    fn rejects_short_card_number() {
        // 12 digits fails the length check before Luhn runs.
        assert_eq!(
            validate_card_number("453201511283"),
            Err(CardValidationError::InvalidCardNumber)
        );
    }

    #[test]
    fn rejects_non_digit_card_number() {
        assert_eq!(
            validate_card_number("4532abcd11283036"),
            Err(CardValidationError::InvalidCardNumber)
        );
    }

    #[test]
    fn normalizes_spaces_and_dashes() {
        assert_eq!(validate_card_number("4532 0151 1283 0366"), Ok(()));
        assert_eq!(validate_card_number("4532-0151-1283-0366"), Ok(()));
        assert_eq!(card_last_four("4532 0151 1283 0366"), "0366");
    }

    #[test]
    fn expiry_accepts_both_year_forms() {
        assert_eq!(validate_expiry_date("12/25"), Ok(()));
        assert_eq!(validate_expiry_date("01/2030"), Ok(()));
    }

    #[test]
    fn expiry_rejects_bad_shapes() {
        assert!(validate_expiry_date("1225").is_err());
        assert!(validate_expiry_date("1/25").is_err());
        assert!(validate_expiry_date("13/25").is_err());
        assert!(validate_expiry_date("00/25").is_err());
        assert!(validate_expiry_date("12/205").is_err());
        assert!(validate_expiry_date("ab/cd").is_err());
    }

    #[test]
    fn cvv_rules() {
        assert_eq!(validate_cvv("123"), Ok(()));
        assert_eq!(validate_cvv("1234"), Ok(()));
        assert!(validate_cvv("12").is_err());
        assert!(validate_cvv("12345").is_err());
        assert!(validate_cvv("12a").is_err());
    }
}
