//! # Barcode Payloads
//!
//! Pure payload logic for item barcodes. Rendering label images and decoding
//! scans are handled by external libraries at the edges of the system; this
//! module only decides *what* gets encoded.
//!
//! Generated SKUs are sequential 7-digit numeric codes starting at 1,000,000,
//! backed by the `sku_sequence` table. Code 128 needs no check digit, but an
//! EAN-13 helper is provided for retailers printing EAN labels.

use crate::error::ValidationError;
use crate::validation::ValidationResult;

/// First value handed out by the SKU sequence.
pub const SKU_SEQUENCE_START: i64 = 1_000_000;

/// Formats a sequence value as a SKU / barcode payload.
///
/// Values below the sequence start are zero-padded to seven digits so every
/// generated payload has a uniform width on printed labels.
///
/// ## Example
/// ```rust
/// use karat_core::barcode::sku_from_sequence;
///
/// assert_eq!(sku_from_sequence(1_000_042), "1000042");
/// assert_eq!(sku_from_sequence(7), "0000007");
/// ```
pub fn sku_from_sequence(seq: i64) -> String {
    format!("{:07}", seq.max(0))
}

/// Checks that a scanned payload looks like one of our generated SKUs.
///
/// Manual SKUs may be alphanumeric (see `validation::validate_sku`); this is
/// the stricter check applied to sequence-generated codes.
pub fn is_generated_sku(payload: &str) -> bool {
    payload.len() >= 7 && payload.chars().all(|c| c.is_ascii_digit())
}

/// Calculates the EAN-13 check digit for a 12-digit code.
///
/// The code is zero-filled to 12 digits first. Odd positions (0-indexed even)
/// weigh 1, even positions weigh 3; the check digit is the distance to the
/// next multiple of ten.
///
/// ## Example
/// ```rust
/// use karat_core::barcode::ean13_check_digit;
///
/// // 400638133393 → check digit 1 (full EAN: 4006381333931)
/// assert_eq!(ean13_check_digit("400638133393"), Ok(1));
/// ```
pub fn ean13_check_digit(code: &str) -> ValidationResult<u8> {
    if code.len() > 12 || code.is_empty() {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "EAN-13 body must be 1-12 digits".to_string(),
        });
    }

    if !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "EAN-13 body must be numeric".to_string(),
        });
    }

    let padded = format!("{code:0>12}");
    let total: u32 = padded
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let digit = (b - b'0') as u32;
            if i % 2 == 0 {
                digit
            } else {
                digit * 3
            }
        })
        .sum();

    Ok(((10 - (total % 10)) % 10) as u8)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_skus_are_seven_digits() {
        assert_eq!(sku_from_sequence(SKU_SEQUENCE_START), "1000000");
        assert_eq!(sku_from_sequence(1_000_042), "1000042");
        assert_eq!(sku_from_sequence(7), "0000007");
    }

    #[test]
    fn generated_sku_detection() {
        assert!(is_generated_sku("1000042"));
        assert!(is_generated_sku("00000071"));

        assert!(!is_generated_sku("RING-001"));
        assert!(!is_generated_sku("123"));
        assert!(!is_generated_sku(""));
    }

    #[test]
    fn ean13_known_values() {
        // Well-known reference code.
        assert_eq!(ean13_check_digit("400638133393").unwrap(), 1);
        // All zeros sums to zero, check digit zero.
        assert_eq!(ean13_check_digit("000000000000").unwrap(), 0);
        // Shorter bodies are zero-filled.
        assert_eq!(
            ean13_check_digit("1000042").unwrap(),
            ean13_check_digit("000001000042").unwrap()
        );
    }

    #[test]
    fn ean13_rejects_bad_input() {
        assert!(ean13_check_digit("").is_err());
        assert!(ean13_check_digit("1234567890123").is_err());
        assert!(ean13_check_digit("12345678901X").is_err());
    }
}
