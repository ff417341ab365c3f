//! Reading the patient's age out of the rendered record table.

use cardiorisk_calc::ASCVD_AGE_RANGE;
use cardiorisk_common::RecordTable;

use super::FormError;

/// Label fragment identifying the age row.
pub const AGE_LABEL: &str = "Age";

/// Locate the age row and parse its value.
///
/// The first row whose label contains [`AGE_LABEL`] wins. Values are read
/// with leading-integer semantics, so `"55 years"` yields 55.
pub fn read_age(table: &RecordTable) -> Result<i64, FormError> {
    let raw = table
        .value_for_label_containing(AGE_LABEL)
        .ok_or(FormError::MissingElement)?;
    parse_leading_int(raw).ok_or(FormError::InvalidInput)
}

/// Age as the equations accept it, or `OutOfRange`.
pub fn check_range(age: i64) -> Result<u32, FormError> {
    u32::try_from(age)
        .ok()
        .filter(|a| ASCVD_AGE_RANGE.contains(a))
        .ok_or(FormError::OutOfRange { age })
}

/// Base-10 integer prefix of `text`: surrounding whitespace is ignored, an
/// optional sign is accepted, and digits are consumed up to the first
/// non-digit. Overlong values saturate.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    let (negative, digits) = match trimmed.as_bytes().first()? {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let prefix: &str = {
        let end = digits
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(digits.len());
        &digits[..end]
    };
    if prefix.is_empty() {
        return None;
    }

    let magnitude = prefix.bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_integer_semantics() {
        assert_eq!(parse_leading_int("55"), Some(55));
        assert_eq!(parse_leading_int("  55  "), Some(55));
        assert_eq!(parse_leading_int("55 years"), Some(55));
        assert_eq!(parse_leading_int("42.9"), Some(42));
        assert_eq!(parse_leading_int("+61"), Some(61));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn test_first_matching_row_wins() {
        let table = RecordTable::new()
            .with_row("Name", "Anna Lee")
            .with_row("Age", "55")
            .with_row("Age at onset", "30");
        assert_eq!(read_age(&table), Ok(55));
    }

    #[test]
    fn test_missing_and_unparseable_age() {
        let no_age = RecordTable::new().with_row("Name", "Anna Lee");
        assert_eq!(read_age(&no_age), Err(FormError::MissingElement));

        let placeholder = RecordTable::new().with_row("Age", "No birth date specified");
        assert_eq!(read_age(&placeholder), Err(FormError::InvalidInput));
    }

    #[test]
    fn test_range_is_inclusive() {
        assert_eq!(check_range(40), Ok(40));
        assert_eq!(check_range(75), Ok(75));
        assert_eq!(check_range(39), Err(FormError::OutOfRange { age: 39 }));
        assert_eq!(check_range(76), Err(FormError::OutOfRange { age: 76 }));
        assert_eq!(check_range(-5), Err(FormError::OutOfRange { age: -5 }));
    }
}
