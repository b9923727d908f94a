//! Text format for integer arrays.
//!
//! Arrays travel and rest as comma-separated base-10 integers. Parsing is
//! lenient about whitespace and empty tokens (`"1, ,3"` is `[1, 3]`) but
//! strict about anything that is not an integer.

use crate::error::ParseError;

/// Parse a comma-separated list of signed integers.
///
/// Tokens are trimmed and empty tokens are skipped. Fails with
/// [`ParseError::InvalidToken`] on the first token that is not a valid `i64`
/// and with [`ParseError::Empty`] when no integers remain.
pub fn parse_array(input: &str) -> Result<Vec<i64>, ParseError> {
    let mut numbers = Vec::new();

    for token in input.split(',').map(str::trim) {
        if token.is_empty() {
            continue;
        }
        let value = token.parse::<i64>().map_err(|_| ParseError::InvalidToken {
            token: token.to_string(),
        })?;
        numbers.push(value);
    }

    if numbers.is_empty() {
        return Err(ParseError::Empty);
    }

    Ok(numbers)
}

/// Serialize integers to the stored text form (comma-joined, no spaces).
pub fn format_array(values: &[i64]) -> String {
    values
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_simple() {
        assert_eq!(parse_array("3,1,2"), Ok(vec![3, 1, 2]));
    }

    #[test]
    fn test_parse_trims_whitespace_and_signs() {
        assert_eq!(parse_array("  -5 ,+7,  0 "), Ok(vec![-5, 7, 0]));
    }

    #[test]
    fn test_parse_skips_empty_tokens() {
        assert_eq!(parse_array("1, ,3"), Ok(vec![1, 3]));
        assert_eq!(parse_array(",,4,,"), Ok(vec![4]));
    }

    #[test]
    fn test_parse_rejects_non_integers() {
        assert_eq!(
            parse_array("a,b"),
            Err(ParseError::InvalidToken {
                token: "a".to_string()
            })
        );
        assert!(matches!(
            parse_array("1,2.5"),
            Err(ParseError::InvalidToken { token }) if token == "2.5"
        ));
        assert!(parse_array("1 2").is_err());
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(matches!(
            parse_array("99999999999999999999"),
            Err(ParseError::InvalidToken { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(parse_array(""), Err(ParseError::Empty));
        assert_eq!(parse_array(" , , "), Err(ParseError::Empty));
    }

    #[test]
    fn test_format() {
        assert_eq!(format_array(&[1, -2, 3]), "1,-2,3");
        assert_eq!(format_array(&[]), "");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Formatting then parsing yields the original sequence.
        #[test]
        fn prop_format_parse_roundtrip(values in prop::collection::vec(any::<i64>(), 1..64)) {
            let text = format_array(&values);
            prop_assert_eq!(parse_array(&text), Ok(values));
        }

        /// Padding tokens with whitespace does not change the result.
        #[test]
        fn prop_parse_ignores_padding(
            values in prop::collection::vec(-1000i64..1000, 1..32),
            pad in "[ \t]{0,3}",
        ) {
            let text = values
                .iter()
                .map(|v| format!("{pad}{v}{pad}"))
                .collect::<Vec<_>>()
                .join(",");
            prop_assert_eq!(parse_array(&text), Ok(values));
        }
    }
}
