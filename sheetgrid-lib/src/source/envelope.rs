//! Fixed-length envelope stripping.

use crate::error::SourceError;

/// Length of the `/*O_o*/\ngoogle.visualization.Query.setResponse(` prefix.
pub const DEFAULT_PREFIX_LEN: usize = 47;

/// Length of the `);` suffix.
pub const DEFAULT_SUFFIX_LEN: usize = 2;

/// Removes exactly `prefix_len` leading and `suffix_len` trailing bytes.
///
/// The affix lengths are an external contract with the upstream source. A
/// payload too short to hold both affixes, or a cut that lands inside a
/// multi-byte character, is reported as malformed. Any other drift in the
/// affixes is only detectable when the remaining body fails to parse.
pub fn strip_envelope(text: &str, prefix_len: usize, suffix_len: usize) -> Result<&str, SourceError> {
    let end = text
        .len()
        .checked_sub(suffix_len)
        .filter(|end| *end >= prefix_len)
        .ok_or_else(|| {
            SourceError::malformed_with_body(
                format!(
                    "payload of {} bytes is shorter than its {}+{} byte envelope",
                    text.len(),
                    prefix_len,
                    suffix_len
                ),
                text,
            )
        })?;

    text.get(prefix_len..end).ok_or_else(|| {
        SourceError::malformed_with_body("envelope boundary splits a character", text)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_default_envelope() {
        let text = "/*O_o*/\ngoogle.visualization.Query.setResponse({\"a\":1});";
        assert_eq!(
            strip_envelope(text, DEFAULT_PREFIX_LEN, DEFAULT_SUFFIX_LEN).unwrap(),
            "{\"a\":1}"
        );
    }

    #[test]
    fn test_strip_too_short() {
        let err = strip_envelope("short", DEFAULT_PREFIX_LEN, DEFAULT_SUFFIX_LEN).unwrap_err();
        assert!(matches!(err, SourceError::Malformed { .. }));
    }

    #[test]
    fn test_strip_exact_envelope_leaves_empty_body() {
        assert_eq!(strip_envelope("abcde", 3, 2).unwrap(), "");
    }

    #[test]
    fn test_strip_inside_multibyte_char() {
        let err = strip_envelope("é{}", 1, 0).unwrap_err();
        assert!(matches!(err, SourceError::Malformed { .. }));
    }
}
