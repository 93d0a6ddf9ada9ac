//! Tabular source adapter
//!
//! Turns the upstream spreadsheet payload into normalized [`Record`]s. The
//! payload is a JSON body wrapped in a fixed-length JavaScript prefix and
//! suffix:
//!
//! ```text
//! /*O_o*/
//! google.visualization.Query.setResponse({"table": {"cols": [...], "rows": [...]}});
//! ```
//!
//! Decoding happens in three steps: [`strip_envelope`], [`parse_table`] and
//! [`normalize`]. [`decode_payload`] runs all three.

mod envelope;
mod normalize;
mod raw;

pub use envelope::*;
pub use normalize::*;
pub use raw::*;

use crate::error::SourceError;
use crate::model::Record;

/// Decodes a complete upstream payload into records.
pub fn decode_payload(
    text: &str,
    prefix_len: usize,
    suffix_len: usize,
) -> Result<Vec<Record>, SourceError> {
    let body = strip_envelope(text, prefix_len, suffix_len)?;
    let table = parse_table(body)?;
    Ok(normalize(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    fn wrap(body: &str) -> String {
        format!("/*O_o*/\ngoogle.visualization.Query.setResponse({});", body)
    }

    #[test]
    fn test_decode_payload() {
        let text = wrap(
            r#"{"version":"0.6","table":{"cols":[{"id":"A","label":"Name","type":"string"},{"id":"B","label":"Domain","type":"string"}],"rows":[{"c":[{"v":"Acme"},{"v":"acme.io"}]},{"c":[{"v":"Globex"},null]}]}}"#,
        );

        let records = decode_payload(&text, DEFAULT_PREFIX_LEN, DEFAULT_SUFFIX_LEN).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("Domain"), Some(&Value::from("acme.io")));
        assert_eq!(records[1].get("Domain"), Some(&Value::empty()));
    }

    #[test]
    fn test_decode_payload_wrong_affix_is_malformed() {
        let text = format!("/*O_o*/\n{}", r#"{"table":{"cols":[],"rows":[]}});"#);

        let err = decode_payload(&text, DEFAULT_PREFIX_LEN, DEFAULT_SUFFIX_LEN).unwrap_err();
        assert!(matches!(err, SourceError::Malformed { .. }));
    }
}
