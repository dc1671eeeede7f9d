//! Conversion engine
//!
//! A static compatibility table says which media types a source type may be
//! turned into; [`convert`] holds the matching transformation rules. The two
//! are kept in lock-step: every pair the table lists has a rule, which the
//! tests below check exhaustively.

mod csv;
mod markdown;
mod yaml;

use crate::fragment::{ContentType, FragmentError, MediaType, Result};

/// Media types reachable from `source`, starting with `source` itself
pub fn conversion_targets(source: MediaType) -> &'static [MediaType] {
    use MediaType::*;

    match source {
        TextPlain => &[TextPlain],
        TextMarkdown => &[TextMarkdown, TextHtml, TextPlain],
        TextHtml => &[TextHtml, TextPlain],
        TextCsv => &[TextCsv, TextPlain, ApplicationJson],
        ApplicationJson => &[ApplicationJson, ApplicationYaml, TextPlain],
        ApplicationYaml => &[ApplicationYaml, TextPlain],
    }
}

/// Conversion targets for a raw Content-Type string
///
/// Unparseable or unsupported source types have no targets.
pub fn conversion_targets_for(content_type: &str) -> Vec<MediaType> {
    ContentType::parse(content_type)
        .ok()
        .and_then(|ct| ct.media_type())
        .map(|source| conversion_targets(source).to_vec())
        .unwrap_or_default()
}

/// Whether the compatibility table allows `from` -> `to`
pub fn can_convert(from: MediaType, to: MediaType) -> bool {
    conversion_targets(from).contains(&to)
}

/// Transform `payload` from one media type into another
///
/// Payload bytes are read as (lossy) UTF-8 text. Pairs without a rule fail
/// with [`FragmentError::ConversionNotImplemented`], whether or not the
/// compatibility table lists them.
pub fn convert(payload: &[u8], from: MediaType, to: MediaType) -> Result<Vec<u8>> {
    use MediaType::*;

    if from == to {
        return Ok(payload.to_vec());
    }

    let text = || String::from_utf8_lossy(payload);
    match (from, to) {
        (TextMarkdown, TextHtml) => Ok(markdown::to_html(&text()).into_bytes()),
        (TextCsv, ApplicationJson) => csv::to_json(&text()),
        (ApplicationJson, ApplicationYaml) => yaml::from_json(&text()),
        // The source is already text; no re-encoding happens
        (_, TextPlain) => Ok(payload.to_vec()),
        _ => Err(FragmentError::ConversionNotImplemented { from, to }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(media_type: MediaType) -> &'static [u8] {
        match media_type {
            MediaType::TextPlain => b"plain text",
            MediaType::TextMarkdown => b"# Title\n*soft*",
            MediaType::TextHtml => b"<p>hello</p>",
            MediaType::TextCsv => b"a,b\n1,2",
            MediaType::ApplicationJson => br#"{"a":1}"#,
            MediaType::ApplicationYaml => b"a: 1",
        }
    }

    #[test]
    fn test_every_table_entry_has_a_rule() {
        for from in MediaType::ALL {
            for &to in conversion_targets(from) {
                let result = convert(sample(from), from, to);
                assert!(
                    result.is_ok(),
                    "{from} -> {to} is listed but failed: {result:?}"
                );
            }
        }
    }

    #[test]
    fn test_targets_start_with_source() {
        for source in MediaType::ALL {
            assert_eq!(conversion_targets(source)[0], source);
        }
    }

    #[test]
    fn test_identity_returns_payload_unchanged() {
        for media_type in MediaType::ALL {
            let payload = sample(media_type);
            assert_eq!(convert(payload, media_type, media_type).unwrap(), payload);
        }
    }

    #[test]
    fn test_plain_text_is_passthrough() {
        let payload = b"name,age\nJohn,25";
        assert_eq!(
            convert(payload, MediaType::TextCsv, MediaType::TextPlain).unwrap(),
            payload
        );
    }

    #[test]
    fn test_unlisted_pair_is_not_implemented() {
        assert_eq!(
            convert(b"a,b", MediaType::TextCsv, MediaType::ApplicationYaml),
            Err(FragmentError::ConversionNotImplemented {
                from: MediaType::TextCsv,
                to: MediaType::ApplicationYaml,
            })
        );
        assert!(!can_convert(MediaType::TextCsv, MediaType::ApplicationYaml));
    }

    #[test]
    fn test_targets_for_raw_content_type() {
        assert_eq!(
            conversion_targets_for("text/markdown; charset=utf-8"),
            vec![MediaType::TextMarkdown, MediaType::TextHtml, MediaType::TextPlain]
        );
        assert!(conversion_targets_for("image/png").is_empty());
        assert!(conversion_targets_for("not a type").is_empty());
    }
}
