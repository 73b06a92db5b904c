//! Share codes: a bundle snapshot packed into one URL-safe-ish string.
//!
//! The pipeline is JSON, then percent-escaping, then standard base64. There
//! is no compression and no signature; a damaged code is caught by parsing
//! and field validation.

use base64::Engine as _;
use base64::engine::general_purpose;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::SocialMediaType;

/// Query parameter carrying the code in a share URL
pub const SHARE_QUERY_PARAM: &str = "data";

/// Minimal bundle shape carried inside a share code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedBundle {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub links: Vec<SharedLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedLink {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_media_type: Option<SocialMediaType>,
}

#[derive(Debug, Error)]
pub enum ShareCodeError {
    #[error("share code is empty")]
    Empty,

    #[error("share code is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("share code does not decode to text")]
    NotUtf8,

    #[error("share code contains an invalid escape sequence at byte {0}")]
    InvalidEscape(usize),

    #[error("share code payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("share code payload is missing `{0}`")]
    MissingField(&'static str),
}

/// Encode a shared bundle into a share code. Never fails.
pub fn encode_share_code(bundle: &SharedBundle) -> String {
    // Serializing plain strings, integers and enums cannot fail
    let json = serde_json::to_string(bundle).unwrap_or_default();
    let escaped = urlencoding::encode(&json);
    general_purpose::STANDARD.encode(escaped.as_bytes())
}

/// Decode a share code back into a shared bundle.
///
/// Every failure comes back as a `ShareCodeError`; nothing partially parsed
/// is ever returned.
pub fn decode_share_code(code: &str) -> Result<SharedBundle, ShareCodeError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ShareCodeError::Empty);
    }

    let bytes = general_purpose::STANDARD.decode(code)?;
    let escaped = String::from_utf8(bytes).map_err(|_| ShareCodeError::NotUtf8)?;
    check_escapes(&escaped)?;
    let json = urlencoding::decode(&escaped).map_err(|_| ShareCodeError::NotUtf8)?;

    let value: Value = serde_json::from_str(&json)?;
    if !value.get("name").is_some_and(Value::is_string) {
        return Err(ShareCodeError::MissingField("name"));
    }
    if !value.get("links").is_some_and(Value::is_array) {
        return Err(ShareCodeError::MissingField("links"));
    }

    Ok(serde_json::from_value(value)?)
}

/// `urlencoding::decode` passes malformed `%` sequences through untouched;
/// reject them instead.
fn check_escapes(text: &str) -> Result<(), ShareCodeError> {
    let bytes = text.as_bytes();
    let mut idx = 0;
    while idx < bytes.len() {
        if bytes[idx] == b'%' {
            let valid = bytes
                .get(idx + 1..idx + 3)
                .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(ShareCodeError::InvalidEscape(idx));
            }
            idx += 3;
        } else {
            idx += 1;
        }
    }
    Ok(())
}

/// Build the URL a recipient opens to import a bundle
pub fn share_url(base_url: &str, code: &str) -> String {
    format!(
        "{}/share?{}={}",
        base_url.trim_end_matches('/'),
        SHARE_QUERY_PARAM,
        urlencoding::encode(code)
    )
}

/// Accept either a bare share code or a full share URL and return the code
pub fn extract_share_code(input: &str) -> String {
    let input = input.trim();
    let Some((_, query)) = input.split_once('?') else {
        return input.to_string();
    };

    let query = query.split('#').next().unwrap_or_default();
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == SHARE_QUERY_PARAM)
        .map(|(_, value)| {
            urlencoding::decode(value)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| value.to_string())
        })
        .unwrap_or_else(|| input.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> SharedBundle {
        SharedBundle {
            name: "DeFi starter".into(),
            description: Some("Swaps & lending — the basics".into()),
            links: vec![
                SharedLink {
                    title: "Uniswap".into(),
                    url: "https://uniswap.org".into(),
                    description: String::new(),
                    order: Some(0),
                    social_media_type: None,
                },
                SharedLink {
                    title: "Aave 🦇".into(),
                    url: "https://aave.com/?ref=a+b".into(),
                    description: "100% lending".into(),
                    order: None,
                    social_media_type: Some(SocialMediaType::Discord),
                },
            ],
        }
    }

    #[test]
    fn test_roundtrip_sample() {
        let bundle = sample();
        let code = encode_share_code(&bundle);
        assert!(code.is_ascii());
        assert_eq!(decode_share_code(&code).unwrap(), bundle);
    }

    #[test]
    fn test_decodes_browser_generated_code() {
        // Percent-escaped JSON wrapped in standard base64, as web clients emit it.
        let json = r#"{"name":"A","description":"","links":[{"title":"T","url":"https://t.me/x","description":""}]}"#;
        let escaped = json
            .replace('{', "%7B")
            .replace('}', "%7D")
            .replace('"', "%22")
            .replace(':', "%3A")
            .replace(',', "%2C")
            .replace('[', "%5B")
            .replace(']', "%5D")
            .replace('/', "%2F");
        let code = general_purpose::STANDARD.encode(escaped);

        let bundle = decode_share_code(&code).unwrap();
        assert_eq!(bundle.name, "A");
        assert_eq!(bundle.description.as_deref(), Some(""));
        assert_eq!(bundle.links.len(), 1);
        assert_eq!(bundle.links[0].url, "https://t.me/x");
    }

    #[test]
    fn test_rejects_bad_base64() {
        assert!(matches!(
            decode_share_code("not base64!"),
            Err(ShareCodeError::Base64(_))
        ));
        assert!(matches!(decode_share_code("   "), Err(ShareCodeError::Empty)));
    }

    #[test]
    fn test_rejects_invalid_escape() {
        let code = general_purpose::STANDARD.encode("%7B%zz");
        assert!(matches!(
            decode_share_code(&code),
            Err(ShareCodeError::InvalidEscape(3))
        ));
        let truncated = general_purpose::STANDARD.encode("%7");
        assert!(matches!(
            decode_share_code(&truncated),
            Err(ShareCodeError::InvalidEscape(0))
        ));
    }

    #[test]
    fn test_rejects_invalid_json() {
        let code = general_purpose::STANDARD.encode("%7Bname");
        assert!(matches!(decode_share_code(&code), Err(ShareCodeError::Json(_))));
    }

    #[test]
    fn test_rejects_missing_fields() {
        let encode = |json: &str| general_purpose::STANDARD.encode(urlencoding::encode(json).as_bytes());

        assert!(matches!(
            decode_share_code(&encode(r#"{"links":[]}"#)),
            Err(ShareCodeError::MissingField("name"))
        ));
        assert!(matches!(
            decode_share_code(&encode(r#"{"name":7,"links":[]}"#)),
            Err(ShareCodeError::MissingField("name"))
        ));
        assert!(matches!(
            decode_share_code(&encode(r#"{"name":"x","links":{}}"#)),
            Err(ShareCodeError::MissingField("links"))
        ));
        assert!(matches!(
            decode_share_code(&encode("[1,2]")),
            Err(ShareCodeError::MissingField("name"))
        ));
    }

    #[test]
    fn test_rejects_malformed_link_entries() {
        let json = r#"{"name":"x","links":[{"title":"no url"}]}"#;
        let code = general_purpose::STANDARD.encode(urlencoding::encode(json).as_bytes());
        assert!(matches!(decode_share_code(&code), Err(ShareCodeError::Json(_))));
    }

    #[test]
    fn test_share_url_and_extract() {
        let code = encode_share_code(&sample());
        let url = share_url("https://links.example.com/", &code);
        assert!(url.starts_with("https://links.example.com/share?data="));
        assert!(!url[url.find('=').unwrap() + 1..].contains('+'));

        assert_eq!(extract_share_code(&url), code);
        assert_eq!(extract_share_code(&format!("  {code}\n")), code);
        assert_eq!(
            extract_share_code(&format!("https://x.test/share?foo=1&data={code}#top")),
            code
        );
    }

    fn shared_link_strategy() -> impl Strategy<Value = SharedLink> {
        let platform = prop_oneof![
            Just(None),
            Just(Some(SocialMediaType::Telegram)),
            Just(Some(SocialMediaType::Discord)),
            Just(Some(SocialMediaType::X)),
        ];
        (
            any::<String>(),
            "https?://[a-z0-9./?=&%-]{1,40}",
            any::<String>(),
            proptest::option::of(-1000i64..1000),
            platform,
        )
            .prop_map(|(title, url, description, order, social_media_type)| SharedLink {
                title,
                url,
                description,
                order,
                social_media_type,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

        #[test]
        fn roundtrip_law(
            name in any::<String>(),
            description in proptest::option::of(any::<String>()),
            links in prop::collection::vec(shared_link_strategy(), 0..6),
        ) {
            let bundle = SharedBundle { name, description, links };
            let decoded = decode_share_code(&encode_share_code(&bundle));
            prop_assert_eq!(decoded.ok(), Some(bundle));
        }

        #[test]
        fn decode_never_panics(input in any::<String>()) {
            let _ = decode_share_code(&input);
        }

        #[test]
        fn non_base64_input_is_rejected(input in "[A-Za-z0-9]{0,20}[!@#$^*(){}<>~ ][A-Za-z0-9]{0,20}") {
            prop_assert!(decode_share_code(&input).is_err());
        }
    }
}
