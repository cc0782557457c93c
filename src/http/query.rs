//! Query string decoding
//!
//! Follows `application/x-www-form-urlencoded` rules: pairs split on `&`,
//! key and value split on the first `=`, `+` means space, percent escapes are
//! decoded. The first occurrence of a key wins.

/// Error for a value that does not decode to UTF-8
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedQuery;

/// Look up `key` in a raw query string.
///
/// Returns `Ok(None)` when the key is absent. Pairs whose key fails to
/// decode are ignored; a matching key whose value fails to decode is an error.
pub fn query_param(query: Option<&str>, key: &str) -> Result<Option<String>, MalformedQuery> {
    let Some(query) = query else {
        return Ok(None);
    };

    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let Ok(decoded_key) = decode(raw_key) else {
            continue;
        };
        if decoded_key == key {
            return decode(raw_value).map(Some);
        }
    }
    Ok(None)
}

fn decode(raw: &str) -> Result<String, MalformedQuery> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(std::borrow::Cow::into_owned)
        .map_err(|_| MalformedQuery)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent() {
        assert_eq!(query_param(None, "path"), Ok(None));
        assert_eq!(query_param(Some("other=1"), "path"), Ok(None));
        assert_eq!(query_param(Some(""), "path"), Ok(None));
    }

    #[test]
    fn test_decoding() {
        assert_eq!(
            query_param(Some("path=docs%2Fmy+file.txt"), "path"),
            Ok(Some("docs/my file.txt".to_string()))
        );
        assert_eq!(query_param(Some("path="), "path"), Ok(Some(String::new())));
        assert_eq!(query_param(Some("path"), "path"), Ok(Some(String::new())));
    }

    #[test]
    fn test_first_value_wins() {
        assert_eq!(
            query_param(Some("x=1&path=a&path=b"), "path"),
            Ok(Some("a".to_string()))
        );
    }

    #[test]
    fn test_invalid_utf8_value() {
        assert_eq!(query_param(Some("path=%FF"), "path"), Err(MalformedQuery));
    }
}
