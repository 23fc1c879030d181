use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Token presented by the caller.
///
/// `Basic` credentials yield the username (the password is ignored);
/// `Bearer` credentials yield the token. Anything else yields `None`.
pub fn extract_credential(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, rest) = value.split_once(' ')?;

    if scheme.eq_ignore_ascii_case("basic") {
        let decoded = STANDARD.decode(rest.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user, _password) = decoded.split_once(':')?;
        Some(user.to_string())
    } else if scheme.eq_ignore_ascii_case("bearer") {
        Some(rest.trim().to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(auth: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        h
    }

    #[test]
    fn test_basic_username() {
        let encoded = STANDARD.encode("good:");
        assert_eq!(extract_credential(&headers(&format!("Basic {encoded}"))), Some("good".into()));
    }

    #[test]
    fn test_basic_empty_username() {
        // "Basic Og==" is ":"
        assert_eq!(extract_credential(&headers("Basic Og==")), Some(String::new()));
    }

    #[test]
    fn test_basic_without_colon_rejected() {
        let encoded = STANDARD.encode("nocolon");
        assert_eq!(extract_credential(&headers(&format!("Basic {encoded}"))), None);
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(extract_credential(&headers("Bearer abc123")), Some("abc123".into()));
    }

    #[test]
    fn test_missing_or_unknown_scheme() {
        assert_eq!(extract_credential(&HeaderMap::new()), None);
        assert_eq!(extract_credential(&headers("Digest xyz")), None);
        assert_eq!(extract_credential(&headers("Basic !!!")), None);
    }
}
