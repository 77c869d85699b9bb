use anyhow::{Context, Result};
use axum::http::{header::COOKIE, HeaderMap, HeaderValue};

pub const SENDER_COOKIE: &str = "sender";

/// The current sender's name, if the browser carries a non-empty `sender` cookie.
pub fn read_sender(headers: &HeaderMap) -> Option<String> {
    let raw = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SENDER_COOKIE)
        .map(|(_, value)| value.trim_matches('"'))?;

    let name = match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    };

    (!name.is_empty()).then_some(name)
}

/// `Set-Cookie` value that identifies the browser as `name`.
pub fn set_sender(name: &str) -> Result<HeaderValue> {
    let value = format!("{}={}; Path=/", SENDER_COOKIE, urlencoding::encode(name));
    HeaderValue::from_str(&value).context("Failed to build sender cookie")
}

/// `Set-Cookie` value that forgets the current sender.
pub fn clear_sender() -> HeaderValue {
    HeaderValue::from_static("sender=; Path=/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(cookies: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        headers
    }

    #[test]
    fn reads_sender_among_other_cookies() {
        let headers = headers(&["theme=dark; sender=Alice; lang=ja"]);
        assert_eq!(read_sender(&headers).as_deref(), Some("Alice"));
    }

    #[test]
    fn reads_sender_from_second_header() {
        let headers = headers(&["theme=dark", "sender=Bob"]);
        assert_eq!(read_sender(&headers).as_deref(), Some("Bob"));
    }

    #[test]
    fn empty_or_missing_cookie_is_no_sender() {
        assert_eq!(read_sender(&headers(&["sender="])), None);
        assert_eq!(read_sender(&headers(&["other=1"])), None);
        assert_eq!(read_sender(&HeaderMap::new()), None);
    }

    #[test]
    fn encoded_names_survive_the_cookie() {
        let set = set_sender("山田 太郎").unwrap();
        let set = set.to_str().unwrap();
        assert!(set.ends_with("; Path=/"));

        let pair = set.split(';').next().unwrap();
        assert_eq!(read_sender(&headers(&[pair])).as_deref(), Some("山田 太郎"));
    }

    #[test]
    fn undecodable_value_is_taken_verbatim() {
        assert_eq!(read_sender(&headers(&["sender=%FF"])).as_deref(), Some("%FF"));
    }

    #[test]
    fn clearing_empties_the_value() {
        assert_eq!(clear_sender(), "sender=; Path=/");
    }
}
