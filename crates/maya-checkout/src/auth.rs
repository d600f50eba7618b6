use base64::Engine;

/// `Authorization` header value for a Maya API key: the key as the
/// username with an empty password.
pub fn basic_auth(key: &str) -> String {
    let credential = base64::engine::general_purpose::STANDARD.encode(format!("{key}:"));
    format!("Basic {credential}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_encodes_key_with_empty_password() {
        assert_eq!(basic_auth("pk-test"), "Basic cGstdGVzdDo=");
        assert_eq!(basic_auth("sk-test"), "Basic c2stdGVzdDo=");
    }

    #[test]
    fn test_basic_auth_decodes_back() {
        let header = basic_auth("pk-Z0OSzLvIcOI2UIvDhdTGVVfRSSeiGStnceqwUE7n0Ah");
        let encoded = header.strip_prefix("Basic ").unwrap();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        assert_eq!(
            String::from_utf8(decoded).unwrap(),
            "pk-Z0OSzLvIcOI2UIvDhdTGVVfRSSeiGStnceqwUE7n0Ah:"
        );
    }
}
