use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub fn encode_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

pub fn decode_base64(text: &str) -> Option<Vec<u8>> {
    STANDARD.decode(text.trim()).ok()
}

pub fn png_data_url(base64: &str) -> String {
    format!("data:image/png;base64,{base64}")
}

/// Payload after the comma of a `data:` URL. `None` for anything else or an empty payload.
pub fn base64_from_data_url(url: &str) -> Option<&str> {
    let trimmed = url.trim_start();
    if !trimmed.starts_with("data:") {
        return None;
    }
    let (_, payload) = trimmed.split_once(',')?;
    if payload.is_empty() {
        None
    } else {
        Some(payload)
    }
}

pub fn data_url_mime(url: &str) -> Option<&str> {
    let rest = url.trim_start().strip_prefix("data:")?;
    let (header, _) = rest.split_once(',')?;
    let mime = header.split(';').next()?;
    if mime.is_empty() {
        None
    } else {
        Some(mime)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_payload_and_mime() {
        let url = png_data_url("iVBORw0KGgo=");
        assert_eq!(base64_from_data_url(&url), Some("iVBORw0KGgo="));
        assert_eq!(data_url_mime(&url), Some("image/png"));
    }

    #[test]
    fn rejects_non_data_urls() {
        assert_eq!(base64_from_data_url("blob:http://localhost/abc"), None);
        assert_eq!(base64_from_data_url("data:image/png;base64,"), None);
        assert_eq!(data_url_mime("https://example.com/a.png"), None);
    }

    #[test]
    fn base64_survives_encoding() {
        let bytes = [0u8, 1, 2, 250, 251, 252];
        let text = encode_base64(&bytes);
        assert_eq!(decode_base64(&text).as_deref(), Some(&bytes[..]));
        assert!(decode_base64("not base64!").is_none());
    }
}
