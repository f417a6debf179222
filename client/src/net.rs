use async_trait::async_trait;
use drawpilot_shared::ErrorResponse;
use serde::de::DeserializeOwned;

use crate::error::AiError;

#[derive(Clone, Debug, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes a 2xx body. Error statuses surface the server's `error` field
    /// when there is one.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AiError> {
        if !self.is_success() {
            let message = serde_json::from_str::<ErrorResponse>(&self.body)
                .map(|payload| payload.error)
                .unwrap_or_else(|_| format!("API error: {}", self.status));
            return Err(AiError::Status {
                status: self.status,
                message,
            });
        }
        serde_json::from_str(&self.body).map_err(|error| AiError::Malformed(error.to_string()))
    }
}

#[async_trait(?Send)]
pub trait AiTransport {
    async fn post_json(&self, path: &str, body: String) -> Result<HttpReply, String>;
}

#[cfg(target_arch = "wasm32")]
pub use fetch::FetchTransport;

#[cfg(target_arch = "wasm32")]
mod fetch {
    use async_trait::async_trait;
    use wasm_bindgen::{JsCast, JsValue};
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Headers, Request, RequestInit, Response};

    use super::{AiTransport, HttpReply};

    fn js_error(value: JsValue) -> String {
        value.as_string().unwrap_or_else(|| format!("{value:?}"))
    }

    pub struct FetchTransport {
        base: String,
    }

    impl FetchTransport {
        pub fn new(base: &str) -> Self {
            Self {
                base: base.trim_end_matches('/').to_string(),
            }
        }
    }

    #[async_trait(?Send)]
    impl AiTransport for FetchTransport {
        async fn post_json(&self, path: &str, body: String) -> Result<HttpReply, String> {
            let window = web_sys::window().ok_or_else(|| "no window".to_string())?;
            let headers = Headers::new().map_err(js_error)?;
            headers
                .set("Content-Type", "application/json")
                .map_err(js_error)?;
            let init = RequestInit::new();
            init.set_method("POST");
            init.set_headers(&headers);
            init.set_body(&JsValue::from_str(&body));
            let url = format!("{}{}", self.base, path);
            let request = Request::new_with_str_and_init(&url, &init).map_err(js_error)?;

            let response: Response = JsFuture::from(window.fetch_with_request(&request))
                .await
                .map_err(js_error)?
                .dyn_into()
                .map_err(js_error)?;
            let status = response.status();
            let text = JsFuture::from(response.text().map_err(js_error)?)
                .await
                .map_err(js_error)?;
            Ok(HttpReply {
                status,
                body: text.as_string().unwrap_or_default(),
            })
        }
    }
}
