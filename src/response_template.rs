use crate::Response;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use hyper::body::Bytes;
use serde::Serialize;
use std::convert::TryInto;
use std::time::Duration;

/// The blueprint for the response returned by a [`MockTransport`] when a registered responder
/// matches an outgoing request.
///
/// `ResponseTemplate` implements [`Respond`]: register it directly to always answer with the
/// same response.
///
/// [`MockTransport`]: crate::MockTransport
/// [`Respond`]: crate::Respond
#[derive(Clone, Debug)]
pub struct ResponseTemplate {
    mime: String,
    status_code: StatusCode,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    delay: Option<Duration>,
}

// `tripmock` is a crate meant for testing - failures are most likely not handled/temporary mistakes.
// Hence we prefer to panic and provide an easier API than to use `Result`s thus pushing
// the burden of "correctness" (and conversions) on the user.
//
// All methods try to accept the widest possible set of inputs and then perform the fallible conversion
// internally, bailing if the fallible conversion fails.
//
// Same principle applies to allocation/cloning, freely used where convenient.
impl ResponseTemplate {
    /// Start building a `ResponseTemplate` specifying the status code of the response.
    pub fn new<S>(s: S) -> Self
    where
        S: TryInto<StatusCode>,
        <S as TryInto<StatusCode>>::Error: std::fmt::Debug,
    {
        let status_code = s.try_into().expect("Failed to convert into status code.");
        Self {
            status_code,
            headers: HeaderMap::new(),
            mime: String::new(),
            body: None,
            delay: None,
        }
    }

    /// Append a header `value` to list of headers with `key` as header name.
    ///
    /// Unlike `insert_header`, this function will not override the contents of a header:
    /// - if there are no header values with `key` as header name, it will insert one;
    /// - if there are already some values with `key` as header name, it will append to the
    ///   existing list.
    pub fn append_header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        <K as TryInto<HeaderName>>::Error: std::fmt::Debug,
        V: TryInto<HeaderValue>,
        <V as TryInto<HeaderValue>>::Error: std::fmt::Debug,
    {
        let key = key.try_into().expect("Failed to convert into header name.");
        let value = value
            .try_into()
            .expect("Failed to convert into header value.");
        self.headers.append(key, value);
        self
    }

    /// Insert a header `value` with `key` as header name.
    ///
    /// This function will override the contents of a header:
    /// - if there are no header values with `key` as header name, it will insert one;
    /// - if there are already some values with `key` as header name, it will drop them and
    ///   start a new list of header values, containing only `value`.
    ///
    /// ### Example:
    /// ```rust
    /// use tripmock::{MockTransport, Request, ResponseTemplate, http::Method};
    ///
    /// // Arrange
    /// let transport = MockTransport::new();
    /// let correlation_id = "1311db4f-fe65-4cb2-b514-1bb47f781aa7";
    /// let template = ResponseTemplate::new(200).insert_header(
    ///     "X-Correlation-ID",
    ///     correlation_id
    /// );
    /// transport.register_responder("GET", "http://example.com/", template);
    ///
    /// // Act
    /// let request = Request::parse(Method::GET, "http://example.com/").unwrap();
    /// let response = transport.dispatch(&request).unwrap();
    ///
    /// // Assert
    /// assert_eq!(response.headers()["X-Correlation-ID"], correlation_id);
    /// ```
    pub fn insert_header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        <K as TryInto<HeaderName>>::Error: std::fmt::Debug,
        V: TryInto<HeaderValue>,
        <V as TryInto<HeaderValue>>::Error: std::fmt::Debug,
    {
        let key = key.try_into().expect("Failed to convert into header name.");
        let value = value
            .try_into()
            .expect("Failed to convert into header value.");
        self.headers.insert(key, value);
        self
    }

    /// Append multiple header key-value pairs.
    ///
    /// Existing header values will not be overridden.
    ///
    /// # Example
    /// ```rust
    /// use tripmock::ResponseTemplate;
    ///
    /// let headers = vec![
    ///     ("Set-Cookie", "name=value"),
    ///     ("Set-Cookie", "name2=value2; Domain=example.com"),
    /// ];
    /// let response = ResponseTemplate::new(200)
    ///     .append_headers(headers)
    ///     .generate_response();
    ///
    /// assert_eq!(response.headers().get_all("Set-Cookie").iter().count(), 2);
    /// ```
    pub fn append_headers<K, V, I>(mut self, headers: I) -> Self
    where
        K: TryInto<HeaderName>,
        <K as TryInto<HeaderName>>::Error: std::fmt::Debug,
        V: TryInto<HeaderValue>,
        <V as TryInto<HeaderValue>>::Error: std::fmt::Debug,
        I: IntoIterator<Item = (K, V)>,
    {
        let headers = headers.into_iter().map(|(key, value)| {
            (
                key.try_into().expect("Failed to convert into header name."),
                value
                    .try_into()
                    .expect("Failed to convert into header value."),
            )
        });
        // The `Extend<(HeaderName, T)>` impl uses `HeaderMap::append` internally: https://docs.rs/http/1.0.0/src/http/header/map.rs.html#1953
        self.headers.extend(headers);
        self
    }

    /// Set the response body with bytes.
    ///
    /// It does not set a "Content-Type".
    ///
    /// To set a body with bytes but a different "Content-Type"
    /// [`set_body_raw`](#method.set_body_raw) can be used.
    pub fn set_body_bytes<B>(mut self, body: B) -> Self
    where
        B: TryInto<Vec<u8>>,
        <B as TryInto<Vec<u8>>>::Error: std::fmt::Debug,
    {
        let body = body.try_into().expect("Failed to convert into body.");
        self.body = Some(body);
        self
    }

    /// Set the response body from a JSON-serializable value.
    ///
    /// It sets "Content-Type" to "application/json".
    pub fn set_body_json<B: Serialize>(mut self, body: B) -> Self {
        let body = serde_json::to_vec(&body).expect("Failed to convert into body.");

        self.body = Some(body);
        self.mime = "application/json".to_string();
        self
    }

    /// Set the response body to a string.
    ///
    /// It sets "Content-Type" to "text/plain".
    pub fn set_body_string<T>(mut self, body: T) -> Self
    where
        T: TryInto<String>,
        <T as TryInto<String>>::Error: std::fmt::Debug,
    {
        let body = body.try_into().expect("Failed to convert into body.");

        self.body = Some(body.into_bytes());
        self.mime = "text/plain".to_string();
        self
    }

    /// Set a raw response body. The mime type needs to be set because the
    /// raw body could be of any type.
    ///
    /// ### Example:
    /// ```rust
    /// use tripmock::ResponseTemplate;
    /// use tripmock::http::HeaderValue;
    ///
    /// mod external {
    ///     // This could be a method of a struct that is
    ///     // implemented in another crate and the struct
    ///     // does not implement Serialize.
    ///     pub fn body() -> Vec<u8>{
    ///         r#"{"hello": "world"}"#.as_bytes().to_owned()
    ///     }
    /// }
    ///
    /// let response = ResponseTemplate::new(200)
    ///     .set_body_raw(external::body(), "application/json")
    ///     .generate_response();
    ///
    /// assert_eq!(response.body().as_ref(), br#"{"hello": "world"}"#);
    /// assert_eq!(
    ///     response.headers().get("content-type"),
    ///     Some(&HeaderValue::from_static("application/json"))
    /// );
    /// ```
    pub fn set_body_raw<B>(mut self, body: B, mime: &str) -> Self
    where
        B: TryInto<Vec<u8>>,
        <B as TryInto<Vec<u8>>>::Error: std::fmt::Debug,
    {
        let body = body.try_into().expect("Failed to convert into body.");
        self.body = Some(body);
        self.mime = mime.to_string();
        self
    }

    /// By default responses are produced as fast as possible.
    ///
    /// You can use `set_delay` to introduce an artificial delay to simulate the behaviour of
    /// a real server with a non-negligible latency: the calling thread sleeps for `delay` before
    /// the response is handed back.
    ///
    /// ### Example:
    /// ```rust
    /// use tripmock::{Respond, Request, ResponseTemplate, http::Method};
    /// use std::time::{Duration, Instant};
    ///
    /// let delay = Duration::from_millis(50);
    /// let template = ResponseTemplate::new(200).set_delay(delay);
    /// let request = Request::parse(Method::GET, "http://example.com/").unwrap();
    ///
    /// let start = Instant::now();
    /// template.respond(&request).unwrap();
    /// assert!(start.elapsed() >= delay);
    /// ```
    pub fn set_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);

        self
    }

    /// Build the response described by this template.
    pub fn generate_response(&self) -> Response {
        let mut headers = self.headers.clone();
        // Set content-type, if needed
        if !self.mime.is_empty() {
            if let Ok(mime) = HeaderValue::from_str(&self.mime) {
                headers.insert(http::header::CONTENT_TYPE, mime);
            }
        }

        let body = self.body.clone().unwrap_or_default();
        let mut response = Response::new(Bytes::from(body));
        *response.status_mut() = self.status_code;
        *response.headers_mut() = headers;
        response
    }

    /// Retrieve the response delay.
    pub(crate) fn delay(&self) -> &Option<Duration> {
        &self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_bodies_are_plain_text() {
        let response = ResponseTemplate::new(200)
            .set_body_string("hi")
            .generate_response();

        assert_eq!(response.status(), 200);
        assert_eq!(response.body().as_ref(), b"hi");
        assert_eq!(response.headers()["content-type"], "text/plain");
    }

    #[test]
    fn json_bodies_set_the_content_type() {
        let response = ResponseTemplate::new(201)
            .set_body_json(json!({ "id": 7 }))
            .generate_response();

        assert_eq!(response.status(), 201);
        assert_eq!(response.headers()["content-type"], "application/json");
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body, json!({ "id": 7 }));
    }

    #[test]
    fn byte_bodies_do_not_set_a_content_type() {
        let response = ResponseTemplate::new(200)
            .set_body_bytes(vec![0u8, 159, 146, 150])
            .generate_response();

        assert!(response.headers().get("content-type").is_none());
        assert_eq!(response.body().as_ref(), &[0u8, 159, 146, 150]);
    }

    #[test]
    fn no_body_means_an_empty_body() {
        let response = ResponseTemplate::new(204).generate_response();

        assert!(response.body().is_empty());
        assert!(response.headers().is_empty());
    }
}
