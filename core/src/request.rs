//! Description of a single API call before authentication is applied.
//!
//! # Design
//! `RequestConfig` stores form data and a JSON payload in separate optional
//! fields, mirroring how resource wrappers fill them in. `body()` folds them
//! into the [`RequestBody`] tagged union, which is the only place the
//! "exactly one body kind" rule is enforced and the only source of the
//! content type used by `ApiClient::send`.

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::Values;

pub const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";
pub const CONTENT_TYPE_JSON: &str = "application/json";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestConfig {
    pub method: String,
    pub path: String,
    pub query: Option<Values>,
    pub form: Option<Values>,
    pub json: Option<Value>,
}

/// Encoded request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Empty,
    Form(String),
    Json(String),
}

impl RequestBody {
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Form(_) => Some(CONTENT_TYPE_FORM),
            RequestBody::Json(_) => Some(CONTENT_TYPE_JSON),
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            RequestBody::Empty => None,
            RequestBody::Form(s) | RequestBody::Json(s) => Some(s.into_bytes()),
        }
    }
}

impl RequestConfig {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new("POST", path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new("PUT", path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new("PATCH", path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new("DELETE", path)
    }

    pub fn query(mut self, query: Values) -> Self {
        self.query = Some(query);
        self
    }

    pub fn query_pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.get_or_insert_with(Values::new).add(key, value);
        self
    }

    pub fn form(mut self, form: Values) -> Self {
        self.form = Some(form);
        self
    }

    /// Serialize `payload` as the JSON body. It must serialize to an object.
    pub fn json<T: Serialize + ?Sized>(self, payload: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.json_value(value))
    }

    pub fn json_value(mut self, value: Value) -> Self {
        self.json = Some(value);
        self
    }

    /// Full request URL: `base_url`, one `/`, the path without its leading
    /// slashes, then `?query` when a non-empty query is present.
    pub fn url(&self, base_url: &str) -> String {
        let mut url = format!("{}/{}", base_url, self.path.trim_start_matches('/'));
        if let Some(query) = self.query.as_ref().filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(&query.encode());
        }
        url
    }

    pub fn body(&self) -> Result<RequestBody, ApiError> {
        match (&self.form, &self.json) {
            (Some(_), Some(_)) => Err(ApiError::ConflictingBody),
            (Some(form), None) => Ok(RequestBody::Form(form.encode())),
            (None, Some(json)) => {
                if !json.is_object() {
                    return Err(ApiError::Serialization("json body must be an object".to_string()));
                }
                serde_json::to_string(json)
                    .map(RequestBody::Json)
                    .map_err(|e| ApiError::Serialization(e.to_string()))
            }
            (None, None) => Ok(RequestBody::Empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;

    const BASE: &str = "https://example.com";

    fn name_query() -> Values {
        [("name", "test")].into_iter().collect()
    }

    #[test]
    fn url_joins_with_single_slash() {
        for path in ["some/path", "/some/path", "////some/path"] {
            let cfg = RequestConfig::get(path).query(name_query());
            assert_eq!(cfg.url(BASE), "https://example.com/some/path?name=test", "path {path:?}");
        }
    }

    #[test]
    fn url_without_query_has_no_question_mark() {
        assert_eq!(RequestConfig::get("/v1/config/locations").url(BASE), "https://example.com/v1/config/locations");
        let empty = RequestConfig::get("/x").query(Values::new());
        assert_eq!(empty.url(BASE), "https://example.com/x");
    }

    #[test]
    fn url_of_empty_path_is_base_with_slash() {
        assert_eq!(RequestConfig::get("").url(BASE), "https://example.com/");
        assert_eq!(RequestConfig::get("///").url(BASE), "https://example.com/");
    }

    #[test]
    fn query_pair_accumulates() {
        let cfg = RequestConfig::get("/search").query_pair("b", "2").query_pair("a", "1 2").query_pair("b", "3");
        assert_eq!(cfg.url(BASE), "https://example.com/search?a=1+2&b=2&b=3");
    }

    #[test]
    fn body_rejects_form_and_json_together() {
        let cfg = RequestConfig::post("/test").form(name_query()).json_value(json!({"name": "test"}));
        assert_eq!(cfg.body(), Err(ApiError::ConflictingBody));
    }

    #[test]
    fn form_body_is_urlencoded() {
        let form: Values = [("name", "test"), ("age", "20")].into_iter().collect();
        let body = RequestConfig::post("/test").form(form).body().unwrap();
        assert_eq!(body.content_type(), Some(CONTENT_TYPE_FORM));
        assert_eq!(body, RequestBody::Form("age=20&name=test".to_string()));
    }

    #[test]
    fn json_body_is_object_string() {
        let body = RequestConfig::post("/test")
            .json_value(json!({"name": "test", "age": 20}))
            .body()
            .unwrap();
        assert_eq!(body.content_type(), Some(CONTENT_TYPE_JSON));
        let bytes = body.into_bytes().unwrap();
        let decoded: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, json!({"name": "test", "age": 20}));
    }

    #[test]
    fn json_builder_accepts_serializable_structs() {
        #[derive(Serialize)]
        struct Rename<'a> {
            name: &'a str,
        }
        let cfg = RequestConfig::patch("/x").json(&Rename { name: "net" }).unwrap();
        assert_eq!(cfg.body().unwrap(), RequestBody::Json(r#"{"name":"net"}"#.to_string()));
    }

    #[test]
    fn json_builder_reports_unserializable_payload() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], "non-string key");
        let err = RequestConfig::post("/x").json(&map).unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
    }

    #[test]
    fn json_body_must_be_object() {
        let err = RequestConfig::post("/x").json_value(json!([1, 2])).body().unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
    }

    #[test]
    fn no_body_is_empty() {
        let body = RequestConfig::delete("/x").body().unwrap();
        assert_eq!(body, RequestBody::Empty);
        assert_eq!(body.content_type(), None);
        assert_eq!(body.into_bytes(), None);
    }
}
