//! Request descriptors and bodies.

use std::path::Path;

use bytes::Bytes;
use serde::Serialize;

use crate::error::Result;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl RequestMethod {
    /// Convert to reqwest::Method.
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Put => reqwest::Method::PUT,
            RequestMethod::Patch => reqwest::Method::PATCH,
            RequestMethod::Delete => reqwest::Method::DELETE,
        }
    }

    /// Upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Patch => "PATCH",
            RequestMethod::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body content.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
    Text(String),
    Multipart(MultipartPayload),
}

/// A file sent as one part of a multipart upload.
#[derive(Debug, Clone)]
pub struct FilePayload {
    /// Form field name of the file part.
    pub field_name: String,
    /// File name reported to the server.
    pub file_name: String,
    /// MIME type of the part, if known.
    pub content_type: Option<String>,
    /// File contents.
    pub data: Bytes,
}

impl FilePayload {
    /// Create a file payload from in-memory bytes, sent as the `file` field.
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            field_name: "file".to_string(),
            file_name: file_name.into(),
            content_type: None,
            data: data.into(),
        }
    }

    /// Read a file from disk. The file name is taken from the path.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, data))
    }

    /// Set the MIME type of the part.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the form field name of the part.
    pub fn with_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.field_name = field_name.into();
        self
    }
}

/// Multipart body: one file plus additional text fields.
#[derive(Debug, Clone)]
pub struct MultipartPayload {
    pub file: FilePayload,
    pub fields: Vec<(String, String)>,
}

impl MultipartPayload {
    /// Build a fresh form. `reqwest::multipart::Form` is consumed by a send,
    /// so every attempt gets its own.
    pub(crate) fn to_form(&self) -> Result<reqwest::multipart::Form> {
        let mut part = reqwest::multipart::Part::bytes(self.file.data.to_vec())
            .file_name(self.file.file_name.clone());
        if let Some(ref content_type) = self.file.content_type {
            part = part.mime_str(content_type)?;
        }

        let mut form = reqwest::multipart::Form::new();
        for (name, value) in &self.fields {
            form = form.text(name.clone(), value.clone());
        }
        Ok(form.part(self.file.field_name.clone(), part))
    }
}

/// One logical HTTP operation: method, endpoint, optional body and header overrides.
///
/// Built once per call and only borrowed by the client afterwards.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub(crate) method: RequestMethod,
    pub(crate) endpoint: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Option<RequestBody>,
}

impl RequestDescriptor {
    /// Create a new request descriptor.
    pub fn new(method: RequestMethod, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// GET descriptor.
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(RequestMethod::Get, endpoint)
    }

    /// POST descriptor.
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(RequestMethod::Post, endpoint)
    }

    /// PUT descriptor.
    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(RequestMethod::Put, endpoint)
    }

    /// PATCH descriptor.
    pub fn patch(endpoint: impl Into<String>) -> Self {
        Self::new(RequestMethod::Patch, endpoint)
    }

    /// DELETE descriptor.
    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(RequestMethod::Delete, endpoint)
    }

    /// Add a header override. Overrides replace client defaults.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)?;
        self.body = Some(RequestBody::Json(value));
        Ok(self)
    }

    /// Set raw JSON body.
    pub fn json_value(mut self, body: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Set text body.
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }

    /// Set a multipart body.
    pub fn multipart(
        mut self,
        file: FilePayload,
        fields: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.body = Some(RequestBody::Multipart(MultipartPayload {
            file,
            fields: fields.into_iter().collect(),
        }));
        self
    }

    /// The request method.
    pub fn method(&self) -> RequestMethod {
        self.method
    }

    /// The endpoint as given (relative or absolute).
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Header overrides in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The body, if any.
    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_descriptor() {
        let req = RequestDescriptor::get("/posts")
            .header("X-WP-Nonce", "abc")
            .header("Accept", "text/html");

        assert_eq!(req.method(), RequestMethod::Get);
        assert_eq!(req.endpoint(), "/posts");
        assert_eq!(req.headers().len(), 2);
        assert_eq!(req.headers()[0], ("X-WP-Nonce".to_string(), "abc".to_string()));
        assert!(req.body().is_none());
    }

    #[test]
    fn test_json_body() {
        let data = serde_json::json!({"title": "Hello", "status": "draft"});
        let req = RequestDescriptor::post("/posts").json(&data).unwrap();

        match req.body() {
            Some(RequestBody::Json(value)) => assert_eq!(value["status"], "draft"),
            other => panic!("expected JSON body, got {other:?}"),
        }
    }

    #[test]
    fn test_method_names() {
        assert_eq!(RequestMethod::Patch.as_str(), "PATCH");
        assert_eq!(RequestMethod::Delete.to_reqwest(), reqwest::Method::DELETE);
        assert_eq!(RequestMethod::Put.to_string(), "PUT");
    }

    #[test]
    fn test_multipart_body() {
        let file = FilePayload::new("hero.jpg", vec![0xFF, 0xD8, 0xFF])
            .with_content_type("image/jpeg");
        let req = RequestDescriptor::post("/media")
            .multipart(file, vec![("alt_text".to_string(), "Hero".to_string())]);

        match req.body() {
            Some(RequestBody::Multipart(payload)) => {
                assert_eq!(payload.file.field_name, "file");
                assert_eq!(payload.file.file_name, "hero.jpg");
                assert_eq!(payload.fields.len(), 1);
                assert!(payload.to_form().is_ok());
            }
            other => panic!("expected multipart body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_file_payload_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, b"png-bytes").unwrap();

        let payload = FilePayload::from_path(&path).await.unwrap();
        assert_eq!(payload.file_name, "logo.png");
        assert_eq!(payload.data.as_ref(), b"png-bytes");
    }
}
