//! Thin client for the image hosting service.
//!
//! Product and profile image uploads go straight to the host; only the
//! returned public URL ever reaches the marketplace backend.

use reqwest::multipart::{Form, Part};
use serde::Deserialize;

/// Default base URL for the hosted image service.
pub const DEFAULT_BASE_URL: &str = "https://api.imgbb.com";

#[derive(Debug, thiserror::Error)]
pub enum ImageHostError {
    #[error("image host rejected the upload: {0}")]
    Rejected(String),

    #[error("image host request failed")]
    Network(#[from] reqwest::Error),
}

/// Client for the image host's upload endpoint.
#[derive(Debug, Clone)]
pub struct ImageHostClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl ImageHostClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Uploads an image and returns its public URL.
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: impl Into<String>,
    ) -> Result<String, ImageHostError> {
        let form = Form::new().part("image", Part::bytes(bytes).file_name(filename.into()));
        let response = self
            .http
            .post(format!("{}/1/upload", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return match response.json::<UploadFailure>().await {
                Ok(failure) => Err(ImageHostError::Rejected(failure.error.message)),
                Err(_) => Err(ImageHostError::Rejected(format!("unexpected HTTP {status}"))),
            };
        }

        let upload: UploadResponse = response.json().await?;
        if !upload.success {
            return Err(ImageHostError::Rejected(
                "upload reported success=false".to_string(),
            ));
        }
        Ok(upload.data.url)
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    success: bool,
    data: UploadData,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct UploadFailure {
    error: FailureBody,
}

#[derive(Debug, Deserialize)]
struct FailureBody {
    message: String,
}
