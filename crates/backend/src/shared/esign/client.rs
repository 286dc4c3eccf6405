use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use super::{ESignClient, ESignError, RemoteFile};

/// HTTP-клиент сервиса электронной подписи
#[derive(Debug, Clone)]
pub struct HttpESignClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl HttpESignClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(base_url: &str, api_key: &str) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("pestdesk/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, ESignError> {
        let url = self.url(path);
        tracing::debug!("esign GET {}", url);
        let res = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        match res.status() {
            s if s.is_success() => Ok(res),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::error!("esign rejected api key ({})", res.status());
                Err(ESignError::Http(res.status().as_u16()))
            }
            s => Err(ESignError::Http(s.as_u16())),
        }
    }
}

#[async_trait]
impl ESignClient for HttpESignClient {
    async fn list_files(&self, document_id: &str) -> Result<Vec<RemoteFile>, ESignError> {
        let path = format!("/documents/{}/files", urlencoding::encode(document_id));
        self.get(&path)
            .await?
            .json::<Vec<RemoteFile>>()
            .await
            .map_err(|e| ESignError::Decode(e.to_string()))
    }

    async fn fetch_content(&self, external_file_id: &str) -> Result<Vec<u8>, ESignError> {
        let path = format!("/files/{}/content", urlencoding::encode(external_file_id));
        let bytes = self
            .get(&path)
            .await?
            .bytes()
            .await
            .map_err(map_reqwest_error)?;
        Ok(bytes.to_vec())
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ESignError {
    if e.is_decode() {
        ESignError::Decode(e.to_string())
    } else {
        ESignError::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let client = HttpESignClient::new("https://sign.example.com/api/", "key").unwrap();
        assert_eq!(
            client.url("/files/1/content"),
            "https://sign.example.com/api/files/1/content"
        );
    }
}
