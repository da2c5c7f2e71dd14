//! HTTP client for the storefront API

use crate::{ClientConfig, ClientError, ClientResult};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use shared::ApiResponse;

/// Header carrying the tenant id
pub const TENANT_HEADER: &str = "X-Tenant-Id";

/// HTTP client for making network requests to the storefront
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    tenant_id: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
            tenant_id: config.tenant_id.clone(),
        })
    }

    /// Set the authentication token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the current token
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Attach bearer token and tenant headers
    fn authorize(&self, mut request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(tenant_id) = &self.tenant_id {
            request = request.header(TENANT_HEADER, tenant_id);
        }
        request
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ApiResponse<T>> {
        let request = self.authorize(self.client.get(self.url(path)));
        Self::handle_response(request.send().await?).await
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ApiResponse<T>> {
        let request = self.authorize(self.client.delete(self.url(path)));
        Self::handle_response(request.send().await?).await
    }

    /// Make a PUT request without body
    pub async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ApiResponse<T>> {
        let request = self.authorize(self.client.put(self.url(path)));
        Self::handle_response(request.send().await?).await
    }

    /// Make a multipart POST request
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> ClientResult<ApiResponse<T>> {
        let request = self.authorize(self.client.post(self.url(path)).multipart(form));
        Self::handle_response(request.send().await?).await
    }

    /// Handle the HTTP response
    ///
    /// Error bodies in the `ApiResponse` shape surface as [`ClientError::Api`]
    /// with their code; anything else falls back to the status code.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> ClientResult<ApiResponse<T>> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                return Err(ClientError::Unauthorized);
            }
            if let Ok(body) = serde_json::from_str::<ApiResponse<serde_json::Value>>(&text) {
                if !body.is_success() {
                    return Err(ClientError::Api(body.into_error()));
                }
            }
            return match status {
                StatusCode::FORBIDDEN => Err(ClientError::Forbidden(text)),
                StatusCode::NOT_FOUND => Err(ClientError::NotFound(text)),
                StatusCode::BAD_REQUEST => Err(ClientError::Validation(text)),
                _ => Err(ClientError::Internal(text)),
            };
        }

        let body: ApiResponse<T> = serde_json::from_str(&text)?;
        if !body.is_success() {
            return Err(ClientError::Api(body.into_error()));
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_single_slash() {
        let client = ClientConfig::new("http://shop.local/")
            .build_http_client()
            .unwrap();
        assert_eq!(
            client.url("/api/brands/b1/images/0"),
            "http://shop.local/api/brands/b1/images/0"
        );
        assert_eq!(client.url("api/x"), "http://shop.local/api/x");
    }
}
