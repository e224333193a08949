use reqwest::{multipart, Client, Method, RequestBuilder, Response, StatusCode};
use tokio::sync::RwLock;
use url::Url;

use crate::config::DeploymentConfig;
use crate::error::{Error, ErrorCode, Result};

/// User-Agent sent with every platform request
pub const USER_AGENT: &str = "FancyVerteiler (https://github.com/FancyInnovations/FancyVerteiler)";

/// How a platform expects its credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiAuth {
    /// `Authorization: <value>`, sent verbatim
    Authorization(String),
    /// `Authorization: Bearer <token>`
    Bearer(String),
    /// Custom header such as `X-Api-Key`
    Header(&'static str, String),
}

/// HTTP client bound to one platform's API root
pub struct PlatformClient {
    /// HTTP client for REST API calls
    pub(crate) http_client: Client,
    /// API root, e.g. "https://api.modrinth.com/v2"
    base_url: Url,
    /// Credential attached to every request; Hangar swaps it for a session token
    auth: RwLock<Option<ApiAuth>>,
}

impl PlatformClient {
    /// Create a new platform client
    ///
    /// # Arguments
    /// * `base_url` - The API root every endpoint is appended to
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| Error::new(ErrorCode::Config, format!("Invalid URL: {e}")))?;

        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| Error::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url,
            auth: RwLock::new(None),
        })
    }

    /// Attach a credential (builder pattern)
    pub fn with_auth(mut self, auth: ApiAuth) -> Self {
        self.auth = RwLock::new(Some(auth));
        self
    }

    /// Replace the credential used for subsequent requests
    pub async fn set_auth(&self, auth: ApiAuth) {
        let mut a = self.auth.write().await;
        *a = Some(auth);
    }

    /// Build the full API URL for a given endpoint
    pub fn api_url(&self, endpoint: &str) -> String {
        let endpoint = endpoint.trim_start_matches('/');
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/{endpoint}")
    }

    /// Start a request with the current credential attached
    pub(crate) async fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let request = self.http_client.request(method, self.api_url(endpoint));

        match self.auth.read().await.as_ref() {
            Some(ApiAuth::Authorization(value)) => {
                request.header(reqwest::header::AUTHORIZATION, value)
            }
            Some(ApiAuth::Bearer(token)) => request.bearer_auth(token),
            Some(ApiAuth::Header(name, value)) => request.header(*name, value),
            None => request,
        }
    }

    /// Send a prepared request, mapping transport failures
    ///
    /// The URL is stripped from transport errors since some platforms take
    /// credentials in the query string.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response> {
        request
            .send()
            .await
            .map_err(|e| Error::network(format!("Request failed: {}", e.without_url())))
    }

    /// POST a JSON body
    pub async fn post_json<T: serde::Serialize>(&self, endpoint: &str, body: &T) -> Result<Response> {
        let request = self.request(Method::POST, endpoint).await.json(body);
        self.send(request).await
    }

    /// PATCH a JSON body
    pub async fn patch_json<T: serde::Serialize>(&self, endpoint: &str, body: &T) -> Result<Response> {
        let request = self.request(Method::PATCH, endpoint).await.json(body);
        self.send(request).await
    }

    /// POST a multipart form
    pub async fn post_multipart(&self, endpoint: &str, form: multipart::Form) -> Result<Response> {
        let request = self.request(Method::POST, endpoint).await.multipart(form);
        self.send(request).await
    }

    /// POST raw bytes as the request body
    pub async fn post_bytes(&self, endpoint: &str, data: Vec<u8>) -> Result<Response> {
        let request = self
            .request(Method::POST, endpoint)
            .await
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data);
        self.send(request).await
    }

    /// POST without a body
    pub async fn post_empty(&self, endpoint: &str) -> Result<Response> {
        let request = self.request(Method::POST, endpoint).await;
        self.send(request).await
    }

    /// Fail with `ErrorCode::Http` unless the response has the expected status
    ///
    /// The response body is captured in the error for diagnostics.
    pub async fn expect_status(&self, response: Response, expected: StatusCode) -> Result<Response> {
        let status = response.status();
        if status == expected {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<failed to read body: {e}>"));
        Err(Error::http(status.as_u16(), body))
    }

    /// Check the status and extract the JSON body
    pub async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: Response,
        expected: StatusCode,
    ) -> Result<T> {
        let response = self.expect_status(response, expected).await?;
        response.json::<T>().await.map_err(|e| {
            Error::new(ErrorCode::Serialization, format!("Failed to parse response: {e}"))
        })
    }
}

/// Multipart part carrying the artifact under its resolved file name
pub async fn artifact_part(config: &DeploymentConfig) -> Result<multipart::Part> {
    let data = config.plugin_artifact().await?.to_vec();
    let file_name = config.artifact_file_name().await?;
    multipart::Part::bytes(data)
        .file_name(file_name)
        .mime_str("application/java-archive")
        .map_err(|e| Error::new(ErrorCode::Serialization, format!("Invalid MIME type: {e}")))
}

/// Serialize a request body that travels as a multipart text field
pub fn json_field<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| Error::new(ErrorCode::Serialization, format!("Failed to encode request: {e}")))
}
