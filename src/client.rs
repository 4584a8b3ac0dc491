use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::client_logger::ClientLogger;
use crate::credentials::CredentialStore;
use crate::error::{Error, Result};
use crate::observability::{
    CLIENT_AUTH_EXPIRED, CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS,
};
use crate::types::{
    AuthRequest, AuthResponse, ChatRequest, ChatResponse, HistoryResponse, SubscriptionStatus,
    User, VerifyPaymentRequest, VerifyPaymentResponse,
};

const DEFAULT_API_URL: &str = "http://localhost:4000/api/";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Client for the GemiDoc backend.
///
/// Wraps outbound HTTP calls, attaches the current bearer credential, and
/// maps failure responses onto [`Error`]. A 401 response clears the shared
/// [`CredentialStore`] before the error is returned, so the rest of the
/// application observes the expired session immediately.
#[derive(Clone)]
pub struct GemiDoc {
    http: ReqwestClient,
    base_url: String,
    timeout: Duration,
    credentials: CredentialStore,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl GemiDoc {
    /// Create a new client against the default backend.
    ///
    /// The base URL can be overridden with the GEMIDOC_API_URL environment
    /// variable.
    pub fn new(credentials: CredentialStore) -> Result<Self> {
        let base_url = env::var("GEMIDOC_API_URL").ok();
        Self::with_options(credentials, base_url, None)
    }

    /// Create a new client with custom settings.
    pub fn with_options(
        credentials: CredentialStore,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut base_url = base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Url::parse(&base_url)?;

        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let http = ReqwestClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            http,
            base_url,
            timeout,
            credentials,
            logger: None,
        })
    }

    /// Attach a logger that records balance-affecting responses.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The credential store this client attaches tokens from.
    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// The resolved base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create and return default headers for API requests, including the
    /// bearer credential when one is stored.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = self.credentials.token()
            && let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}"))
        {
            headers.insert(header::AUTHORIZATION, value);
        }
        headers
    }

    /// Map a transport-level reqwest failure onto our error type.
    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(self.timeout.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    /// Process a failure response and convert it to our Error type.
    ///
    /// A 401 clears the stored credential: the session is over no matter
    /// which call happened to discover it, and this is the only place that
    /// discovery happens, so the side effect fires exactly once per failing
    /// call.
    async fn process_error_response(&self, response: Response) -> Error {
        let status = response.status();
        let status_code = status.as_u16();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        // Try to parse the error body for a user-facing message
        #[derive(Deserialize)]
        struct ErrorResponse {
            message: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let error_message = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| error_body.clone());

        if status_code == 401 {
            CLIENT_AUTH_EXPIRED.click();
            self.credentials.clear();
        }

        // Map HTTP status code to appropriate error type
        match status_code {
            400 => Error::bad_request(error_message),
            401 => Error::authentication(error_message),
            402 => Error::insufficient_credit(error_message),
            403 => Error::permission(error_message),
            404 => Error::not_found(error_message),
            408 => Error::timeout(error_message, None),
            429 => Error::rate_limit(error_message, retry_after),
            500 => Error::internal_server(error_message),
            502..=504 => Error::service_unavailable(error_message, retry_after),
            _ => Error::api(status_code, error_message),
        }
    }

    async fn finish<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(self.process_error_response(response).await);
        }
        response.json::<T>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let start = Instant::now();
        CLIENT_REQUESTS.click();
        let result = self
            .http
            .get(&url)
            .headers(self.default_headers())
            .send()
            .await
            .map_err(|e| self.transport_error(e));
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                CLIENT_REQUEST_ERRORS.click();
                return Err(err);
            }
        };
        self.finish(response).await.inspect_err(|_| {
            CLIENT_REQUEST_ERRORS.click();
        })
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let start = Instant::now();
        CLIENT_REQUESTS.click();
        let result = self
            .http
            .post(&url)
            .headers(self.default_headers())
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e));
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                CLIENT_REQUEST_ERRORS.click();
                return Err(err);
            }
        };
        self.finish(response).await.inspect_err(|_| {
            CLIENT_REQUEST_ERRORS.click();
        })
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        let start = Instant::now();
        CLIENT_REQUESTS.click();
        let result = self
            .http
            .delete(&url)
            .headers(self.default_headers())
            .send()
            .await
            .map_err(|e| self.transport_error(e));
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                CLIENT_REQUEST_ERRORS.click();
                return Err(err);
            }
        };
        if !response.status().is_success() {
            CLIENT_REQUEST_ERRORS.click();
            return Err(self.process_error_response(response).await);
        }
        Ok(())
    }
}

impl fmt::Debug for GemiDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GemiDoc")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Authentication endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `POST /auth/login`.
    async fn login(&self, request: &AuthRequest) -> Result<AuthResponse>;

    /// `POST /auth/register`.
    async fn register(&self, request: &AuthRequest) -> Result<AuthResponse>;

    /// `GET /auth/profile`.
    async fn profile(&self) -> Result<User>;
}

/// The chat completion endpoint.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// `POST /chat`. May fail with [`Error::InsufficientCredit`].
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

/// Conversation and transaction history endpoints.
#[async_trait]
pub trait HistoryApi: Send + Sync {
    /// `GET /history`.
    async fn history(&self) -> Result<HistoryResponse>;

    /// `DELETE /history`. Clears chat history only.
    async fn clear_history(&self) -> Result<()>;
}

/// Credit purchase and subscription endpoints.
#[async_trait]
pub trait CreditsApi: Send + Sync {
    /// `POST /credits/verify-payment`.
    async fn verify_payment(
        &self,
        request: &VerifyPaymentRequest,
    ) -> Result<VerifyPaymentResponse>;

    /// `GET /credits/subscription`.
    async fn subscription(&self) -> Result<SubscriptionStatus>;
}

#[async_trait]
impl AuthApi for GemiDoc {
    async fn login(&self, request: &AuthRequest) -> Result<AuthResponse> {
        self.post("auth/login", request).await
    }

    async fn register(&self, request: &AuthRequest) -> Result<AuthResponse> {
        self.post("auth/register", request).await
    }

    async fn profile(&self) -> Result<User> {
        self.get("auth/profile").await
    }
}

#[async_trait]
impl ChatApi for GemiDoc {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response: ChatResponse = self.post("chat", request).await?;
        if let Some(logger) = &self.logger {
            logger.log_chat_response(&response);
        }
        Ok(response)
    }
}

#[async_trait]
impl HistoryApi for GemiDoc {
    async fn history(&self) -> Result<HistoryResponse> {
        self.get("history").await
    }

    async fn clear_history(&self) -> Result<()> {
        self.delete("history").await
    }
}

#[async_trait]
impl CreditsApi for GemiDoc {
    async fn verify_payment(
        &self,
        request: &VerifyPaymentRequest,
    ) -> Result<VerifyPaymentResponse> {
        let response: VerifyPaymentResponse =
            self.post("credits/verify-payment", request).await?;
        if let Some(logger) = &self.logger {
            logger.log_payment_verified(&response);
        }
        Ok(response)
    }

    async fn subscription(&self) -> Result<SubscriptionStatus> {
        self.get("credits/subscription").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GemiDoc::with_options(CredentialStore::in_memory(), None, None).unwrap();
        assert_eq!(client.base_url, DEFAULT_API_URL);
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);

        let client = GemiDoc::with_options(
            CredentialStore::in_memory(),
            Some("https://api.example.com/v1".to_string()),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(client.base_url, "https://api.example.com/v1/");
        assert_eq!(client.timeout, Duration::from_secs(30));
    }

    #[test]
    fn rejects_malformed_base_url() {
        let result = GemiDoc::with_options(
            CredentialStore::in_memory(),
            Some("not a url".to_string()),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn bearer_header_follows_store() {
        let credentials = CredentialStore::in_memory();
        let client = GemiDoc::new(credentials.clone()).unwrap();
        assert!(!client.default_headers().contains_key(header::AUTHORIZATION));

        credentials.store("tok-1").unwrap();
        let headers = client.default_headers();
        assert_eq!(
            headers.get(header::AUTHORIZATION).unwrap(),
            &HeaderValue::from_static("Bearer tok-1")
        );

        credentials.clear();
        assert!(!client.default_headers().contains_key(header::AUTHORIZATION));
    }
}
