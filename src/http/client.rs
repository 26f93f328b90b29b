//! REST client with timeout, retry and business-error unwrapping.
//!
//! # Responsibilities
//! - Build `{api_base}/api/app{path}` URLs with null-free query strings
//! - Attach the bearer token when a call asks for auth
//! - Run each attempt under the configured deadline
//! - Retry transient failures with exponential backoff
//! - Unwrap the `{code, data, message}` envelope
//!
//! # Design Decisions
//! - Attempts are strictly sequential
//! - The token is fetched once per call, not per attempt
//! - The response body is read inside the deadline

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

use crate::auth::TokenCache;
use crate::blockchain::client::is_truthy;
use crate::config::schema::{HttpConfig, SkillConfig};
use crate::http::types::{ApiError, ApiResult, RequestOptions, API_PREFIX, SUCCESS_CODE};
use crate::http::url::{encode_query, join_url};
use crate::observability::metrics;
use crate::resilience::{is_retryable_status, run_with_timeout, AttemptOutcome, RetryPolicy};

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base: String,
    http: HttpConfig,
    tokens: Arc<TokenCache>,
}

impl ApiClient {
    pub fn new(config: &SkillConfig, client: reqwest::Client, tokens: Arc<TokenCache>) -> Self {
        Self {
            client,
            base: format!("{}{}", config.api.api_base.trim_end_matches('/'), API_PREFIX),
            http: config.http.clone(),
            tokens,
        }
    }

    /// Base all relative paths are joined onto.
    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&Value>,
        options: RequestOptions,
    ) -> ApiResult<T> {
        let url = join_url(&self.base, path) + &encode_query(query);
        let data = self.execute(Method::GET, path, &url, None, options).await?;
        decode_into(path, data)
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &Value,
        options: RequestOptions,
    ) -> ApiResult<T> {
        let url = join_url(&self.base, path);
        let data = self.execute(Method::POST, path, &url, Some(body), options).await?;
        decode_into(path, data)
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        url: &str,
        body: Option<&Value>,
        options: RequestOptions,
    ) -> ApiResult<Value> {
        let authorization = if options.auth {
            Some(self.tokens.get_access_token(false).await?.authorization_header())
        } else {
            None
        };

        let policy = RetryPolicy::for_method(&self.http, &method);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;

            let mut request = self.client.request(method.clone(), url);
            if let Some(value) = &authorization {
                request = request.header(AUTHORIZATION, value);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let started = Instant::now();
            let outcome = run_with_timeout(self.http.timeout_ms, async {
                let response = request.send().await?;
                let status = response.status();
                let text = response.text().await?;
                Ok::<_, reqwest::Error>((status, text))
            })
            .await;

            let (error, retryable) = match outcome {
                AttemptOutcome::Completed((status, text)) if status.is_success() => {
                    metrics::record_http_attempt(method.as_str(), "success", started.elapsed());
                    return unwrap_envelope(path, &text);
                }
                AttemptOutcome::Completed((status, text)) => {
                    metrics::record_http_attempt(method.as_str(), "http_error", started.elapsed());
                    (http_error(path, status, text), is_retryable_status(status))
                }
                AttemptOutcome::TimedOut(bound) => {
                    metrics::record_http_attempt(method.as_str(), "timeout", started.elapsed());
                    let timeout_ms = bound.as_millis() as u64;
                    (ApiError::Timeout { path: path.to_string(), timeout_ms }, true)
                }
                AttemptOutcome::NetworkError(e) => {
                    metrics::record_http_attempt(method.as_str(), "network_error", started.elapsed());
                    let reason = e.without_url().to_string();
                    (ApiError::Network { path: path.to_string(), reason }, true)
                }
            };

            if !retryable || !policy.should_retry(attempt) {
                tracing::debug!(
                    method = %method,
                    path = %path,
                    attempt,
                    code = error.code(),
                    "Request failed"
                );
                return Err(error);
            }

            let delay = policy.backoff(attempt);
            tracing::debug!(
                method = %method,
                path = %path,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retrying request"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base)
            .field("http", &self.http)
            .finish()
    }
}

fn http_error(path: &str, status: StatusCode, body: String) -> ApiError {
    ApiError::Http {
        status: status.as_u16(),
        path: path.to_string(),
        body,
    }
}

/// `data` from a success envelope, the whole body when `data` is absent.
pub fn unwrap_envelope(path: &str, text: &str) -> ApiResult<Value> {
    let body: Value = serde_json::from_str(text).map_err(|e| ApiError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })?;

    if let Some(code) = body.get("code").filter(|c| is_truthy(c)) {
        let code = match code {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if code != SUCCESS_CODE {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("api error {}", code));
            return Err(ApiError::Business { code, message, body });
        }
    }

    Ok(match body {
        Value::Object(mut map) if map.get("data").is_some_and(|d| !d.is_null()) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    })
}

fn decode_into<T: DeserializeOwned>(path: &str, data: Value) -> ApiResult<T> {
    serde_json::from_value(data).map_err(|e| ApiError::Decode {
        path: path.to_string(),
        reason: e.to_string(),
    })
}
