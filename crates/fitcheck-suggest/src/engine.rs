use std::time::Duration;

use fitcheck_core::GenerationSettings;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

/// Role framing prepended to every generation prompt.
const SYSTEM_PREFIX: &str =
    "You are a personal fashion stylist. Follow the user's instructions exactly.\n\n";

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Client failures, all distinguishable to the caller. None of these reach
/// the end user directly; the orchestrator converts them into a fallback
/// outfit.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("generation endpoint unreachable")]
    Connection,
    #[error("generation request timed out")]
    Timeout,
    #[error("generation endpoint returned http {status}")]
    Http { status: u16 },
    #[error("generation response missing text field")]
    MalformedResponse,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Client for an Ollama-shaped text-generation endpoint
/// (`POST {base}/api/generate`). Holds no ambient state; reachability is an
/// explicit method the caller polls when it wants to.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    num_predict: u32,
    temperature: f64,
    top_p: f64,
    timeout: Duration,
}

impl GenerationClient {
    pub fn new(settings: &GenerationSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            num_predict: settings.num_predict,
            temperature: settings.temperature,
            top_p: settings.top_p,
            timeout: Duration::from_millis(settings.timeout_ms),
        }
    }

    /// Short-timeout HEAD probe of the endpoint base URL. Any 2xx response
    /// counts as reachable.
    pub async fn check_health(&self) -> bool {
        match self
            .http
            .head(&self.base_url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
        {
            Ok(res) => res.status().is_success(),
            Err(e) => {
                debug!(error = %e, "health probe failed");
                false
            }
        }
    }

    /// Issue one generation request with the configured timeout.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        self.generate_with_timeout(prompt, self.timeout).await
    }

    /// Issue one generation request, aborting after `timeout`. Probes the
    /// endpoint first so an unreachable host fails fast instead of waiting
    /// out the full timeout. No retries here; bounded retry is the caller's
    /// concern.
    pub async fn generate_with_timeout(
        &self,
        prompt: &str,
        timeout: Duration,
    ) -> Result<String, GenerateError> {
        if !self.check_health().await {
            return Err(GenerateError::Connection);
        }

        let body = json!({
            "model": self.model,
            "prompt": format!("{SYSTEM_PREFIX}{prompt}"),
            "stream": false,
            "options": {
                "num_predict": self.num_predict,
                "temperature": self.temperature,
                "top_p": self.top_p,
                "stop": ["\n\n"],
            },
        });

        let res = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .timeout(timeout)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = res.status();
        if !status.is_success() {
            return Err(GenerateError::Http {
                status: status.as_u16(),
            });
        }

        let data: GenerateResponse = res
            .json()
            .await
            .map_err(|_| GenerateError::MalformedResponse)?;

        match data.response {
            Some(text) => Ok(text.trim().to_string()),
            None => Err(GenerateError::MalformedResponse),
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> GenerateError {
    if e.is_timeout() {
        GenerateError::Timeout
    } else {
        GenerateError::Connection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn client_for(base_url: &str, timeout_ms: u64) -> GenerationClient {
        GenerationClient::new(&GenerationSettings {
            base_url: base_url.to_string(),
            model: "test-model".to_string(),
            timeout_ms,
            ..Default::default()
        })
    }

    /// Minimal HTTP stub: answers HEAD probes with 200, then handles the
    /// POST according to `mode`.
    async fn spawn_stub(mode: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 8192];
                    let mut filled = 0;
                    loop {
                        let Ok(n) = socket.read(&mut buf[filled..]).await else {
                            return;
                        };
                        if n == 0 {
                            return;
                        }
                        filled += n;
                        let head = String::from_utf8_lossy(&buf[..filled]);
                        if !head.contains("\r\n\r\n") {
                            continue;
                        }
                        let reply = if head.starts_with("HEAD") {
                            "HTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n".to_string()
                        } else {
                            match mode {
                                "stall" => {
                                    tokio::time::sleep(Duration::from_secs(60)).await;
                                    return;
                                }
                                "error" => {
                                    "HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\n\r\n"
                                        .to_string()
                                }
                                "garbage" => {
                                    let body = "not json";
                                    format!(
                                        "HTTP/1.1 200 OK\r\ncontent-length: {}\r\n\r\n{}",
                                        body.len(),
                                        body
                                    )
                                }
                                _ => {
                                    let body =
                                        r#"{"response":"  Casual Look | White Shirt | Blue Jeans | None | None | Nice  "}"#;
                                    format!(
                                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n{}",
                                        body.len(),
                                        body
                                    )
                                }
                            }
                        };
                        let _ = socket.write_all(reply.as_bytes()).await;
                        filled = 0;
                    }
                });
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails_fast_with_connection_error() {
        // nothing listens on this port
        let client = client_for("http://127.0.0.1:9", 120_000);
        let started = Instant::now();
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, GenerateError::Connection));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn successful_generation_returns_trimmed_text() {
        let base = spawn_stub("ok").await;
        let client = client_for(&base, 5_000);
        let text = client.generate("prompt").await.unwrap();
        assert_eq!(text, "Casual Look | White Shirt | Blue Jeans | None | None | Nice");
    }

    #[tokio::test]
    async fn stalled_endpoint_times_out_within_bound() {
        let base = spawn_stub("stall").await;
        let client = client_for(&base, 120_000);
        let started = Instant::now();
        let err = client
            .generate_with_timeout("prompt", Duration::from_millis(300))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Timeout));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn non_2xx_status_is_reported_with_code() {
        let base = spawn_stub("error").await;
        let client = client_for(&base, 5_000);
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, GenerateError::Http { status: 500 }));
    }

    #[tokio::test]
    async fn missing_text_field_is_malformed() {
        let base = spawn_stub("garbage").await;
        let client = client_for(&base, 5_000);
        let err = client.generate("prompt").await.unwrap_err();
        assert!(matches!(err, GenerateError::MalformedResponse));
    }
}
