//! HTTP request builder: a thin wrapper around `reqwest::Client` that joins
//! paths onto the configured base URL and applies the suite's single global
//! timeout to every request. The explicit terminal `send` is the only
//! suspension point of a step.

use tracing::*;

pub use reqwest::{Method, StatusCode};

use crate::{
    config::Config,
    error::{Error, Result},
};

/// HTTP client for the remote service under test.
#[derive(Debug, Clone)]
pub struct Client {
    inner: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Construct a client carrying the configured base URL and timeout.
    pub fn new(cfg: &Config) -> Result<Client> {
        let inner = reqwest::Client::builder().timeout(cfg.timeout()).build()?;
        Ok(Client {
            inner,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn get(&self, path: impl AsRef<str>) -> RequestBuilder {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: impl AsRef<str>) -> RequestBuilder {
        self.request(Method::POST, path)
    }

    pub fn delete(&self, path: impl AsRef<str>) -> RequestBuilder {
        self.request(Method::DELETE, path)
    }

    fn request(&self, method: Method, path: impl AsRef<str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path.as_ref());
        RequestBuilder {
            inner: self.inner.request(method.clone(), &url),
            method,
            url,
        }
    }
}

/// An immutable request description: method, URL and optional JSON body.
/// Nothing is sent until the terminal `send`.
pub struct RequestBuilder {
    inner: reqwest::RequestBuilder,
    method: Method,
    url: String,
}

impl RequestBuilder {
    /// Attach a JSON body to the request.
    pub fn json<T: serde::Serialize + ?Sized>(mut self, json: &T) -> RequestBuilder {
        self.inner = self.inner.json(json);
        self
    }

    /// Send the request and capture the response. A timeout fails the step
    /// immediately; there are no retries.
    pub async fn send(self) -> Result<Response> {
        debug!("{} {}", self.method, self.url);

        let res = self.inner.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    url: self.url.clone(),
                }
            } else {
                Error::Http(e)
            }
        })?;

        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        debug!("{} {} -> {status}", self.method, self.url);

        Ok(Response {
            method: self.method,
            url: self.url,
            status,
            text,
        })
    }
}

/// A captured response: status code plus raw body. Read-only once received.
#[derive(Debug, Clone)]
pub struct Response {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) status: StatusCode,
    pub(crate) text: String,
}

impl Response {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.text)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn test_config(server: &mockito::ServerGuard, timeout: u64) -> Config {
        Config {
            base_url: server.url(),
            timeout,
        }
    }

    #[tokio::test]
    async fn post_sends_json_body() -> eyre::Result<()> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/mercado")
            .match_body(mockito::Matcher::Json(
                serde_json::json!({"nome": "Feira Central"}),
            ))
            .with_status(201)
            .with_body(r#"{"id": 1}"#)
            .create_async()
            .await;

        let client = Client::new(&test_config(&server, 5_000))?;
        let res = client
            .post("/mercado")
            .json(&serde_json::json!({"nome": "Feira Central"}))
            .send()
            .await?;

        mock.assert_async().await;
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.json::<serde_json::Value>()?["id"], 1);
        Ok(())
    }

    #[tokio::test]
    async fn base_url_and_path_are_joined() -> eyre::Result<()> {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/mercado/7/produtos/padaria/doces")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        // Trailing slash on the base URL must not produce a double slash.
        let mut cfg = test_config(&server, 5_000);
        cfg.base_url.push('/');

        let client = Client::new(&cfg)?;
        let res = client.get("/mercado/7/produtos/padaria/doces").send().await?;

        mock.assert_async().await;
        assert_eq!(res.status(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn slow_response_fails_with_timeout() -> eyre::Result<()> {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/mercado")
            .with_chunked_body(|w| {
                std::thread::sleep(std::time::Duration::from_millis(300));
                w.write_all(b"[]")
            })
            .create_async()
            .await;

        let client = Client::new(&test_config(&server, 50))?;
        let err = client.get("/mercado").send().await.unwrap_err();

        assert!(matches!(err, Error::Timeout { .. }), "unexpected error: {err}");
        Ok(())
    }
}
