use futures::future::BoxFuture;
use http::header::ACCEPT;
use http::{HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use url::Url;

use crate::config::FetchConfig;
use crate::errors::NetError;
use crate::net::{BodyFuture, Response};

/// Capability to issue a single HTTP GET.
///
/// Implementations must not retry: one call is one request. The returned
/// [`Response`] may defer reading its body until the caller asks for it.
pub trait HttpClient: Send + Sync {
    fn get<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<Response, NetError>>;
}

/// [`HttpClient`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(config: &FetchConfig) -> Result<Self, NetError> {
        let redirect = match config.max_redirects {
            0 => Policy::none(),
            n => Policy::limited(n),
        };

        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(redirect)
            .gzip(config.compression)
            .brotli(config.compression)
            .deflate(config.compression);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(accept) = &config.accept {
            let value = HeaderValue::from_str(accept)
                .map_err(|e| NetError::Other(format!("invalid accept header: {e}")))?;
            let mut headers = HeaderMap::new();
            headers.insert(ACCEPT, value);
            builder = builder.default_headers(headers);
        }

        Ok(Self { client: builder.build()? })
    }

    /// Wraps an already configured `reqwest::Client`.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl HttpClient for ReqwestClient {
    fn get<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<Response, NetError>> {
        Box::pin(async move {
            let res = self.client.get(url.clone()).send().await?;

            let final_url = res.url().clone();
            let status = res.status();
            // hyper only keeps the phrase when it differs from the canonical one
            let status_text = match res.extensions().get::<hyper::ext::ReasonPhrase>() {
                Some(phrase) => String::from_utf8_lossy(phrase.as_bytes()).into_owned(),
                None => status.canonical_reason().unwrap_or("Unknown").to_string(),
            };
            let headers = res.headers().clone();

            // Body stays on the wire until the caller reads it
            let body: BodyFuture = Box::pin(async move { Ok::<_, NetError>(res.bytes().await?.to_vec()) });

            Ok::<_, NetError>(Response::new(final_url, status.as_u16(), status_text, headers, body))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;
    use crate::{FetchError, StepFetcher};

    const STEP_BODY: &str = "ISO-10303-21;\nHEADER;\nENDSEC;\nEND-ISO-10303-21;";

    fn http_response(status_line: &str, extra_headers: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\n{extra_headers}Connection: close\r\n\r\n{body}",
            body.len()
        )
    }

    /// Accepts one connection, answers with `response` and returns the raw request.
    async fn serve_once(response: String) -> (SocketAddr, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                if request.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            String::from_utf8_lossy(&request).into_owned()
        });

        (addr, handle)
    }

    fn fetcher(config: &FetchConfig) -> StepFetcher {
        StepFetcher::new(Arc::new(ReqwestClient::new(config).unwrap()))
    }

    #[tokio::test]
    async fn returns_body_of_successful_response() {
        let (addr, server) = serve_once(http_response(
            "200 OK",
            "Content-Type: model/step\r\n",
            STEP_BODY,
        ))
        .await;

        let text = fetcher(&FetchConfig::default())
            .fetch_text(&format!("http://{addr}/part.step"))
            .await
            .unwrap();

        assert_eq!(text, STEP_BODY);
        let request = server.await.unwrap();
        assert!(request.starts_with("GET /part.step HTTP/1.1\r\n"));
    }

    #[tokio::test]
    async fn sends_configured_headers() {
        let (addr, server) = serve_once(http_response("200 OK", "", STEP_BODY)).await;
        let config = FetchConfig::builder()
            .user_agent("merger-test/0.1")
            .accept("model/step")
            .build()
            .unwrap();

        fetcher(&config).fetch_text(&format!("http://{addr}/")).await.unwrap();

        let request = server.await.unwrap().to_ascii_lowercase();
        assert!(request.contains("user-agent: merger-test/0.1\r\n"));
        assert!(request.contains("accept: model/step\r\n"));
    }

    #[tokio::test]
    async fn reports_not_found_status() {
        let (addr, _server) = serve_once(http_response("404 Not Found", "", "missing")).await;

        let err = fetcher(&FetchConfig::default())
            .fetch_text(&format!("http://{addr}/missing.step"))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::HttpStatus { status: 404, .. }));
        assert_eq!(err.to_string(), "HTTP 404 Not Found");
    }

    #[tokio::test]
    async fn reports_reason_phrase_sent_by_server() {
        for (status_line, expected) in [
            ("404 File Missing", "HTTP 404 File Missing"),
            ("499 Client Closed", "HTTP 499 Client Closed"),
        ] {
            let (addr, _server) = serve_once(http_response(status_line, "", "")).await;

            let err = fetcher(&FetchConfig::default())
                .fetch_text(&format!("http://{addr}/part.step"))
                .await
                .unwrap_err();

            assert_eq!(err.to_string(), expected);
        }
    }

    #[tokio::test]
    async fn utf8_body_is_not_redecoded_by_declared_charset() {
        let body = "ISO-10303-21;\n/* M\u{FC}ller */\n";
        let (addr, _server) = serve_once(http_response(
            "200 OK",
            "Content-Type: text/plain; charset=ISO-8859-1\r\n",
            body,
        ))
        .await;

        let text = fetcher(&FetchConfig::default())
            .fetch_text(&format!("http://{addr}/part.step"))
            .await
            .unwrap();

        assert_eq!(text, body);
    }

    #[tokio::test]
    async fn wraps_preconfigured_reqwest_client() {
        let (origin, _server) = serve_once(http_response(
            "301 Moved Permanently",
            "Location: http://127.0.0.1:1/elsewhere.step\r\n",
            "",
        ))
        .await;
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .unwrap();
        let fetcher = StepFetcher::new(Arc::new(ReqwestClient::from_client(client)));

        let err = fetcher
            .fetch_text(&format!("http://{origin}/part.step"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(301));
        assert_eq!(err.to_string(), "HTTP 301 Moved Permanently");
    }

    #[tokio::test]
    async fn follows_redirects_by_default() {
        let (target, _target_server) = serve_once(http_response("200 OK", "", STEP_BODY)).await;
        let location = format!("Location: http://{target}/moved.step\r\n");
        let (origin, _origin_server) = serve_once(http_response("302 Found", &location, "")).await;

        let text = fetcher(&FetchConfig::default())
            .fetch_text(&format!("http://{origin}/part.step"))
            .await
            .unwrap();

        assert_eq!(text, STEP_BODY);
    }

    #[tokio::test]
    async fn redirect_is_a_status_failure_when_disabled() {
        let (origin, _server) = serve_once(http_response(
            "302 Found",
            "Location: http://127.0.0.1:1/elsewhere.step\r\n",
            "",
        ))
        .await;
        let config = FetchConfig::builder().max_redirects(0).build().unwrap();

        let err = fetcher(&config)
            .fetch_text(&format!("http://{origin}/part.step"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "HTTP 302 Found");
    }

    #[tokio::test]
    async fn connection_refused_is_a_network_error() {
        // Reserve a port, then free it so nothing is listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = fetcher(&FetchConfig::default())
            .fetch_text(&format!("http://{addr}/part.step"))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Network(_)));
        assert!(err.to_string().starts_with("Network error fetching STEP file"));
    }

    #[tokio::test]
    async fn timeout_is_a_network_error() {
        // Accept but never answer
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });
        let config = FetchConfig::builder().timeout(Duration::from_millis(200)).build().unwrap();

        let err = fetcher(&config)
            .fetch_text(&format!("http://{addr}/slow.step"))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Network(_)));
    }

    #[tokio::test]
    async fn truncated_body_is_a_body_error() {
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\nISO-10303-21;",
            STEP_BODY.len() + 100
        );
        let (addr, _server) = serve_once(response).await;

        let err = fetcher(&FetchConfig::default())
            .fetch_text(&format!("http://{addr}/part.step"))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Body(NetError::Http(_))));
    }
}
