use reqwest::Url;

use super::{interpret_response, SolveRequest, SolverClient};
use crate::{Route, ViewerError};

/// Sends solve requests as `POST` with a JSON body.
#[derive(Debug, Clone)]
pub struct HttpSolverClient {
    http_client: reqwest::Client,
    url: Url,
}

impl HttpSolverClient {
    /// Creates a client posting to `url`.
    pub fn new(url: Url) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            url,
        }
    }

    /// Solver endpoint.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl SolverClient for HttpSolverClient {
    async fn solve(&self, request: &SolveRequest) -> Result<Vec<Route>, ViewerError> {
        log::info!("Requesting routes for depot {} from {}", request.depot, self.url);

        let response = self
            .http_client
            .post(self.url.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        let routes = interpret_response(status, &body)?;
        log::info!("Solver returned {} routes", routes.len());

        Ok(routes)
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use assert_matches::assert_matches;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;
    use crate::Coordinate;

    // Answers a single request with the given status line and JSON body and returns the raw
    // request text.
    async fn serve_once(listener: TcpListener, status: &'static str, body: &'static str) -> String {
        let (mut stream, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !is_complete(&request) {
            let read = stream.read(&mut buf).await.unwrap();
            if read == 0 {
                break;
            }
            request.extend_from_slice(&buf[..read]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();

        String::from_utf8(request).unwrap()
    }

    fn is_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request).to_lowercase();
        let Some(headers_end) = text.find("\r\n\r\n") else {
            return false;
        };

        let content_length = text[..headers_end]
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|value| value.trim().parse::<usize>().ok())
            .unwrap_or(0);

        request.len() >= headers_end + 4 + content_length
    }

    fn local_url(listener: &TcpListener) -> Url {
        format!("http://{}/solve-vrp", listener.local_addr().unwrap())
            .parse()
            .unwrap()
    }

    #[test]
    fn posts_depot_as_json() {
        tokio_test::block_on(async {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let client = HttpSolverClient::new(local_url(&listener));
            let server = tokio::spawn(serve_once(
                listener,
                "200 OK",
                r#"{"status":"success","routes":[[[38.7,-9.1],[38.8,-9.2]]]}"#,
            ));

            let routes = client
                .solve(&SolveRequest::new(Coordinate::new(38.7223, -9.1393)))
                .await
                .unwrap();

            let request = server.await.unwrap().to_lowercase();
            assert!(request.starts_with("post /solve-vrp http/1.1\r\n"));
            assert!(request.contains("\r\ncontent-type: application/json\r\n"));
            assert!(request.ends_with(r#"{"depot":{"lat":38.7223,"lng":-9.1393}}"#));

            assert_eq!(routes.len(), 1);
            assert_eq!(routes[0].points()[1], Coordinate::new(38.8, -9.2));
        });
    }

    #[test]
    fn server_error_status_carries_message() {
        tokio_test::block_on(async {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let client = HttpSolverClient::new(local_url(&listener));
            let server = tokio::spawn(serve_once(
                listener,
                "500 Internal Server Error",
                r#"{"status":"error","message":"graph not loaded"}"#,
            ));

            let result = client
                .solve(&SolveRequest::new(Coordinate::new(38.7, -9.1)))
                .await;
            server.await.unwrap();

            assert_matches!(result, Err(ViewerError::Server(message)) if message == "graph not loaded");
        });
    }

    #[test]
    fn unreachable_solver_is_network_error() {
        tokio_test::block_on(async {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let url = local_url(&listener);
            drop(listener);

            let result = HttpSolverClient::new(url)
                .solve(&SolveRequest::new(Coordinate::new(38.7, -9.1)))
                .await;

            assert_matches!(result, Err(ViewerError::Network(_)));
        });
    }
}
