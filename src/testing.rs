//! Loopback HTTP stub for exercising the network hops in tests.
//!
//! Serves canned responses by path prefix, one request per connection, and
//! records each request head so tests can assert on headers and queries.

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    task::JoinHandle,
};
use url::Url;

use crate::{config::Config, http::Client as HttpClient};

pub const SECRETS_PATH: &str = "/secrets.json";
pub const SERVER_TIME_PATH: &str = "/api/server-time";
pub const TOKEN_PATH: &str = "/api/token";
pub const LYRICS_PATH: &str = "/color-lyrics/v2/track/";

#[derive(Clone, Debug)]
struct Route {
    prefix: String,
    status: u16,
    body: String,
}

#[derive(Default)]
pub struct Builder {
    routes: Vec<Route>,
}

impl Builder {
    pub fn route(mut self, prefix: &str, status: u16, body: impl Into<String>) -> Self {
        self.routes.push(Route {
            prefix: prefix.to_owned(),
            status,
            body: body.into(),
        });
        self
    }

    pub async fn start(self) -> StubServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes = Arc::new(Mutex::new(self.routes));
        let requests = Arc::new(Mutex::new(Vec::new()));

        let task = tokio::spawn({
            let routes = Arc::clone(&routes);
            let requests = Arc::clone(&requests);
            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    tokio::spawn(serve(stream, Arc::clone(&routes), Arc::clone(&requests)));
                }
            }
        });

        StubServer {
            addr,
            routes,
            requests,
            task,
        }
    }
}

pub struct StubServer {
    addr: SocketAddr,
    routes: Arc<Mutex<Vec<Route>>>,
    requests: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl StubServer {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn url(&self, path: &str) -> Url {
        Url::parse(&format!("http://{}{path}", self.addr)).unwrap()
    }

    /// Replaces the response served for `prefix`.
    pub fn set_route(&self, prefix: &str, status: u16, body: impl Into<String>) {
        let mut routes = self.routes.lock().unwrap();
        routes.retain(|route| route.prefix != prefix);
        routes.push(Route {
            prefix: prefix.to_owned(),
            status,
            body: body.into(),
        });
    }

    /// Request heads received so far, oldest first.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of requests whose path starts with `prefix`.
    pub fn hits(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|head| request_path(head).starts_with(prefix))
            .count()
    }

    /// A configuration with every endpoint pointed at this server.
    pub fn config(&self) -> Config {
        let mut config = Config::with_sp_dc("stub-sp-dc-cookie".parse().unwrap()).unwrap();
        config.secret_url = self.url(SECRETS_PATH);
        config.server_time_url = self.url(SERVER_TIME_PATH);
        config.token_url = self.url(TOKEN_PATH);
        config.lyrics_url = self.url(LYRICS_PATH);
        config.timeout = Some(Duration::from_secs(5));
        config
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn http_client() -> HttpClient {
    let mut config = Config::with_sp_dc("stub-sp-dc-cookie".parse().unwrap()).unwrap();
    config.timeout = Some(Duration::from_secs(5));
    HttpClient::new(&config).unwrap()
}

/// Path of the request target, without query.
fn request_path(head: &str) -> &str {
    let target = head.split_whitespace().nth(1).unwrap_or("/");
    target.split('?').next().unwrap_or(target)
}

async fn serve(
    mut stream: TcpStream,
    routes: Arc<Mutex<Vec<Route>>>,
    requests: Arc<Mutex<Vec<String>>>,
) {
    let mut head = Vec::new();
    let mut chunk = [0; 1024];
    while !head.windows(4).any(|window| window == b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&chunk[..n]),
        }
    }

    let head = String::from_utf8_lossy(&head).into_owned();
    let path = request_path(&head).to_owned();
    requests.lock().unwrap().push(head);

    let (status, body) = routes
        .lock()
        .unwrap()
        .iter()
        .filter(|route| path.starts_with(&route.prefix))
        .max_by_key(|route| route.prefix.len())
        .map_or((404, String::new()), |route| (route.status, route.body.clone()));

    let reason = reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Unknown");
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}
