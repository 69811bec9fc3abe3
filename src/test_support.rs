use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::app::api::{FeedItem, FeedPage, VideoApi};
use crate::http::{ApiError, ApiResult};

/// Loopback HTTP server that answers queued `(status, body)` pairs in order
/// and records each request target.
pub(crate) struct StubServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub(crate) fn spawn(responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind stub server");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        std::thread::spawn(move || {
            for (status, body) in responses {
                let Ok((mut stream, _)) = listener.accept() else {
                    break;
                };
                let target = read_request_target(&mut stream).unwrap_or_default();
                recorded.lock().expect("lock requests").push(target);
                let _ = write_response(&mut stream, status, &body);
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    pub(crate) fn base_url(&self) -> String {
        self.base_url.clone()
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock requests").clone()
    }
}

/// URL of a port nobody listens on.
pub(crate) fn closed_port_url() -> String {
    let listener = TcpListener::bind(("127.0.0.1", 0)).expect("bind probe");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

fn read_request_target(stream: &mut TcpStream) -> std::io::Result<String> {
    stream.set_read_timeout(Some(Duration::from_millis(500)))?;
    let mut buf = [0_u8; 1024];
    let mut data = Vec::new();
    loop {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => {
                data.extend_from_slice(&buf[..read]);
                if data.windows(4).any(|window| window == b"\r\n\r\n") {
                    break;
                }
            }
            Err(err)
                if err.kind() == std::io::ErrorKind::WouldBlock
                    || err.kind() == std::io::ErrorKind::TimedOut =>
            {
                break;
            }
            Err(err) => return Err(err),
        }
    }
    let head = String::from_utf8_lossy(&data);
    let target = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string();
    Ok(target)
}

fn write_response(stream: &mut TcpStream, status: u16, body: &str) -> std::io::Result<()> {
    let payload = body.as_bytes();
    write!(
        stream,
        "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        payload.len()
    )?;
    stream.write_all(payload)?;
    stream.flush()
}

pub(crate) fn feed_item(video_id: &str, title: &str, published_at: &str) -> FeedItem {
    FeedItem {
        video_id: video_id.to_string(),
        title: title.to_string(),
        published_at: published_at.to_string(),
    }
}

/// In-memory `VideoApi`. Lookups without a scripted answer return an empty
/// result; feeds without a scripted page return a missing-`items` error.
#[derive(Default)]
pub(crate) struct FakeApi {
    usernames: HashMap<String, ApiResult<Vec<String>>>,
    searches: HashMap<String, ApiResult<Vec<String>>>,
    pages: HashMap<(String, Option<String>), ApiResult<FeedPage>>,
    comments: HashMap<String, ApiResult<usize>>,
    calls: RefCell<Vec<String>>,
}

impl FakeApi {
    pub(crate) fn with_username(mut self, username: &str, result: ApiResult<Vec<String>>) -> Self {
        self.usernames.insert(username.to_string(), result);
        self
    }

    pub(crate) fn with_search(mut self, query: &str, result: ApiResult<Vec<String>>) -> Self {
        self.searches.insert(query.to_string(), result);
        self
    }

    /// Scripts a feed whose pages are chained with tokens `tok-1`, `tok-2`, ...
    pub(crate) fn with_feed(mut self, playlist_id: &str, pages: Vec<Vec<FeedItem>>) -> Self {
        let count = pages.len();
        for (index, items) in pages.into_iter().enumerate() {
            let token = (index > 0).then(|| format!("tok-{index}"));
            let next_page_token = (index + 1 < count).then(|| format!("tok-{}", index + 1));
            self.pages.insert(
                (playlist_id.to_string(), token),
                Ok(FeedPage {
                    items,
                    next_page_token,
                    skipped_items: 0,
                }),
            );
        }
        self
    }

    pub(crate) fn with_page(
        mut self,
        playlist_id: &str,
        token: Option<&str>,
        result: ApiResult<FeedPage>,
    ) -> Self {
        self.pages.insert(
            (playlist_id.to_string(), token.map(str::to_string)),
            result,
        );
        self
    }

    pub(crate) fn with_comments(mut self, video_id: &str, result: ApiResult<usize>) -> Self {
        self.comments.insert(video_id.to_string(), result);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub(crate) fn count_calls(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl VideoApi for FakeApi {
    fn channels_for_username(&self, username: &str) -> ApiResult<Vec<String>> {
        self.record(format!("channels:{username}"));
        self.usernames
            .get(username)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn search_channels(&self, query: &str) -> ApiResult<Vec<String>> {
        self.record(format!("search:{query}"));
        self.searches
            .get(query)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn playlist_items(&self, playlist_id: &str, page_token: Option<&str>) -> ApiResult<FeedPage> {
        self.record(format!(
            "playlist:{playlist_id}:{}",
            page_token.unwrap_or("-")
        ));
        self.pages
            .get(&(playlist_id.to_string(), page_token.map(str::to_string)))
            .cloned()
            .unwrap_or_else(|| {
                Err(ApiError::MissingField {
                    field: "items",
                    excerpt: "{}".to_string(),
                })
            })
    }

    fn comment_thread_count(&self, video_id: &str) -> ApiResult<usize> {
        self.record(format!("comments:{video_id}"));
        self.comments.get(video_id).cloned().unwrap_or(Ok(0))
    }
}
