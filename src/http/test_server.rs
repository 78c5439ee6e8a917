use std::num::{NonZeroU32, NonZeroUsize};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::domain::{ArrayGaps, ParamMode, RunConfig};

/// What the server answers for one request.
#[derive(Debug, Clone)]
pub(crate) struct Reply {
    pub(crate) status: u16,
    pub(crate) body: String,
    pub(crate) delay: Duration,
}

impl Reply {
    pub(crate) fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_owned(),
            delay: Duration::ZERO,
        }
    }

    pub(crate) const fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub(crate) body: String,
    pub(crate) at: Instant,
}

type Script = dyn Fn(usize, &str) -> Reply + Send + Sync;

/// Minimal HTTP/1.1 server answering from a script, for sender and
/// dispatcher tests. Requests are recorded in arrival order.
pub(crate) struct ScriptedServer {
    url: String,
    recorded: Arc<Mutex<Vec<Recorded>>>,
    accept_task: JoinHandle<()>,
}

impl Drop for ScriptedServer {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

impl ScriptedServer {
    pub(crate) async fn spawn<F>(script: F) -> Result<Self, String>
    where
        F: Fn(usize, &str) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|err| format!("bind test server failed: {}", err))?;
        let addr = listener
            .local_addr()
            .map_err(|err| format!("server addr failed: {}", err))?;
        let recorded = Arc::new(Mutex::new(Vec::new()));
        let script: Arc<Script> = Arc::new(script);

        let task_recorded = Arc::clone(&recorded);
        let accept_task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = Arc::clone(&task_recorded);
                let script = Arc::clone(&script);
                tokio::spawn(handle_client(stream, recorded, script));
            }
        });

        Ok(Self {
            url: format!("http://{}/invoke", addr),
            recorded,
            accept_task,
        })
    }

    pub(crate) fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn requests(&self) -> Vec<Recorded> {
        self.recorded
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub(crate) fn hits(&self) -> usize {
        self.requests().len()
    }
}

async fn handle_client(
    mut stream: TcpStream,
    recorded: Arc<Mutex<Vec<Recorded>>>,
    script: Arc<Script>,
) {
    let mut pending: Vec<u8> = Vec::new();
    let mut buf = [0_u8; 4096];
    loop {
        let Some(header_end) = find_header_end(&pending) else {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(read) => {
                    pending.extend_from_slice(buf.get(..read).unwrap_or_default());
                    continue;
                }
            }
        };
        let head = String::from_utf8_lossy(pending.get(..header_end).unwrap_or_default())
            .into_owned();
        let body_len = content_length(&head);
        let body_start = header_end.saturating_add(4);
        let body_end = body_start.saturating_add(body_len);
        while pending.len() < body_end {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(read) => pending.extend_from_slice(buf.get(..read).unwrap_or_default()),
            }
        }
        let body = String::from_utf8_lossy(pending.get(body_start..body_end).unwrap_or_default())
            .into_owned();
        pending.drain(..body_end);

        let seq = match recorded.lock() {
            Ok(mut guard) => {
                guard.push(Recorded {
                    body: body.clone(),
                    at: Instant::now(),
                });
                guard.len().saturating_sub(1)
            }
            Err(_) => return,
        };
        let reply = script(seq, &body);
        if !reply.delay.is_zero() {
            tokio::time::sleep(reply.delay).await;
        }
        let response = format!(
            "HTTP/1.1 {} Scripted\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            reply.status,
            reply.body.len(),
            reply.body
        );
        if stream.write_all(response.as_bytes()).await.is_err() {
            return;
        }
    }
}

fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|window| window == b"\r\n\r\n")
}

fn content_length(head: &str) -> usize {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

/// Run config pointed at `url` with two fake endpoints and fast retries.
pub(crate) fn run_config(url: &str, max_retries: u32) -> RunConfig {
    RunConfig {
        url: url.to_owned(),
        cookie: Some("session=abc".to_owned()),
        body_template: r#"{"appId":"demo","ipPort":"placeholder"}"#.to_owned(),
        endpoints: vec!["10.0.0.1:80".to_owned(), "10.0.0.2:80".to_owned()],
        qps: NonZeroU32::new(1000).unwrap_or(NonZeroU32::MIN),
        workers: NonZeroUsize::new(4).unwrap_or(NonZeroUsize::MIN),
        max_retries,
        param_mode: ParamMode::Object,
        array_gaps: ArrayGaps::Shift,
        mappings: Vec::new(),
        endpoint_field: "ipPort".to_owned(),
        params_field: "jsonParam".to_owned(),
        failure_marker: "call failed".to_owned(),
        origin: "http://127.0.0.1".to_owned(),
        referer: "http://127.0.0.1/".to_owned(),
    }
}
