//! In-process fakes for exercising sync without a real backend

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use super::remote::{RemoteError, RemoteResult, RemoteStore};

#[derive(Debug, Clone, PartialEq)]
pub enum RemoteCall {
    Insert {
        collection: String,
        payload: Value,
    },
    Update {
        collection: String,
        id: String,
        payload: Value,
    },
    Delete {
        collection: String,
        id: String,
    },
}

/// Remote store keeping rows in memory and recording every call.
#[derive(Default)]
pub struct MemoryRemoteStore {
    calls: Mutex<Vec<RemoteCall>>,
    rows: Mutex<HashMap<String, BTreeMap<String, Value>>>,
    failing_ids: Mutex<HashSet<String>>,
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call is held until the returned `release` is notified.
    /// `entered` fires when a call reaches the store.
    pub fn gated() -> (Self, Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let store = Self {
            gate: Some((Arc::clone(&entered), Arc::clone(&release))),
            ..Self::default()
        };
        (store, entered, release)
    }

    pub fn fail_for(&self, id: &str) {
        self.failing_ids.lock().unwrap().insert(id.to_string());
    }

    pub fn heal(&self, id: &str) {
        self.failing_ids.lock().unwrap().remove(id);
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn row(&self, collection: &str, id: &str) -> Option<Value> {
        self.rows
            .lock()
            .unwrap()
            .get(collection)
            .and_then(|rows| rows.get(id))
            .cloned()
    }

    pub fn row_count(&self, collection: &str) -> usize {
        self.rows
            .lock()
            .unwrap()
            .get(collection)
            .map_or(0, BTreeMap::len)
    }

    async fn enter(&self, call: RemoteCall, id: &str) -> RemoteResult<()> {
        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }

        self.calls.lock().unwrap().push(call);
        if self.failing_ids.lock().unwrap().contains(id) {
            return Err(RemoteError::Api {
                status: 500,
                message: format!("scripted failure for {id}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn insert(&self, collection: &str, payload: &Value) -> RemoteResult<()> {
        let id = payload
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| RemoteError::InvalidPayload("insert without id".to_string()))?
            .to_string();
        let call = RemoteCall::Insert {
            collection: collection.to_string(),
            payload: payload.clone(),
        };
        self.enter(call, &id).await?;

        self.rows
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .insert(id, payload.clone());
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, payload: &Value) -> RemoteResult<()> {
        let call = RemoteCall::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            payload: payload.clone(),
        };
        self.enter(call, id).await?;

        let mut rows = self.rows.lock().unwrap();
        if let Some(Value::Object(row)) = rows.get_mut(collection).and_then(|rows| rows.get_mut(id))
        {
            if let Value::Object(changes) = payload {
                for (key, value) in changes {
                    row.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> RemoteResult<()> {
        let call = RemoteCall::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        };
        self.enter(call, id).await?;

        if let Some(rows) = self.rows.lock().unwrap().get_mut(collection) {
            rows.remove(id);
        }
        Ok(())
    }
}

/// Accept one HTTP request on a loopback port, answer it with `status` and
/// `body`, and resolve to the raw request text.
pub async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let raw = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        raw
    });

    (format!("http://{addr}"), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 1024];

    loop {
        let read = socket.read(&mut chunk).await.unwrap();
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);

        if let Some(header_end) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buffer[..header_end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buffer.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8(buffer).unwrap()
}
