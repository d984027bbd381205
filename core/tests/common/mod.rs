//! Shared fakes for store tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tasks_core::hooks::{Navigator, Notification, NotificationKind, Notifier};
use tasks_core::{
    AppContext, ClientConfig, HttpRequest, HttpResponse, Persistence, Transport, TransportError,
};
use tokio::sync::{mpsc, oneshot};

pub const BASE_URL: &str = "http://localhost:3000";

pub fn json(status: u16, body: Value) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status,
        headers: Vec::new(),
        body: body.to_string(),
    })
}

pub fn network_error(message: &str) -> Result<HttpResponse, TransportError> {
    Err(TransportError::Network(message.to_string()))
}

/// Answers requests from a queue, in order, and records what was sent.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, reply: Result<HttpResponse, TransportError>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn sent(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> HttpRequest {
        self.sent().pop().expect("no request was sent")
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.sent.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected request: no scripted reply left")
    }
}

pub type Pending = (HttpRequest, oneshot::Sender<Result<HttpResponse, TransportError>>);

/// Hands every request to the test, which decides when (and in what order)
/// each one is answered.
pub struct GatedTransport {
    requests: mpsc::UnboundedSender<Pending>,
}

impl GatedTransport {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Pending>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { requests: tx }), rx)
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let (tx, rx) = oneshot::channel();
        self.requests
            .send((request, tx))
            .map_err(|_| TransportError::Network("test harness gone".to_string()))?;
        rx.await
            .map_err(|_| TransportError::Network("reply dropped".to_string()))?
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn seen(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last(&self) -> Notification {
        self.seen().pop().expect("nothing was notified")
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        self.seen().iter().filter(|n| n.kind == kind).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

pub struct Harness {
    pub app: AppContext,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
    pub storage: Persistence,
}

pub fn harness(transport: Arc<dyn Transport>, per_page: u32) -> Harness {
    harness_with_storage(transport, per_page, Persistence::in_memory())
}

pub fn harness_with_storage(
    transport: Arc<dyn Transport>,
    per_page: u32,
    storage: Persistence,
) -> Harness {
    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::default());
    let config = ClientConfig {
        per_page,
        ..ClientConfig::new(BASE_URL)
    };
    let app = AppContext::new(
        &config,
        transport,
        storage.clone(),
        notifier.clone(),
        navigator.clone(),
    );
    Harness {
        app,
        notifier,
        navigator,
        storage,
    }
}

pub fn task(id: &str, title: &str, done: bool) -> Value {
    serde_json::json!({ "id": id, "title": title, "description": "", "is_completed": done })
}

pub fn page(tasks: Vec<Value>, page: u32, total: u64, total_pages: u32) -> Result<HttpResponse, TransportError> {
    json(
        200,
        serde_json::json!({
            "success": true,
            "tasks": tasks,
            "pagination": { "page": page, "total": total, "total_pages": total_pages },
        }),
    )
}
