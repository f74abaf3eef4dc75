use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use http::{Method, StatusCode};
use roomly_core::ApiError;
use roomly_http::{ApiCall, ApiFuture, ApiRequest};
use serde_json::Value;
use tokio::sync::watch;

/// Holds a scripted reply back until opened.
///
/// Used to keep a request in flight while the test issues more calls.
#[derive(Clone)]
pub struct Gate {
    tx: Arc<watch::Sender<bool>>,
}

impl Gate {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Release every reply waiting on this gate.
    pub fn open(&self) {
        self.tx.send_replace(true);
    }

    async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|open| *open).await;
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new()
    }
}

struct Scripted {
    reply: Result<Value, ApiError>,
    gate: Option<Gate>,
}

type RouteKey = (Method, String);

#[derive(Default)]
struct Routes {
    queued: HashMap<RouteKey, VecDeque<Scripted>>,
    fixed: HashMap<RouteKey, Result<Value, ApiError>>,
}

/// Scripted in-process backend implementing [`ApiCall`].
///
/// Replies are registered per `(method, path)`. One-shot replies are served
/// first, in registration order; afterwards the route's fixed reply (if any)
/// answers every call. Unscripted routes fail with a transport error.
///
/// ```ignore
/// let backend = MockBackend::new();
/// backend.reply(Method::GET, "/rooms", paginated(numbered("room", 1..=20), 1, 20, 60));
/// backend.fail(Method::POST, "/rooms", ApiError::status(StatusCode::BAD_REQUEST, "title is required"));
/// ```
#[derive(Clone)]
pub struct MockBackend {
    routes: Arc<Mutex<Routes>>,
    calls: Arc<watch::Sender<Vec<ApiRequest>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        let (calls, _) = watch::channel(Vec::new());
        Self {
            routes: Arc::new(Mutex::new(Routes::default())),
            calls: Arc::new(calls),
        }
    }

    /// Queue a one-shot success reply.
    pub fn reply(&self, method: Method, path: &str, body: Value) -> &Self {
        self.push(method, path, Ok(body), None)
    }

    /// Queue a one-shot success reply that waits for `gate`.
    pub fn reply_gated(&self, method: Method, path: &str, body: Value, gate: &Gate) -> &Self {
        self.push(method, path, Ok(body), Some(gate.clone()))
    }

    /// Queue a one-shot failure.
    pub fn fail(&self, method: Method, path: &str, error: ApiError) -> &Self {
        self.push(method, path, Err(error), None)
    }

    /// Queue a one-shot failure that waits for `gate`.
    pub fn fail_gated(&self, method: Method, path: &str, error: ApiError, gate: &Gate) -> &Self {
        self.push(method, path, Err(error), Some(gate.clone()))
    }

    /// Queue a one-shot `404 Not Found` with a backend message.
    pub fn not_found(&self, method: Method, path: &str) -> &Self {
        self.fail(method, path, ApiError::status(StatusCode::NOT_FOUND, "Not found"))
    }

    /// Answer every call to the route with `body` once the queue is drained.
    pub fn always(&self, method: Method, path: &str, body: Value) -> &Self {
        self.lock().fixed.insert((method, path.to_string()), Ok(body));
        self
    }

    fn push(
        &self,
        method: Method,
        path: &str,
        reply: Result<Value, ApiError>,
        gate: Option<Gate>,
    ) -> &Self {
        self.lock()
            .queued
            .entry((method, path.to_string()))
            .or_default()
            .push_back(Scripted { reply, gate });
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Routes> {
        self.routes.lock().expect("mock backend routes poisoned")
    }

    /// Every request received so far, in arrival order.
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.borrow().clone()
    }

    /// Number of requests received for a route.
    pub fn call_count(&self, method: Method, path: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// The most recent request for a route.
    pub fn last_call(&self, method: Method, path: &str) -> Option<ApiRequest> {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find(|r| r.method == method && r.path == path)
            .cloned()
    }

    /// Wait until at least `n` requests have arrived.
    pub async fn wait_for_calls(&self, n: usize) {
        let mut rx = self.calls.subscribe();
        let _ = rx.wait_for(|calls| calls.len() >= n).await;
    }

    /// Number of one-shot replies not yet consumed.
    pub fn pending_replies(&self) -> usize {
        self.lock().queued.values().map(VecDeque::len).sum()
    }

    fn next_reply(&self, request: &ApiRequest) -> Scripted {
        let key = (request.method.clone(), request.path.clone());
        let mut routes = self.lock();
        if let Some(scripted) = routes.queued.get_mut(&key).and_then(VecDeque::pop_front) {
            return scripted;
        }
        let reply = routes.fixed.get(&key).cloned().unwrap_or_else(|| {
            Err(ApiError::Transport(format!(
                "no scripted reply for {}",
                request.describe()
            )))
        });
        Scripted { reply, gate: None }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiCall for MockBackend {
    fn call(&self, request: ApiRequest) -> ApiFuture<'_> {
        Box::pin(async move {
            let scripted = self.next_reply(&request);
            self.calls.send_modify(|calls| calls.push(request));
            if let Some(gate) = scripted.gate {
                gate.wait().await;
            }
            scripted.reply
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn queued_replies_are_served_in_order_then_fixed() {
        let backend = MockBackend::new();
        backend
            .reply(Method::GET, "/rooms", json!(1))
            .reply(Method::GET, "/rooms", json!(2))
            .always(Method::GET, "/rooms", json!(0));

        for expected in [1, 2, 0, 0] {
            let value = backend.call(ApiRequest::get("/rooms")).await.unwrap();
            assert_eq!(value, json!(expected));
        }
        assert_eq!(backend.call_count(Method::GET, "/rooms"), 4);
    }

    #[tokio::test]
    async fn unscripted_route_is_a_transport_error() {
        let backend = MockBackend::new();
        let err = backend.call(ApiRequest::delete("/rooms/1")).await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[tokio::test]
    async fn gated_reply_waits_for_open() {
        let backend = MockBackend::new();
        let gate = Gate::new();
        backend.reply_gated(Method::GET, "/rooms", json!("late"), &gate);

        let task = {
            let backend = backend.clone();
            tokio::spawn(async move { backend.call(ApiRequest::get("/rooms")).await })
        };
        backend.wait_for_calls(1).await;
        assert!(!task.is_finished());

        gate.open();
        assert_eq!(task.await.unwrap().unwrap(), json!("late"));
    }
}
