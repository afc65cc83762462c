use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rockauto_client::{ClientConfig, HttpResponse, Result, RockAutoClient, Transport};

/// Serves fixed bodies by URL (or AJAX `func`) substring and counts calls.
#[derive(Default)]
pub struct StubTransport {
    routes: Vec<(&'static str, String)>,
    calls: AtomicUsize,
    closed: Arc<AtomicUsize>,
    pub seen: Mutex<Vec<String>>,
}

impl StubTransport {
    pub fn route(mut self, pattern: &'static str, body: impl Into<String>) -> Self {
        self.routes.push((pattern, body.into()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Counter that outlives the transport, for checking `close`.
    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closed)
    }

    fn serve(&self, key: &str) -> HttpResponse {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(key.to_string());
        match self.routes.iter().find(|(pattern, _)| key.contains(*pattern)) {
            Some((_, body)) => HttpResponse::ok(body.clone()),
            None => HttpResponse {
                status: 404,
                headers: Vec::new(),
                body: String::new(),
            },
        }
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn get(&self, url: &str, _headers: &[(String, String)]) -> Result<HttpResponse> {
        Ok(self.serve(url))
    }

    async fn post(
        &self,
        url: &str,
        form: &[(String, String)],
        _headers: &[(String, String)],
    ) -> Result<HttpResponse> {
        let func = form.iter().find(|(k, _)| k == "func").map(|(_, v)| v.as_str());
        Ok(self.serve(func.unwrap_or(url)))
    }

    async fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn client(transport: StubTransport) -> RockAutoClient<StubTransport> {
    let config = ClientConfig {
        navigation_priming: false,
        ..ClientConfig::default()
    };
    RockAutoClient::with_transport(transport, config)
}

pub fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("missing fixture {path}: {e}"))
}
