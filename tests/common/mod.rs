#![allow(dead_code)]

use async_trait::async_trait;
use explorebd::{HttpResponse, ListError, QueryCache, Result, Transport};
use serde_json::{Value, json};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

type Handler = Box<dyn Fn(&str, &[(String, String)]) -> Result<HttpResponse> + Send + Sync>;

/// In-memory transport with a call counter and an optional permit gate.
///
/// With a gate, every call blocks until a permit is released, which lets tests
/// hold requests in flight.
pub struct ScriptedTransport {
    handler: Handler,
    calls: AtomicUsize,
    gate: Option<Semaphore>,
    seen: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl ScriptedTransport {
    pub fn new(
        handler: impl Fn(&str, &[(String, String)]) -> Result<HttpResponse> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            calls: AtomicUsize::new(0),
            gate: None,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Serves `total` generated package records, honoring `page` and `size`.
    pub fn packages(total: usize) -> Self {
        Self::new(move |_path, query| {
            let page = param(query, "page").and_then(|p| p.parse::<usize>().ok()).unwrap_or(0);
            let size = param(query, "size").and_then(|s| s.parse::<usize>().ok()).unwrap_or(10);
            let items: Vec<Value> = (page * size..((page + 1) * size).min(total))
                .map(|i| json!({ "_id": format!("pkg-{}", i), "price": 100 * (i + 1) }))
                .collect();
            Ok(HttpResponse::ok_json(&json!({ "items": items, "count": total })))
        })
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    pub fn release(&self, permits: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(permits);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((path.to_string(), query.to_vec()));

        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| ListError::Network("gate closed".into()))?;
            permit.forget();
        }

        (self.handler)(path, query)
    }
}

pub fn param<'a>(query: &'a [(String, String)], name: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

pub fn cache_over(transport: &Arc<ScriptedTransport>) -> QueryCache {
    QueryCache::new(transport.clone(), NonZeroUsize::new(16).unwrap())
}
