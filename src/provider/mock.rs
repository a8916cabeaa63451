//! Scripted provider for tests: replays canned replies in order and records
//! every request it sees.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;

use super::Provider;
use crate::errors::{CouncilError, Result};
use crate::wire::ModelRequest;

pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<ModelRequest>>,
    gated: AtomicBool,
    gate: Notify,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            gated: AtomicBool::new(false),
            gate: Notify::new(),
        }
    }

    /// Like `new`, but every call parks until [`release`](Self::release).
    pub fn gated(replies: Vec<Result<String>>) -> Self {
        let p = Self::new(replies);
        p.gated.store(true, Ordering::SeqCst);
        p
    }

    /// Park every later call until [`release`](Self::release).
    pub fn hold(&self) {
        self.gated.store(true, Ordering::SeqCst);
    }

    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn generate(&self, req: &ModelRequest) -> Result<String> {
        self.requests.lock().push(req.clone());
        if self.gated.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| {
                Err(CouncilError::Network("scripted provider has no reply left".into()))
            })
    }
}
