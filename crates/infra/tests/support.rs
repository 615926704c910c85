//! Shared helpers for infra integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use relaychat_common::{DurableStorage, TokenStore};
use relaychat_infra::{
    AuthenticatedRequestExecutor, ExecutorConfig, HttpTransport, TransportError,
};
use reqwest::header::{HeaderMap, AUTHORIZATION};
use serde_json::Value;

pub const GATEWAY: &str = "http://gateway.test";

/// One request seen by [`MockTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

/// Transport that replays scripted outcomes in order
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Result<Value, TransportError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then_ok(self, body: Value) -> Self {
        self.script.lock().unwrap().push_back(Ok(body));
        self
    }

    pub fn then_status(self, status: u16, body: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(TransportError::Status { status, body: body.to_string() }));
        self
    }

    pub fn then_err(self, err: TransportError) -> Self {
        self.script.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }

    fn record(&self, call: RecordedCall) -> Result<Value, TransportError> {
        self.calls.lock().unwrap().push(call);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("script exhausted".to_string())))
    }
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()).map(str::to_string)
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &str, headers: &HeaderMap) -> Result<Value, TransportError> {
        self.record(RecordedCall {
            method: "GET",
            url: url.to_string(),
            authorization: authorization(headers),
            body: None,
        })
    }

    async fn post(
        &self,
        url: &str,
        body: &Value,
        headers: &HeaderMap,
    ) -> Result<Value, TransportError> {
        self.record(RecordedCall {
            method: "POST",
            url: url.to_string(),
            authorization: authorization(headers),
            body: Some(body.clone()),
        })
    }
}

/// Executor over `transport` with a fresh store on `storage`
pub fn executor_with(
    transport: Arc<MockTransport>,
    storage: Arc<dyn DurableStorage>,
) -> (Arc<TokenStore>, AuthenticatedRequestExecutor) {
    let store = Arc::new(TokenStore::new(storage));
    let executor =
        AuthenticatedRequestExecutor::new(transport, store.clone(), ExecutorConfig::new(GATEWAY))
            .unwrap();
    (store, executor)
}
