//! In-memory fakes for the session ports.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use bling_domain::{GrantRequest, StorageKey, TokenResponse};
use chrono::{DateTime, Utc};

use crate::ports::{ApiTransport, Clock, KeyValueStore, StoreError, TokenTransport, TransportError};

#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn insert(&self, key: StorageKey, value: &str) {
        self.values
            .lock()
            .unwrap()
            .insert(key.as_str().to_string(), value.to_string());
    }

    pub fn value(&self, key: StorageKey) -> Option<String> {
        self.values.lock().unwrap().get(key.as_str()).cloned()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

pub struct FixedClock {
    millis: AtomicI64,
}

impl FixedClock {
    pub const fn at_millis(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    pub fn set_millis(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap()
    }
}

#[derive(Default)]
pub struct ScriptedTokenTransport {
    responses: Mutex<VecDeque<Result<TokenResponse, TransportError>>>,
    calls: Mutex<Vec<(GrantRequest, String)>>,
}

impl ScriptedTokenTransport {
    pub fn push(&self, response: Result<TokenResponse, TransportError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> Vec<(GrantRequest, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenTransport for ScriptedTokenTransport {
    async fn request_token(
        &self,
        grant: &GrantRequest,
        authorization: &str,
    ) -> Result<TokenResponse, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((grant.clone(), authorization.to_string()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted token response")
    }

    fn token_url(&self) -> String {
        "http://localhost/Api/v3/oauth/token".to_string()
    }
}

#[derive(Default)]
pub struct ScriptedApiTransport {
    responses: Mutex<VecDeque<Result<serde_json::Value, TransportError>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedApiTransport {
    pub fn push(&self, response: Result<serde_json::Value, TransportError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApiTransport for ScriptedApiTransport {
    async fn get_json(
        &self,
        path: &str,
        bearer_token: &str,
    ) -> Result<serde_json::Value, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((path.to_string(), bearer_token.to_string()));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted API response")
    }
}
