#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use httpmock::MockServer;
use reelsync::{
    SyncContext,
    config::Settings,
    management::{ACCESS_TOKEN_KEY, KeyValueStore, MemoryStore, USER_KEY},
    navigation::RecordingNavigator,
};
use serde_json::{Value, json};

pub const TOKEN: &str = "token-alice";

pub struct Harness {
    pub server: MockServer,
    pub storage: Arc<MemoryStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub ctx: SyncContext,
}

pub fn alice() -> Value {
    json!({"id": 1, "username": "alice", "email": "alice@example.com"})
}

pub fn settings_for(server: &MockServer) -> Settings {
    Settings::new(format!("{}/api", server.base_url()))
}

// Context against a fresh mock server, with nothing persisted.
pub async fn anonymous() -> Harness {
    build(MemoryStore::new(), Duration::from_secs(10)).await
}

// Context whose storage already holds alice's session.
pub async fn logged_in() -> Harness {
    logged_in_with_timeout(Duration::from_secs(10)).await
}

pub async fn logged_in_with_timeout(timeout: Duration) -> Harness {
    let storage = MemoryStore::with_entries([
        (ACCESS_TOKEN_KEY, TOKEN.to_string()),
        (USER_KEY, alice().to_string()),
    ]);
    build(storage, timeout).await
}

async fn build(storage: MemoryStore, timeout: Duration) -> Harness {
    let server = MockServer::start_async().await;
    let storage = Arc::new(storage);
    let navigator = Arc::new(RecordingNavigator::new());
    let ctx = SyncContext::new(
        settings_for(&server).with_timeout(timeout),
        storage.clone() as Arc<dyn KeyValueStore>,
        navigator.clone(),
    )
    .expect("context builds");
    ctx.init().await.expect("session loads");

    Harness {
        server,
        storage,
        navigator,
        ctx,
    }
}
