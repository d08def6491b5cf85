#![allow(dead_code)]

use axum::extract::ConnectInfo;
use axum_test::TestServer;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::Layer;

use shortkey::config::ShortenerSettings;
use shortkey::domain::click_event::ClickEvent;
use shortkey::domain::entities::NewUrlRecord;
use shortkey::domain::repositories::UrlStore;
use shortkey::infrastructure::cache::NullCache;
use shortkey::infrastructure::persistence::MemoryUrlStore;
use shortkey::routes::router;
use shortkey::state::AppState;

/// Injects a fixed peer address, as `into_make_service_with_connect_info` would.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// Test fixture over the in-memory store and a disabled cache.
pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryUrlStore>,
    pub clicks: mpsc::Receiver<ClickEvent>,
}

pub fn create_test_app() -> TestApp {
    create_test_app_with(ShortenerSettings::default(), false)
}

pub fn create_test_app_with(settings: ShortenerSettings, behind_proxy: bool) -> TestApp {
    let store = Arc::new(MemoryUrlStore::new());
    let (tx, rx) = mpsc::channel(100);

    let state = AppState::new(
        store.clone(),
        Arc::new(NullCache::new()),
        tx,
        &settings,
        behind_proxy,
    );

    let app = router(state).layer(MockConnectInfoLayer);
    let server = TestServer::new(app).unwrap();

    TestApp {
        server,
        store,
        clicks: rx,
    }
}

/// Stores `value` under `key` directly, bypassing key derivation.
pub async fn occupy_key(store: &MemoryUrlStore, key: &str, value: &str) {
    store
        .create_if_absent(NewUrlRecord::derived(
            key.to_string(),
            value.to_string(),
            chrono::Utc::now(),
        ))
        .await
        .unwrap();
}
