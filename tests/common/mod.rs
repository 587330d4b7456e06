//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use route_registrar::config::RegistrarConfig;
use route_registrar::http::{AppState, HttpServer};
use route_registrar::invite::{DisabledInviteGateway, InviteGateway};
use route_registrar::reload::{ProxyControlPlane, ReloadError};
use route_registrar::routing::{ConfigWriter, RoutingService};
use route_registrar::Shutdown;
use tokio::net::TcpListener;

/// Control plane that counts reloads and can be told to fail.
#[derive(Default)]
pub struct RecordingControlPlane {
    calls: AtomicUsize,
    fail: AtomicBool,
}

impl RecordingControlPlane {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn fail_next_reloads(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProxyControlPlane for RecordingControlPlane {
    async fn reload(&self) -> Result<(), ReloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            Err(ReloadError::Signal("docker: container coolify-proxy not found".into()))
        } else {
            Ok(())
        }
    }

    fn strategy(&self) -> &'static str {
        "recording"
    }
}

/// A registrar bound to an ephemeral local port.
pub struct TestRegistrar {
    pub addr: SocketAddr,
    pub plane: Arc<RecordingControlPlane>,
    shutdown: Shutdown,
}

impl TestRegistrar {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestRegistrar {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a registrar writing into `dir`, with a recording control plane.
pub async fn start_registrar(dir: &Path) -> TestRegistrar {
    start_registrar_with(dir, Arc::new(DisabledInviteGateway)).await
}

pub async fn start_registrar_with(dir: &Path, invites: Arc<dyn InviteGateway>) -> TestRegistrar {
    let config = RegistrarConfig::default();
    let plane = Arc::new(RecordingControlPlane::default());

    let routing = RoutingService::new(
        config.topology.clone(),
        ConfigWriter::new(dir, "yaml"),
        plane.clone(),
    );
    let state = AppState {
        routing: Arc::new(routing),
        invites,
    };

    let (addr, shutdown) = serve(&config, state).await;
    TestRegistrar {
        addr,
        plane,
        shutdown,
    }
}

/// Serve `state` behind the full middleware stack built from `config`.
#[allow(dead_code)]
pub async fn serve(config: &RegistrarConfig, state: AppState) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, state);
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[allow(dead_code)]
pub fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
