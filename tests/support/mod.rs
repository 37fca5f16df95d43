// Integration-test plumbing: a shared control server per test binary and
// throwaway HTTP stubs for the policy client.
#![allow(dead_code)]

use axum::Router;
use std::{
    net::SocketAddr,
    sync::{OnceLock, mpsc},
    time::{Duration, Instant},
};

/// Addresses of the control server under test.
pub struct TestServer {
    pub http: String,
    pub ws: String,
}

static SERVER: OnceLock<TestServer> = OnceLock::new();

const READY_TIMEOUT: Duration = Duration::from_secs(2);

/// Starts the control server on first use and returns its addresses.
pub fn server() -> &'static TestServer {
    SERVER.get_or_init(|| {
        let addr = boot_server();
        await_accepting(addr);
        TestServer {
            http: format!("http://{addr}"),
            ws: format!("ws://{addr}/ws"),
        }
    })
}

// The server gets its own thread and runtime so it outlives every
// `#[tokio::test]` runtime in the binary.
fn boot_server() -> SocketAddr {
    let (addr_tx, addr_rx) = mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().expect("server runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind ephemeral port");
            addr_tx
                .send(listener.local_addr().expect("bound addr"))
                .expect("test thread waiting for addr");
            rl_car_server::run(listener).await.expect("control server");
        });
    });
    addr_rx
        .recv_timeout(READY_TIMEOUT)
        .expect("server published its address")
}

fn await_accepting(addr: SocketAddr) {
    let deadline = Instant::now() + READY_TIMEOUT;
    while std::net::TcpStream::connect(addr).is_err() {
        assert!(Instant::now() < deadline, "server at {addr} never accepted");
        std::thread::sleep(Duration::from_millis(20));
    }
}

/// Serves `app` on an ephemeral port inside the calling test's runtime.
pub async fn spawn_stub(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral stub port");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });
    format!("http://{addr}")
}
