// Starts the aquarium server once per test binary and hands out its base URL.
use std::net::{SocketAddr, TcpStream};
use std::sync::{OnceLock, mpsc};
use std::time::Duration;

static BASE_URL: OnceLock<String> = OnceLock::new();

pub fn ensure_server() -> &'static str {
    BASE_URL.get_or_init(|| {
        let (addr_tx, addr_rx) = mpsc::channel::<SocketAddr>();
        // Each #[tokio::test] owns a short-lived runtime, so the server gets a thread of its own.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .expect("server runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0))
                    .await
                    .expect("bind test listener");
                addr_tx
                    .send(listener.local_addr().expect("listener address"))
                    .expect("test thread is waiting for the address");
                aquarium_server::run(listener)
                    .await
                    .expect("aquarium server stopped");
            });
        });

        let addr = addr_rx
            .recv_timeout(Duration::from_secs(10))
            .expect("server never bound a port");
        wait_until_accepting(addr);
        format!("http://{addr}")
    })
}

fn wait_until_accepting(addr: SocketAddr) {
    for _ in 0..100 {
        if TcpStream::connect_timeout(&addr, Duration::from_millis(100)).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("server at {addr} never accepted connections");
}
