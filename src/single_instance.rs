//! Cross-process single-instance mutex. The running service holds a bound
//! loopback listener; a second launch fails the bind, pings the incumbent so
//! the duplicate start is visible in its log, and exits.

use log::{info, warn};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
};

pub struct InstanceLock {
    listener: TcpListener,
}

impl InstanceLock {
    /// Try to become the primary instance. Returns `None` when another
    /// instance already holds the lock port, after notifying it.
    pub async fn acquire(port: u16) -> Option<Self> {
        match TcpListener::bind(("127.0.0.1", port)).await {
            Ok(listener) => Some(Self { listener }),
            Err(_) => {
                notify_running_instance(port).await;
                None
            }
        }
    }

    /// Accept loop for the lifetime of the process. Each connection may
    /// carry a single `notify` line from a rejected second instance.
    pub async fn listen(self) {
        loop {
            let stream = match self.listener.accept().await {
                Ok((stream, _)) => stream,
                Err(err) => {
                    warn!("instance lock accept failed: {err}");
                    continue;
                }
            };

            let mut line = String::new();
            let mut reader = BufReader::new(stream);
            if reader.read_line(&mut line).await.is_ok() && line.trim() == "notify" {
                info!("Another instance attempted to start");
            }
        }
    }
}

async fn notify_running_instance(port: u16) {
    match TcpStream::connect(("127.0.0.1", port)).await {
        Ok(mut stream) => {
            let _ = stream.write_all(b"notify\n").await;
        }
        Err(err) => {
            warn!("lock port {port} is taken but the holder is unreachable: {err}");
        }
    }
}
