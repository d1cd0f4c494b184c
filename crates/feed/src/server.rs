//! TCP observation server.
//!
//! A tokio runtime on a background thread accepts observers and fans each
//! published state out to them as a JSON line. The game loop publishes
//! through a broadcast channel and never blocks on the network; clients that
//! fall behind miss frames rather than stalling gameplay.

use std::net::SocketAddr;
use std::sync::mpsc;
use std::thread;

use anyhow::{anyhow, Result};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use blockfall_core::State;

use crate::protocol::{hello, observation, FeedMessage};

const CHANNEL_CAPACITY: usize = 64;

/// Publish handle for the observation feed.
///
/// Owned by the game loop; the server side lives on its own thread for the
/// rest of the process.
pub struct ObservationFeed {
    tx: broadcast::Sender<String>,
    local_addr: SocketAddr,
    seq: u64,
}

impl ObservationFeed {
    /// Bind `127.0.0.1:port` (0 picks a free port) and start serving.
    pub fn bind(port: u16) -> Result<Self> {
        let (tx, _) = broadcast::channel::<String>(CHANNEL_CAPACITY);
        let (addr_tx, addr_rx) = mpsc::channel::<Result<SocketAddr>>();

        let server_tx = tx.clone();
        thread::spawn(move || serve(port, server_tx, addr_tx));

        let local_addr = addr_rx
            .recv()
            .map_err(|_| anyhow!("observation server thread exited before binding"))??;

        Ok(Self {
            tx,
            local_addr,
            seq: 0,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Publish one state snapshot to every connected observer.
    pub fn publish(&mut self, state: &State) {
        self.seq += 1;
        let msg = FeedMessage::Observation(observation(self.seq, state));
        if let Ok(line) = serde_json::to_string(&msg) {
            // No receivers is fine; observers are optional.
            let _ = self.tx.send(line);
        }
    }
}

fn serve(port: u16, tx: broadcast::Sender<String>, addr_tx: mpsc::Sender<Result<SocketAddr>>) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .build()
    {
        Ok(rt) => rt,
        Err(err) => {
            let _ = addr_tx.send(Err(err.into()));
            return;
        }
    };

    runtime.block_on(async move {
        let listener = match TcpListener::bind(("127.0.0.1", port)).await {
            Ok(listener) => listener,
            Err(err) => {
                let _ = addr_tx.send(Err(err.into()));
                return;
            }
        };

        match listener.local_addr() {
            Ok(addr) => {
                let _ = addr_tx.send(Ok(addr));
            }
            Err(err) => {
                let _ = addr_tx.send(Err(err.into()));
                return;
            }
        }

        loop {
            let Ok((stream, _)) = listener.accept().await else {
                continue;
            };
            tokio::spawn(observer_session(stream, tx.subscribe()));
        }
    });
}

async fn observer_session(mut stream: TcpStream, mut rx: broadcast::Receiver<String>) {
    let Ok(hello_line) = serde_json::to_string(&hello()) else {
        return;
    };
    if write_line(&mut stream, &hello_line).await.is_err() {
        return;
    }

    loop {
        match rx.recv().await {
            Ok(line) => {
                if write_line(&mut stream, &line).await.is_err() {
                    // Observer went away; drop the session quietly.
                    return;
                }
            }
            // Slow observer: skip the frames it missed and keep going.
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => return,
        }
    }
}

async fn write_line(stream: &mut TcpStream, line: &str) -> std::io::Result<()> {
    stream.write_all(line.as_bytes()).await?;
    stream.write_all(b"\n").await
}
