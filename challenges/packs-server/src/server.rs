use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::sync::broadcast::Receiver;
use tokio::sync::mpsc;
use tokio::time;

use crate::connection::Connection;
use crate::handler::SolveProcessor;
use crate::protocol::{Response, Status};

/// Server listener state. Created in the `run` call. It includes a `run` method
/// which performs the TCP listening and initialization of per-connection state.
struct Listener {
    listener: TcpListener,

    processor: Arc<SolveProcessor>,

    /// Broadcasts a shutdown signal to all active connections.
    ///
    /// Each connection task holds a receiver. When a graceful shutdown starts
    /// the sender is dropped, every receiver wakes up and the connection
    /// finishes the request it is on before returning.
    notify_shutdown: broadcast::Sender<()>,

    /// Every connection handler holds a clone of this sender. Once the
    /// listener drops its own copy, the paired receiver completes only after
    /// all handlers have returned, which is how `run` waits for in-flight
    /// requests before exiting.
    shutdown_complete_tx: mpsc::Sender<()>,
}

impl Listener {
    async fn run(&mut self) -> std::io::Result<()> {
        info!("accepting inbound connections on {:?}", self.listener.local_addr()?);
        loop {
            let socket = self.accept().await?;
            let mut handler = Handler {
                con: Connection::new(socket),
                processor: self.processor.clone(),
                shutdown: self.notify_shutdown.subscribe(),
                _shutdown_complete: self.shutdown_complete_tx.clone(),
            };
            tokio::spawn(async move {
                if let Err(err) = handler.run().await {
                    error!("connection error: {:?}", err);
                }
            });
        }
    }

    /// Accept an inbound connection.
    ///
    /// Errors are handled by backing off and retrying, doubling the wait from
    /// 1 second each time. Once the wait would exceed 64 seconds the error is
    /// returned.
    async fn accept(&mut self) -> std::io::Result<TcpStream> {
        let mut backoff = 1;

        loop {
            match self.listener.accept().await {
                Ok((socket, addr)) => {
                    debug!("accepted connection from {}", addr);
                    return Ok(socket);
                }
                Err(err) => {
                    if backoff > 64 {
                        return Err(err);
                    }
                    error!("failed to accept, retrying in {}s: {}", backoff, err);
                }
            }

            time::sleep(Duration::from_secs(backoff)).await;
            backoff *= 2;
        }
    }
}

struct Handler {
    con: Connection,
    processor: Arc<SolveProcessor>,
    shutdown: Receiver<()>,
    /// Not used directly. Dropped together with the `Handler`.
    _shutdown_complete: mpsc::Sender<()>,
}

impl Handler {
    async fn run(&mut self) -> std::io::Result<()> {
        loop {
            tokio::select! {
                req = self.con.read_request() => {
                    let response = match req {
                        Ok(Some(line)) => self.processor.handle_line(&line).await,
                        Ok(None) => return Ok(()),
                        Err(err) if err.kind() == std::io::ErrorKind::InvalidData => {
                            // answer, then drop the connection: the stream
                            // position is no longer trustworthy
                            let response = Response::error(Status::BadRequest, &err.to_string());
                            self.con.write_response(&response).await?;
                            return Ok(());
                        }
                        Err(err) => return Err(err),
                    };
                    self.con.write_response(&response).await?;
                }
                _ = self.shutdown.recv() => {
                    return Ok(());
                }
            }
        }
    }
}

/// Serves solve requests on `listener` until `shutdown` completes, then waits
/// for open connections to finish.
pub async fn run(listener: TcpListener, processor: Arc<SolveProcessor>, shutdown: impl Future) {
    // The receiver half of the broadcast pair is not needed here; handlers
    // subscribe on the sender.
    let (notify_shutdown, _) = broadcast::channel(1);
    let (shutdown_complete_tx, mut shutdown_complete_rx) = mpsc::channel(1);

    let mut server = Listener {
        processor,
        listener,
        notify_shutdown,
        shutdown_complete_tx,
    };

    tokio::select! {
        res = server.run() => {
            // Accepting failed repeatedly. Errors from individual
            // connections never reach this point.
            if let Err(err) = res {
                error!("failed to accept: {}", err);
            }
        }
        _ = shutdown => {
            info!("shutting down");
        }
    }

    let Listener {
        notify_shutdown,
        shutdown_complete_tx,
        ..
    } = server;

    // Dropping the broadcast sender wakes every subscribed handler.
    drop(notify_shutdown);
    // Drop the last sender held here so the receiver below can complete.
    drop(shutdown_complete_tx);

    shutdown_complete_rx.recv().await;
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
    use tokio::sync::oneshot;

    use super::*;
    use crate::handler::Settings;

    async fn start() -> std::io::Result<(std::net::SocketAddr, oneshot::Sender<()>, tokio::task::JoinHandle<()>)> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let processor = Arc::new(SolveProcessor::new(Settings {
            max_quantity: 1_000_000,
            max_pack_sizes: 16,
            max_edges: 10_000_000,
            cache_capacity: 64,
            workers: 2,
        }));
        let (tx, rx) = oneshot::channel::<()>();
        let task = tokio::spawn(run(listener, processor, rx));
        Ok((addr, tx, task))
    }

    type Lines = tokio::io::Lines<BufReader<OwnedReadHalf>>;

    async fn exchange(lines: &mut Lines, writer: &mut OwnedWriteHalf, request: &str) -> std::io::Result<Response> {
        writer.write_all(request.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        let line = lines.next_line().await?.expect("response line");
        Ok(serde_json::from_str(&line).expect("response json"))
    }

    #[tokio::test]
    async fn test_requests_over_tcp() -> std::io::Result<()> {
        let (addr, shutdown, task) = start().await?;
        let stream = TcpStream::connect(addr).await?;
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        let res = exchange(&mut lines, &mut writer, r#"{"quantity": 508, "packSizes": [3, 23, 31, 53, 151, 757]}"#).await?;
        assert_eq!(res.status_code, 200);
        assert_eq!(res.body, r#"{"3":3,"23":2,"151":3}"#);

        let res = exchange(&mut lines, &mut writer, r#"{"quantity": 5, "packSizes": [0]}"#).await?;
        assert_eq!(res.status_code, 400);

        let res = exchange(&mut lines, &mut writer, "{").await?;
        assert_eq!(res.status_code, 400);

        // the connection survives bad requests
        let res = exchange(&mut lines, &mut writer, r#"{"quantity": 1, "packSizes": [250, 500]}"#).await?;
        assert_eq!(res.body, r#"{"250":1}"#);

        let event = r#"{"body": "{\"quantity\": 750, \"packSizes\": [250, 500]}"}"#;
        let res = exchange(&mut lines, &mut writer, event).await?;
        assert_eq!(res.status_code, 200);
        assert_eq!(res.body, r#"{"250":1,"500":1}"#);

        drop(writer);
        drop(lines);
        let _ = shutdown.send(());
        task.await.expect("server task");
        Ok(())
    }

    #[tokio::test]
    async fn test_shutdown_closes_idle_connections() -> std::io::Result<()> {
        let (addr, shutdown, task) = start().await?;
        let stream = TcpStream::connect(addr).await?;
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        // one round trip so the connection is being handled before shutdown
        let res = exchange(&mut lines, &mut writer, r#"{"quantity": 500, "packSizes": [50]}"#).await?;
        assert_eq!(res.body, r#"{"50":10}"#);

        let _ = shutdown.send(());
        task.await.expect("server task");
        assert_eq!(lines.next_line().await?, None);
        Ok(())
    }
}
