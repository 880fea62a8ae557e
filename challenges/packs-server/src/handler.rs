use log::{debug, error};
use moka::future::Cache;
use packs::{PackSizes, Packs, SolveError, SolverConfig};
use tokio::sync::Semaphore;

use crate::protocol::{Event, Request, Response, Status};

#[derive(Debug, Clone)]
pub struct Settings {
    /// Largest quantity accepted in a request.
    pub max_quantity: i64,
    /// Most distinct pack sizes accepted in a request.
    pub max_pack_sizes: usize,
    /// Largest graph, in edges, a request may need.
    pub max_edges: u64,
    /// Number of solved requests kept in memory.
    pub cache_capacity: u64,
    /// Solves allowed to run at the same time.
    pub workers: usize,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            max_quantity: 10_000_000,
            max_pack_sizes: 32,
            max_edges: 50_000_000,
            cache_capacity: 10_000,
            workers: num_cpus::get(),
        }
    }
}

/// Turns request bodies into responses. Shared by every connection.
///
/// Solves are CPU bound, so they run on the blocking pool and at most
/// `workers` of them run at once. Results are cached by quantity and
/// normalized pack sizes since a solve is deterministic.
pub struct SolveProcessor {
    config: SolverConfig,
    permits: Semaphore,
    cache: Cache<(i64, PackSizes), Packs>,
}

impl SolveProcessor {
    pub fn new(settings: Settings) -> SolveProcessor {
        SolveProcessor {
            config: SolverConfig {
                early_exit: false,
                max_quantity: Some(settings.max_quantity),
                max_pack_sizes: Some(settings.max_pack_sizes),
                max_edges: Some(settings.max_edges),
            },
            permits: Semaphore::new(settings.workers.max(1)),
            cache: Cache::new(settings.cache_capacity),
        }
    }

    /// Answers one line read from a connection. The line is either a bare
    /// request or a Lambda style event wrapping one in its `body`.
    pub async fn handle_line(&self, line: &str) -> Response {
        match serde_json::from_str::<Event>(line) {
            Ok(event) if event.body.is_some() => self.handle_event(&event).await,
            _ => self.handle(line).await,
        }
    }

    pub async fn handle_event(&self, event: &Event) -> Response {
        self.handle(event.body.as_deref().unwrap_or_default()).await
    }

    pub async fn handle(&self, body: &str) -> Response {
        let request: Request = match serde_json::from_str(body) {
            Ok(request) => request,
            Err(err) => {
                return Response::error(Status::BadRequest, &format!("malformed request: {}", err));
            }
        };
        match self.solve(request).await {
            Ok(packs) => Response::packs(&packs),
            Err(Failure::Solve(err)) if err.is_client_error() => {
                Response::error(Status::BadRequest, &err.to_string())
            }
            Err(Failure::Solve(err)) => {
                error!("solve failed: {}", err);
                Response::error(Status::InternalError, &err.to_string())
            }
            Err(Failure::Task(message)) => {
                error!("solver task failed: {}", message);
                Response::error(Status::InternalError, "internal error")
            }
        }
    }

    async fn solve(&self, request: Request) -> Result<Packs, Failure> {
        let sizes = PackSizes::new(&request.pack_sizes).map_err(SolveError::from)?;
        let key = (request.quantity, sizes);
        if let Some(packs) = self.cache.get(&key).await {
            debug!("cache hit for quantity {}", request.quantity);
            return Ok(packs);
        }

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|err| Failure::Task(err.to_string()))?;
        let config = self.config.clone();
        let (quantity, sizes) = (key.0, key.1.as_slice().to_vec());
        let packs = tokio::task::spawn_blocking(move || packs::solve_with(quantity, &sizes, &config))
            .await
            .map_err(|err| Failure::Task(err.to_string()))??;

        self.cache.insert(key, packs.clone()).await;
        Ok(packs)
    }

    pub fn cached(&self) -> u64 {
        self.cache.entry_count()
    }
}

enum Failure {
    Solve(SolveError),
    // the blocking task panicked or the worker pool was closed
    Task(String),
}

impl From<SolveError> for Failure {
    fn from(err: SolveError) -> Failure {
        Failure::Solve(err)
    }
}
