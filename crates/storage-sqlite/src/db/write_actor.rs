use super::DbPool;
use crate::errors::StorageError;
use bcportal_core::errors::{DatabaseError, Error, Result};
use diesel::SqliteConnection;
use log::{error, warn};
use std::any::Any;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};

// Type alias for the job to be executed by the writer actor.
// Jobs return core::Result since that's what callers expect.
type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;

type AnyResult = Result<Box<dyn Any + Send + 'static>>;

/// Time budget for one writer transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionLimits {
    /// Longest a job may sit in the queue before the actor starts it.
    pub max_wait: Duration,
    /// Longest a job may run; a job that overruns is rolled back.
    pub timeout: Duration,
}

impl Default for TransactionLimits {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(30),
            timeout: Duration::from_secs(60),
        }
    }
}

struct WriteJob {
    job: Job<Box<dyn Any + Send + 'static>>,
    reply: oneshot::Sender<AnyResult>,
    enqueued_at: Instant,
    limits: TransactionLimits,
}

/// Handle for sending jobs to the writer actor.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<WriteJob>,
    limits: TransactionLimits,
}

impl WriteHandle {
    /// Returns a handle whose `exec` calls use `limits`.
    pub fn with_limits(mut self, limits: TransactionLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> TransactionLimits {
        self.limits
    }

    /// Executes a database job on the writer actor's dedicated connection,
    /// inside an immediate transaction bounded by the handle's limits.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        self.exec_with_limits(self.limits, job).await
    }

    /// Like [`exec`](Self::exec) with an explicit time budget.
    ///
    /// A job that waited longer than `max_wait` is rejected without running.
    /// A job that ran longer than `timeout` is rolled back. Both surface as
    /// `DatabaseError::TransactionTimeout`.
    pub async fn exec_with_limits<F, T>(&self, limits: TransactionLimits, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send(WriteJob {
                job: Box::new(move |c| job(c).map(|v| Box::new(v) as Box<dyn Any + Send>)),
                reply: ret_tx,
                enqueued_at: Instant::now(),
                limits,
            })
            .await
            .map_err(|_| {
                Error::Database(DatabaseError::Internal(
                    "Writer actor stopped; cannot accept jobs".to_string(),
                ))
            })?;

        let boxed = ret_rx.await.map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Writer actor dropped the reply without a result".to_string(),
            ))
        })??;

        boxed.downcast::<T>().map(|v| *v).map_err(|_| {
            Error::Database(DatabaseError::Internal(
                "Failed to downcast writer actor result".to_string(),
            ))
        })
    }
}

/// Spawns a background Tokio task that acts as a single writer to the database.
/// This actor owns one database connection from the pool and processes write jobs serially.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) = mpsc::channel::<WriteJob>(1024);

    tokio::spawn(async move {
        let mut conn = match pool.get() {
            Ok(conn) => conn,
            Err(e) => {
                error!("[WriteActor] Failed to acquire a writer connection: {}", e);
                while let Some(write) = rx.recv().await {
                    let _ = write.reply.send(Err(Error::Database(
                        DatabaseError::ConnectionFailed(e.to_string()),
                    )));
                }
                return;
            }
        };

        while let Some(write) = rx.recv().await {
            let WriteJob {
                job,
                reply,
                enqueued_at,
                limits,
            } = write;

            let waited = enqueued_at.elapsed();
            if waited > limits.max_wait {
                warn!(
                    "[WriteActor] Rejecting job that waited {:?} (max {:?})",
                    waited, limits.max_wait
                );
                let _ = reply.send(Err(Error::Database(DatabaseError::TransactionTimeout(
                    format!(
                        "waited {}ms for the writer (max {}ms)",
                        waited.as_millis(),
                        limits.max_wait.as_millis()
                    ),
                ))));
                continue;
            }

            let started = Instant::now();
            let result: AnyResult = conn
                .immediate_transaction::<_, StorageError, _>(|c| {
                    let value = job(c).map_err(StorageError::from)?;
                    let elapsed = started.elapsed();
                    if elapsed > limits.timeout {
                        return Err(StorageError::TransactionTimeout(format!(
                            "transaction ran {}ms (max {}ms) and was rolled back",
                            elapsed.as_millis(),
                            limits.timeout.as_millis()
                        )));
                    }
                    Ok(value)
                })
                .map_err(Error::from);

            // The requester may have given up; nothing to do then.
            let _ = reply.send(result);
        }
    });

    WriteHandle {
        tx,
        limits: TransactionLimits::default(),
    }
}
