//! # Pool de Workers
//! src/server/pool.rs
//!
//! Número fijo de threads que atienden conexiones de forma bloqueante. Las
//! conexiones aceptadas esperan en una cola acotada; si la cola se llena,
//! `execute` bloquea al acceptor (backpressure) en vez de descartar.
//!
//! Un job que hace panic no mata a su worker: el panic se captura, se
//! registra y el worker vuelve a esperar trabajo.

use crate::error::ServerError;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Worker {
    id: usize,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    fn spawn(id: usize, receiver: Arc<Mutex<Receiver<Job>>>) -> io::Result<Self> {
        let handle = thread::Builder::new()
            .name(format!("worker-{}", id))
            .spawn(move || Self::worker_loop(id, receiver))?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    fn worker_loop(id: usize, receiver: Arc<Mutex<Receiver<Job>>>) {
        loop {
            // El guard se libera al terminar la sentencia, antes de ejecutar el job
            let message = receiver
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .recv();

            match message {
                Ok(job) => {
                    if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                        tracing::error!(worker = id, "job panicked, worker keeps running");
                    }
                }
                Err(_) => {
                    tracing::debug!(worker = id, "queue closed, worker exiting");
                    break;
                }
            }
        }
    }
}

/// Pool de threads con cola acotada
pub struct WorkerPool {
    sender: Option<SyncSender<Job>>,
    workers: Vec<Worker>,
}

impl WorkerPool {
    /// Crea `size` workers y una cola de `queue_capacity` jobs pendientes
    pub fn new(size: usize, queue_capacity: usize) -> io::Result<Self> {
        let (sender, receiver) = mpsc::sync_channel::<Job>(queue_capacity);
        let receiver = Arc::new(Mutex::new(receiver));

        let workers = (0..size.max(1))
            .map(|id| Worker::spawn(id, Arc::clone(&receiver)))
            .collect::<io::Result<Vec<_>>>()?;

        tracing::debug!(workers = workers.len(), queue_capacity, "worker pool started");

        Ok(Self {
            sender: Some(sender),
            workers,
        })
    }

    /// Encola un job. Bloquea mientras la cola esté llena.
    pub fn execute<F>(&self, job: F) -> Result<(), ServerError>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(ServerError::PoolClosed)?;
        sender.send(Box::new(job)).map_err(|_| ServerError::PoolClosed)
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }
}

impl Drop for WorkerPool {
    /// Cierra la cola y espera a que cada worker termine su job actual
    fn drop(&mut self) {
        drop(self.sender.take());

        for worker in &mut self.workers {
            if let Some(handle) = worker.handle.take() {
                if handle.join().is_err() {
                    tracing::error!(worker = worker.id, "worker thread panicked");
                }
            }
        }
    }
}
