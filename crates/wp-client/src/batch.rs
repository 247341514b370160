//! Batched execution with bounded concurrency.

use futures::future::join_all;
use tracing::{debug, instrument};

use crate::client::ResilientClient;
use crate::error::Error;
use crate::request::RequestDescriptor;
use crate::response::Response;

/// A request of a batch that succeeded.
#[derive(Debug)]
pub struct BatchSuccess {
    /// Position of the request in the submitted list.
    pub index: usize,
    pub response: Response,
}

/// A request of a batch that failed after its own retries.
#[derive(Debug)]
pub struct BatchFailure {
    /// Position of the request in the submitted list.
    pub index: usize,
    pub error: Error,
}

/// Outcome of [`ResilientClient::batch`]. Both lists are in submission order.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub successes: Vec<BatchSuccess>,
    pub failures: Vec<BatchFailure>,
}

impl BatchOutcome {
    /// Number of requests in the batch.
    pub fn len(&self) -> usize {
        self.successes.len() + self.failures.len()
    }

    /// Returns true if the batch contained no requests.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if every request succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}

impl ResilientClient {
    /// Execute requests in chunks of `concurrency`.
    ///
    /// Requests inside a chunk run concurrently; chunk k+1 starts only after
    /// every request of chunk k resolved. A `concurrency` of zero is treated as one.
    #[instrument(skip(self, requests), fields(requests = requests.len()))]
    pub async fn batch(&self, requests: Vec<RequestDescriptor>, concurrency: usize) -> BatchOutcome {
        let chunk_size = concurrency.max(1);
        let mut outcome = BatchOutcome::default();

        for (chunk_index, chunk) in requests.chunks(chunk_size).enumerate() {
            let offset = chunk_index * chunk_size;
            if self.config().enable_logging {
                debug!(chunk = chunk_index, size = chunk.len(), "Executing batch chunk");
            }

            // join_all yields results in input order regardless of completion order
            let results = join_all(chunk.iter().map(|request| self.send(request))).await;

            for (i, result) in results.into_iter().enumerate() {
                let index = offset + i;
                match result {
                    Ok(response) => outcome.successes.push(BatchSuccess { index, response }),
                    Err(error) => outcome.failures.push(BatchFailure { index, error }),
                }
            }
        }

        outcome
    }
}
