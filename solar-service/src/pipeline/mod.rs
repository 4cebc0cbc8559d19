use std::{pin::Pin, sync::Arc, time::SystemTime};

use futures::{Stream, StreamExt};

#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub payload: T,
    pub received_at: SystemTime,
}

impl<T> Envelope<T> {
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            received_at: SystemTime::now(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(String),
    #[error("transform error: {0}")]
    Transform(String),
    #[error("sink error: {0}")]
    Sink(String),
}

pub type EnvelopeStream<T> = Pin<Box<dyn Stream<Item = Result<Envelope<T>, PipelineError>> + Send>>;

#[async_trait::async_trait]
pub trait Source<T>: Send + Sync {
    async fn stream(&self) -> EnvelopeStream<T>;
}

/// Maps one envelope to zero or one envelopes; `Ok(None)` drops the item.
#[async_trait::async_trait]
pub trait Transform<I, O>: Send + Sync {
    async fn apply(&self, input: Envelope<I>) -> Result<Option<Envelope<O>>, PipelineError>;
}

/// Consumes the whole stream. Returns the number of items persisted.
#[async_trait::async_trait]
pub trait Sink<T>: Send + Sync {
    async fn run(&self, input: EnvelopeStream<T>) -> Result<u64, PipelineError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub rows_read: u64,
    pub rows_dropped: u64,
    pub rows_inserted: u64,
}

#[derive(Default)]
struct Counters {
    read: std::sync::atomic::AtomicU64,
    dropped: std::sync::atomic::AtomicU64,
}

pub struct Pipeline<S, I, O, K> {
    pub source: S,
    pub transform: Arc<dyn Transform<I, O> + Send + Sync>,
    pub sink: K,
}

impl<S, I, O, K> Pipeline<S, I, O, K>
where
    I: Send + 'static,
    O: Send + 'static,
    S: Source<I> + Send + Sync + 'static,
    K: Sink<O> + Send + Sync + 'static,
{
    pub async fn run(self) -> Result<IngestReport, PipelineError> {
        use std::sync::atomic::Ordering;

        let counters = Arc::new(Counters::default());
        let transform = self.transform.clone();
        let tally = counters.clone();

        let stream: EnvelopeStream<O> = Box::pin(
            self.source
                .stream()
                .await
                .then(move |item| {
                    let t = transform.clone();
                    let tally = tally.clone();
                    async move {
                        let env = match item {
                            Ok(env) => env,
                            Err(e) => return Err(e),
                        };
                        tally.read.fetch_add(1, Ordering::Relaxed);

                        let out = t.apply(env).await;
                        if matches!(out, Ok(None)) {
                            tally.dropped.fetch_add(1, Ordering::Relaxed);
                        }
                        out
                    }
                })
                .filter_map(|res| async move { res.transpose() }),
        );

        let rows_inserted = self.sink.run(stream).await?;

        Ok(IngestReport {
            rows_read: counters.read.load(Ordering::Relaxed),
            rows_dropped: counters.dropped.load(Ordering::Relaxed),
            rows_inserted,
        })
    }
}
