//! Synthetic incident feed.
//!
//! [`SyntheticReports`] is a lazy, endless source of report requests;
//! [`FeedRunner`] drives any such source on a timer and feeds it through the
//! same ingestion path as human reports.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::settings::SimulationConfig;
use crate::handlers::ingestion::{IncidentIngestion, ReportIncidentRequest};
use crate::models::Coordinates;

/// Endless generator of sensor-style reports around a base position
pub struct SyntheticReports<R: Rng = StdRng> {
    rng: R,
    base: Coordinates,
}

impl SyntheticReports<StdRng> {
    pub fn from_entropy(base: Coordinates) -> Self {
        Self::with_rng(StdRng::from_entropy(), base)
    }

    pub fn seeded(seed: u64, base: Coordinates) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), base)
    }
}

impl<R: Rng> SyntheticReports<R> {
    pub fn with_rng(rng: R, base: Coordinates) -> Self {
        Self { rng, base }
    }
}

impl<R: Rng> Iterator for SyntheticReports<R> {
    type Item = ReportIncidentRequest;

    fn next(&mut self) -> Option<Self::Item> {
        let signal: u32 = self.rng.gen_range(0..100);
        let anomaly: u32 = self.rng.gen_range(0..1000);
        let lat = self.base.lat + self.rng.gen::<f64>();
        let lng = self.base.lng - self.rng.gen::<f64>();

        Some(ReportIncidentRequest {
            description: format!(
                "Automatic detection of anomaly at coordinates {}. Status: Critical.",
                anomaly
            ),
            reporter: format!("Signal_{}", signal),
            coordinates: Coordinates::new(lat, lng),
        })
    }
}

/// Handle to a running feed. Dropping the handle also cancels the feed.
pub struct FeedHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<u64>,
}

impl FeedHandle {
    /// Cancel the feed and wait for it to wind down. Returns how many reports were ingested.
    pub async fn stop(mut self) -> u64 {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        match self.task.await {
            Ok(count) => count,
            Err(e) => {
                warn!("Incident feed task ended abnormally: {}", e);
                0
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

pub struct FeedRunner;

impl FeedRunner {
    /// Spawn a task that ingests one report from `source` per `interval`.
    /// The first report arrives after one full interval.
    pub fn spawn<S>(source: S, ingestion: Arc<IncidentIngestion>, interval: Duration) -> FeedHandle
    where
        S: Iterator<Item = ReportIncidentRequest> + Send + 'static,
    {
        let (tx, mut rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let mut source = source;
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            let mut ingested = 0u64;

            info!(interval_secs = interval.as_secs_f64(), "Incident feed started");
            loop {
                tokio::select! {
                    _ = &mut rx => break,
                    _ = ticker.tick() => {
                        let Some(request) = source.next() else {
                            debug!("Incident source exhausted");
                            break;
                        };
                        match ingestion.report(request).await {
                            Ok(incident) => {
                                ingested += 1;
                                debug!(incident_id = %incident.id, "Synthetic incident ingested");
                            }
                            Err(e) => warn!("Synthetic incident rejected: {}", e),
                        }
                    }
                }
            }
            info!(ingested, "Incident feed stopped");
            ingested
        });

        FeedHandle {
            shutdown: Some(tx),
            task,
        }
    }

    /// Spawn the default synthetic feed described by `config`.
    pub fn spawn_synthetic(config: &SimulationConfig, ingestion: Arc<IncidentIngestion>) -> FeedHandle {
        let source = SyntheticReports::from_entropy(Coordinates::new(config.base_lat, config.base_lng));
        Self::spawn(source, ingestion, Duration::from_secs(config.interval_secs))
    }
}
