use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};
use tsp_matrix_providers::google_maps::GoogleMapsClient;

use crate::{
    error::GeocodeError,
    location_table::{LocationRow, LocationTable},
    node::Node,
};

/// External geocoding capability: ranked candidates for an address, empty
/// when nothing matches. One call is one attempt.
#[async_trait]
pub trait GeocodingService: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Vec<Node>, GeocodeError>;
}

#[async_trait]
impl GeocodingService for GoogleMapsClient {
    async fn geocode(&self, address: &str) -> Result<Vec<Node>, GeocodeError> {
        let candidates = GoogleMapsClient::geocode(self, address).await?;
        Ok(candidates.into_iter().map(Node::from).collect())
    }
}

#[async_trait]
impl<T> GeocodingService for Arc<T>
where
    T: GeocodingService + ?Sized,
{
    async fn geocode(&self, address: &str) -> Result<Vec<Node>, GeocodeError> {
        (**self).geocode(address).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    Resolved(Node),
    /// The service answered but had no candidate.
    Unresolved,
    /// The service could not answer; the address may resolve on a later try.
    TransientFailure(String),
    /// The service refused the request; retrying would not help.
    Rejected(String),
}

#[derive(Debug, Default)]
pub struct GeocodeReport {
    pub table: LocationTable,
    pub unresolved: Vec<String>,
    /// Addresses still failing transiently after every retry, with the reason.
    pub failed: Vec<(String, String)>,
    pub rejected: Vec<(String, String)>,
}

pub struct GeocoderAdapter<G> {
    service: G,
    max_retries: u32,
    retry_delay: Duration,
}

impl<G> GeocoderAdapter<G>
where
    G: GeocodingService,
{
    pub fn new(service: G) -> Self {
        Self {
            service,
            max_retries: 0,
            retry_delay: Duration::ZERO,
        }
    }

    /// Extra attempts, `retry_delay` apart, for addresses that fail
    /// transiently. Unresolved and rejected addresses are never retried.
    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    pub async fn resolve(&self, address: &str) -> GeocodeOutcome {
        let mut attempt = 0;

        loop {
            match self.service.geocode(address).await {
                Ok(candidates) => {
                    return match candidates.into_iter().find(Node::is_finite) {
                        Some(node) => GeocodeOutcome::Resolved(node),
                        None => GeocodeOutcome::Unresolved,
                    };
                }
                Err(GeocodeError::Transient(reason)) if attempt < self.max_retries => {
                    attempt += 1;
                    debug!(
                        "Geocoding '{}' failed ({}), retry {}/{}",
                        address, reason, attempt, self.max_retries
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(GeocodeError::Transient(reason)) => {
                    return GeocodeOutcome::TransientFailure(reason);
                }
                Err(GeocodeError::Rejected(reason)) => return GeocodeOutcome::Rejected(reason),
            }
        }
    }

    pub async fn resolve_all(&self, addresses: &[String]) -> GeocodeReport {
        self.resolve_all_with_progress(addresses, |_, _| {}).await
    }

    /// Resolves every address in order, one request at a time. `on_progress`
    /// receives `(done, total)` after each address.
    #[instrument(skip_all, level = "debug")]
    pub async fn resolve_all_with_progress(
        &self,
        addresses: &[String],
        mut on_progress: impl FnMut(usize, usize) + Send,
    ) -> GeocodeReport {
        let mut rows = Vec::with_capacity(addresses.len());
        let mut unresolved = Vec::new();
        let mut failed = Vec::new();
        let mut rejected = Vec::new();

        for (i, address) in addresses.iter().enumerate() {
            match self.resolve(address).await {
                GeocodeOutcome::Resolved(node) => rows.push(LocationRow::new(address.clone(), node)),
                GeocodeOutcome::Unresolved => {
                    warn!("No geocoding result for '{}'", address);
                    unresolved.push(address.clone());
                }
                GeocodeOutcome::TransientFailure(reason) => {
                    warn!("Geocoding '{}' failed: {}", address, reason);
                    failed.push((address.clone(), reason));
                }
                GeocodeOutcome::Rejected(reason) => {
                    warn!("Geocoding '{}' rejected: {}", address, reason);
                    rejected.push((address.clone(), reason));
                }
            }

            on_progress(i + 1, addresses.len());
        }

        let table = LocationTable::new(rows);

        info!(
            "Geocoded {}/{} addresses ({} unresolved, {} failed, {} rejected)",
            table.len(),
            addresses.len(),
            unresolved.len(),
            failed.len(),
            rejected.len()
        );

        GeocodeReport {
            table,
            unresolved,
            failed,
            rejected,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use tsp_matrix_providers::google_maps::GoogleMapsError;

    use super::*;

    struct FakeGeocoder {
        known: HashMap<&'static str, Node>,
        flaky_failures: AtomicUsize,
        calls: AtomicUsize,
    }

    impl FakeGeocoder {
        fn new(flaky_failures: usize) -> Self {
            Self {
                known: HashMap::from([
                    ("Grand Place, Brussels", Node::new(50.8467, 4.3525)),
                    ("Grote Markt, Antwerp", Node::new(51.2211, 4.3997)),
                ]),
                flaky_failures: AtomicUsize::new(flaky_failures),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GeocodingService for FakeGeocoder {
        async fn geocode(&self, address: &str) -> Result<Vec<Node>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if address == "down" {
                return Err(GeocodeError::Transient("connection reset".to_string()));
            }

            if address == "denied" {
                return Err(GoogleMapsError::Status {
                    status: "REQUEST_DENIED".to_string(),
                    message: "The provided API key is invalid.".to_string(),
                }
                .into());
            }

            if address == "flaky"
                && self
                    .flaky_failures
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok()
            {
                return Err(GeocodeError::Transient("timeout".to_string()));
            }

            if address == "flaky" {
                return Ok(vec![Node::new(50.0, 4.0)]);
            }

            Ok(self.known.get(address).copied().into_iter().collect())
        }
    }

    #[tokio::test]
    async fn test_resolve_outcomes() {
        let adapter = GeocoderAdapter::new(FakeGeocoder::new(0));

        assert_eq!(
            adapter.resolve("Grand Place, Brussels").await,
            GeocodeOutcome::Resolved(Node::new(50.8467, 4.3525))
        );
        assert_eq!(adapter.resolve("Atlantis").await, GeocodeOutcome::Unresolved);
        assert!(matches!(
            adapter.resolve("down").await,
            GeocodeOutcome::TransientFailure(_)
        ));
        assert!(matches!(
            adapter.resolve("denied").await,
            GeocodeOutcome::Rejected(_)
        ));
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let adapter = GeocoderAdapter::new(FakeGeocoder::new(1)).with_retries(1, Duration::ZERO);

        assert_eq!(
            adapter.resolve("flaky").await,
            GeocodeOutcome::Resolved(Node::new(50.0, 4.0))
        );
        assert_eq!(adapter.service.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retries_run_out_on_persistent_transient_failures() {
        let adapter = GeocoderAdapter::new(FakeGeocoder::new(0)).with_retries(2, Duration::ZERO);

        assert_eq!(
            adapter.resolve("down").await,
            GeocodeOutcome::TransientFailure("connection reset".to_string())
        );
        assert_eq!(adapter.service.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_unresolved_addresses_are_not_retried() {
        let adapter = GeocoderAdapter::new(FakeGeocoder::new(0)).with_retries(3, Duration::ZERO);

        assert_eq!(adapter.resolve("Atlantis").await, GeocodeOutcome::Unresolved);
        assert_eq!(adapter.service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_requests_are_called_once() {
        let adapter = GeocoderAdapter::new(FakeGeocoder::new(0)).with_retries(2, Duration::ZERO);

        match adapter.resolve("denied").await {
            GeocodeOutcome::Rejected(reason) => assert!(reason.contains("REQUEST_DENIED")),
            outcome => panic!("expected a rejection, got {:?}", outcome),
        }
        assert_eq!(adapter.service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_shared_service() {
        let service = Arc::new(FakeGeocoder::new(0));
        let adapter = GeocoderAdapter::new(service.clone());

        assert!(matches!(
            adapter.resolve("Grote Markt, Antwerp").await,
            GeocodeOutcome::Resolved(_)
        ));
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_resolve_all_continues_past_failures() {
        let adapter = GeocoderAdapter::new(FakeGeocoder::new(0));
        let addresses = vec![
            "Grand Place, Brussels".to_string(),
            "down".to_string(),
            "Atlantis".to_string(),
            "denied".to_string(),
            "Grote Markt, Antwerp".to_string(),
        ];

        let mut progress = Vec::new();
        let report = adapter
            .resolve_all_with_progress(&addresses, |done, total| progress.push((done, total)))
            .await;

        assert_eq!(report.table.len(), 2);
        assert_eq!(report.table.rows()[1].address, "Grote Markt, Antwerp");
        assert_eq!(report.unresolved, vec!["Atlantis".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "down");
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, "denied");
        assert_eq!(progress.last(), Some(&(5, 5)));
    }
}
