//! Availability controller: the single entry point in front of the repository.
//!
//! Tracks whether the persistent store is reachable and routes every request:
//!
//! ```text
//!                 connect() ok                 live op fails (Unavailable)
//! Disconnected ─────────────────▶ Connected ─────────────────────────────▶ Disconnected
//!   reads  → demo data (tier `demo`)            reads  → repository (tier `live`)
//!   writes → Unavailable                        writes → repository
//! ```
//!
//! A live read that fails mid-flight is answered with demo data tagged
//! `demo-on-error`. There is no retry timer: reconnecting happens only when
//! `connect()` is called (process start or an explicit request).

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use beadstock_core::{DomainError, DomainResult, ItemId};
use beadstock_inventory::{AdjustDirection, InventoryItem, category_index, matches_category};

use crate::demo::DemoGenerator;
use crate::repository::{ExportRow, InventoryRepository};
use crate::seed::SeedSource;
use crate::store::InventoryStore;

/// Which data source answered a read.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataSource {
    Live,
    Demo,
    DemoOnError,
}

/// A read result tagged with its data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sourced<T> {
    pub source: DataSource,
    pub data: T,
}

impl<T> Sourced<T> {
    pub fn new(source: DataSource, data: T) -> Self {
        Self { source, data }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Connectivity readout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub state: ConnectionState,
    /// Live record count; `None` while disconnected.
    pub records: Option<u64>,
    pub seed_asset_present: bool,
    /// When the last connectivity probe ran.
    pub checked_at: Option<DateTime<Utc>>,
}

/// Outcome of a manual re-seed or a reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReseedOutcome {
    pub removed: u64,
    pub inserted: u64,
    pub seed_asset_present: bool,
}

pub struct AvailabilityController<S> {
    repository: InventoryRepository<S>,
    seed: SeedSource,
    demo: DemoGenerator,
    probe_timeout: Duration,
    operation_timeout: Duration,
    connected: AtomicBool,
    checked_at: Mutex<Option<DateTime<Utc>>>,
    // Serializes connect() so seeding runs at most once per transition.
    connecting: tokio::sync::Mutex<()>,
}

impl<S> AvailabilityController<S>
where
    S: InventoryStore,
{
    /// Starts `Disconnected`; call [`connect`](Self::connect) to probe the store.
    pub fn new(
        repository: InventoryRepository<S>,
        seed: SeedSource,
        demo: DemoGenerator,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            seed,
            demo,
            probe_timeout,
            operation_timeout: probe_timeout,
            connected: AtomicBool::new(false),
            checked_at: Mutex::new(None),
            connecting: tokio::sync::Mutex::new(()),
        }
    }

    /// Bound every live call (reads, writes, seeding); defaults to the probe timeout.
    pub fn with_operation_timeout(mut self, operation_timeout: Duration) -> Self {
        self.operation_timeout = operation_timeout;
        self
    }

    pub fn state(&self) -> ConnectionState {
        if self.connected.load(Ordering::SeqCst) {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Probe the store (bounded by the probe timeout) and update the state.
    ///
    /// On the `Disconnected → Connected` transition an empty store is seeded
    /// from the seed asset before the state flips, so no request reaches the
    /// store until seeding is done. Probe failures are logged, never returned.
    pub async fn connect(&self) -> ConnectionState {
        let _guard = self.connecting.lock().await;
        self.touch_checked_at();

        let probe = tokio::time::timeout(self.probe_timeout, self.repository.ping()).await;
        let failure = match probe {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(_) => Some(format!("probe timed out after {:?}", self.probe_timeout)),
        };

        if let Some(reason) = failure {
            if self.connected.swap(false, Ordering::SeqCst) {
                warn!(%reason, "store probe failed; switching to demo data");
            } else {
                warn!(%reason, "store probe failed; staying disconnected");
            }
            return ConnectionState::Disconnected;
        }

        if self.is_connected() {
            return ConnectionState::Connected;
        }

        // The repository is not gated by the flag; seed first, then publish.
        match self.bounded(self.seed_if_empty()).await {
            Err(e) if e.is_unavailable() => {
                warn!(error = %e, "seeding failed; staying disconnected");
                return ConnectionState::Disconnected;
            }
            Err(e) => warn!(error = %e, "seeding failed"),
            Ok(()) => {}
        }

        self.connected.store(true, Ordering::SeqCst);
        info!("store connected");
        ConnectionState::Connected
    }

    async fn seed_if_empty(&self) -> DomainResult<()> {
        let count = self.repository.count().await?;
        if count > 0 {
            return Ok(());
        }
        let Some(codes) = self.read_seed() else {
            return Ok(());
        };
        let inserted = self.repository.import_codes(&codes).await?;
        info!(inserted, seed = %self.seed.path().display(), "seeded empty store");
        Ok(())
    }

    /// Seed codes; `None` if the asset is absent or unreadable.
    fn read_seed(&self) -> Option<Vec<String>> {
        match self.seed.read_codes() {
            Ok(codes) => codes,
            Err(e) => {
                warn!(error = %e, "seed asset unreadable; skipping import");
                None
            }
        }
    }

    fn touch_checked_at(&self) {
        if let Ok(mut checked_at) = self.checked_at.lock() {
            *checked_at = Some(Utc::now());
        }
    }

    /// Run a live call under the operation timeout; elapsing counts as `Unavailable`.
    async fn bounded<T>(&self, live: impl Future<Output = DomainResult<T>>) -> DomainResult<T> {
        match tokio::time::timeout(self.operation_timeout, live).await {
            Ok(result) => result,
            Err(_) => Err(DomainError::unavailable(format!(
                "store call timed out after {:?}",
                self.operation_timeout
            ))),
        }
    }

    /// Record a failed live call. Only store failures flip the state.
    fn note_failure(&self, operation: &'static str, err: &DomainError) {
        if err.is_unavailable() && self.connected.swap(false, Ordering::SeqCst) {
            warn!(operation, error = %err, "store became unavailable; switching to demo data");
        }
    }

    /// Route a read: live when connected, demo otherwise.
    ///
    /// `live` is only polled when connected. A store failure or timeout during
    /// the live call falls back to demo data tagged `demo-on-error`; domain
    /// errors (e.g. `NotFound`) are returned as-is.
    async fn read<T>(
        &self,
        operation: &'static str,
        live: impl Future<Output = DomainResult<T>>,
        demo: impl FnOnce(Vec<InventoryItem>) -> DomainResult<T>,
    ) -> DomainResult<Sourced<T>> {
        if !self.is_connected() {
            return demo(self.demo.generate()).map(|data| Sourced::new(DataSource::Demo, data));
        }
        match self.bounded(live).await {
            Ok(data) => Ok(Sourced::new(DataSource::Live, data)),
            Err(e) if e.is_unavailable() => {
                self.note_failure(operation, &e);
                demo(self.demo.generate()).map(|data| Sourced::new(DataSource::DemoOnError, data))
            }
            Err(e) => Err(e),
        }
    }

    /// Like [`read`](Self::read) for operations that must never fail.
    ///
    /// Whole-set reads only fail with `Unavailable`, which `read` already
    /// handles. Any other error still gets demo data and goes through
    /// `note_failure`, which leaves the state alone for non-store errors.
    async fn read_infallible<T>(
        &self,
        operation: &'static str,
        live: impl Future<Output = DomainResult<T>>,
        demo: impl Fn(Vec<InventoryItem>) -> T,
    ) -> Sourced<T> {
        match self.read(operation, live, |items| Ok(demo(items))).await {
            Ok(sourced) => sourced,
            Err(e) => {
                self.note_failure(operation, &e);
                warn!(operation, error = %e, "live read failed; serving demo data");
                Sourced::new(DataSource::DemoOnError, demo(self.demo.generate()))
            }
        }
    }

    /// Route a write: live when connected, `Unavailable` otherwise.
    async fn write<T>(
        &self,
        operation: &'static str,
        live: impl Future<Output = DomainResult<T>>,
    ) -> DomainResult<T> {
        if !self.is_connected() {
            return Err(DomainError::unavailable("store is disconnected"));
        }
        self.bounded(live)
            .await
            .inspect_err(|e| self.note_failure(operation, e))
    }

    pub async fn list(&self) -> Sourced<Vec<InventoryItem>> {
        self.read_infallible("list", self.repository.list(), |items| items)
            .await
    }

    /// Single item; in degraded mode the id is looked up in the demo data.
    pub async fn get(&self, id: ItemId) -> DomainResult<Sourced<InventoryItem>> {
        self.read("get", self.repository.get(id), |items| {
            items
                .into_iter()
                .find(|i| i.id() == id)
                .ok_or_else(DomainError::not_found)
        })
        .await
    }

    pub async fn categories(&self) -> Sourced<BTreeSet<String>> {
        self.read_infallible("categories", self.repository.categories(), |items| {
            category_index(items.iter().map(|i| i.code().as_str()))
        })
        .await
    }

    pub async fn items_by_category(&self, category: &str) -> Sourced<Vec<InventoryItem>> {
        self.read_infallible(
            "items_by_category",
            self.repository.items_by_category(category),
            |mut items| {
                items.retain(|i| matches_category(i.code().as_str(), category));
                items
            },
        )
        .await
    }

    pub async fn export(&self) -> Sourced<Vec<ExportRow>> {
        self.read_infallible("export", self.repository.export(), |items| {
            items.iter().map(ExportRow::from).collect()
        })
        .await
    }

    pub async fn create(&self, code: &str, quantity: i64) -> DomainResult<InventoryItem> {
        self.write("create", self.repository.create(code, quantity))
            .await
    }

    pub async fn set_quantity(&self, id: ItemId, quantity: Option<i64>) -> DomainResult<InventoryItem> {
        self.write("set_quantity", self.repository.set_quantity(id, quantity))
            .await
    }

    pub async fn adjust(
        &self,
        id: ItemId,
        direction: AdjustDirection,
        amount: Option<i64>,
    ) -> DomainResult<InventoryItem> {
        self.write("adjust", self.repository.adjust(id, direction, amount))
            .await
    }

    pub async fn delete(&self, id: ItemId) -> DomainResult<InventoryItem> {
        self.write("delete", self.repository.delete(id)).await
    }

    /// Import the seed asset into the live store, skipping codes already present.
    pub async fn reseed(&self) -> DomainResult<ReseedOutcome> {
        self.write("reseed", self.import_seed(0)).await
    }

    /// Clear the live store, then import the seed asset.
    pub async fn reset(&self) -> DomainResult<ReseedOutcome> {
        self.write("reset", async {
            let removed = self.repository.clear().await?;
            self.import_seed(removed).await
        })
        .await
    }

    async fn import_seed(&self, removed: u64) -> DomainResult<ReseedOutcome> {
        let Some(codes) = self.read_seed() else {
            return Ok(ReseedOutcome {
                removed,
                inserted: 0,
                seed_asset_present: false,
            });
        };
        let inserted = self.repository.import_codes(&codes).await?;
        info!(removed, inserted, "seed asset imported");
        Ok(ReseedOutcome {
            removed,
            inserted,
            seed_asset_present: true,
        })
    }

    /// Connectivity readout. Counting records is itself a live call.
    pub async fn status(&self) -> StatusReport {
        let records = if self.is_connected() {
            match self.bounded(self.repository.count()).await {
                Ok(n) => Some(n),
                Err(e) => {
                    self.note_failure("status", &e);
                    None
                }
            }
        } else {
            None
        };

        StatusReport {
            state: self.state(),
            records,
            seed_asset_present: self.seed.is_present(),
            checked_at: self.checked_at.lock().ok().and_then(|c| *c),
        }
    }
}
