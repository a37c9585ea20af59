//! Catalog lookup trait and in-memory implementation.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use common::PartId;
use domain::{Money, Part};
use uuid::Uuid;

use super::ServiceError;

/// Read-only access to the parts catalog.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Returns the parts matching `part_ids`.
    ///
    /// Each matching part is returned once, regardless of how often its id
    /// appears in the request. Unknown ids are silently omitted.
    async fn list_parts(&self, part_ids: &[PartId]) -> Result<Vec<Part>, ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    parts: HashMap<PartId, Part>,
    fail_on_lookup: bool,
    latency: Option<Duration>,
    lookup_count: usize,
}

/// In-memory catalog.
///
/// Clones share the same parts and failure switches.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog holding the given parts.
    pub fn with_parts(parts: impl IntoIterator<Item = Part>) -> Self {
        let catalog = Self::new();
        for part in parts {
            catalog.insert_part(part);
        }
        catalog
    }

    /// Creates a catalog pre-loaded with a small set of spaceship parts.
    pub fn seeded() -> Self {
        Self::with_parts(seed_parts())
    }

    /// Adds or replaces a part.
    pub fn insert_part(&self, part: Part) {
        self.write().parts.insert(part.id, part);
    }

    /// Returns the number of parts in the catalog.
    pub fn part_count(&self) -> usize {
        self.read_parts(|parts| parts.len())
    }

    /// Returns the part with the given id, if present.
    pub fn part(&self, part_id: PartId) -> Option<Part> {
        self.read_parts(|parts| parts.get(&part_id).cloned())
    }

    /// Makes every subsequent lookup fail with `Unavailable`.
    pub fn set_fail_on_lookup(&self, fail: bool) {
        self.write().fail_on_lookup = fail;
    }

    /// Delays every subsequent lookup by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.write().latency = latency;
    }

    /// Returns how many lookups have been attempted.
    pub fn lookup_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .lookup_count
    }

    fn read_parts<T>(&self, f: impl FnOnce(&HashMap<PartId, Part>) -> T) -> T {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state.parts)
    }

    fn write(&self) -> RwLockWriteGuard<'_, InMemoryCatalogState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl CatalogLookup for InMemoryCatalog {
    async fn list_parts(&self, part_ids: &[PartId]) -> Result<Vec<Part>, ServiceError> {
        let (latency, result) = {
            let mut state = self.write();
            state.lookup_count += 1;

            let result = if state.fail_on_lookup {
                Err(ServiceError::Unavailable(
                    "catalog backend unavailable".to_string(),
                ))
            } else {
                let mut seen = HashSet::new();
                Ok(part_ids
                    .iter()
                    .filter(|id| seen.insert(**id))
                    .filter_map(|id| state.parts.get(id).cloned())
                    .collect())
            };
            (state.latency, result)
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        result
    }
}

fn seed_parts() -> Vec<Part> {
    let part = |id: u128, name: &str, cents: i64, category: &str| {
        Part::new(
            PartId::from_uuid(Uuid::from_u128(id)),
            name,
            Money::from_cents(cents),
            category,
        )
    };

    vec![
        part(
            0x6ba7b810_9dad_11d1_80b4_00c04fd430c9,
            "Main Engine",
            250_000_099,
            "ENGINE",
        ),
        part(
            0x6ba7b810_9dad_11d1_80b4_00c04fd430ca,
            "Fuel Tank",
            120_000_050,
            "FUEL",
        ),
        part(
            0x6ba7b810_9dad_11d1_80b4_00c04fd430cb,
            "Porthole",
            4_500_000,
            "PORTHOLE",
        ),
        part(
            0x6ba7b810_9dad_11d1_80b4_00c04fd430cc,
            "Wing",
            78_000_025,
            "WING",
        ),
    ]
}
