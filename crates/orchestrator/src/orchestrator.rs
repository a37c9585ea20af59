//! Order lifecycle orchestration.

use std::future::Future;
use std::time::{Duration, Instant};

use common::{OrderId, PartId, UserId};
use domain::{Money, Order, OrderError};
use order_store::{OrderRepository, OrderRepositoryExt, RepositoryError};

use crate::config::OrchestratorConfig;
use crate::error::{OrchestratorError, Result};
use crate::locks::OrderLocks;
use crate::services::{CatalogLookup, PaymentClient, ServiceError};

/// Coordinates order creation, payment, and cancellation.
///
/// The orchestrator owns the only write path to the repository. Pay and
/// cancel for the same order are serialized through [`OrderLocks`], so a
/// second caller observes the first caller's outcome instead of charging or
/// cancelling twice. The repository's version check catches writers outside
/// this process.
pub struct OrderOrchestrator<R, C, P>
where
    R: OrderRepository,
    C: CatalogLookup,
    P: PaymentClient,
{
    repository: R,
    catalog: C,
    payment: P,
    config: OrchestratorConfig,
    locks: OrderLocks,
}

impl<R, C, P> OrderOrchestrator<R, C, P>
where
    R: OrderRepository,
    C: CatalogLookup,
    P: PaymentClient,
{
    /// Creates a new orchestrator.
    pub fn new(repository: R, catalog: C, payment: P, config: OrchestratorConfig) -> Self {
        Self {
            repository,
            catalog,
            payment,
            config,
            locks: OrderLocks::new(),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Prices the requested parts and stores a new pending order.
    ///
    /// Every requested id must resolve to a catalog part. Ids are matched
    /// as a set, so a repeated id makes the request fail with
    /// [`OrchestratorError::PartsNotFound`].
    #[tracing::instrument(skip(self, part_ids), fields(part_count = part_ids.len()))]
    pub async fn create_order(&self, user_id: UserId, part_ids: Vec<PartId>) -> Result<Order> {
        if part_ids.is_empty() {
            return Err(OrderError::PartsNotSpecified.into());
        }

        let parts = with_deadline(
            self.config.catalog_timeout,
            self.catalog.list_parts(&part_ids),
        )
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "catalog lookup failed");
            OrchestratorError::CatalogUnavailable(e)
        })?;

        if parts.len() != part_ids.len() {
            tracing::info!(
                requested = part_ids.len(),
                found = parts.len(),
                "order references unknown parts"
            );
            return Err(OrchestratorError::PartsNotFound {
                requested: part_ids.len(),
                found: parts.len(),
            });
        }

        let total_price = parts
            .iter()
            .try_fold(Money::zero(), |total, part| total.checked_add(part.price))
            .ok_or(OrderError::TotalOverflow)?;
        let order = Order::new(user_id, part_ids, total_price)?;
        self.repository.create(&order).await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %order.id(), %total_price, "order created");

        Ok(order)
    }

    /// Returns the current state of an order.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order> {
        Ok(self.repository.get(order_id).await?)
    }

    /// Charges a pending order and returns it marked paid.
    ///
    /// The payment gateway is called at most once per successful call, and
    /// never for an order that is not pending.
    #[tracing::instrument(skip(self))]
    pub async fn pay_order(&self, order_id: OrderId, payment_method: &str) -> Result<Order> {
        if payment_method.trim().is_empty() {
            return Err(OrderError::PaymentMethodRequired.into());
        }

        let _guard = self.locks.acquire(order_id).await;

        let mut order = self.repository.get(order_id).await?;
        if let Err(e) = order.status().ensure_pending() {
            metrics::counter!("order_conflicts_total", "operation" => "pay").increment(1);
            return Err(e.into());
        }

        let payment_start = Instant::now();
        let charge = with_deadline(
            self.config.payment_timeout,
            self.payment.pay(order_id, order.user_id(), payment_method),
        )
        .await;
        metrics::histogram!("order_payment_duration_seconds")
            .record(payment_start.elapsed().as_secs_f64());

        let transaction_id = charge.map_err(|e| {
            metrics::counter!("order_payment_failures_total").increment(1);
            tracing::warn!(error = %e, "payment failed");
            OrchestratorError::PaymentFailed(e)
        })?;

        order.mark_paid(payment_method, transaction_id)?;
        match self.repository.update(&order).await {
            Ok(version) => order.set_version(version),
            Err(e) => {
                // The charge went through; keep the transaction id in the logs
                // so the payment can be reconciled.
                tracing::error!(%transaction_id, error = %e, "order update failed after payment");
                return Err(match e {
                    RepositoryError::VersionConflict { .. } => {
                        metrics::counter!("order_conflicts_total", "operation" => "pay")
                            .increment(1);
                        self.explain_conflict(order_id, e).await
                    }
                    other => OrchestratorError::RepositoryFailure(other),
                });
            }
        }

        metrics::counter!("orders_paid_total").increment(1);
        tracing::info!(%transaction_id, "order paid");

        Ok(order)
    }

    /// Cancels a pending order.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<()> {
        let _guard = self.locks.acquire(order_id).await;

        let mut order = self.repository.get(order_id).await?;
        if let Err(e) = order.cancel() {
            metrics::counter!("order_conflicts_total", "operation" => "cancel").increment(1);
            return Err(e.into());
        }

        match self.repository.update(&order).await {
            Ok(_) => {}
            Err(e @ RepositoryError::VersionConflict { .. }) => {
                metrics::counter!("order_conflicts_total", "operation" => "cancel").increment(1);
                return Err(self.explain_conflict(order_id, e).await);
            }
            Err(e) => return Err(OrchestratorError::RepositoryFailure(e)),
        }

        metrics::counter!("orders_cancelled_total").increment(1);
        tracing::info!("order cancelled");

        Ok(())
    }

    /// Maps a lost version race to the status the winner left behind.
    async fn explain_conflict(&self, order_id: OrderId, err: RepositoryError) -> OrchestratorError {
        match self.repository.find(order_id).await {
            Ok(Some(current)) => match current.status().ensure_pending() {
                Err(state) => state.into(),
                Ok(()) => OrchestratorError::RepositoryFailure(err),
            },
            Ok(None) => OrchestratorError::OrderNotFound(order_id),
            Err(e) => e.into(),
        }
    }
}

async fn with_deadline<T, F>(limit: Duration, call: F) -> std::result::Result<T, ServiceError>
where
    F: Future<Output = std::result::Result<T, ServiceError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(ServiceError::Timeout(limit)))
}
