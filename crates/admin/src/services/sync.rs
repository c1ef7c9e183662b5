//! WooCommerce synchronization service.
//!
//! Three flows, each recorded as one `admin.sync_run` row:
//!
//! - **pull**: fetch remote products and fold them into the local catalog,
//!   matching by stored remote ID first and case-insensitive name second.
//! - **push**: create or update remote products so the remote store mirrors
//!   the local active catalog.
//! - **orders**: import remote orders that have no local counterpart yet.
//!
//! Per-record problems are tallied instead of aborting the run; only a
//! failed remote list (or a broken database) ends a run early, and even
//! then the run row records it.

use std::collections::HashSet;

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument, warn};

use roastline_core::{CurrencyCode, OrderStatus, Price, ProductId, SyncDirection, SyncRunId, SyncStatus};

use crate::db::RepositoryError;
use crate::db::catalog::{CatalogRepository, Product};
use crate::db::customers::CustomerRepository;
use crate::db::orders::{ImportedOrderItem, OrderRepository};
use crate::db::sync_runs::{SyncCounts, SyncRun, SyncRunRepository};
use crate::woocommerce::{WooClient, WooError, WooLineItem, WooOrder, WooProduct, WooProductPayload};

/// Errors that end a sync run early.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The run log or a catalog read could not be written/read.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The remote list request failed outright.
    #[error(transparent)]
    Woo(#[from] WooError),
}

/// WooCommerce synchronization service.
///
/// Catalog and order data live in the shop database; run records live in
/// the admin database.
pub struct SyncService<'a> {
    catalog: CatalogRepository<'a>,
    orders: OrderRepository<'a>,
    customers: CustomerRepository<'a>,
    runs: SyncRunRepository<'a>,
    woo: &'a WooClient,
    currency: CurrencyCode,
}

impl<'a> SyncService<'a> {
    /// Create a new sync service.
    #[must_use]
    pub const fn new(
        shop_pool: &'a PgPool,
        admin_pool: &'a PgPool,
        woo: &'a WooClient,
        currency: CurrencyCode,
    ) -> Self {
        Self {
            catalog: CatalogRepository::new(shop_pool),
            orders: OrderRepository::new(shop_pool),
            customers: CustomerRepository::new(shop_pool),
            runs: SyncRunRepository::new(admin_pool),
            woo,
            currency,
        }
    }

    /// Pull remote products into the local catalog.
    ///
    /// Remote products matched to a local one (by stored remote ID, then by
    /// case-insensitive name) overwrite its name, description, and price;
    /// unmatched remote products are inserted. Remote products without a
    /// parseable price can be updated but not inserted.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if the remote list or the run log fails; the run
    /// row records the failure either way.
    #[instrument(skip(self))]
    pub async fn pull_products(&self) -> Result<SyncRun, SyncError> {
        let run = self.runs.start(SyncDirection::Pull).await?;

        let remote = match self.woo.list_products().await {
            Ok(remote) => remote,
            Err(e) => return self.fail(run.id, e.into()).await,
        };
        let locals = match self.catalog.list_all().await {
            Ok(locals) => locals,
            Err(e) => return self.fail(run.id, e.into()).await,
        };

        let mut counts = SyncCounts::default();

        for action in plan_pull(&locals, &remote) {
            match action {
                PullAction::Update { local_id, remote: rp } => {
                    match self
                        .catalog
                        .sync_from_remote(local_id, rp.id, &rp.name, &rp.description, rp.price())
                        .await
                    {
                        Ok(()) => counts.updated += 1,
                        Err(e) => {
                            warn!(woo_id = rp.id, error = %e, "failed to update product from remote");
                            counts.failed += 1;
                        }
                    }
                }
                PullAction::Insert { remote: rp } => {
                    let Some(price) = rp.price() else {
                        info!(woo_id = rp.id, "skipping remote product without a price");
                        counts.skipped += 1;
                        continue;
                    };
                    match self
                        .catalog
                        .insert_from_remote(
                            rp.id,
                            &rp.name,
                            &rp.description,
                            price,
                            self.currency,
                            rp.is_published(),
                        )
                        .await
                    {
                        Ok(_) => counts.created += 1,
                        Err(e) => {
                            warn!(woo_id = rp.id, error = %e, "failed to insert remote product");
                            counts.failed += 1;
                        }
                    }
                }
            }
        }

        Ok(self.runs.finish(run.id, outcome(counts), counts, None).await?)
    }

    /// Push the local active catalog to the remote store.
    ///
    /// Active products without a remote counterpart are created remotely
    /// and linked; matched products are updated remotely when name,
    /// description, or price differ. Inactive products are left alone.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if the remote list or the run log fails; the run
    /// row records the failure either way.
    #[instrument(skip(self))]
    pub async fn push_products(&self) -> Result<SyncRun, SyncError> {
        let run = self.runs.start(SyncDirection::Push).await?;

        let remote = match self.woo.list_products().await {
            Ok(remote) => remote,
            Err(e) => return self.fail(run.id, e.into()).await,
        };
        let locals = match self.catalog.list_all().await {
            Ok(locals) => locals,
            Err(e) => return self.fail(run.id, e.into()).await,
        };

        let mut counts = SyncCounts::default();

        for action in plan_push(&locals, &remote) {
            match action {
                PushAction::Create { local } => match self.create_remote(local).await {
                    Ok(()) => counts.created += 1,
                    Err(e) => {
                        warn!(product_id = %local.id, error = %e, "failed to create remote product");
                        counts.failed += 1;
                    }
                },
                PushAction::Update { local, woo_id } => {
                    match self.woo.update_product(woo_id, &payload_for(local)).await {
                        Ok(_) => counts.updated += 1,
                        Err(e) => {
                            warn!(product_id = %local.id, woo_id, error = %e, "failed to update remote product");
                            counts.failed += 1;
                        }
                    }
                }
                PushAction::Link { local, woo_id, push_update } => {
                    match self.link_remote(local, woo_id, push_update).await {
                        Ok(()) => counts.updated += 1,
                        Err(e) => {
                            warn!(product_id = %local.id, woo_id, error = %e, "failed to link remote product");
                            counts.failed += 1;
                        }
                    }
                }
                PushAction::Skip => counts.skipped += 1,
            }
        }

        Ok(self.runs.finish(run.id, outcome(counts), counts, None).await?)
    }

    /// Import remote orders that were never imported before.
    ///
    /// Orders are matched to local customer accounts by billing email;
    /// remote orders without a matching account, a mappable status, or
    /// well-formed money values are skipped, not failed.
    ///
    /// # Errors
    ///
    /// Returns `SyncError` if the remote list or the run log fails; the run
    /// row records the failure either way.
    #[instrument(skip(self))]
    pub async fn import_orders(&self) -> Result<SyncRun, SyncError> {
        let run = self.runs.start(SyncDirection::Orders).await?;

        let remote = match self.woo.list_orders().await {
            Ok(remote) => remote,
            Err(e) => return self.fail(run.id, e.into()).await,
        };

        let mut counts = SyncCounts::default();

        for order in &remote {
            match self.import_order(order).await {
                Ok(ImportOutcome::Created) => counts.created += 1,
                Ok(ImportOutcome::Skipped(reason)) => {
                    info!(woo_id = order.id, reason, "skipped remote order");
                    counts.skipped += 1;
                }
                Err(e) => {
                    warn!(woo_id = order.id, error = %e, "failed to import remote order");
                    counts.failed += 1;
                }
            }
        }

        Ok(self.runs.finish(run.id, outcome(counts), counts, None).await?)
    }

    /// Create a remote product for a local one and record the new link.
    async fn create_remote(&self, local: &Product) -> Result<(), SyncError> {
        let created = self.woo.create_product(&payload_for(local)).await?;
        self.catalog.set_woo_id(local.id, created.id).await?;
        Ok(())
    }

    /// Record a name-matched link, pushing our copy when it differs.
    async fn link_remote(
        &self,
        local: &Product,
        woo_id: i64,
        push_update: bool,
    ) -> Result<(), SyncError> {
        self.catalog.set_woo_id(local.id, woo_id).await?;
        if push_update {
            self.woo.update_product(woo_id, &payload_for(local)).await?;
        }
        Ok(())
    }

    /// Import a single remote order, deciding between created and skipped.
    async fn import_order(&self, order: &WooOrder) -> Result<ImportOutcome, RepositoryError> {
        if self.orders.exists_by_woo_id(order.id).await? {
            return Ok(ImportOutcome::Skipped("already imported"));
        }
        let Some(status) = map_order_status(&order.status) else {
            return Ok(ImportOutcome::Skipped("unmapped status"));
        };
        let Some(total) = order.total_amount() else {
            return Ok(ImportOutcome::Skipped("unparseable total"));
        };
        let Ok(currency) = order.currency.parse::<CurrencyCode>() else {
            return Ok(ImportOutcome::Skipped("unsupported currency"));
        };
        if order.billing.email.is_empty() {
            return Ok(ImportOutcome::Skipped("no billing email"));
        }
        let Some(user_id) = self.customers.find_id_by_email(&order.billing.email).await? else {
            return Ok(ImportOutcome::Skipped("no matching customer account"));
        };

        let placed_at = order.placed_at().unwrap_or_else(Utc::now);
        let items: Vec<ImportedOrderItem> = order.line_items.iter().map(import_item).collect();

        match self
            .orders
            .insert_imported(order.id, user_id, status, Price::new(total, currency), placed_at, &items)
            .await
        {
            Ok(_) => Ok(ImportOutcome::Created),
            // Lost a race against a concurrent import of the same order.
            Err(RepositoryError::Conflict(_)) => Ok(ImportOutcome::Skipped("already imported")),
            Err(e) => Err(e),
        }
    }

    /// Record a run as failed and propagate the error that ended it.
    async fn fail(&self, run_id: SyncRunId, error: SyncError) -> Result<SyncRun, SyncError> {
        self.runs
            .finish(
                run_id,
                SyncStatus::Failed,
                SyncCounts::default(),
                Some(&error.to_string()),
            )
            .await?;

        Err(error)
    }
}

/// What one remote order import did.
enum ImportOutcome {
    Created,
    Skipped(&'static str),
}

/// One planned step of a pull run.
#[derive(Debug, PartialEq, Eq)]
enum PullAction<'p> {
    Update { local_id: ProductId, remote: &'p WooProduct },
    Insert { remote: &'p WooProduct },
}

/// One planned step of a push run.
#[derive(Debug, PartialEq, Eq)]
enum PushAction<'p> {
    Create { local: &'p Product },
    Update { local: &'p Product, woo_id: i64 },
    Link { local: &'p Product, woo_id: i64, push_update: bool },
    Skip,
}

/// Decide what a pull run does with each remote product.
///
/// A local product is claimed by at most one remote product: stored remote
/// IDs win, then the first case-insensitive name match among unlinked
/// locals.
fn plan_pull<'p>(locals: &[Product], remote: &'p [WooProduct]) -> Vec<PullAction<'p>> {
    let mut claimed: HashSet<ProductId> = HashSet::new();
    let mut actions = Vec::with_capacity(remote.len());

    for rp in remote {
        let matched = locals
            .iter()
            .find(|l| l.woo_id == Some(rp.id))
            .or_else(|| {
                locals.iter().find(|l| {
                    l.woo_id.is_none()
                        && !claimed.contains(&l.id)
                        && l.name.to_lowercase() == rp.name.to_lowercase()
                })
            });

        match matched {
            Some(local) => {
                claimed.insert(local.id);
                actions.push(PullAction::Update {
                    local_id: local.id,
                    remote: rp,
                });
            }
            None => actions.push(PullAction::Insert { remote: rp }),
        }
    }

    actions
}

/// Decide what a push run does with each local active product.
fn plan_push<'p>(locals: &'p [Product], remote: &[WooProduct]) -> Vec<PushAction<'p>> {
    let mut actions = Vec::new();

    for local in locals {
        if !local.active {
            continue;
        }

        if let Some(woo_id) = local.woo_id {
            match remote.iter().find(|rp| rp.id == woo_id) {
                Some(rp) if needs_remote_update(local, rp) => {
                    actions.push(PushAction::Update { local, woo_id });
                }
                Some(_) => actions.push(PushAction::Skip),
                // The linked remote product is gone; recreate it.
                None => actions.push(PushAction::Create { local }),
            }
        } else {
            match remote
                .iter()
                .find(|rp| rp.name.to_lowercase() == local.name.to_lowercase())
            {
                Some(rp) => actions.push(PushAction::Link {
                    local,
                    woo_id: rp.id,
                    push_update: needs_remote_update(local, rp),
                }),
                None => actions.push(PushAction::Create { local }),
            }
        }
    }

    actions
}

/// Whether the remote copy is out of date with respect to ours.
///
/// An unparseable remote price always counts as differing.
fn needs_remote_update(local: &Product, remote: &WooProduct) -> bool {
    if local.name != remote.name || local.description != remote.description {
        return true;
    }

    remote.price() != Some(local.price.amount)
}

/// Build the remote payload for a local product.
fn payload_for(local: &Product) -> WooProductPayload {
    WooProductPayload::from_local(
        &local.name,
        &local.description,
        local.price.amount,
        local.active,
    )
}

/// Map a WooCommerce order status onto ours; `None` means don't import.
fn map_order_status(remote: &str) -> Option<OrderStatus> {
    match remote {
        "pending" | "on-hold" => Some(OrderStatus::Pending),
        "processing" => Some(OrderStatus::Paid),
        "completed" => Some(OrderStatus::Delivered),
        "cancelled" | "refunded" => Some(OrderStatus::Cancelled),
        _ => None,
    }
}

/// Convert one remote order line.
///
/// Remote rows with zero or negative quantity come across as a single
/// unit; the unit price is derived from the line total.
fn import_item(line: &WooLineItem) -> ImportedOrderItem {
    let line_total = line.total_amount().unwrap_or(Decimal::ZERO);
    let quantity = u32::try_from(line.quantity).unwrap_or(0).max(1);
    let unit_price = (line_total / Decimal::from(quantity)).round_dp(2);

    ImportedOrderItem {
        name: line.name.clone(),
        quantity,
        unit_price,
        line_total,
    }
}

/// Overall outcome of a run from its tallies.
const fn outcome(counts: SyncCounts) -> SyncStatus {
    if counts.failed == 0 {
        SyncStatus::Success
    } else if counts.created + counts.updated > 0 {
        SyncStatus::Partial
    } else {
        SyncStatus::Failed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn local(id: i32, woo_id: Option<i64>, name: &str, price: Decimal, active: bool) -> Product {
        Product {
            id: ProductId::new(id),
            woo_id,
            name: name.to_owned(),
            description: String::new(),
            origin: None,
            price: Price::new(price, CurrencyCode::USD),
            image_url: None,
            active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn remote(id: i64, name: &str, price: &str) -> WooProduct {
        WooProduct {
            id,
            name: name.to_owned(),
            description: String::new(),
            regular_price: price.to_owned(),
            status: "publish".to_owned(),
        }
    }

    #[test]
    fn test_plan_pull_prefers_stored_remote_id() {
        let locals = vec![local(1, Some(50), "Old Name", Decimal::new(900, 2), true)];
        let remotes = vec![remote(50, "New Name", "9.00")];

        let actions = plan_pull(&locals, &remotes);

        assert_eq!(
            actions,
            vec![PullAction::Update {
                local_id: ProductId::new(1),
                remote: &remotes[0]
            }]
        );
    }

    #[test]
    fn test_plan_pull_falls_back_to_name_match() {
        let locals = vec![local(2, None, "Espresso Roast", Decimal::new(900, 2), true)];
        let remotes = vec![remote(50, "ESPRESSO ROAST", "9.00")];

        let actions = plan_pull(&locals, &remotes);

        assert_eq!(
            actions,
            vec![PullAction::Update {
                local_id: ProductId::new(2),
                remote: &remotes[0]
            }]
        );
    }

    #[test]
    fn test_plan_pull_inserts_unmatched() {
        let locals = vec![local(1, Some(50), "Espresso Roast", Decimal::new(900, 2), true)];
        let remotes = vec![remote(60, "Filter Blend", "11.00")];

        let actions = plan_pull(&locals, &remotes);

        assert_eq!(actions, vec![PullAction::Insert { remote: &remotes[0] }]);
    }

    #[test]
    fn test_plan_pull_claims_name_match_once() {
        let locals = vec![local(1, None, "Espresso Roast", Decimal::new(900, 2), true)];
        let remotes = vec![
            remote(50, "Espresso Roast", "9.00"),
            remote(60, "Espresso Roast", "9.50"),
        ];

        let actions = plan_pull(&locals, &remotes);

        assert_eq!(
            actions,
            vec![
                PullAction::Update {
                    local_id: ProductId::new(1),
                    remote: &remotes[0]
                },
                PullAction::Insert { remote: &remotes[1] },
            ]
        );
    }

    #[test]
    fn test_plan_push_skips_in_sync_product() {
        let locals = vec![local(1, Some(50), "Espresso Roast", Decimal::new(900, 2), true)];
        let remotes = vec![remote(50, "Espresso Roast", "9.00")];

        assert_eq!(plan_push(&locals, &remotes), vec![PushAction::Skip]);
    }

    #[test]
    fn test_plan_push_updates_on_price_drift() {
        let locals = vec![local(1, Some(50), "Espresso Roast", Decimal::new(950, 2), true)];
        let remotes = vec![remote(50, "Espresso Roast", "9.00")];

        assert_eq!(
            plan_push(&locals, &remotes),
            vec![PushAction::Update {
                local: &locals[0],
                woo_id: 50
            }]
        );
    }

    #[test]
    fn test_plan_push_creates_missing_and_ignores_inactive() {
        let locals = vec![
            local(1, None, "Espresso Roast", Decimal::new(900, 2), true),
            local(2, None, "Retired Blend", Decimal::new(800, 2), false),
        ];

        assert_eq!(
            plan_push(&locals, &[]),
            vec![PushAction::Create { local: &locals[0] }]
        );
    }

    #[test]
    fn test_plan_push_links_by_name() {
        let locals = vec![local(1, None, "Espresso Roast", Decimal::new(900, 2), true)];
        let remotes = vec![remote(50, "espresso roast", "9.00")];

        assert_eq!(
            plan_push(&locals, &remotes),
            vec![PushAction::Link {
                local: &locals[0],
                woo_id: 50,
                push_update: true
            }]
        );
    }

    #[test]
    fn test_needs_remote_update_treats_rescaled_price_as_equal() {
        let product = local(1, Some(50), "Espresso Roast", Decimal::new(950, 2), true);
        let same = remote(50, "Espresso Roast", "9.5");

        assert!(!needs_remote_update(&product, &same));
    }

    #[test]
    fn test_needs_remote_update_on_unparseable_remote_price() {
        let product = local(1, Some(50), "Espresso Roast", Decimal::new(950, 2), true);
        let blank = remote(50, "Espresso Roast", "");

        assert!(needs_remote_update(&product, &blank));
    }

    #[test]
    fn test_map_order_status_table() {
        assert_eq!(map_order_status("pending"), Some(OrderStatus::Pending));
        assert_eq!(map_order_status("on-hold"), Some(OrderStatus::Pending));
        assert_eq!(map_order_status("processing"), Some(OrderStatus::Paid));
        assert_eq!(map_order_status("completed"), Some(OrderStatus::Delivered));
        assert_eq!(map_order_status("cancelled"), Some(OrderStatus::Cancelled));
        assert_eq!(map_order_status("refunded"), Some(OrderStatus::Cancelled));
        assert_eq!(map_order_status("trash"), None);
    }

    #[test]
    fn test_import_item_derives_unit_price() {
        let item = import_item(&WooLineItem {
            name: "Espresso Roast".to_owned(),
            quantity: 2,
            total: "29.00".to_owned(),
        });

        assert_eq!(item.quantity, 2);
        assert_eq!(item.unit_price, Decimal::new(1450, 2));
        assert_eq!(item.line_total, Decimal::new(2900, 2));
    }

    #[test]
    fn test_import_item_clamps_zero_quantity() {
        let item = import_item(&WooLineItem {
            name: "Mystery".to_owned(),
            quantity: 0,
            total: "5.00".to_owned(),
        });

        assert_eq!(item.quantity, 1);
        assert_eq!(item.unit_price, Decimal::new(500, 2));
    }

    #[test]
    fn test_outcome_thresholds() {
        let clean = SyncCounts { created: 2, updated: 1, skipped: 3, failed: 0 };
        assert_eq!(outcome(clean), SyncStatus::Success);

        let partial = SyncCounts { created: 1, updated: 0, skipped: 0, failed: 2 };
        assert_eq!(outcome(partial), SyncStatus::Partial);

        let failed = SyncCounts { created: 0, updated: 0, skipped: 1, failed: 2 };
        assert_eq!(outcome(failed), SyncStatus::Failed);
    }
}
