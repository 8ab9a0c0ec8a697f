//! Read-only view of the billing/entitlement subsystem.
//!
//! The engine consults billing as a boolean capability gate and never
//! mutates it. Status arrives on a `watch` stream so the one bounded wait
//! in `ConversionSucceeded` can race the stream against a timer.

use tokio::sync::watch;

/// Entitlement state as published by the host's billing layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingStatus {
    /// A refresh is in flight; the answer is not yet known.
    Loading,
    NotPurchased,
    /// Purchase confirmed for the given product id.
    Purchased(String),
    /// Purchase confirmed and acknowledged at the given epoch-millis time.
    Done { product: String, at_epoch_ms: u64 },
}

impl BillingStatus {
    /// The purchased product id, for the two terminal "owned" states.
    #[must_use]
    pub fn purchased_product(&self) -> Option<&str> {
        match self {
            BillingStatus::Purchased(product) | BillingStatus::Done { product, .. } => {
                Some(product)
            }
            BillingStatus::Loading | BillingStatus::NotPurchased => None,
        }
    }
}

/// A purchasable product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    pub id: &'static str,
}

/// The static product catalogue; automation is the single paid feature.
pub const PRODUCTS: &[Product] = &[Product { id: "automation" }];

/// Host-provided billing collaborator.
pub trait BillingObserver: Send + Sync {
    /// Subscribe to the status stream. `borrow()` on the receiver gives the
    /// current value synchronously.
    fn status(&self) -> watch::Receiver<BillingStatus>;

    fn products(&self) -> &'static [Product] {
        PRODUCTS
    }
}

/// A fixed-status observer. Hosts without a billing backend (tests, the
/// CLI) publish one constant value.
pub struct StaticBilling {
    tx: watch::Sender<BillingStatus>,
}

impl StaticBilling {
    #[must_use]
    pub fn new(status: BillingStatus) -> Self {
        let (tx, _rx) = watch::channel(status);
        StaticBilling { tx }
    }

    /// Push a new status to all subscribers.
    pub fn publish(&self, status: BillingStatus) {
        let _ = self.tx.send(status);
    }
}

impl BillingObserver for StaticBilling {
    fn status(&self) -> watch::Receiver<BillingStatus> {
        self.tx.subscribe()
    }
}
