//! External collaborators
//!
//! The catalog and the recorded bids live in a spreadsheet we don't own.
//! These traits are all the core knows about it.
use crate::auction::{Amount, Lot, LotId, LotIdRef};
use anyhow::Result;
use async_trait::async_trait;
use std::{collections::BTreeMap, sync::Arc};

mod gviz;
#[cfg(test)]
mod in_memory;
mod web_app;

#[cfg(test)]
pub use self::in_memory::*;
pub use self::{gviz::*, web_app::*};

/// Where the lot listing and the current bids are read from
#[async_trait]
pub trait CatalogSource {
    /// Lots in listing order
    async fn load_lots(&self) -> Result<Vec<Lot>>;
    async fn load_bids(&self) -> Result<BTreeMap<LotId, Amount>>;
}

pub type SharedCatalogSource = Arc<dyn CatalogSource + Send + Sync + 'static>;

/// Where accepted bids are written to
///
/// No idempotency key is sent, so a retry after an ambiguous failure
/// may record the same bid twice.
#[async_trait]
pub trait BidRecorder {
    async fn record(
        &self,
        lot: LotIdRef<'_>,
        bidder_name: &str,
        bidder_number: &str,
        amount: Amount,
    ) -> Result<()>;
}

pub type SharedBidRecorder = Arc<dyn BidRecorder + Send + Sync + 'static>;
