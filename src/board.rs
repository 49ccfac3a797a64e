use crate::{
    auction::{Amount, LotId, LotIdRef},
    catalog::CatalogStore,
};
use std::collections::BTreeMap;
use tracing::warn;

/// Current accepted bid of every lot that has one
///
/// No validation happens here: callers check amounts with
/// [`crate::policy::validate_bid`] before recording them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BidBoard(BTreeMap<LotId, Amount>);

impl BidBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the board from loaded bids, dropping lots the catalog doesn't list
    pub fn from_loaded(
        bids: impl IntoIterator<Item = (LotId, Amount)>,
        catalog: &CatalogStore,
    ) -> Self {
        let mut board = Self::new();
        for (lot, amount) in bids {
            if catalog.contains(&lot) {
                board.record_bid(&lot, amount);
            } else {
                warn!(%lot, amount, "ignoring bid for a lot missing from the catalog");
            }
        }
        board
    }

    /// Lots without a bid read as 0
    pub fn get(&self, lot: LotIdRef) -> Amount {
        self.0.get(lot).copied().unwrap_or(0)
    }

    pub fn record_bid(&mut self, lot: LotIdRef, amount: Amount) {
        self.0.insert(lot.to_owned(), amount);
    }

    pub fn iter(&self) -> impl Iterator<Item = (LotIdRef<'_>, Amount)> {
        self.0.iter().map(|(lot, amount)| (lot.as_str(), *amount))
    }
}
