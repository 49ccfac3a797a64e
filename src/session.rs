use crate::{
    auction::{Amount, LotId, LotIdRef},
    board::BidBoard,
    catalog::CatalogStore,
    policy::{self, BidPrompt},
    source::CatalogSource,
};
use thiserror::Error;
use tracing::{info, warn};

pub const LOAD_FAILED_MESSAGE: &str = "Failed to load sale lots. Please refresh the page.";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to load the lot listing")]
    Lots(#[source] anyhow::Error),
    #[error("failed to load the bid board")]
    Bids(#[source] anyhow::Error),
    #[error("bid board holds {amount} for lot {lot}, not a multiple of {}", policy::INCREMENT)]
    OffIncrement { lot: LotId, amount: Amount },
    #[error("bid board holds {amount} for lot {lot}, above any biddable amount")]
    OutOfRange { lot: LotId, amount: Amount },
}

impl LoadError {
    pub fn user_message(&self) -> &'static str {
        LOAD_FAILED_MESSAGE
    }
}

/// What the operator sees after selecting a lot
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LotView {
    pub lot: LotId,
    pub image: Option<String>,
    pub current_bid: Amount,
    pub suggested_bid: Amount,
    pub prompt: BidPrompt,
}

/// Catalog and bid board of one bidding session
#[derive(Clone, Debug, Default)]
pub struct Session {
    pub catalog: CatalogStore,
    pub board: BidBoard,
}

impl Session {
    pub fn new(catalog: CatalogStore, board: BidBoard) -> Self {
        Self { catalog, board }
    }

    /// Load everything or nothing
    pub async fn load(source: &(dyn CatalogSource + Send + Sync)) -> Result<Self, LoadError> {
        let (lots, bids) = futures::try_join!(
            async { source.load_lots().await.map_err(LoadError::Lots) },
            async { source.load_bids().await.map_err(LoadError::Bids) },
        )?;

        let catalog = CatalogStore::from_listing(lots);
        let board = BidBoard::from_loaded(bids, &catalog);
        check_board(&board)?;
        if catalog.is_empty() {
            warn!("lot listing is empty");
        }
        info!(lots = catalog.len(), bids = board.iter().count(), "session loaded");

        Ok(Self::new(catalog, board))
    }

    pub fn view(&self, lot: LotIdRef) -> Option<LotView> {
        if !self.catalog.contains(lot) {
            return None;
        }
        let current_bid = self.board.get(lot);
        Some(LotView {
            lot: lot.to_owned(),
            image: self.catalog.image(lot).map(str::to_owned),
            current_bid,
            suggested_bid: policy::next_suggested_bid(current_bid),
            prompt: policy::prompt_text(current_bid),
        })
    }
}

/// Amounts from 400 up were accepted by the policy, so they sit on the
/// increment grid and fit a proposed bid.
fn check_board(board: &BidBoard) -> Result<(), LoadError> {
    for (lot, amount) in board.iter() {
        if i64::try_from(amount).is_err() {
            return Err(LoadError::OutOfRange {
                lot: lot.to_owned(),
                amount,
            });
        }
        if amount >= policy::MINIMUM_OPENING_BID && amount % policy::INCREMENT != 0 {
            return Err(LoadError::OffIncrement {
                lot: lot.to_owned(),
                amount,
            });
        }
    }
    Ok(())
}
