use super::*;
use anyhow::bail;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Fake catalog source.
///
/// Useful for unit-tests.
#[derive(Debug, Default)]
pub struct InMemoryCatalogSource {
    lots: Vec<Lot>,
    bids: BTreeMap<LotId, Amount>,
    fail: AtomicBool,
}

impl InMemoryCatalogSource {
    pub fn new(lots: Vec<Lot>, bids: BTreeMap<LotId, Amount>) -> Self {
        Self {
            lots,
            bids,
            fail: AtomicBool::new(false),
        }
    }

    pub fn new_shared(lots: Vec<Lot>, bids: BTreeMap<LotId, Amount>) -> Arc<Self> {
        Arc::new(Self::new(lots, bids))
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalogSource {
    async fn load_lots(&self) -> Result<Vec<Lot>> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("catalog source unavailable");
        }
        Ok(self.lots.clone())
    }

    async fn load_bids(&self) -> Result<BTreeMap<LotId, Amount>> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("catalog source unavailable");
        }
        Ok(self.bids.clone())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedBid {
    pub lot: LotId,
    pub bidder_name: String,
    pub bidder_number: String,
    pub amount: Amount,
}

/// Fake bid recorder keeping every call it receives.
///
/// Useful for unit-tests.
#[derive(Debug, Default)]
pub struct InMemoryBidRecorder {
    recorded: Mutex<Vec<RecordedBid>>,
    fail: AtomicBool,
}

impl InMemoryBidRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Make subsequent calls fail like a dropped connection would
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn recorded(&self) -> Vec<RecordedBid> {
        self.recorded.lock().clone()
    }
}

#[async_trait]
impl BidRecorder for InMemoryBidRecorder {
    async fn record(
        &self,
        lot: LotIdRef<'_>,
        bidder_name: &str,
        bidder_number: &str,
        amount: Amount,
    ) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            bail!("connection reset by peer");
        }
        self.recorded.lock().push(RecordedBid {
            lot: lot.to_owned(),
            bidder_name: bidder_name.to_owned(),
            bidder_number: bidder_number.to_owned(),
            amount,
        });
        Ok(())
    }
}
