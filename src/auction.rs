use serde::Serialize;
use std::time::Duration;

pub type LotId = String;
pub type LotIdRef<'s> = &'s str;
pub type Amount = u64;

/// How long the "bid submitted" notification stays visible
pub const NOTIFICATION_DISMISS_AFTER: Duration = Duration::from_secs(3);

/// An item available for bidding
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lot {
    pub id: LotId,
    /// `None` means no image is available
    pub image: Option<String>,
}

#[cfg(test)]
impl Lot {
    pub fn new(id: impl Into<LotId>, image: Option<String>) -> Self {
        Self {
            id: id.into(),
            image,
        }
    }
}

/// A bid as entered by the operator, before any validation
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BidSubmission {
    /// Empty when no lot was selected
    pub lot: String,
    pub bidder_name: String,
    pub bidder_number: String,
    /// `None` when the entered amount is not an integer
    pub amount: Option<i64>,
}

/// A bid that the recorder confirmed and that is now on the board
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub lot: LotId,
    pub bidder_name: String,
    pub bidder_number: String,
    pub amount: Amount,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub dismiss_after: Duration,
}

impl Receipt {
    pub fn notification(&self) -> Notification {
        Notification {
            message: format!("Your bid of ${} on {} was submitted.", self.amount, self.lot),
            dismiss_after: NOTIFICATION_DISMISS_AFTER,
        }
    }
}
