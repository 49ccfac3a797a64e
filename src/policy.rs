//! Bid policy
//!
//! Pure rules deciding what the next bid on a lot should be and whether
//! a proposed bid is acceptable. Everything that validates an amount
//! goes through here; the [`crate::board::BidBoard`] trusts its callers.
use crate::auction::Amount;
use std::fmt;
use thiserror::Error;

/// Floor for any lot with no prior bids
pub const MINIMUM_OPENING_BID: Amount = 400;
/// Required step between bids, and the modulus every bid must satisfy
pub const INCREMENT: Amount = 100;

pub fn minimum_opening_bid() -> Amount {
    MINIMUM_OPENING_BID
}

pub fn increment() -> Amount {
    INCREMENT
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum BidRejection {
    #[error("Bid must be at least ${} and greater than current bid.", MINIMUM_OPENING_BID)]
    TooLow,
    #[error("Bid must be in increments of ${}.", INCREMENT)]
    NotAnIncrement,
}

/// Amount to autofill when the operator selects a lot
pub fn next_suggested_bid(current: Amount) -> Amount {
    if current < MINIMUM_OPENING_BID {
        MINIMUM_OPENING_BID
    } else {
        current + INCREMENT
    }
}

/// Helper text shown next to the autofilled amount
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BidPrompt {
    Opening { minimum: Amount },
    Raise { current: Amount, increment: Amount },
}

impl fmt::Display for BidPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BidPrompt::Opening { minimum } => write!(
                f,
                "You are placing the opening bid. Minimum starting bid is ${minimum}."
            ),
            BidPrompt::Raise { current, increment } => write!(
                f,
                "Current bid is ${current}. Your bid is autofilled ${increment} above."
            ),
        }
    }
}

pub fn prompt_text(current: Amount) -> BidPrompt {
    if current < MINIMUM_OPENING_BID {
        BidPrompt::Opening {
            minimum: minimum_opening_bid(),
        }
    } else {
        BidPrompt::Raise {
            current,
            increment: increment(),
        }
    }
}

/// Check `proposed` against the lot's `current` bid
///
/// Both rules are always evaluated. When both fail, the increment rule
/// is the one reported.
pub fn validate_bid(proposed: i64, current: Amount) -> Result<Amount, BidRejection> {
    // negative amounts don't convert and are below the opening bid anyway
    let too_low = Amount::try_from(proposed)
        .map_or(true, |amount| amount < MINIMUM_OPENING_BID || amount <= current);

    let mut rejection = None;
    if too_low {
        rejection = Some(BidRejection::TooLow);
    }
    if proposed % INCREMENT as i64 != 0 {
        rejection = Some(BidRejection::NotAnIncrement);
    }

    match rejection {
        Some(rejection) => Err(rejection),
        None => Ok(proposed as Amount),
    }
}

#[cfg(test)]
pub fn is_valid_bid(proposed: i64, current: Amount) -> bool {
    validate_bid(proposed, current).is_ok()
}
