//! Submission Controller
//!
//! Takes a bid the operator entered, validates it against the bid policy,
//! sends it to the recorder and, only once the recorder confirmed, puts it
//! on the bid board.
use crate::{
    auction::{Amount, BidSubmission, LotId, Receipt},
    policy::{self, BidRejection},
    session::Session,
    source::SharedBidRecorder,
};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit bid. Please try again.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select a Sale Lot.")]
    MissingLot,
    #[error("Please select a Sale Lot.")]
    UnknownLot(LotId),
    #[error("Please enter your name.")]
    MissingName,
    #[error("Please enter your bidding number.")]
    MissingBidderNumber,
    #[error(transparent)]
    InvalidBidAmount(#[from] BidRejection),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Field {
    SaleLot,
    BidderName,
    BidderNumber,
    BidAmount,
}

impl Field {
    /// Name of the form field the error is shown next to
    pub fn form_name(self) -> &'static str {
        match self {
            Field::SaleLot => "saleLot",
            Field::BidderName => "bidderName",
            Field::BidderNumber => "biddingNumber",
            Field::BidAmount => "bidAmount",
        }
    }
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::MissingLot | ValidationError::UnknownLot(_) => Field::SaleLot,
            ValidationError::MissingName => Field::BidderName,
            ValidationError::MissingBidderNumber => Field::BidderNumber,
            ValidationError::InvalidBidAmount(_) => Field::BidAmount,
        }
    }
}

/// Every failed check of a submission, at most one per field
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    fn push(&mut self, error: ValidationError) {
        self.0.retain(|e| e.field() != error.field());
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn get(&self, field: Field) -> Option<&ValidationError> {
        self.0.iter().find(|e| e.field() == field)
    }

    #[cfg(test)]
    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i != 0 {
                f.write_str(" ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
#[error("bid recorder call failed")]
pub struct SubmissionError(#[source] anyhow::Error);

impl SubmissionError {
    pub fn user_message(&self) -> &'static str {
        SUBMIT_FAILED_MESSAGE
    }
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("invalid submission: {0}")]
    Validation(ValidationErrors),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Committed,
    Failed,
}

pub struct SubmissionController {
    recorder: SharedBidRecorder,
    state: SubmissionState,
}

impl SubmissionController {
    pub fn new(recorder: SharedBidRecorder) -> Self {
        Self {
            recorder,
            state: SubmissionState::Idle,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> SubmissionState {
        self.state
    }

    fn transition(&mut self, state: SubmissionState) {
        debug!(from = ?self.state, to = ?state, "submission state");
        self.state = state;
    }

    /// Validate, record and commit one bid
    ///
    /// The board is only touched after the recorder confirmed the write.
    pub async fn submit(
        &mut self,
        session: &mut Session,
        submission: BidSubmission,
    ) -> Result<Receipt, SubmitError> {
        let res = self.submit_inner(session, submission).await;
        self.transition(SubmissionState::Idle);
        res
    }

    async fn submit_inner(
        &mut self,
        session: &mut Session,
        submission: BidSubmission,
    ) -> Result<Receipt, SubmitError> {
        self.transition(SubmissionState::Validating);
        let (lot, amount) = match validate(session, &submission) {
            Ok(valid) => valid,
            Err(errors) => {
                self.transition(SubmissionState::Failed);
                debug!(%errors, "submission rejected");
                return Err(SubmitError::Validation(errors));
            }
        };
        let bidder_name = submission.bidder_name.trim();
        let bidder_number = submission.bidder_number.trim();

        self.transition(SubmissionState::Submitting);
        if let Err(e) = self
            .recorder
            .record(&lot, bidder_name, bidder_number, amount)
            .await
        {
            self.transition(SubmissionState::Failed);
            warn!(%lot, amount, error = ?e, "error submitting bid");
            return Err(SubmissionError(e).into());
        }

        self.transition(SubmissionState::Committed);
        session.board.record_bid(&lot, amount);
        info!(%lot, amount, "bid recorded");

        Ok(Receipt {
            lot,
            bidder_name: bidder_name.to_owned(),
            bidder_number: bidder_number.to_owned(),
            amount,
        })
    }
}

/// Run every check, without stopping at the first failure
fn validate(
    session: &Session,
    submission: &BidSubmission,
) -> Result<(LotId, Amount), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let lot = submission.lot.as_str();
    if lot.is_empty() {
        errors.push(ValidationError::MissingLot);
    } else if !session.catalog.contains(lot) {
        errors.push(ValidationError::UnknownLot(lot.to_owned()));
    }
    if submission.bidder_name.trim().is_empty() {
        errors.push(ValidationError::MissingName);
    }
    if submission.bidder_number.trim().is_empty() {
        errors.push(ValidationError::MissingBidderNumber);
    }

    let current = session.board.get(lot);
    let amount = match submission.amount {
        Some(proposed) => policy::validate_bid(proposed, current),
        // not a number: only the increment rule can fail
        None => Err(BidRejection::NotAnIncrement),
    };

    match amount {
        Ok(amount) if errors.is_empty() => Ok((lot.to_owned(), amount)),
        Ok(_) => Err(errors),
        Err(rejection) => {
            errors.push(rejection.into());
            Err(errors)
        }
    }
}
