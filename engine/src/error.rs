//! Engine errors.
//!
//! Display strings of the protocol-facing variants are part of the observable
//! contract and must not change.

use counterstake_store::StoreError;
use counterstake_types::{Amount, ParamsError, Timestamp};
use thiserror::Error;

use crate::price::PriceError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),

    #[error("this transfer has already been claimed")]
    DuplicateClaim,

    #[error("the stake is too small: received {received}, required {required}")]
    InsufficientStake { received: Amount, required: Amount },

    #[error("the transfer is too recent, it can be claimed from {ready_at}")]
    TxTooRecent { ready_at: Timestamp },

    #[error("no such claim")]
    NoSuchClaim,

    #[error("this outcome is already current")]
    OutcomeAlreadyCurrent,

    #[error("the challenging period has expired")]
    ChallengingPeriodExpired,

    #[error("challenging period is still ongoing")]
    ChallengingPeriodOngoing,

    #[error("already withdrawn")]
    AlreadyWithdrawn,

    #[error("already issued")]
    AlreadyIssued,

    #[error("you are not the recipient and you didn't stake on the winning outcome or you have already withdrawn")]
    NotEligible,

    #[error("the claim is not finished yet")]
    NotFinished,

    #[error("the loss has already been accounted")]
    AlreadyAccounted,

    #[error("the staker holds a winning stake")]
    StillWinning,

    #[error("nothing was staked on the losing outcome")]
    NothingToAcknowledge,

    #[error("price unavailable: {0}")]
    PriceUnavailable(#[from] PriceError),

    #[error("invalid parameters: {0}")]
    InvalidParams(#[from] ParamsError),

    #[error("arithmetic overflow")]
    Overflow,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Coarse classification of an [`EngineError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    DuplicateClaim,
    InsufficientStake,
    State,
    Authorization,
    Infrastructure,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::TxTooRecent { .. } | Self::InvalidParams(_) => {
                ErrorKind::Validation
            }
            Self::DuplicateClaim => ErrorKind::DuplicateClaim,
            Self::InsufficientStake { .. } => ErrorKind::InsufficientStake,
            Self::NoSuchClaim
            | Self::OutcomeAlreadyCurrent
            | Self::ChallengingPeriodExpired
            | Self::ChallengingPeriodOngoing
            | Self::AlreadyWithdrawn
            | Self::AlreadyIssued
            | Self::NotFinished
            | Self::AlreadyAccounted
            | Self::StillWinning
            | Self::NothingToAcknowledge => ErrorKind::State,
            Self::NotEligible => ErrorKind::Authorization,
            Self::PriceUnavailable(_) | Self::Overflow | Self::Store(_) => {
                ErrorKind::Infrastructure
            }
        }
    }
}
