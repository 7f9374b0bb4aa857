//! Counterstake claim/challenge resolution engine.
//!
//! A claimant asserts that a transfer happened on a remote ledger, bonds a
//! stake on `yes`, and the claimed value is released immediately. Anyone may
//! then stake on the opposite outcome; once the losing side reaches the
//! challenging target the outcome flips, the target grows by
//! `counterstake_coef`, and a longer challenging period starts. After the
//! period expires the claim is locked and the winners split both sides' stakes
//! pro rata.
//!
//! This crate handles:
//! - The Claim Registry (numbering, identity-key dedup)
//! - The Stake Ledger (per-outcome, per-staker balances)
//! - Escalation, finalization and pot distribution
//! - The Price Provider and Settlement Executor seams

pub mod engine;
pub mod error;
pub mod events;
pub mod ledger;
pub mod ops;
pub mod payout;
pub mod price;
pub mod registry;
pub mod settlement;

pub use engine::ResolutionEngine;
pub use error::{EngineError, ErrorKind};
pub use events::{ClaimEvent, EventBus};
pub use ops::{
    ChallengeReceipt, ChallengeRequest, CreateClaim, CreateReceipt, FinalizeReceipt, LossReceipt,
    WithdrawReceipt,
};
pub use price::{AssetPair, FixedPrice, Price, PriceError, PriceProvider};
pub use settlement::{Asset, NoticeKind, SettlementExecutor, SettlementNotice};
