//! Claim registry storage trait.

use crate::StoreError;
use counterstake_types::{Claim, ClaimId, ClaimNum};

/// Read access to claim records and the identity-key index.
pub trait ClaimStore {
    /// Get a claim by number.
    fn get_claim(&self, claim_num: ClaimNum) -> Result<Option<Claim>, StoreError>;

    /// Latest claim number registered for an identity key.
    fn claim_num_by_id(&self, claim_id: &ClaimId) -> Result<Option<ClaimNum>, StoreError>;

    /// Highest claim number assigned so far (0 when no claim exists).
    fn last_claim_num(&self) -> Result<ClaimNum, StoreError>;

    /// Numbers of all claims not yet finished, ascending.
    fn ongoing_claim_nums(&self) -> Result<Vec<ClaimNum>, StoreError>;
}
