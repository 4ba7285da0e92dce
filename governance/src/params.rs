//! Bounds applied to new proposals.

use crate::error::GovernanceError;
use crate::proposal::ProposalRequest;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_DURATION_SECS: u64 = 86_400;
pub const DEFAULT_MAX_DURATION_SECS: u64 = 1_209_600;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceParams {
    pub min_duration_secs: u64,
    pub max_duration_secs: u64,
}

impl Default for GovernanceParams {
    fn default() -> Self {
        Self {
            min_duration_secs: DEFAULT_MIN_DURATION_SECS,
            max_duration_secs: DEFAULT_MAX_DURATION_SECS,
        }
    }
}

impl GovernanceParams {
    pub fn validate(&self) -> Result<(), GovernanceError> {
        if self.min_duration_secs > self.max_duration_secs {
            return Err(GovernanceError::InvalidParameters(format!(
                "minimum duration {} exceeds maximum {}",
                self.min_duration_secs, self.max_duration_secs
            )));
        }
        Ok(())
    }

    /// Check a request against the duration bounds, quorum and threshold
    /// ranges.
    pub fn check_request(&self, request: &ProposalRequest) -> Result<(), GovernanceError> {
        let duration = request.duration_secs;
        if duration < self.min_duration_secs || duration > self.max_duration_secs {
            return Err(GovernanceError::InvalidParameters(format!(
                "duration {duration}s outside {}..={}",
                self.min_duration_secs, self.max_duration_secs
            )));
        }
        if request.min_voters == 0 {
            return Err(GovernanceError::InvalidParameters(
                "min_voters must be greater than zero".into(),
            ));
        }
        if request.min_percentage == 0 || request.min_percentage > 100 {
            return Err(GovernanceError::InvalidParameters(format!(
                "min_percentage {} outside 1..=100",
                request.min_percentage
            )));
        }
        Ok(())
    }
}
