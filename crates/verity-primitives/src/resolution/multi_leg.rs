use alloy::primitives::B256;
use serde::{Deserialize, Serialize};

use super::{ExpectedTransaction, ResolvedLeg};
use crate::{transaction::TransactionInfo, Status};

/// One leg of a two-step flow, as loaded and observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegInput {
    pub expected: ExpectedTransaction,
    /// Hash attached for this leg, if any.
    pub tx_hash: Option<B256>,
    /// Chain data for `tx_hash`. `None` until the node knows the transaction.
    pub observed: Option<TransactionInfo>,
}

impl LegInput {
    pub fn new(
        expected: ExpectedTransaction,
        tx_hash: Option<B256>,
        observed: Option<TransactionInfo>,
    ) -> Self {
        Self {
            expected,
            tx_hash,
            observed,
        }
    }

    fn into_resolved(self) -> ResolvedLeg {
        ResolvedLeg::resolve(self.expected, self.tx_hash, self.observed)
    }

    fn into_pending(self) -> ResolvedLeg {
        ResolvedLeg::pending(self.expected)
    }
}

/// Per-leg results of a multi-send flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiLegOutcome {
    /// Absent for native assets.
    pub approve: Option<ResolvedLeg>,
    /// Absent until it has a hash or the approval succeeded.
    pub disperse: Option<ResolvedLeg>,
}

impl MultiLegOutcome {
    /// Status of the flow as a whole: a failed approval fails it, otherwise the disperse
    /// leg decides once it is surfaced.
    pub fn status(&self) -> Status {
        if let Some(approve) = &self.approve {
            if approve.status == Status::Failed {
                return Status::Failed;
            }
        }
        self.disperse
            .as_ref()
            .map_or(Status::Pending, |disperse| disperse.status)
    }
}

/// Resolves an approve → disperse flow.
///
/// `approve` is `None` for native assets, which skip the approval step entirely.
/// Each leg is judged on its own transaction only. The disperse leg is surfaced
/// when it carries a hash, when there is no approve leg, or as a pending
/// expectation once the approval succeeded.
pub fn resolve_multi_leg(approve: Option<LegInput>, disperse: LegInput) -> MultiLegOutcome {
    let Some(approve) = approve else {
        return MultiLegOutcome {
            approve: None,
            disperse: Some(disperse.into_resolved()),
        };
    };

    let approve = approve.into_resolved();
    let disperse = if disperse.tx_hash.is_some() {
        Some(disperse.into_resolved())
    } else if approve.status.is_success() {
        Some(disperse.into_pending())
    } else {
        None
    };

    MultiLegOutcome {
        approve: Some(approve),
        disperse,
    }
}
