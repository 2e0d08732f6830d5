use crate::workflows::eligibility::SelectedOutcome;
use crate::workflows::intake::WizardState;
use crate::workflows::scope::{CaseType, Jurisdiction, Product};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CaseId(pub String);

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything persisted for one possession case. The wizard state carries
/// the facts and answers; the record adds identity, scope, and the outcome
/// the landlord has committed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case_id: CaseId,
    pub product: Product,
    pub jurisdiction: Jurisdiction,
    pub case_type: CaseType,
    pub wizard: WizardState,
    pub selected_outcome: Option<SelectedOutcome>,
}

impl CaseRecord {
    pub fn new(
        case_id: CaseId,
        product: Product,
        jurisdiction: Jurisdiction,
        case_type: CaseType,
    ) -> Self {
        Self {
            case_id,
            product,
            jurisdiction,
            case_type,
            wizard: WizardState::new(),
            selected_outcome: None,
        }
    }
}
