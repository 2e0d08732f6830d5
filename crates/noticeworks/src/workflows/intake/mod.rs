//! Guided data collection for possession cases.
//!
//! A question set declares what to ask, in what order, and which facts each
//! answer feeds; the wizard walks it deterministically, validating answers
//! and clearing stale dependent facts whenever an earlier answer changes.
//! The ledger importer short-circuits the arrears questions from a CSV rent
//! ledger.

pub(crate) mod answers;
pub mod definition;
pub mod ledger;
pub mod loader;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use answers::AnswerError;
pub use definition::{
    QuestionDefinition, QuestionId, QuestionKind, QuestionSection, QuestionSet,
};
pub use ledger::{parse_ledger, LedgerError, RentLedgerSummary};
pub use loader::QuestionSetLoader;
pub use wizard::{
    apply_answer, is_complete, next_question, progress, section_complete, AnswerReceipt,
    WizardProgress, WizardState,
};
