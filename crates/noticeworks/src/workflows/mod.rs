//! Guided workflows for preparing possession notices.
//!
//! `intake` owns questionnaires and the wizard state machine, `eligibility`
//! owns the rule engine and the export gate, and `cases` ties both to a
//! repository and an HTTP surface. Questionnaire and rule documents are
//! versioned data, loaded through [`source::DefinitionSource`]; the compiled
//! fallbacks live in [`catalog`].

pub mod catalog;
pub mod cases;
pub mod eligibility;
pub mod intake;
pub mod scope;
pub mod source;
