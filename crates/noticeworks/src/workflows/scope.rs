//! Keys that scope every definition and case: which product the landlord
//! bought, which jurisdiction the property sits in, and which legal route a
//! notice would travel.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Jurisdiction {
    England,
    Wales,
    Scotland,
    NorthernIreland,
}

impl Jurisdiction {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::England,
            Self::Wales,
            Self::Scotland,
            Self::NorthernIreland,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::England => "england",
            Self::Wales => "wales",
            Self::Scotland => "scotland",
            Self::NorthernIreland => "northern_ireland",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::England => "England",
            Self::Wales => "Wales",
            Self::Scotland => "Scotland",
            Self::NorthernIreland => "Northern Ireland",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    NoticeBuilder,
    CompleteEvictionPack,
}

impl Product {
    pub const fn key(self) -> &'static str {
        match self {
            Self::NoticeBuilder => "notice_builder",
            Self::CompleteEvictionPack => "complete_eviction_pack",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::NoticeBuilder => "Notice Builder",
            Self::CompleteEvictionPack => "Complete Eviction Pack",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseType {
    Eviction,
    RentArrears,
}

impl CaseType {
    pub const fn key(self) -> &'static str {
        match self {
            Self::Eviction => "eviction",
            Self::RentArrears => "rent_arrears",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Eviction => "Eviction",
            Self::RentArrears => "Rent Arrears",
        }
    }
}

/// The statutory notice routes the engine can recommend. Each maps to a
/// prescribed form the landlord ultimately serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeRoute {
    SectionEight,
    SectionTwentyOne,
    WalesSection173,
    WalesFaultNotice,
    ScotlandNoticeToLeave,
}

impl NoticeRoute {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SectionEight => "Section 8 notice seeking possession",
            Self::SectionTwentyOne => "Section 21 notice seeking possession",
            Self::WalesSection173 => "Section 173 landlord's notice",
            Self::WalesFaultNotice => "Breach of contract possession notice",
            Self::ScotlandNoticeToLeave => "Notice to Leave",
        }
    }

    pub const fn form_reference(self) -> &'static str {
        match self {
            Self::SectionEight => "Form 3",
            Self::SectionTwentyOne => "Form 6A",
            Self::WalesSection173 => "Form RHW16",
            Self::WalesFaultNotice => "Form RHW20",
            Self::ScotlandNoticeToLeave => "Notice to Leave (prescribed form)",
        }
    }
}

/// Identifies one published question set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionSetKey {
    pub product: Product,
    pub jurisdiction: Jurisdiction,
}

impl QuestionSetKey {
    pub fn identifier(&self) -> String {
        format!("questions/{}/{}", self.product.key(), self.jurisdiction.key())
    }
}

/// Identifies one published rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleSetKey {
    pub jurisdiction: Jurisdiction,
    pub case_type: CaseType,
}

impl RuleSetKey {
    pub fn identifier(&self) -> String {
        format!("rules/{}/{}", self.jurisdiction.key(), self.case_type.key())
    }
}
