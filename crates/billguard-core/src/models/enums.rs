//! String-backed enums for the loosely-typed fields of an analysis.
//!
//! The model is told which values to use but nothing enforces it, so every
//! enum here keeps an `Unrecognized` variant holding the value verbatim.
//! Serialization is always the plain string.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal, )+
        }
        default = $default:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// Value outside the known set, kept as supplied.
            Unrecognized(String),
        }

        impl $name {
            /// Parse a value, matching known variants case-insensitively.
            pub fn parse(value: &str) -> Self {
                match value.trim().to_ascii_lowercase().as_str() {
                    $( $value => $name::$variant, )+
                    _ => $name::Unrecognized(value.to_string()),
                }
            }

            pub fn as_str(&self) -> &str {
                match self {
                    $( $name::$variant => $value, )+
                    $name::Unrecognized(value) => value.as_str(),
                }
            }

            /// Whether the value is one of the known variants.
            pub fn is_recognized(&self) -> bool {
                !matches!(self, $name::Unrecognized(_))
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                $name::parse(&value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name::parse(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Document classification.
    pub enum DocumentCategory {
        MedicalBill => "medical_bill",
        LegalContract => "legal_contract",
        LegalNotice => "legal_notice",
        InsuranceEob => "insurance_eob",
        TaxDocument => "tax_document",
        FinancialStatement => "financial_statement",
        Invoice => "invoice",
        Receipt => "receipt",
        GovernmentForm => "government_form",
        RealEstate => "real_estate",
        Employment => "employment",
        Correspondence => "correspondence",
        Other => "other",
    }
    default = Other;
}

impl DocumentCategory {
    /// Categories that carry line-item billing data.
    pub fn is_medical_bill(&self) -> bool {
        matches!(self, DocumentCategory::MedicalBill | DocumentCategory::InsuranceEob)
    }

    /// Upper-case display label, e.g. `MEDICAL BILL`.
    pub fn label(&self) -> String {
        self.as_str().replace('_', " ").to_uppercase()
    }
}

string_enum! {
    /// Three-step scale used for confidence, priority and line-item severity.
    pub enum Level {
        High => "high",
        Medium => "medium",
        Low => "low",
    }
    default = Medium;
}

string_enum! {
    /// Risk flag severity.
    pub enum RiskSeverity {
        Critical => "critical",
        Warning => "warning",
        Info => "info",
    }
    default = Info;
}

string_enum! {
    /// User-tracked state of an action item.
    pub enum ActionStatus {
        Pending => "pending",
        Done => "done",
    }
    default = Pending;
}

string_enum! {
    /// Audit verdict for a single bill line.
    pub enum LineItemStatus {
        Ok => "ok",
        Overcharge => "overcharge",
        Duplicate => "duplicate",
        Unbundled => "unbundled",
        Suspicious => "suspicious",
    }
    default = Ok;
}

impl LineItemStatus {
    /// Anything other than `ok` counts as flagged, including unknown values.
    pub fn is_flagged(&self) -> bool {
        !matches!(self, LineItemStatus::Ok)
    }
}
