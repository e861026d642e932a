//! The canonical analysis record produced by the normalizer.

use serde::{Deserialize, Serialize};

use super::enums::{ActionStatus, DocumentCategory, Level, LineItemStatus, RiskSeverity};

/// Fully-populated analysis of one document.
///
/// Every field is present after normalization; optional data is modelled
/// with `Option` rather than left missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentAnalysis {
    // Classification
    pub category: DocumentCategory,
    pub subcategory: String,
    pub title: String,
    pub summary: String,
    pub detailed_analysis: String,

    // Extracted data
    pub entities: Vec<ExtractedEntity>,
    pub meta_tags: Vec<MetaTag>,
    pub dates: Vec<KeyDate>,
    pub amounts: Vec<MoneyAmount>,
    pub parties: Vec<Party>,

    // Intelligence
    pub key_findings: Vec<String>,
    pub risk_flags: Vec<RiskFlag>,
    pub action_items: Vec<ActionItem>,
    pub legal_references: Vec<String>,

    /// Line-item audit, only for medical bill categories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_bill_data: Option<MedicalBillData>,

    pub confidence: Level,
}

/// A labelled value pulled out of the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExtractedEntity {
    pub label: String,
    pub value: String,
    pub confidence: Level,
}

/// Free-form key/value tag with a grouping category.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetaTag {
    pub key: String,
    pub value: String,
    pub category: String,
}

/// A date mentioned in the document (kept as free text).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KeyDate {
    pub label: String,
    pub date: String,
}

/// A monetary amount mentioned in the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MoneyAmount {
    pub label: String,
    pub amount: f64,
    pub currency: String,
}

/// A person or organisation involved in the document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Party {
    pub role: String,
    pub name: String,
    pub details: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RiskFlag {
    pub issue: String,
    pub severity: RiskSeverity,
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulation: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActionItem {
    pub action: String,
    pub deadline: Option<String>,
    pub priority: Level,
    pub status: ActionStatus,
}

/// Line-item audit of a medical bill.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalBillData {
    pub line_items: Vec<BillLineItem>,
    pub total_billed: f64,
    pub total_fair_price: f64,
    pub total_savings: f64,
}

/// One charge on a medical bill with its audit verdict.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BillLineItem {
    /// CPT/HCPCS/revenue code
    pub code: String,
    pub description: String,
    pub billed_amount: f64,
    pub status: LineItemStatus,
    pub issue: Option<String>,
    pub fair_price: f64,
    pub savings: f64,
    pub severity: Level,
    pub regulation: String,
}

impl MedicalBillData {
    /// Line items whose status is anything but `ok`.
    pub fn flagged_items(&self) -> Vec<&BillLineItem> {
        self.line_items
            .iter()
            .filter(|item| item.status.is_flagged())
            .collect()
    }

    /// Line items marked `ok`.
    pub fn ok_items(&self) -> Vec<&BillLineItem> {
        self.line_items
            .iter()
            .filter(|item| !item.status.is_flagged())
            .collect()
    }

    /// Savings as a whole percentage of the billed total (0 when nothing billed).
    pub fn savings_percent(&self) -> i64 {
        if self.total_billed > 0.0 {
            ((self.total_savings / self.total_billed) * 100.0).round() as i64
        } else {
            0
        }
    }
}

impl DocumentAnalysis {
    /// Lower-cased text used for library search.
    pub fn searchable_text(&self) -> String {
        let mut parts: Vec<String> = vec![
            self.title.clone(),
            self.summary.clone(),
            self.category.as_str().to_string(),
            self.subcategory.clone(),
            self.detailed_analysis.clone(),
        ];
        parts.extend(self.key_findings.iter().cloned());
        parts.extend(self.entities.iter().map(|e| format!("{} {}", e.label, e.value)));
        parts.extend(self.meta_tags.iter().map(|t| format!("{} {}", t.key, t.value)));
        parts.extend(
            self.parties
                .iter()
                .map(|p| format!("{} {} {}", p.role, p.name, p.details)),
        );
        parts.extend(self.risk_flags.iter().map(|r| r.issue.clone()));
        parts.extend(self.action_items.iter().map(|a| a.action.clone()));
        parts.extend(self.legal_references.iter().cloned());

        parts.join(" ").to_lowercase()
    }

    /// Number of flagged bill lines, zero when there is no bill data.
    pub fn overcharge_count(&self) -> usize {
        self.medical_bill_data
            .as_ref()
            .map(|data| data.flagged_items().len())
            .unwrap_or(0)
    }
}
