//! Response normalizer.
//!
//! Turns the raw text of a model reply into a fully-populated
//! [`DocumentAnalysis`]. Missing or mistyped fields never fail; they are
//! replaced with their defaults one field (and one sequence element) at a
//! time. Only two things fail:
//! - text that is not a JSON object after fence stripping
//! - an object carrying the model's `error` convention

mod coerce;
mod fence;

pub use coerce::coerce_number;
pub use fence::strip_code_fences;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{
    ActionItem, ActionStatus, BillLineItem, DocumentAnalysis, DocumentCategory, ExtractedEntity,
    KeyDate, Level, LineItemStatus, MedicalBillData, MetaTag, MoneyAmount, Party, RiskFlag,
    RiskSeverity,
};
use coerce::{array, enum_or, optional_text, text, text_list, text_or};

/// Characters of raw text kept for diagnostics.
pub const PREVIEW_CHARS: usize = 500;

/// Normalization errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizationError {
    #[error("model response is not valid JSON: {preview}")]
    Unparseable {
        /// First [`PREVIEW_CHARS`] characters of the raw text
        preview: String,
    },

    #[error("model rejected the input: {0}")]
    UpstreamRejected(String),
}

impl NormalizationError {
    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            NormalizationError::Unparseable { .. } => {
                "Could not parse the document clearly. Please try with a clearer photo.".into()
            }
            NormalizationError::UpstreamRejected(message) => message.clone(),
        }
    }
}

pub type NormalizationResult<T> = Result<T, NormalizationError>;

/// Normalize a raw model reply into a canonical analysis record.
pub fn normalize(raw_text: &str) -> NormalizationResult<DocumentAnalysis> {
    let stripped = strip_code_fences(raw_text);

    let value: Value = serde_json::from_str(stripped).map_err(|e| {
        let preview = preview(raw_text);
        warn!(error = %e, preview = %preview, "failed to parse model response");
        NormalizationError::Unparseable { preview }
    })?;

    let Value::Object(object) = value else {
        let preview = preview(raw_text);
        warn!(preview = %preview, "model response is JSON but not an object");
        return Err(NormalizationError::Unparseable { preview });
    };

    if let Some(message) = upstream_error(&object) {
        info!(message = %message, "model rejected the document");
        return Err(NormalizationError::UpstreamRejected(message));
    }

    Ok(build_analysis(&object))
}

/// Truncate raw text to [`PREVIEW_CHARS`] characters.
fn preview(raw_text: &str) -> String {
    raw_text.chars().take(PREVIEW_CHARS).collect()
}

/// The `error` field, when it holds a meaningful value.
fn upstream_error(object: &Map<String, Value>) -> Option<String> {
    match object.get("error")? {
        // Any string rejects, even an empty one
        Value::String(s) => Some(s.clone()),
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Object(inner) => Some(
            inner
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| Value::Object(inner.clone()).to_string()),
        ),
        other => Some(other.to_string()),
    }
}

fn build_analysis(object: &Map<String, Value>) -> DocumentAnalysis {
    let legacy_line_items = matches!(object.get("lineItems"), Some(Value::Array(_)));

    let category = match object.get("category") {
        Some(Value::String(s)) if !s.trim().is_empty() => DocumentCategory::parse(s),
        // Older replies were bill-only and carried line items at the top level
        _ if legacy_line_items => DocumentCategory::MedicalBill,
        _ => DocumentCategory::Other,
    };

    let medical_bill_data = match object.get("medicalBillData") {
        Some(data @ Value::Object(_)) => Some(bill_data(data)),
        _ if legacy_line_items => Some(bill_data_from_map(object)),
        _ => None,
    }
    .filter(|_| {
        let keep = category.is_medical_bill();
        if !keep {
            debug!(category = %category, "dropping bill data for non-bill category");
        }
        keep
    });

    let mut analysis = DocumentAnalysis {
        category,
        subcategory: text(object.get("subcategory")),
        title: text(object.get("title")),
        summary: text(object.get("summary")),
        detailed_analysis: text(object.get("detailedAnalysis")),
        entities: array(object.get("entities")).iter().map(entity).collect(),
        meta_tags: array(object.get("metaTags")).iter().map(meta_tag).collect(),
        dates: array(object.get("dates")).iter().map(key_date).collect(),
        amounts: array(object.get("amounts")).iter().map(amount).collect(),
        parties: array(object.get("parties")).iter().map(party).collect(),
        key_findings: text_list(object.get("keyFindings")),
        risk_flags: array(object.get("riskFlags")).iter().map(risk_flag).collect(),
        action_items: array(object.get("actionItems")).iter().map(action_item).collect(),
        legal_references: text_list(object.get("legalReferences")),
        medical_bill_data,
        confidence: enum_or(object.get("confidence"), Level::Medium),
    };

    if legacy_line_items {
        fill_legacy_bill_fields(&mut analysis, object);
    }

    analysis
}

fn entity(value: &Value) -> ExtractedEntity {
    ExtractedEntity {
        label: text(value.get("label")),
        value: text(value.get("value")),
        confidence: enum_or(value.get("confidence"), Level::Medium),
    }
}

fn meta_tag(value: &Value) -> MetaTag {
    MetaTag {
        key: text(value.get("key")),
        value: text(value.get("value")),
        category: text_or(value.get("category"), "general"),
    }
}

fn key_date(value: &Value) -> KeyDate {
    KeyDate {
        label: text(value.get("label")),
        date: text(value.get("date")),
    }
}

fn amount(value: &Value) -> MoneyAmount {
    MoneyAmount {
        label: text(value.get("label")),
        amount: coerce_number(value.get("amount")),
        currency: text_or(value.get("currency"), "USD"),
    }
}

fn party(value: &Value) -> Party {
    Party {
        role: text(value.get("role")),
        name: text(value.get("name")),
        details: text(value.get("details")),
    }
}

fn risk_flag(value: &Value) -> RiskFlag {
    RiskFlag {
        issue: text(value.get("issue")),
        severity: enum_or(value.get("severity"), RiskSeverity::Info),
        explanation: text(value.get("explanation")),
        regulation: optional_text(value.get("regulation")),
    }
}

fn action_item(value: &Value) -> ActionItem {
    ActionItem {
        action: text(value.get("action")),
        deadline: optional_text(value.get("deadline")),
        priority: enum_or(value.get("priority"), Level::Medium),
        // Completion is tracked by the user, never by the model
        status: ActionStatus::Pending,
    }
}

fn bill_data(value: &Value) -> MedicalBillData {
    match value {
        Value::Object(map) => bill_data_from_map(map),
        _ => MedicalBillData::default(),
    }
}

fn bill_data_from_map(map: &Map<String, Value>) -> MedicalBillData {
    MedicalBillData {
        line_items: array(map.get("lineItems")).iter().map(line_item).collect(),
        total_billed: coerce_number(map.get("totalBilled")),
        total_fair_price: coerce_number(map.get("totalFairPrice")),
        total_savings: coerce_number(map.get("totalSavings")),
    }
}

fn line_item(value: &Value) -> BillLineItem {
    BillLineItem {
        code: text_or(value.get("code"), "N/A"),
        description: text(value.get("description")),
        billed_amount: coerce_number(value.get("billedAmount")),
        status: enum_or(value.get("status"), LineItemStatus::Ok),
        issue: optional_text(value.get("issue")),
        fair_price: coerce_number(value.get("fairPrice")),
        savings: coerce_number(value.get("savings")),
        severity: enum_or(value.get("severity"), Level::Low),
        regulation: text(value.get("regulation")),
    }
}

/// Map the bill-only reply fields (`provider`, `billType`, `dateOfService`)
/// onto the general record where the general fields were left empty.
fn fill_legacy_bill_fields(analysis: &mut DocumentAnalysis, object: &Map<String, Value>) {
    let bill_type = text_or(object.get("billType"), "Medical Bill");
    if analysis.subcategory.is_empty() {
        analysis.subcategory = bill_type.clone();
    }
    if analysis.title.is_empty() {
        analysis.title = bill_type;
    }

    if analysis.parties.is_empty() {
        if let Some(provider) = optional_text(object.get("provider")) {
            analysis.parties.push(Party {
                role: "Provider".into(),
                name: provider,
                details: String::new(),
            });
        }
    }

    if analysis.dates.is_empty() {
        if let Some(date) = optional_text(object.get("dateOfService")) {
            analysis.dates.push(KeyDate {
                label: "Date of Service".into(),
                date,
            });
        }
    }
}
