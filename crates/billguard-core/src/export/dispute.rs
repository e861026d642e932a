//! Dispute letter generation for flagged bill charges.

use serde::{Deserialize, Serialize};

use super::{format_money, sanitize_file_stem};
use crate::models::{BillLineItem, DocumentAnalysis};

const NAME_PLACEHOLDER: &str = "[YOUR NAME]";
const ACCOUNT_PLACEHOLDER: &str = "[ACCOUNT NUMBER]";
const PROVIDER_PLACEHOLDER: &str = "[PROVIDER NAME]";

/// Optional personal details for the letter; placeholders are used when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisputeRequest {
    pub patient_name: Option<String>,
    pub account_number: Option<String>,
}

/// A generated dispute letter. Kept apart from the analysis it was built from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DisputeLetter {
    pub provider: String,
    pub disputed_items: usize,
    pub disputed_total: f64,
    pub text: String,
}

impl DisputeLetter {
    /// Build a letter for the flagged line items of a bill.
    ///
    /// Returns `None` when the analysis has no bill data or nothing is flagged.
    pub fn generate(analysis: &DocumentAnalysis, request: &DisputeRequest) -> Option<Self> {
        let bill = analysis.medical_bill_data.as_ref()?;
        let flagged = bill.flagged_items();
        if flagged.is_empty() {
            return None;
        }

        let name = non_empty(request.patient_name.as_deref()).unwrap_or(NAME_PLACEHOLDER);
        let account = non_empty(request.account_number.as_deref()).unwrap_or(ACCOUNT_PLACEHOLDER);
        let provider = provider_name(analysis);
        let date_of_service = analysis
            .dates
            .iter()
            .find(|d| d.label.to_lowercase().contains("service"))
            .map(|d| d.date.as_str())
            .unwrap_or("Not visible");
        let disputed_total: f64 = flagged.iter().map(|item| item.savings).sum();

        let mut text = String::new();
        text.push_str(&format!("{}\n", name));
        text.push_str(&format!("Account Number: {}\n", account));
        text.push_str(&format!(
            "Date: {}\n\n",
            chrono::Utc::now().format("%B %-d, %Y")
        ));
        text.push_str(&format!("Billing Department\n{}\n\n", provider));
        text.push_str(&format!(
            "RE: Formal Dispute of Charges, Account {}\nDate of Service: {}\n\n",
            account, date_of_service
        ));
        text.push_str("Dear Billing Department,\n\n");
        text.push_str(&format!(
            "I am writing to formally dispute {} charge{} on my bill totaling {}. \
Based on a review of the itemized charges, these items appear to be billed in error, \
representing {} in potential overcharges.\n\n",
            flagged.len(),
            if flagged.len() == 1 { "" } else { "s" },
            format_money(bill.total_billed),
            format_money(disputed_total)
        ));

        text.push_str("DISPUTED CHARGES\n\n");
        for (i, item) in flagged.iter().enumerate() {
            text.push_str(&disputed_item(i + 1, item));
        }

        text.push_str("I request that you:\n");
        text.push_str("1. Provide a fully itemized bill with CPT/HCPCS codes for every charge.\n");
        text.push_str("2. Review and correct the charges listed above.\n");
        text.push_str(
            "3. Suspend collection activity on the disputed amount while this review is pending.\n\n",
        );
        text.push_str(
            "Please respond in writing within 30 days. I reserve all rights under applicable \
federal and state law, including the No Surprises Act.\n\n",
        );
        text.push_str(&format!("Sincerely,\n\n{}\n", name));

        Some(Self {
            provider,
            disputed_items: flagged.len(),
            disputed_total,
            text,
        })
    }

    /// File name for the letter, e.g. `BillGuard-Dispute-Mercy-General.txt`.
    pub fn file_name(&self) -> String {
        letter_file_name(&self.provider)
    }
}

/// File name for a dispute letter addressed to `provider`.
///
/// The provider name comes from model output, so only ASCII alphanumeric
/// runs survive, joined with `-`.
pub fn letter_file_name(provider: &str) -> String {
    let words: Vec<&str> = provider
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect();
    let stem = if words.is_empty() {
        "Provider".to_string()
    } else {
        sanitize_file_stem(&words.join("-"), 40)
    };
    format!("BillGuard-Dispute-{}.txt", stem)
}

fn disputed_item(number: usize, item: &BillLineItem) -> String {
    let mut block = format!("{}. {} - {}\n", number, item.code, item.description);
    block.push_str(&format!(
        "   Billed: {} | Fair price: {} | Difference: {}\n",
        format_money(item.billed_amount),
        format_money(item.fair_price),
        format_money(item.savings)
    ));
    let status = item.status.as_str().replace('_', " ").to_uppercase();
    match &item.issue {
        Some(issue) => block.push_str(&format!("   Reason: {}: {}\n", status, issue)),
        None => block.push_str(&format!("   Reason: {}\n", status)),
    }
    if !item.regulation.is_empty() {
        block.push_str(&format!("   Reference: {}\n", item.regulation));
    }
    block.push('\n');
    block
}

/// The provider party, falling back to the first party, then a placeholder.
fn provider_name(analysis: &DocumentAnalysis) -> String {
    analysis
        .parties
        .iter()
        .find(|p| p.role.to_lowercase().contains("provider"))
        .or_else(|| analysis.parties.first())
        .and_then(|p| non_empty(Some(p.name.as_str())))
        .unwrap_or(PROVIDER_PLACEHOLDER)
        .to_string()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
