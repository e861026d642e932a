//! Plain-text document report.
//!
//! Sections follow the order of the exported PDF: overview first, then the
//! extracted data, then the bill audit and tags. Empty sections are left out.

use super::{format_money, sanitize_file_stem};
use crate::models::{AnalyzedDocument, LineItemStatus};

const RULE: &str = "------------------------------------------------------------";

const DISCLAIMER: &str = "This report was generated by BillGuard. Analysis is AI-powered and \
does not constitute legal, medical, or financial advice.";

/// Accumulates report text section by section.
struct ReportWriter {
    out: String,
}

impl ReportWriter {
    fn new() -> Self {
        Self { out: String::new() }
    }

    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn heading(&mut self, title: &str) {
        self.line(title);
        self.blank();
    }

    fn end_section(&mut self) {
        self.blank();
        self.line(RULE);
        self.blank();
    }

    fn finish(self) -> String {
        self.out
    }
}

/// Render a stored document as a plain-text report.
pub fn render_report(doc: &AnalyzedDocument) -> String {
    let analysis = &doc.analysis;
    let mut w = ReportWriter::new();

    w.line("BillGuard");
    w.line("Document Intelligence Report");
    w.line(&format!(
        "Generated: {}",
        chrono::Utc::now().format("%B %-d, %Y")
    ));
    w.line(RULE);
    w.blank();

    w.line(&analysis.title);
    w.line(&format!(
        "{} | {} | Confidence: {}",
        analysis.subcategory,
        analysis.category.label(),
        analysis.confidence
    ));
    w.blank();

    w.heading("SUMMARY");
    w.line(&analysis.summary);
    w.end_section();

    if !analysis.key_findings.is_empty() {
        w.heading("KEY FINDINGS");
        for (i, finding) in analysis.key_findings.iter().enumerate() {
            w.line(&format!("{}. {}", i + 1, finding));
        }
        w.end_section();
    }

    if !analysis.risk_flags.is_empty() {
        w.heading("RISK FLAGS");
        for flag in &analysis.risk_flags {
            w.line(&format!(
                "[{}] {}",
                flag.severity.as_str().to_uppercase(),
                flag.issue
            ));
            w.line(&flag.explanation);
            if let Some(regulation) = &flag.regulation {
                w.line(&format!("Regulation: {}", regulation));
            }
            w.blank();
        }
        w.end_section();
    }

    w.heading("DETAILED ANALYSIS");
    w.line(&analysis.detailed_analysis);
    w.end_section();

    if !analysis.amounts.is_empty() {
        w.heading("FINANCIAL DETAILS");
        for amount in &analysis.amounts {
            w.line(&format!("{}: {}", amount.label, format_money(amount.amount)));
        }
        w.end_section();
    }

    if !analysis.dates.is_empty() {
        w.heading("KEY DATES");
        for date in &analysis.dates {
            w.line(&format!("{}: {}", date.label, date.date));
        }
        w.end_section();
    }

    if !analysis.parties.is_empty() {
        w.heading("PARTIES INVOLVED");
        for party in &analysis.parties {
            w.line(&format!("{}: {}", party.role, party.name));
            if !party.details.is_empty() {
                w.line(&format!("  {}", party.details));
            }
        }
        w.end_section();
    }

    if !analysis.action_items.is_empty() {
        w.heading("ACTION ITEMS");
        for (i, item) in analysis.action_items.iter().enumerate() {
            w.line(&format!(
                "{}. [{}] {}",
                i + 1,
                item.priority.as_str().to_uppercase(),
                item.action
            ));
            if let Some(deadline) = &item.deadline {
                w.line(&format!("   Deadline: {}", deadline));
            }
        }
        w.end_section();
    }

    if !analysis.legal_references.is_empty() {
        w.heading("LEGAL REFERENCES");
        for reference in &analysis.legal_references {
            w.line(&format!("• {}", reference));
        }
        w.end_section();
    }

    if let Some(bill) = &analysis.medical_bill_data {
        w.heading("MEDICAL BILLING AUDIT");
        w.line(&format!("Total Billed: {}", format_money(bill.total_billed)));
        if bill.total_savings > 0.0 {
            w.line(&format!(
                "Potential Overcharges: {}",
                format_money(bill.total_savings)
            ));
            w.line(&format!(
                "Fair Price Estimate: {}",
                format_money(bill.total_fair_price)
            ));
        }
        w.blank();

        for item in &bill.line_items {
            w.line(&format!("{} - {}", item.code, item.description));
            w.line(&format!(
                "Billed: {} | Fair: {} | Status: {}",
                format_money(item.billed_amount),
                format_money(item.fair_price),
                item.status.as_str().to_uppercase()
            ));
            if let Some(issue) = &item.issue {
                w.line(&format!("Issue: {}", issue));
            }
            if item.status != LineItemStatus::Ok && !item.regulation.is_empty() {
                w.line(&format!("Regulation: {}", item.regulation));
            }
            w.blank();
        }
        w.end_section();
    }

    if !analysis.meta_tags.is_empty() {
        w.heading("METADATA TAGS");
        for tag in &analysis.meta_tags {
            w.line(&format!("{}: {} [{}]", tag.key, tag.value, tag.category));
        }
        w.blank();
    }

    w.line(DISCLAIMER);
    w.finish()
}

/// File name for a report, e.g. `BillGuard-ER-Visit.txt`.
pub fn report_file_name(title: &str) -> String {
    format!("BillGuard-{}.txt", sanitize_file_stem(title, 40))
}
