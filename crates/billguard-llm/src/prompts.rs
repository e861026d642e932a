//! Document analysis prompts.
//!
//! The model is asked for one raw JSON object matching the analysis schema,
//! or `{"error": "..."}` when the image is not a document.

/// Instructions sent alongside every document image.
pub const ANALYSIS_PROMPT: &str = r#"You are a document intelligence analyst. Analyze this document image thoroughly.

INSTRUCTIONS:
1. Identify what kind of document this is and classify it into exactly one category:
   medical_bill, legal_contract, legal_notice, insurance_eob, tax_document,
   financial_statement, invoice, receipt, government_form, real_estate,
   employment, correspondence, other
2. Extract every named entity, date, monetary amount and party you can read
3. Summarize the document in plain English and explain what it means for the reader
4. Flag risks: unfavorable terms, deadlines, penalties, errors or potential violations
5. List concrete next steps the reader should take, with deadlines when known
6. Cite relevant laws or regulations where they apply

FOR MEDICAL BILLS AND EXPLANATIONS OF BENEFITS, ALSO AUDIT EVERY LINE ITEM FOR:
- Upcoding: service billed at higher complexity than warranted
- Duplicate charges: same service billed more than once
- Unbundling: bundled services billed separately to inflate costs
- Balance billing violations under the No Surprises Act
- Markup abuse: supply or medication charges far above Medicare rates
- Phantom charges: services unlikely to have been provided
Cite the No Surprises Act, the CMS National Correct Coding Initiative (NCCI),
the Hospital Price Transparency Rule (45 CFR 180) or Medicare fee schedules as relevant.

RESPOND IN THIS EXACT JSON FORMAT (no markdown, no backticks, just raw JSON):
{
  "category": "one of the categories above",
  "subcategory": "Specific document type, e.g. ER Visit Bill or Residential Lease",
  "title": "Short descriptive title",
  "summary": "2-3 sentence plain-English summary",
  "detailedAnalysis": "Several paragraphs of analysis",
  "entities": [{"label": "Entity type", "value": "Entity value", "confidence": "high | medium | low"}],
  "metaTags": [{"key": "Tag name", "value": "Tag value", "category": "general | financial | legal | medical | personal"}],
  "dates": [{"label": "What the date is", "date": "Date as written"}],
  "amounts": [{"label": "What the amount is", "amount": 0.00, "currency": "USD"}],
  "parties": [{"role": "Role in the document", "name": "Name", "details": "Address or other details"}],
  "keyFindings": ["Most important finding"],
  "riskFlags": [{"issue": "Short issue", "severity": "critical | warning | info", "explanation": "Why it matters", "regulation": "Citation or null"}],
  "actionItems": [{"action": "What to do", "deadline": "When, or null", "priority": "high | medium | low"}],
  "legalReferences": ["Law or regulation citation"],
  "medicalBillData": {
    "lineItems": [
      {
        "code": "CPT/HCPCS/REV code",
        "description": "Service description",
        "billedAmount": 0.00,
        "status": "ok | overcharge | duplicate | unbundled | suspicious",
        "issue": "Description of the issue if not ok, null if ok",
        "fairPrice": 0.00,
        "savings": 0.00,
        "severity": "high | medium | low",
        "regulation": "Relevant regulation citation"
      }
    ],
    "totalBilled": 0.00,
    "totalFairPrice": 0.00,
    "totalSavings": 0.00
  },
  "confidence": "high | medium | low"
}

Include "medicalBillData" only for medical_bill and insurance_eob documents.
If you cannot read the document clearly, still provide your best analysis with confidence: "low".
If the image is not a document at all, return: {"error": "This does not appear to be a document. Please upload a clear photo of a bill, contract, letter or form."}"#;

/// Build the prompt for one document, with optional context from the user.
pub fn build_analysis_prompt(user_context: Option<&str>) -> String {
    match user_context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(context) => format!(
            "{}\n\nADDITIONAL CONTEXT FROM THE USER:\n{}",
            ANALYSIS_PROMPT, context
        ),
        None => ANALYSIS_PROMPT.to_string(),
    }
}
