//! Golden tests for the response normalizer.
//!
//! Each case is a raw model reply as it arrives from the hosted model.

use billguard_core::models::{DocumentCategory, Level, LineItemStatus, RiskSeverity};
use billguard_core::{normalize, NormalizationError};

/// Reply text and the fields we expect after normalization.
struct GoldenCase {
    id: &'static str,
    raw: &'static str,
    expected_category: DocumentCategory,
    expected_title: &'static str,
    expected_line_items: Option<usize>,
    expected_total_savings: Option<f64>,
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "fenced-medical-bill",
            raw: "```json\n{\"category\":\"medical_bill\",\"medicalBillData\":{\"lineItems\":[{\"code\":\"99285\",\"billedAmount\":4850}],\"totalBilled\":4850,\"totalFairPrice\":1200,\"totalSavings\":3650}}\n```",
            expected_category: DocumentCategory::MedicalBill,
            expected_title: "",
            expected_line_items: Some(1),
            expected_total_savings: Some(3650.0),
        },
        GoldenCase {
            id: "unfenced-lease",
            raw: r#"{"category":"real_estate","title":"Apartment Lease","summary":"12 month lease."}"#,
            expected_category: DocumentCategory::RealEstate,
            expected_title: "Apartment Lease",
            expected_line_items: None,
            expected_total_savings: None,
        },
        GoldenCase {
            id: "eob-with-bill-data",
            raw: "```\n{\"category\":\"insurance_eob\",\"title\":\"Aetna EOB\",\"medicalBillData\":{\"lineItems\":[],\"totalSavings\":\"1,200.00\"}}\n```",
            expected_category: DocumentCategory::InsuranceEob,
            expected_title: "Aetna EOB",
            expected_line_items: Some(0),
            expected_total_savings: Some(1200.0),
        },
        GoldenCase {
            id: "bill-data-on-invoice-dropped",
            raw: r#"{"category":"invoice","title":"Plumber","medicalBillData":{"lineItems":[{"code":"X"}]}}"#,
            expected_category: DocumentCategory::Invoice,
            expected_title: "Plumber",
            expected_line_items: None,
            expected_total_savings: None,
        },
        GoldenCase {
            id: "legacy-flat-bill",
            raw: r#"{"billType":"ER Visit","provider":"Mercy General","lineItems":[{"code":"99285","billedAmount":"4,850"}],"totalBilled":4850,"totalSavings":3650}"#,
            expected_category: DocumentCategory::MedicalBill,
            expected_title: "ER Visit",
            expected_line_items: Some(1),
            expected_total_savings: Some(3650.0),
        },
        GoldenCase {
            id: "preamble-before-fence",
            raw: "Here is the analysis:\n```json\n{\"category\":\"tax_document\",\"title\":\"W-2\"}\n```",
            expected_category: DocumentCategory::TaxDocument,
            expected_title: "W-2",
            expected_line_items: None,
            expected_total_savings: None,
        },
        GoldenCase {
            id: "commentary-after-fence",
            raw: "```json\n{\"category\":\"receipt\",\"title\":\"A\"}\n```\nNote: wrap code in ``` fences.",
            expected_category: DocumentCategory::Receipt,
            expected_title: "A",
            expected_line_items: None,
            expected_total_savings: None,
        },
    ]
}

#[test]
fn test_golden_cases() {
    for case in get_golden_cases() {
        let analysis = normalize(case.raw)
            .unwrap_or_else(|e| panic!("Case {}: unexpected error {:?}", case.id, e));

        assert_eq!(
            analysis.category, case.expected_category,
            "Case {}: category mismatch", case.id
        );
        assert_eq!(
            analysis.title, case.expected_title,
            "Case {}: title mismatch", case.id
        );
        assert_eq!(
            analysis.medical_bill_data.as_ref().map(|b| b.line_items.len()),
            case.expected_line_items,
            "Case {}: line item count mismatch", case.id
        );
        assert_eq!(
            analysis.medical_bill_data.as_ref().map(|b| b.total_savings),
            case.expected_total_savings,
            "Case {}: total savings mismatch", case.id
        );
    }
}

#[test]
fn test_fenced_medical_bill_defaults() {
    let raw = "```json\n{\"category\":\"medical_bill\",\"medicalBillData\":{\"lineItems\":[{\"code\":\"99285\",\"billedAmount\":4850}],\"totalBilled\":4850,\"totalFairPrice\":1200,\"totalSavings\":3650}}\n```";
    let analysis = normalize(raw).unwrap();

    assert_eq!(analysis.category.as_str(), "medical_bill");
    assert_eq!(analysis.confidence, Level::Medium);

    let bill = analysis.medical_bill_data.unwrap();
    let item = &bill.line_items[0];
    assert_eq!(item.code, "99285");
    assert_eq!(item.billed_amount, 4850.0);
    assert_eq!(item.status, LineItemStatus::Ok);
    assert_eq!(item.fair_price, 0.0);
    assert_eq!(bill.total_billed, 4850.0);
    assert_eq!(bill.total_fair_price, 1200.0);
    assert_eq!(bill.total_savings, 3650.0);
}

#[test]
fn test_upstream_rejection() {
    let err = normalize(r#"{"error":"This does not appear to be a document."}"#).unwrap_err();
    assert_eq!(
        err,
        NormalizationError::UpstreamRejected("This does not appear to be a document.".into())
    );
    assert_eq!(err.user_message(), "This does not appear to be a document.");
}

#[test]
fn test_rejection_wins_over_other_fields() {
    let raw = r#"{"category":"medical_bill","title":"Bill","error":"Image too blurry."}"#;
    assert_eq!(
        normalize(raw).unwrap_err(),
        NormalizationError::UpstreamRejected("Image too blurry.".into())
    );
}

#[test]
fn test_empty_error_string_still_rejects() {
    assert_eq!(
        normalize(r#"{"title":"Bill","error":""}"#).unwrap_err(),
        NormalizationError::UpstreamRejected(String::new())
    );
}

#[test]
fn test_not_json_at_all() {
    let err = normalize("not json at all").unwrap_err();
    match &err {
        NormalizationError::Unparseable { preview } => assert_eq!(preview, "not json at all"),
        other => panic!("expected Unparseable, got {:?}", other),
    }
    assert_eq!(
        err.user_message(),
        "Could not parse the document clearly. Please try with a clearer photo."
    );
}

#[test]
fn test_numeric_coercion_per_line_item() {
    let raw = r#"{"category":"medical_bill","medicalBillData":{"lineItems":[
        {"code":"A","billedAmount":"150.5"},
        {"code":"B","billedAmount":"abc"}
    ]}}"#;
    let bill = normalize(raw).unwrap().medical_bill_data.unwrap();

    assert_eq!(bill.line_items[0].billed_amount, 150.5);
    assert_eq!(bill.line_items[1].billed_amount, 0.0);
}

#[test]
fn test_risk_flag_severity_defaults_to_info() {
    let analysis = normalize(r#"{"riskFlags":[{"issue":"X"}]}"#).unwrap();

    assert_eq!(analysis.risk_flags.len(), 1);
    assert_eq!(analysis.risk_flags[0].issue, "X");
    assert_eq!(analysis.risk_flags[0].severity, RiskSeverity::Info);
    assert_eq!(analysis.risk_flags[0].regulation, None);
}

#[test]
fn test_normalized_json_shape() {
    let analysis = normalize(r#"{"actionItems":[{"action":"Call insurer","deadline":null}]}"#)
        .unwrap();
    let json = serde_json::to_value(&analysis).unwrap();

    assert_eq!(json["category"], "other");
    assert_eq!(json["confidence"], "medium");
    assert_eq!(json["actionItems"][0]["priority"], "medium");
    assert_eq!(json["actionItems"][0]["status"], "pending");
    assert!(json["actionItems"][0]["deadline"].is_null());
    assert!(json.get("medicalBillData").is_none());
}
