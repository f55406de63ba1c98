use credit_risk_core::ecl::calculate_ecl;
use credit_risk_core::{Cell, CreditRiskError, Table};
use pretty_assertions::assert_eq;

// ===========================================================================
// Helpers
// ===========================================================================

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn text(s: &str) -> Cell {
    Cell::Text(s.to_string())
}

/// Table with the columns the aggregator cares about.
fn portfolio(rows: Vec<(&str, &str, f64, i64, f64)>) -> Table {
    let columns: Vec<String> = [
        "loan_intent",
        "person_education",
        "loan_amnt",
        "loan_status",
        "loan_int_rate",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    let rows = rows
        .into_iter()
        .map(|(intent, education, amnt, status, rate)| {
            vec![
                text(intent),
                text(education),
                Cell::Number(amnt),
                Cell::Int(status),
                Cell::Number(rate),
            ]
        })
        .collect();
    Table::from_rows(columns, rows).unwrap()
}

fn by(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|s| s.to_string()).collect()
}

// ===========================================================================
// The worked example
// ===========================================================================

#[test]
fn education_segment_worked_example() {
    let table = portfolio(vec![
        ("EDUCATION", "Master", 5_000.0, 0, 10.0),
        ("EDUCATION", "Master", 15_000.0, 1, 8.0),
    ]);
    let analysis = calculate_ecl(&table, &by(&["loan_intent"])).unwrap().result;

    assert_eq!(analysis.segments.len(), 1);
    let segment = &analysis.segments[0];
    assert_eq!(segment.segment, "EDUCATION");
    assert_eq!(segment.total_loans, 2);
    assert_eq!(segment.pd, 0.5);
    // Mean rate 9% => LGD = 0.35 + 0.09 * 0.05 = 0.3545
    assert!(approx_eq(segment.lgd, 0.3545));
    assert_eq!(segment.ead, 10_000.0);
    // ECL is the exact unrounded product
    assert_eq!(segment.ecl, segment.pd * segment.lgd * segment.ead);

    let rounded = segment.rounded();
    assert_eq!(rounded.lgd, 0.3545);
    assert_eq!(rounded.ecl, 1_772.5);
}

// ===========================================================================
// Grouping semantics
// ===========================================================================

#[test]
fn k_distinct_values_give_k_segments_with_counts_summing_to_input() {
    let table = portfolio(vec![
        ("EDUCATION", "Master", 5_000.0, 0, 10.0),
        ("MEDICAL", "Bachelor", 8_000.0, 1, 11.0),
        ("VENTURE", "Master", 12_000.0, 1, 9.0),
        ("MEDICAL", "Master", 6_000.0, 0, 12.0),
        ("EDUCATION", "Bachelor", 7_000.0, 1, 8.0),
    ]);
    let analysis = calculate_ecl(&table, &by(&["loan_intent"])).unwrap().result;

    assert_eq!(analysis.segments.len(), 3);
    let total: usize = analysis.segments.iter().map(|s| s.total_loans).sum();
    assert_eq!(total, table.n_rows());
}

#[test]
fn result_is_sorted_by_ecl_descending() {
    let table = portfolio(vec![
        ("EDUCATION", "Master", 5_000.0, 1, 10.0),
        ("MEDICAL", "Master", 50_000.0, 0, 15.0),
        ("VENTURE", "Master", 20_000.0, 0, 12.0),
        ("EDUCATION", "Master", 5_000.0, 0, 10.0),
    ]);
    let analysis = calculate_ecl(&table, &by(&["loan_intent"])).unwrap().result;

    for pair in analysis.segments.windows(2) {
        assert!(pair[0].ecl >= pair[1].ecl);
    }
    assert_eq!(analysis.segments[0].segment, "MEDICAL");
}

#[test]
fn ecl_ties_keep_first_encountered_order() {
    // Identical metrics in both segments, so ECL ties exactly.
    let table = portfolio(vec![
        ("VENTURE", "Master", 5_000.0, 0, 10.0),
        ("EDUCATION", "Master", 5_000.0, 0, 10.0),
    ]);
    let analysis = calculate_ecl(&table, &by(&["loan_intent"])).unwrap().result;

    assert_eq!(analysis.segments[0].segment, "VENTURE");
    assert_eq!(analysis.segments[1].segment, "EDUCATION");
}

#[test]
fn multi_column_labels_join_in_grouping_order() {
    let table = portfolio(vec![
        ("EDUCATION", "Master", 5_000.0, 0, 10.0),
        ("EDUCATION", "Bachelor", 8_000.0, 1, 9.0),
    ]);
    let analysis = calculate_ecl(&table, &by(&["loan_intent", "person_education"]))
        .unwrap()
        .result;

    let labels: Vec<&str> = analysis
        .segments
        .iter()
        .map(|s| s.segment.as_str())
        .collect();
    assert!(labels.contains(&"EDUCATION, Master"));
    assert!(labels.contains(&"EDUCATION, Bachelor"));

    let reversed = calculate_ecl(&table, &by(&["person_education", "loan_intent"]))
        .unwrap()
        .result;
    assert!(reversed
        .segments
        .iter()
        .any(|s| s.segment == "Master, EDUCATION"));
}

// ===========================================================================
// Metric semantics
// ===========================================================================

#[test]
fn pd_is_the_empirical_default_rate() {
    let table = portfolio(vec![
        ("MEDICAL", "Master", 10_000.0, 0, 10.0),
        ("MEDICAL", "Master", 10_000.0, 1, 10.0),
        ("MEDICAL", "Master", 10_000.0, 1, 10.0),
        ("MEDICAL", "Master", 10_000.0, 1, 10.0),
    ]);
    let analysis = calculate_ecl(&table, &by(&["loan_intent"])).unwrap().result;
    let segment = &analysis.segments[0];

    assert_eq!(segment.pd, 0.25);
    assert!(segment.pd >= 0.0 && segment.pd <= 1.0);
    assert!(segment.lgd >= 0.0 && segment.lgd <= 1.0);
    assert!(segment.ead >= 0.0);
}

#[test]
fn missing_interest_rate_column_flattens_lgd_to_base() {
    let columns: Vec<String> = ["loan_intent", "loan_amnt", "loan_status"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let table = Table::from_rows(
        columns,
        vec![vec![text("EDUCATION"), Cell::Number(5_000.0), Cell::Int(0)]],
    )
    .unwrap();

    let output = calculate_ecl(&table, &by(&["loan_intent"])).unwrap();
    assert_eq!(output.result.segments[0].lgd, 0.35);
    assert!(output.warnings.iter().any(|w| w.contains("loan_int_rate")));
}

// ===========================================================================
// Error contract
// ===========================================================================

#[test]
fn missing_loan_status_is_an_error_not_a_zero_pd() {
    let columns: Vec<String> = ["loan_intent", "loan_amnt"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let table = Table::from_rows(
        columns,
        vec![vec![text("EDUCATION"), Cell::Number(5_000.0)]],
    )
    .unwrap();

    match calculate_ecl(&table, &by(&["loan_intent"])) {
        Err(CreditRiskError::RequiredColumnMissing { column }) => {
            assert_eq!(column, "loan_status");
        }
        other => panic!("expected RequiredColumnMissing, got {:?}", other.is_ok()),
    }
}

#[test]
fn missing_loan_amnt_is_an_error() {
    let columns: Vec<String> = ["loan_intent", "loan_status"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let table =
        Table::from_rows(columns, vec![vec![text("EDUCATION"), Cell::Int(0)]]).unwrap();

    assert!(matches!(
        calculate_ecl(&table, &by(&["loan_intent"])),
        Err(CreditRiskError::RequiredColumnMissing { column }) if column == "loan_amnt"
    ));
}

#[test]
fn unknown_grouping_column_is_rejected() {
    let table = portfolio(vec![("EDUCATION", "Master", 5_000.0, 0, 10.0)]);
    assert!(matches!(
        calculate_ecl(&table, &by(&["loan_purpose"])),
        Err(CreditRiskError::UnknownColumn { column }) if column == "loan_purpose"
    ));
}

#[test]
fn empty_table_and_empty_grouping_are_rejected() {
    let empty = portfolio(vec![]);
    assert!(matches!(
        calculate_ecl(&empty, &by(&["loan_intent"])),
        Err(CreditRiskError::EmptyInput(_))
    ));

    let table = portfolio(vec![("EDUCATION", "Master", 5_000.0, 0, 10.0)]);
    assert!(matches!(
        calculate_ecl(&table, &[]),
        Err(CreditRiskError::EmptyInput(_))
    ));
}
