//! End-to-end tests of the analysis pass on hand-built tables.

mod common;

use std::sync::Arc;

use analytica::prelude::*;
use arrow::array::{ArrayRef, Float64Array, StringArray};
use common::{daily_dates, floats, ints, strings, table};

fn analyze(table: &Table) -> AnalysisResult {
    analyze_table(table, &AnalysisRequest::new("test.csv")).unwrap()
}

#[test]
fn test_sales_scenario() {
    let dates = daily_dates(10);
    let dates: Vec<&str> = dates.iter().map(String::as_str).collect();
    let revenue: Vec<i64> = (0..10).map(|i| 100 + 10 * i).collect();
    let input = table(vec![("sale_date", strings(&dates)), ("revenue", ints(&revenue))]);

    let result = analyze(&input);

    assert_eq!(
        result.column("sale_date").unwrap().inferred_semantic,
        Some(SemanticTag::Datetime)
    );
    assert_eq!(
        result.column("revenue").unwrap().inferred_semantic,
        Some(SemanticTag::CurrencyLike)
    );
    assert_eq!(result.trends.len(), 1);
    let trend = &result.trends[0];
    assert_eq!(trend.column, "revenue");
    assert_eq!(trend.direction, TrendDirection::Up);
    assert!((trend.r2 - 1.0).abs() < 1e-9);
    // 10 per day, on an axis in seconds
    assert!((trend.slope - 10.0 / 86_400.0).abs() < 1e-12);

    assert_eq!(
        result.insights,
        vec![
            "Loaded 10 rows × 2 columns.".to_string(),
            "High variability in 'revenue'.".to_string(),
            "Increasing trend in 'revenue' (R²=1.00).".to_string(),
        ]
    );
}

#[test]
fn test_caller_table_is_not_mutated() {
    let dates = daily_dates(6);
    let dates: Vec<&str> = dates.iter().map(String::as_str).collect();
    let input = table(vec![
        ("order_date", strings(&dates)),
        ("units", ints(&[1, 2, 3, 4, 5, 6])),
    ]);
    let before = input.clone();

    let result = analyze(&input);
    assert!(result.columns[0].dtype.starts_with("Timestamp"));
    assert_eq!(input, before);
    assert_eq!(input.column(0).kind(), ColumnKind::Text);
}

#[test]
fn test_constant_column() {
    let input = table(vec![("x", floats(&[Some(5.0); 10]))]);
    let result = analyze(&input);

    assert_eq!(result.numeric_stats["x"].std, Some(0.0));
    assert!(result.trends.is_empty());
    assert_eq!(result.correlations["x"]["x"], 0.0);
    // zero variance is not "high variability"
    assert_eq!(result.insights, vec!["Loaded 10 rows × 1 columns."]);

    let single = table(vec![("x", floats(&[Some(5.0)]))]);
    let result = analyze(&single);
    assert_eq!(result.numeric_stats["x"].count, 1);
    assert_eq!(result.numeric_stats["x"].std, Some(0.0));
}

#[test]
fn test_identifier_can_trend() {
    let n = 30;
    let ids: Vec<i64> = (1..=n).collect();
    // deterministic pseudo-random scores
    let scores: Vec<Option<f64>> = (0..n)
        .map(|i| Some(((i * 7919) % 101) as f64 / 10.0))
        .collect();
    let input = table(vec![("user_id", ints(&ids)), ("user_score", floats(&scores))]);

    let result = analyze(&input);
    assert_eq!(
        result.column("user_id").unwrap().inferred_semantic,
        Some(SemanticTag::Identifier)
    );
    assert_eq!(
        result.column("user_score").unwrap().inferred_semantic,
        Some(SemanticTag::Numeric)
    );
    let trend = result
        .trends
        .iter()
        .find(|t| t.column == "user_id")
        .expect("identifier column should trend");
    assert_eq!(trend.direction, TrendDirection::Up);
    assert!((trend.slope - 1.0).abs() < 1e-9);
}

#[test]
fn test_empty_table() {
    let input = table(vec![
        ("a", floats(&[])),
        ("b", strings(&[])),
        ("c", ints(&[])),
    ]);
    let result = analyze(&input);

    assert_eq!(result.meta.rows, 0);
    assert_eq!(result.meta.cols, 3);
    assert!(result.missing.is_empty());
    assert!(result.numeric_stats.is_empty());
    assert!(result.correlations.is_empty());
    assert!(result.trends.is_empty());
    assert!(result.preview.is_empty());
    assert_eq!(result.insights, vec!["Loaded 0 rows × 3 columns."]);
}

#[test]
fn test_trend_ranking_by_score() {
    // both perfectly linear, scores 0.6 and 0.3
    let low: Vec<Option<f64>> = (0..10).map(|i| Some(0.3 * i as f64)).collect();
    let high: Vec<Option<f64>> = (0..10).map(|i| Some(0.6 * i as f64)).collect();
    let input = table(vec![("low", floats(&low)), ("high", floats(&high))]);

    let result = analyze(&input);
    let names: Vec<&str> = result.trends.iter().map(|t| t.column.as_str()).collect();
    assert_eq!(names, vec!["high", "low"]);
    assert!((result.trends[0].score() - 0.6).abs() < 1e-9);
    assert!((result.trends[1].score() - 0.3).abs() < 1e-9);
}

#[test]
fn test_datetime_axis_uses_joint_mask() {
    // y = 2 * day with holes in y; a positional slice of x would pair
    // y values with the wrong days and break the perfect fit
    let dates = daily_dates(10);
    let dates: Vec<&str> = dates.iter().map(String::as_str).collect();
    let y: Vec<Option<f64>> = (0..10)
        .map(|d| if d == 2 || d == 5 { None } else { Some(2.0 * d as f64) })
        .collect();
    let input = table(vec![("sale_date", strings(&dates)), ("level", floats(&y))]);

    let result = analyze(&input);
    assert_eq!(result.trends.len(), 1);
    let trend = &result.trends[0];
    assert!((trend.r2 - 1.0).abs() < 1e-9);
    assert!((trend.slope - 2.0 / 86_400.0).abs() < 1e-15);
}

#[test]
fn test_unparseable_axis_rows_are_dropped() {
    let dates = vec![
        "2024-01-01",
        "2024-01-02",
        "not a date",
        "2024-01-04",
        "2024-01-05",
        "2024-01-06",
        "2024-01-07",
    ];
    let y: Vec<Option<f64>> = vec![
        Some(1.0),
        Some(2.0),
        Some(1000.0),
        Some(4.0),
        Some(5.0),
        Some(6.0),
        Some(7.0),
    ];
    let input = table(vec![("event_time", strings(&dates)), ("value", floats(&y))]);

    let result = analyze(&input);
    // partially parsed column is still coerced; the failed row is missing
    assert!(result.columns[0].dtype.starts_with("Timestamp"));
    assert_eq!(result.missing["event_time"], 1);
    assert_eq!(result.trends.len(), 1);
    assert!((result.trends[0].r2 - 1.0).abs() < 1e-9);
}

#[test]
fn test_failed_coercion_keeps_text_column() {
    let input = table(vec![
        ("start_time", strings(&["soon", "later", "never"])),
        ("n", ints(&[1, 2, 3])),
    ]);
    let result = analyze(&input);

    assert_eq!(result.columns[0].dtype, "Utf8");
    assert_eq!(
        result.columns[0].inferred_semantic,
        Some(SemanticTag::Categorical)
    );
}

#[test]
fn test_idempotence() {
    let dates = daily_dates(12);
    let dates: Vec<&str> = dates.iter().map(String::as_str).collect();
    let a: Vec<Option<f64>> = (0..12).map(|i| Some((i * i) as f64)).collect();
    let b: Vec<Option<f64>> = (0..12)
        .map(|i| if i % 4 == 0 { None } else { Some(50.0 - i as f64) })
        .collect();
    let input = table(vec![
        ("day_date", strings(&dates)),
        ("a", floats(&a)),
        ("b", floats(&b)),
        ("tag", strings(&["x", "y", "z", "x", "y", "z", "x", "y", "z", "x", "y", "z"])),
    ]);

    let analyzer = TableAnalyzer::builder().build().unwrap();
    let request = AnalysisRequest::new("same.csv");
    let first = analyzer.analyze(&input, &request).unwrap();
    let second = analyzer.analyze(&input, &request).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.to_json_pretty().unwrap(), second.to_json_pretty().unwrap());
}

#[test]
fn test_correlation_insight_and_matrix() {
    let x: Vec<Option<f64>> = (0..8).map(|i| Some(i as f64)).collect();
    let y: Vec<Option<f64>> = (0..8).map(|i| Some(-3.0 * i as f64 + 1.0)).collect();
    let input = table(vec![("x", floats(&x)), ("y", floats(&y))]);

    let result = analyze(&input);
    assert!((result.correlations["x"]["y"] + 1.0).abs() < 1e-12);
    assert_eq!(result.correlations["x"]["y"], result.correlations["y"]["x"]);
    assert_eq!(
        result.insights.last().unwrap(),
        "Strongest Pearson correlation: y ↔ x (ρ=-1.00)."
    );
}

#[test]
fn test_custom_thresholds() {
    let noisy: Vec<Option<f64>> = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0]
        .iter()
        .map(|v| Some(*v))
        .collect();
    let input = table(vec![("signal", floats(&noisy))]);

    assert!(analyze(&input).trends.is_empty());

    let config = AnalysisConfig::builder().min_trend_r2(0.0).build();
    let analyzer = TableAnalyzer::with_config(config).unwrap();
    let result = analyzer
        .analyze(&input, &AnalysisRequest::new("signal.csv"))
        .unwrap();
    assert_eq!(result.trends.len(), 1);
}

#[test]
fn test_json_shape() {
    let input = table(vec![
        ("city", Arc::new(StringArray::from(vec![Some("Oslo"), None])) as ArrayRef),
        (
            "temp",
            Arc::new(Float64Array::from(vec![Some(1.5), Some(f64::NAN)])) as ArrayRef,
        ),
    ]);
    let result = analyze(&input);
    let json: serde_json::Value = serde_json::from_str(&result.to_json_pretty().unwrap()).unwrap();

    assert_eq!(json["meta"]["filename"], "test.csv");
    assert_eq!(json["columns"][0]["inferred_semantic"], "categorical");
    assert_eq!(json["columns"][1]["dtype"], "Float64");
    assert_eq!(json["preview"][1]["city"], serde_json::Value::Null);
    assert_eq!(json["preview"][1]["temp"], serde_json::Value::Null);
    assert_eq!(json["missing"]["temp"], 1);
    assert_eq!(json["numeric_stats"]["temp"]["count"], 1);
    assert_eq!(json["numeric_stats"]["temp"]["std"], 0.0);

    let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
    assert_eq!(keys.len(), 8);

    let roundtrip: AnalysisResult = serde_json::from_value(json).unwrap();
    assert_eq!(roundtrip, result);
}

#[test]
fn test_zero_columns_rejected() {
    let empty: Vec<(&str, ArrayRef)> = Vec::new();
    let err = Table::from_columns(empty).unwrap_err();
    assert!(err.is_rejection());
}
