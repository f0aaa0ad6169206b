use super::*;

#[test]
fn no_criteria_no_clauses() {
    let compiled = compile_search_predicate(&SearchCriteria::new());
    assert!(compiled.is_empty());
    assert!(compiled.values.is_empty());
    assert_eq!(compiled.where_clause(), "");
}

#[test]
fn title_and_min_salary() {
    let criteria = SearchCriteria::new().title("eng").min_salary(50_000);

    let compiled = compile_search_predicate(&criteria);

    assert_eq!(compiled.clauses, vec!["title ILIKE $1", "salary >= $2"]);
    assert_eq!(
        compiled.values,
        vec![SqlValue::Text("%eng%".into()), SqlValue::Int(50_000)]
    );
    assert_eq!(
        compiled.where_clause(),
        " WHERE title ILIKE $1 AND salary >= $2"
    );
}

#[test]
fn has_equity_binds_nothing() {
    let compiled = compile_search_predicate(&SearchCriteria::new().has_equity(true));
    assert_eq!(compiled.clauses, vec!["equity > 0"]);
    assert!(compiled.values.is_empty());
}

#[test]
fn fixed_order_regardless_of_construction_order() {
    let criteria = SearchCriteria::new()
        .has_equity(true)
        .min_salary(1)
        .title("eng");

    let compiled = compile_search_predicate(&criteria);

    assert_eq!(
        compiled.clauses,
        vec!["title ILIKE $1", "salary >= $2", "equity > 0"]
    );
    assert_eq!(
        compiled.values,
        vec![SqlValue::Text("%eng%".into()), SqlValue::Int(1)]
    );
}

#[test]
fn equity_flag_does_not_shift_numbering() {
    let compiled = compile_search_predicate(&SearchCriteria::new().has_equity(true).min_salary(7));
    assert_eq!(compiled.clauses, vec!["salary >= $1", "equity > 0"]);
    assert_eq!(compiled.values, vec![SqlValue::Int(7)]);
}

#[test]
fn has_equity_false_adds_nothing() {
    let compiled = compile_search_predicate(&SearchCriteria::new().has_equity(false));
    assert!(compiled.is_empty());
}

#[test]
fn has_equity_only_literal_true_from_json() {
    for raw in [
        r#"{"hasEquity": false}"#,
        r#"{"hasEquity": null}"#,
        r#"{"hasEquity": "true"}"#,
        r#"{"hasEquity": 1}"#,
        r#"{}"#,
    ] {
        let criteria: SearchCriteria = serde_json::from_str(raw).unwrap();
        let compiled = compile_search_predicate(&criteria);
        assert!(compiled.is_empty(), "{raw} should add no clause");
    }

    let criteria: SearchCriteria = serde_json::from_str(r#"{"hasEquity": true}"#).unwrap();
    assert_eq!(compile_search_predicate(&criteria).clauses, vec!["equity > 0"]);
}

#[test]
fn min_salary_is_not_converted() {
    let criteria: SearchCriteria =
        serde_json::from_str(r#"{"title": "eng", "minSalary": "lots"}"#).unwrap();

    let compiled = compile_search_predicate(&criteria);

    assert_eq!(compiled.clauses, vec!["title ILIKE $1", "salary >= $2"]);
    assert_eq!(compiled.values[1], SqlValue::Text("lots".into()));
}

#[test]
fn title_is_bound_never_spliced() {
    let compiled = compile_search_predicate(&SearchCriteria::new().title("x' OR 1=1 --"));
    assert_eq!(compiled.clauses, vec!["title ILIKE $1"]);
    assert_eq!(compiled.values, vec![SqlValue::Text("%x' OR 1=1 --%".into())]);
}

#[test]
fn empty_title_still_filters() {
    let compiled = compile_search_predicate(&SearchCriteria::new().title(""));
    assert_eq!(compiled.values, vec![SqlValue::Text("%%".into())]);
}

#[test]
fn builder_numbers_only_binding_predicates() {
    let mut b = PredicateBuilder::new();
    b.positive("equity")
        .contains_ci("name", "acme")
        .positive("num_employees")
        .at_least("num_employees", 10);

    let placeholders: Vec<usize> = b
        .predicates()
        .iter()
        .filter_map(Predicate::placeholder)
        .map(Placeholder::index)
        .collect();
    assert_eq!(placeholders, vec![1, 2]);

    let compiled = b.build();
    assert_eq!(compiled.values.len(), 2);
    assert_eq!(compiled.clauses[3], "num_employees >= $2");
}

#[test]
fn explicit_null_min_salary_still_filters() {
    let criteria: SearchCriteria = serde_json::from_str(r#"{"minSalary": null}"#).unwrap();
    assert_eq!(criteria.min_salary, Some(SqlValue::Null));

    let compiled = compile_search_predicate(&criteria);
    assert_eq!(compiled.clauses, vec!["salary >= $1"]);
    assert_eq!(compiled.values, vec![SqlValue::Null]);
}

#[test]
fn explicit_null_title_is_rejected() {
    assert!(serde_json::from_str::<SearchCriteria>(r#"{"title": null}"#).is_err());

    let criteria: SearchCriteria = serde_json::from_str(r#"{"title": "eng"}"#).unwrap();
    assert_eq!(criteria.title.as_deref(), Some("eng"));
}
