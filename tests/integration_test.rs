use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use vibefed::assembler::QueryAssembler;
use vibefed::catalog::{DataType, TupleDescriptor};
use vibefed::filter::ParseError;
use vibefed::partition::{
    BoundValue, Boundary, PartitionOptions, PartitionPlanner, PartitionSpec, PlannerConfig,
    PlanningError,
};
use vibefed::request::{EngineError, PushdownRequest};
use vibefed::translator::{translate_filter, Pushdown, UnsupportedReason};

const ORIGINAL_SQL: &str = "SELECT * FROM sales";

fn sales() -> TupleDescriptor {
    TupleDescriptor::from_columns([
        ("id", DataType::Int4),
        ("cdate", DataType::Date),
        ("amt", DataType::Float8),
        ("grade", DataType::Text),
    ])
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_id_filter() {
    let pushdown = translate_filter(Some("a0c20s1d1o5"), &sales()).unwrap();
    assert_eq!(pushdown, Some(Pushdown::Where("id=1".to_string())));
}

#[test]
fn test_date_and_amount_filter() {
    // cdate>'2008-02-01' and cdate<'2008-12-01' and amt > 1200
    let pushdown = translate_filter(
        Some("a1c25s10d2008-02-01o2a1c25s10d2008-12-01o1l0a2c20s4d1200o2l0"),
        &sales(),
    )
    .unwrap();
    assert_eq!(
        pushdown,
        Some(Pushdown::Where(
            "cdate>'2008-02-01' AND cdate<'2008-12-01' AND amt>1200".to_string()
        ))
    );
}

#[test]
fn test_unsupported_operation_filter() {
    // grade like 'bad'
    let pushdown = translate_filter(Some("a3c25s3dbado7"), &sales()).unwrap();
    assert!(matches!(pushdown, Some(Pushdown::Unsupported(_))));
}

#[test]
fn test_unsupported_logical_filter() {
    // cdate>'2008-02-01' or amt < 1200, both sides pushable on their own
    let pushdown =
        translate_filter(Some("a1c25s10d2008-02-01o2a2c20s4d1200o2l1"), &sales()).unwrap();
    assert_eq!(
        pushdown,
        Some(Pushdown::Unsupported(UnsupportedReason::Disjunction))
    );
}

#[test]
fn test_invalid_connective_is_a_parse_error() {
    let tuple = TupleDescriptor::from_columns([
        ("a", DataType::Int4),
        ("b", DataType::Int4),
        ("c", DataType::Int4),
        ("d", DataType::Int4),
        ("e", DataType::Text),
    ]);
    assert!(translate_filter(Some("a4c25s3dtxto5a4c25s3dseqo5o6"), &tuple).is_err());
    assert!(matches!(
        translate_filter(Some("a4c25s3dtxto5a4c25s3dseqo5l2"), &tuple),
        Err(ParseError::UnknownConnective { opcode: 2, .. })
    ));
}

#[test]
fn test_date_partition() {
    let plan = PushdownRequest::new(sales())
        .with_partition(
            PartitionOptions::new("cdate:date")
                .with_range("2008-01-01:2009-01-01")
                .with_interval("2:month"),
        )
        .plan(&PlannerConfig::default())
        .unwrap();
    assert_eq!(plan.fragments.len(), 6);

    let queries = plan.queries(ORIGINAL_SQL).unwrap();
    assert_eq!(
        queries[0].query,
        "SELECT * FROM sales WHERE cdate>='2008-01-01' AND cdate<'2008-03-01'"
    );
    assert_eq!(
        queries[5].query,
        "SELECT * FROM sales WHERE cdate>='2008-11-01' AND cdate<'2009-01-01'"
    );
}

#[test]
fn test_filter_and_partition() {
    let mut options = HashMap::new();
    options.insert("PARTITION_BY".to_string(), "grade:enum".to_string());
    options.insert("RANGE".to_string(), "excellent:good:general:bad".to_string());

    let plan = PushdownRequest::new(sales())
        .with_filter("a0c20s1d5o2")
        .with_options(&options)
        .unwrap()
        .plan(&PlannerConfig::default())
        .unwrap();
    assert_eq!(plan.where_clause(), Some("id>5"));

    let queries: Vec<String> = plan
        .queries(ORIGINAL_SQL)
        .unwrap()
        .into_iter()
        .map(|fragment| fragment.query)
        .collect();
    assert_eq!(
        queries,
        vec![
            "SELECT * FROM sales WHERE id>5 AND grade='excellent'",
            "SELECT * FROM sales WHERE id>5 AND grade='good'",
            "SELECT * FROM sales WHERE id>5 AND grade='general'",
            "SELECT * FROM sales WHERE id>5 AND grade='bad'",
        ]
    );
}

#[test]
fn test_no_partition() {
    let plan = PushdownRequest::new(sales())
        .plan(&PlannerConfig::default())
        .unwrap();
    assert_eq!(plan.fragments.len(), 1);
    assert_eq!(plan.queries(ORIGINAL_SQL).unwrap()[0].query, ORIGINAL_SQL);
}

#[test]
fn test_reassembly_is_byte_identical() {
    let plan = PushdownRequest::new(sales())
        .with_filter("a0c20s1d5o2")
        .with_partition(
            PartitionOptions::new("cdate:date")
                .with_range("2008-01-01:2009-01-01")
                .with_interval("1:month"),
        )
        .plan(&PlannerConfig::default())
        .unwrap();

    for fragment in &plan.fragments {
        // Metadata shipped to a worker rebuilds the same query
        let copy = vibefed::partition::Fragment::from_metadata(
            fragment.index(),
            fragment.metadata().to_vec(),
        )
        .unwrap();
        assert_eq!(
            plan.query_for(ORIGINAL_SQL, fragment).unwrap(),
            plan.query_for(ORIGINAL_SQL, &copy).unwrap()
        );
    }
}

#[test]
fn test_unsupported_filter_with_partitions() {
    let plan = PushdownRequest::new(sales())
        .with_filter("a3c25s3dbado7")
        .with_partition(PartitionOptions::new("id:int").with_range("0:20").with_interval("10"))
        .plan(&PlannerConfig::default())
        .unwrap();
    let queries: Vec<String> = plan
        .queries(ORIGINAL_SQL)
        .unwrap()
        .into_iter()
        .map(|fragment| fragment.query)
        .collect();
    assert_eq!(
        queries,
        vec![
            "SELECT * FROM sales WHERE id>=0 AND id<10",
            "SELECT * FROM sales WHERE id>=10 AND id<20",
        ]
    );
}

#[test]
fn test_partition_type_must_fit_column() {
    // grade is text; integer bounds would compare strings with numbers
    let err = PushdownRequest::new(sales())
        .with_partition(PartitionOptions::new("grade:int").with_range("0:3").with_interval("1"))
        .plan(&PlannerConfig::default())
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Planning(PlanningError::KindMismatch { .. })
    ));
}

#[test]
fn test_long_not_in_filter_with_partitions() {
    std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| {
            let mut filter = String::new();
            for value in 0..100_000 {
                let literal = value.to_string();
                filter.push_str(&format!("a0c23s{}d{}o6", literal.len(), literal));
                if value > 0 {
                    filter.push_str("l0");
                }
            }
            let plan = PushdownRequest::new(sales())
                .with_filter(filter)
                .with_partition(
                    PartitionOptions::new("id:int")
                        .with_range("0:20")
                        .with_interval("10"),
                )
                .plan(&PlannerConfig::default())
                .unwrap();
            let queries = plan.queries(ORIGINAL_SQL).unwrap();
            assert_eq!(queries.len(), 2);
            assert!(queries[1]
                .query
                .starts_with("SELECT * FROM sales WHERE id<>0 AND id<>1 AND "));
            assert!(queries[1].query.ends_with("id<>99999 AND id>=10 AND id<20"));
        })
        .unwrap()
        .join()
        .unwrap();
}

#[test]
fn test_planning_errors_fail_setup() {
    let err = PushdownRequest::new(sales())
        .with_partition(
            PartitionOptions::new("cdate:date")
                .with_range("2008-01-01:2009-01-01")
                .with_interval("0:month"),
        )
        .plan(&PlannerConfig::default())
        .unwrap_err();
    assert!(matches!(err, EngineError::Planning(_)));
}

fn date_bounds(boundary: &Boundary) -> (NaiveDate, NaiveDate) {
    match boundary {
        Boundary::Range {
            lower: BoundValue::Date(lower),
            upper: BoundValue::Date(upper),
            ..
        } => (*lower, *upper),
        other => panic!("expected a date range, got {:?}", other),
    }
}

fn integer_bounds(boundary: &Boundary) -> (i64, i64) {
    match boundary {
        Boundary::Range {
            lower: BoundValue::Integer(lower),
            upper: BoundValue::Integer(upper),
            ..
        } => (*lower, *upper),
        other => panic!("expected an integer range, got {:?}", other),
    }
}

#[test]
fn test_random_date_ranges_are_covered_exactly_once() {
    let mut rng = StdRng::seed_from_u64(2008);
    let planner = PartitionPlanner::new(PlannerConfig::default());
    let units = ["day", "month", "year"];

    for _ in 0..200 {
        let start = date(2000, 1, 1) + Days::new(rng.gen_range(0..10_000));
        let days = rng.gen_range(1..1_500);
        let end = start + Days::new(days);
        let count = rng.gen_range(1..6);
        let unit = units[rng.gen_range(0..units.len())];

        let options = PartitionOptions::new("cdate:date")
            .with_range(format!("{}:{}", start, end))
            .with_interval(format!("{}:{}", count, unit));
        let spec = PartitionSpec::parse(&options, &sales()).unwrap();
        let bounds: Vec<(NaiveDate, NaiveDate)> = planner
            .boundaries(&spec)
            .unwrap()
            .iter()
            .map(date_bounds)
            .collect();

        assert_eq!(bounds.first().unwrap().0, start);
        assert_eq!(bounds.last().unwrap().1, end);
        for window in bounds.windows(2) {
            assert_eq!(window[0].1, window[1].0);
        }
        assert!(bounds.iter().all(|(lower, upper)| lower < upper));
        if unit == "day" {
            assert_eq!(bounds.len() as u64, days.div_ceil(count));
        }

        let probe = start + Days::new(rng.gen_range(0..days));
        let hits = bounds
            .iter()
            .filter(|(lower, upper)| *lower <= probe && probe < *upper)
            .count();
        assert_eq!(hits, 1);
    }
}

#[test]
fn test_random_integer_ranges_are_covered_exactly_once() {
    let mut rng = StdRng::seed_from_u64(1200);
    let planner = PartitionPlanner::new(PlannerConfig::default());

    for _ in 0..200 {
        let start: i64 = rng.gen_range(-1_000..1_000);
        let length: i64 = rng.gen_range(1..500);
        let end = start + length;
        let interval: i64 = rng.gen_range(1..50);

        let options = PartitionOptions::new("id:int")
            .with_range(format!("{}:{}", start, end))
            .with_interval(interval.to_string());
        let spec = PartitionSpec::parse(&options, &sales()).unwrap();
        let bounds: Vec<(i64, i64)> = planner
            .boundaries(&spec)
            .unwrap()
            .iter()
            .map(integer_bounds)
            .collect();

        assert_eq!(bounds.len() as i64, (length + interval - 1) / interval);
        assert_eq!(bounds.first().unwrap().0, start);
        assert_eq!(bounds.last().unwrap().1, end);
        for window in bounds.windows(2) {
            assert_eq!(window[0].1, window[1].0);
        }

        let probe = rng.gen_range(start..end);
        let hits = bounds
            .iter()
            .filter(|(lower, upper)| *lower <= probe && probe < *upper)
            .count();
        assert_eq!(hits, 1);
    }
}

#[test]
fn test_assembler_with_translator_output() {
    let tuple = sales();
    let pushdown = translate_filter(Some("a0c20s1d5o2"), &tuple).unwrap().unwrap();
    let boundary = Boundary::Value {
        column: "grade".to_string(),
        value: BoundValue::Text("excellent".to_string()),
    };
    let assembler = QueryAssembler::new(ORIGINAL_SQL).with_filter(pushdown.where_clause());
    assert_eq!(
        assembler.assemble(&boundary),
        "SELECT * FROM sales WHERE id>5 AND grade='excellent'"
    );
}
