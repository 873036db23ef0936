use std::collections::HashSet;

use proptest::prelude::*;
use u_datalab::aggregation::{aggregate, Reduction};
use u_datalab::cleaning::{deduplicate, impute, MissingPolicy};
use u_datalab::dataframe::DataFrame;
use u_datalab::filter::{restrict, restrict_all, ColumnFilter};
use u_datalab::statistics::{correlate, independent_t_test};
use u_datalab::value::Value;

const CATEGORIES: [&str; 3] = ["north", "south", "east"];

type Row = (Option<i8>, Option<usize>, Option<i8>);

fn frame(rows: &[Row]) -> DataFrame {
    let rows: Vec<Vec<Value>> = rows
        .iter()
        .map(|&(n, c, m)| {
            vec![
                Value::from(n.map(f64::from)),
                Value::from(c.map(|i| CATEGORIES[i])),
                Value::from(m.map(f64::from)),
            ]
        })
        .collect();
    DataFrame::from_rows(vec!["n".into(), "c".into(), "m".into()], &rows).unwrap()
}

fn rows_strategy() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(
        (
            prop::option::of(-4i8..4),
            prop::option::of(0usize..3),
            prop::option::of(-4i8..4),
        ),
        0..40,
    )
}

fn number_set() -> impl Strategy<Value = HashSet<Value>> {
    prop::collection::hash_set(prop::option::of(-4i8..4), 0..5)
        .prop_map(|set| set.into_iter().map(|n| Value::from(n.map(f64::from))).collect())
}

fn category_set() -> impl Strategy<Value = HashSet<Value>> {
    prop::collection::hash_set(prop::option::of(0usize..3), 0..4)
        .prop_map(|set| set.into_iter().map(|i| Value::from(i.map(|i| CATEGORIES[i]))).collect())
}

proptest! {
    #[test]
    fn deduplicate_is_idempotent(rows in rows_strategy()) {
        let df = frame(&rows);
        let (once, removed) = deduplicate(&df);
        prop_assert_eq!(once.row_count() + removed, df.row_count());

        let (twice, removed_again) = deduplicate(&once);
        prop_assert_eq!(removed_again, 0);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn fill_mean_without_nulls_is_identity(values in prop::collection::vec(-1000i32..1000, 1..50)) {
        let rows: Vec<Vec<Value>> = values.iter().map(|&v| vec![Value::from(f64::from(v))]).collect();
        let df = DataFrame::from_rows(vec!["x".into()], &rows).unwrap();
        prop_assert_eq!(impute(&df, "x", MissingPolicy::FillMean).unwrap(), df);
    }

    #[test]
    fn restrictions_commute(rows in rows_strategy(), numbers in number_set(), categories in category_set()) {
        let df = frame(&rows);
        let numbers_first = restrict(&restrict(&df, "n", &numbers).unwrap(), "c", &categories).unwrap();
        let categories_first = restrict(&restrict(&df, "c", &categories).unwrap(), "n", &numbers).unwrap();
        prop_assert_eq!(&numbers_first, &categories_first);

        let filters = vec![
            ColumnFilter::new("c", categories),
            ColumnFilter::new("n", numbers),
        ];
        prop_assert_eq!(restrict_all(&df, &filters).unwrap(), numbers_first);
    }

    #[test]
    fn correlation_diagonal_and_symmetry(
        rows in prop::collection::vec(
            (prop::option::of(-1e3f64..1e3), -1e3f64..1e3, prop::option::of(-1e3f64..1e3)),
            0..30,
        )
    ) {
        let rows: Vec<Vec<Value>> = rows
            .iter()
            .map(|&(a, b, c)| vec![Value::from(a), Value::from(b), Value::from(c)])
            .collect();
        let df = DataFrame::from_rows(vec!["a".into(), "b".into(), "c".into()], &rows).unwrap();
        let m = correlate(&df);
        prop_assert_eq!(m.len(), 3);
        for i in 0..3 {
            prop_assert_eq!(m.values[i][i], 1.0);
            for j in 0..3 {
                prop_assert_eq!(m.values[i][j].to_bits(), m.values[j][i].to_bits());
                let r = m.values[i][j];
                prop_assert!(r.is_nan() || (-1.0..=1.0).contains(&r));
            }
        }
    }

    #[test]
    fn t_test_of_identical_columns(values in prop::collection::vec(-1e3f64..1e3, 2..40)) {
        let rows: Vec<Vec<Value>> = values
            .iter()
            .map(|&v| vec![Value::from(v), Value::from(v)])
            .collect();
        let df = DataFrame::from_rows(vec!["a".into(), "b".into()], &rows).unwrap();
        let result = independent_t_test(&df, "a", "b").unwrap();
        prop_assert_eq!(result.statistic, 0.0);
        prop_assert!((result.p_value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn aggregate_sum_preserves_total(rows in rows_strategy()) {
        let df = frame(&rows);
        let out = aggregate(&df, "c", "n", Reduction::Sum).unwrap();

        let expected: f64 = rows.iter().filter_map(|(n, _, _)| n.map(f64::from)).sum();
        let total: f64 = out.column(1).unwrap().valid_numeric_values().unwrap().iter().sum();
        prop_assert!((total - expected).abs() < 1e-9);

        let keys = out.column(0).unwrap().values();
        prop_assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }
}
