use super::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;

fn weather_table() -> RowTable {
    RowTableBuilder::new("weather")
        .discrete("outlook")
        .continuous("temperature")
        .row(vec!["sunny".into(), 30.0.into()])
        .unwrap()
        .row(vec!["overcast".into(), 20.0.into()])
        .unwrap()
        .row(vec!["rain".into(), 10.0.into()])
        .unwrap()
        .row(vec!["sunny".into(), 25.0.into()])
        .unwrap()
        .build()
        .unwrap()
}

fn ids(values: &[usize]) -> BTreeSet<usize> {
    values.iter().copied().collect()
}

#[test]
fn test_builder_derives_schema() {
    let table = weather_table();

    assert_eq!(table.len(), 4);
    assert_eq!(table.attribute_count(), 2);
    assert_eq!(table.attribute_names(), vec!["outlook", "temperature"]);

    match table.attribute(0).unwrap() {
        Attribute::Discrete(a) => {
            let domain: Vec<&str> = a.values().collect();
            assert_eq!(domain, vec!["overcast", "rain", "sunny"]);
            assert_eq!(a.distinct_values(), 3);
            assert_eq!(a.index(), 0);
        }
        other => panic!("expected a discrete attribute, got {:?}", other),
    }

    match table.attribute(1).unwrap() {
        Attribute::Continuous(a) => {
            assert_eq!(a.min(), 10.0);
            assert_eq!(a.max(), 30.0);
            assert_eq!(a.index(), 1);
        }
        other => panic!("expected a continuous attribute, got {:?}", other),
    }
}

#[test]
fn test_builder_collapses_duplicates() {
    let table = RowTableBuilder::new("dups")
        .discrete("letter")
        .continuous("n")
        .row(vec!["A".into(), 1.0.into()])
        .unwrap()
        .row(vec!["B".into(), 2.0.into()])
        .unwrap()
        .row(vec!["A".into(), 1.0.into()])
        .unwrap()
        .row(vec!["A".into(), (-0.0).into()])
        .unwrap()
        .row(vec!["A".into(), 0.0.into()])
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(table.distinct_rows(), 3);
    assert_eq!(table.row(0), &[Value::from("A"), Value::from(1.0)]);
    assert_eq!(table.row(1), &[Value::from("B"), Value::from(2.0)]);
    assert_eq!(table.row(2), &[Value::from("A"), Value::from(-0.0)]);
}

#[test]
fn test_builder_rejects_bad_rows() {
    let mut builder = RowTableBuilder::new("t").discrete("d").continuous("c");

    let err = builder.push_row(vec!["x".into()]).unwrap_err();
    assert_eq!(
        err,
        DataError::ArityMismatch {
            expected: 2,
            found: 1
        }
    );

    let err = builder.push_row(vec![1.0.into(), 1.0.into()]).unwrap_err();
    assert!(err.to_string().contains("Column d expects a text value"));

    let err = builder.push_row(vec!["x".into(), "y".into()]).unwrap_err();
    assert!(err.to_string().contains("Column c expects a numeric value"));

    let err = builder
        .push_row(vec!["x".into(), f64::NAN.into()])
        .unwrap_err();
    assert_eq!(
        err,
        DataError::NonFinite {
            column: "c".to_string()
        }
    );
}

#[test]
fn test_builder_rejects_empty_tables() {
    let err = RowTableBuilder::new("empty")
        .discrete("d")
        .build()
        .unwrap_err();
    assert_eq!(err, DataError::EmptyTable("empty".to_string()));

    let err = RowTableBuilder::new("bare").build().unwrap_err();
    assert_eq!(err, DataError::NoColumns("bare".to_string()));
}

#[test]
fn test_builder_rejects_unbounded_range() {
    let err = RowTableBuilder::new("wide")
        .continuous("x")
        .row(vec![(-1e308).into()])
        .unwrap()
        .row(vec![1e308.into()])
        .unwrap()
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        DataError::RangeOverflow {
            column: "x".to_string(),
            min: -1e308,
            max: 1e308,
        }
    );

    // the widest representable range is still accepted
    let table = RowTableBuilder::new("wide")
        .continuous("x")
        .row(vec![0.0.into()])
        .unwrap()
        .row(vec![f64::MAX.into()])
        .unwrap()
        .build()
        .unwrap();
    let top = table.tuple(1);
    assert_eq!(top.distance(&top), 0.0);
    assert_eq!(table.tuple(0).distance(&top), 1.0);
}

#[test]
fn test_discrete_distance() {
    let table = weather_table();
    let sunny = table.tuple(0);
    let overcast = table.tuple(1);
    let sunny_again = table.tuple(3);

    let a = sunny.get(0).unwrap();
    let b = overcast.get(0).unwrap();
    let c = sunny_again.get(0).unwrap();

    assert_eq!(a.distance(a), 0.0);
    assert_eq!(a.distance(c), 0.0);
    assert_eq!(a.distance(b), 1.0);
    assert_eq!(b.distance(a), 1.0);
}

#[test]
fn test_continuous_distance() {
    let table = weather_table();
    let t30 = table.tuple(0);
    let t20 = table.tuple(1);
    let t10 = table.tuple(2);

    let a = t30.get(1).unwrap();
    let b = t20.get(1).unwrap();
    let c = t10.get(1).unwrap();

    assert_eq!(a.distance(a), 0.0);
    assert!((a.distance(b) - 0.5).abs() < 1e-12);
    assert_eq!(a.distance(b), b.distance(a));
    assert!((a.distance(c) - 1.0).abs() < 1e-12);

    for x in [a, b, c] {
        for y in [a, b, c] {
            let d = x.distance(y);
            assert!((0.0..=1.0).contains(&d));
        }
    }
}

#[test]
fn test_scaled_value() {
    let attr = ContinuousAttribute::new("t", 0, 0.0, 10.0);
    assert_eq!(attr.scaled_value(0.0), 0.0);
    assert_eq!(attr.scaled_value(5.0), 0.5);
    assert_eq!(attr.scaled_value(10.0), 1.0);

    let flat = ContinuousAttribute::new("flat", 0, 3.0, 3.0);
    assert_eq!(flat.scaled_value(3.0), 0.0);
}

#[test]
#[should_panic(expected = "mismatched columns")]
fn test_distance_between_mismatched_items_panics() {
    let table = weather_table();
    let row = table.tuple(0);
    row.get(0).unwrap().distance(row.get(1).unwrap());
}

#[test]
fn test_tuple_distance_is_sum_of_items() {
    let table = weather_table();
    let a = table.tuple(0); // sunny, 30
    let b = table.tuple(2); // rain, 10

    // 1 for the outlook mismatch, 1 for the full temperature range
    assert!((a.distance(&b) - 2.0).abs() < 1e-12);

    let c = table.tuple(3); // sunny, 25
    // 0 for outlook, 0.25 for temperature
    assert!((a.distance(&c) - 0.25).abs() < 1e-12);
    assert_eq!(a.distance(&c), c.distance(&a));
    assert_eq!(a.distance(&a), 0.0);

    let per_item: f64 = a
        .items()
        .iter()
        .zip(b.items())
        .map(|(x, y)| x.distance(y))
        .sum();
    assert_eq!(a.distance(&b), per_item);
}

#[test]
fn test_avg_distance() {
    let table = weather_table();
    let centroid = table.tuple(0);

    assert_eq!(centroid.avg_distance(&table, &ids(&[])), 0.0);
    // distances 0 and 0.25
    assert!((centroid.avg_distance(&table, &ids(&[0, 3])) - 0.125).abs() < 1e-12);
}

#[test]
fn test_item_try_new_checks_kind() {
    let table = weather_table();
    let outlook = table.attribute(0).unwrap();

    let item = Item::try_new(outlook, "rain".into()).unwrap();
    assert_eq!(item.value(), Value::from("rain"));
    assert_eq!(item.attribute().name(), "outlook");

    assert!(Item::try_new(outlook, 1.0.into()).is_err());
}

#[test]
fn test_frequency() {
    let table = weather_table();
    let Attribute::Discrete(outlook) = table.attribute(0).unwrap() else {
        panic!("outlook should be discrete");
    };

    assert_eq!(outlook.frequency(&table, &ids(&[0, 1, 2, 3]), "sunny"), 2);
    assert_eq!(outlook.frequency(&table, &ids(&[1, 2]), "sunny"), 0);
    assert_eq!(outlook.frequency(&table, &ids(&[0, 1, 2, 3]), "snow"), 0);
}

#[test]
fn test_discrete_prototype_mode_and_ties() {
    let table = weather_table();
    let outlook = table.attribute(0).unwrap();

    assert_eq!(
        table.compute_prototype(&ids(&[0, 1, 3]), outlook),
        Some(Value::from("sunny"))
    );
    // one overcast, one rain: the earlier domain value wins
    assert_eq!(
        table.compute_prototype(&ids(&[1, 2]), outlook),
        Some(Value::from("overcast"))
    );
    assert_eq!(table.compute_prototype(&ids(&[]), outlook), None);
}

#[test]
fn test_discrete_prototype_over_repeated_values() {
    // Four source rows A, A, A, B kept apart by an id column
    let table = RowTableBuilder::new("letters")
        .continuous("id")
        .discrete("letter")
        .row(vec![1.0.into(), "A".into()])
        .unwrap()
        .row(vec![2.0.into(), "A".into()])
        .unwrap()
        .row(vec![3.0.into(), "A".into()])
        .unwrap()
        .row(vec![4.0.into(), "B".into()])
        .unwrap()
        .build()
        .unwrap();

    let letter = table.attribute(1).unwrap();
    assert_eq!(
        table.compute_prototype(&ids(&[0, 1, 2, 3]), letter),
        Some(Value::from("A"))
    );
    assert_eq!(
        table.compute_prototype(&ids(&[2, 3]), letter),
        Some(Value::from("A"))
    );
    assert_eq!(
        table.compute_prototype(&ids(&[3]), letter),
        Some(Value::from("B"))
    );
}

#[test]
fn test_continuous_prototype_reads_own_column() {
    let table = RowTableBuilder::new("pairs")
        .continuous("x")
        .continuous("y")
        .row(vec![0.0.into(), 100.0.into()])
        .unwrap()
        .row(vec![2.0.into(), 300.0.into()])
        .unwrap()
        .build()
        .unwrap();

    let all = ids(&[0, 1]);
    assert_eq!(
        table.compute_prototype(&all, table.attribute(0).unwrap()),
        Some(Value::Number(1.0))
    );
    assert_eq!(
        table.compute_prototype(&all, table.attribute(1).unwrap()),
        Some(Value::Number(200.0))
    );
}

#[test]
fn test_continuous_prototype_near_max_stays_finite() {
    let table = RowTableBuilder::new("huge")
        .continuous("x")
        .row(vec![1e308.into()])
        .unwrap()
        .row(vec![1.7e308.into()])
        .unwrap()
        .build()
        .unwrap();

    let Some(Value::Number(mean)) = table.compute_prototype(&ids(&[0, 1]), table.attribute(0).unwrap())
    else {
        panic!("expected a numeric prototype");
    };
    assert!(mean.is_finite());
    assert!((1e308..=1.7e308).contains(&mean));
    assert!(((mean - 1.35e308) / 1.35e308).abs() < 1e-12);
}

#[test]
fn test_item_update_writes_prototype_in_place() {
    let table = weather_table();
    let mut centroid = table.tuple(2); // rain, 10

    for item in centroid.items_mut() {
        item.update(&table, &ids(&[0, 3]));
    }
    assert_eq!(centroid.values(), vec![Value::from("sunny"), Value::from(27.5)]);

    // empty membership keeps the previous value
    for item in centroid.items_mut() {
        item.update(&table, &ids(&[]));
    }
    assert_eq!(centroid.values(), vec![Value::from("sunny"), Value::from(27.5)]);
}

#[test]
fn test_sampling_returns_distinct_rows() {
    let table = weather_table();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    for k in 1..=table.len() {
        let sample = table.sample(k, &mut rng).unwrap();
        assert_eq!(sample.len(), k);
        for (i, &a) in sample.iter().enumerate() {
            assert!(a < table.len());
            for &b in &sample[i + 1..] {
                assert!(!table.rows_equal(a, b));
            }
        }
    }
}

#[test]
fn test_sampling_out_of_range() {
    let table = weather_table();
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let err = table.sample(0, &mut rng).unwrap_err();
    assert_eq!(err, DataError::OutOfRange { k: 0, max: 4 });

    let err = table.sample(5, &mut rng).unwrap_err();
    assert_eq!(err, DataError::OutOfRange { k: 5, max: 4 });
    assert!(err.to_string().contains("1 - 4"));
}

#[test]
fn test_display() {
    let table = weather_table();
    assert_eq!(table.tuple(0).to_string(), " sunny  30 ");
    assert!(table.to_string().starts_with("1: sunny, 30\n"));
}
