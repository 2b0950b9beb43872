use std::io::Write;

use flavor_ingestor::io::ndjson;
use flavor_ingestor::models::foodb::{ContentRecord, FoodRecord};
use tempfile::NamedTempFile;

#[test]
fn reads_food_dump_from_disk() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"{{"id":1,"public_id":"FOOD00001","name":"Angelica","food_group":"Herbs and Spices","food_subgroup":"Herbs","wikipedia_id":"Garden_Angelica","export_to_foodb":true}}"#
    )
    .unwrap();
    writeln!(
        file,
        r#"{{"id":2,"public_id":"FOOD00002","name":"Savoy cabbage","food_group":"Vegetables","food_subgroup":"Cabbages","wikipedia_id":null,"export_to_foodb":true}}"#
    )
    .unwrap();

    let foods: Vec<FoodRecord> = ndjson::open::<FoodRecord>(file.path())
        .unwrap()
        .map(|l| l.record.unwrap())
        .collect();

    assert_eq!(foods.len(), 2);
    assert_eq!(foods[0].wikipedia_id.as_deref(), Some("Garden_Angelica"));
    assert_eq!(foods[1].food_subgroup.as_deref(), Some("Cabbages"));
}

#[test]
fn content_lines_with_wrong_types_fail_individually() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"{{"source_type":"Compound","food_id":1,"source_id":5,"orig_content":"3.5"}}"#
    )
    .unwrap();
    writeln!(
        file,
        r#"{{"source_type":"Compound","food_id":"one","source_id":5,"orig_content":1}}"#
    )
    .unwrap();

    let lines: Vec<_> = ndjson::open::<ContentRecord>(file.path())
        .unwrap()
        .collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].record.as_ref().unwrap().quantity(), Some(3.5));
    assert!(lines[1].record.is_err());
    assert_eq!(lines[1].line, 2);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ndjson::open::<FoodRecord>(dir.path().join("Food.json"))
        .err()
        .unwrap();
    assert!(err.to_string().contains("Food.json"));
}
