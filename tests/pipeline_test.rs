use anyhow::Result;
use creator_etl::{
    find_record_array, process, process_with_store, repair, ImportError, MemoryDedupStore,
    ParserConfig, RecordId, RepairStage, ScanPath,
};
use serde_json::json;

fn bounds_config() -> ParserConfig {
    ParserConfig::with_bounds(1000, 1_000_000_000)
}

#[test]
fn test_well_formed_export_is_normalized() -> Result<()> {
    // the canonical well-formed shape the export tool produces
    let input = r#"{"creators":[{"aioCreatorID":"c1","creatorTTInfo":{"handleName":"h1","bio":"hi a@b.com"},"statisticData":{"overallPerformance":{"followerCount":5000}}}]}"#;

    let summary = process(input, &bounds_config())?;

    assert_eq!(summary.total, 1);
    assert_eq!(summary.accepted, 1);
    assert_eq!(summary.filtered, 0);
    assert_eq!(summary.duplicates, 0);

    let record = &summary.processed_records[0];
    assert_eq!(record.identifier, RecordId::Text("c1".to_string()));
    assert_eq!(record.display_name, "h1");
    assert_eq!(record.email.as_deref(), Some("a@b.com"));
    assert_eq!(record.follower_count, 5000);
    assert_eq!(record.profile_url, "https://www.tiktok.com/@h1");
    Ok(())
}

#[test]
fn test_low_follower_record_filtered_but_kept() -> Result<()> {
    let input = r#"{"creators":[{"aioCreatorID":"c1","creatorTTInfo":{"handleName":"h1","bio":"hi a@b.com"},"statisticData":{"overallPerformance":{"followerCount":500}}}]}"#;

    let summary = process(input, &bounds_config())?;

    assert_eq!(summary.total, 1);
    assert_eq!(summary.accepted, 0);
    assert_eq!(summary.filtered, 1);
    assert_eq!(summary.processed_records.len(), 1);
    assert_eq!(summary.processed_records[0].follower_count, 500);
    Ok(())
}

#[test]
fn test_truncated_export_still_processes() -> Result<()> {
    // cut off mid-string, as pasted from a stalled export
    let input = r#"{"creators":[{"aioCreatorID":"c1","bio":"trunc..."#;

    let summary = process(input, &bounds_config())?;

    assert_eq!(summary.total, 1);
    assert_eq!(summary.accepted, 0);
    assert_eq!(summary.filtered, 1);
    assert_eq!(
        summary.processed_records[0].identifier,
        RecordId::Text("c1".to_string())
    );
    Ok(())
}

#[test]
fn test_nested_array_found_without_primary_key() -> Result<()> {
    let input = json!({
        "meta": {
            "items": [
                {"aioCreatorID": "x", "statisticData": {"overallPerformance": {"followerCount": 2000}}},
                {"aioCreatorID": "y", "statisticData": {"overallPerformance": {"followerCount": 3000}}}
            ]
        }
    });

    let summary = process(&input.to_string(), &bounds_config())?;
    assert_eq!(summary.total, 2);
    assert_eq!(summary.accepted, 2);

    let outcome = find_record_array(&input, &bounds_config())?;
    assert_eq!(
        outcome.path,
        ScanPath::Discovered {
            path: "meta.items".to_string()
        }
    );
    Ok(())
}

#[test]
fn test_primary_key_short_circuits_structure_scan() -> Result<()> {
    // the walk would prefer the bigger nested array; the primary key must win
    let input = json!({
        "creators": [{"aioCreatorID": "c1"}],
        "meta": {
            "items": [
                {"aioCreatorID": "x"},
                {"aioCreatorID": "y"},
                {"aioCreatorID": "z"}
            ]
        }
    });

    let outcome = find_record_array(&input, &bounds_config())?;
    assert_eq!(outcome.path, ScanPath::Primary);

    let summary = process(&input.to_string(), &bounds_config())?;
    assert_eq!(summary.total, 1);
    assert_eq!(
        summary.processed_records[0].identifier,
        RecordId::Text("c1".to_string())
    );
    Ok(())
}

#[test]
fn test_repair_is_transparent_to_downstream_stages() -> Result<()> {
    let corrupted = r#"{"creators":[{"aioCreatorID":"c1","creatorTTInfo":{"handleName":"h1","bio":"hi a@b.com"},"statisticData":{"overallPerformance":{"followerCount":5000,"engagementRate":0.05"#;

    let repaired = repair(corrupted)?;
    assert_eq!(repaired.stage, RepairStage::Rewritten);

    // a strict-only rerun over the repaired text must agree with the full run
    let from_corrupted = process(corrupted, &bounds_config())?;
    let from_repaired = process(&repaired.text, &bounds_config())?;
    assert_eq!(from_corrupted, from_repaired);
    Ok(())
}

#[test]
fn test_pipeline_output_round_trips_without_repair() -> Result<()> {
    let input = r#"{"creators":[{"aioCreatorID":"c1","creatorTTInfo":{"handleName":"h1","bio":"hi a@b.com"},"statisticData":{"overallPerformance":{"followerCount":5000}}}]}"#;
    let summary = process(input, &bounds_config())?;

    let serialized = serde_json::to_string(&summary)?;
    let repaired = repair(&serialized)?;
    assert_eq!(repaired.stage, RepairStage::Strict);
    assert_eq!(repaired.value, serde_json::to_value(&summary)?);
    Ok(())
}

#[test]
fn test_follower_bounds_inclusive_at_both_ends() -> Result<()> {
    let creator = |id: &str, followers: i64| {
        json!({
            "aioCreatorID": id,
            "statisticData": {"overallPerformance": {"followerCount": followers}}
        })
    };
    let input = json!({
        "creators": [
            creator("below", 999),
            creator("at-min", 1000),
            creator("at-max", 10_000),
            creator("above", 10_001)
        ]
    })
    .to_string();

    let summary = process(&input, &ParserConfig::with_bounds(1000, 10_000))?;
    assert_eq!(summary.total, 4);
    assert_eq!(summary.accepted, 2);
    assert_eq!(summary.filtered, 2);
    Ok(())
}

#[test]
fn test_element_without_identifier_dropped_entirely() -> Result<()> {
    let input = json!({
        "creators": [
            {
                "creatorTTInfo": {"handleName": "h1", "bio": "a@b.com"},
                "statisticData": {"overallPerformance": {"followerCount": 5000}}
            },
            {"aioCreatorID": "c2", "statisticData": {"overallPerformance": {"followerCount": 5000}}}
        ]
    })
    .to_string();

    let summary = process(&input, &bounds_config())?;
    assert_eq!(summary.total, 1);
    assert_eq!(
        summary.processed_records[0].identifier,
        RecordId::Text("c2".to_string())
    );
    Ok(())
}

#[test]
fn test_duplicate_ids_demoted_with_store() -> Result<()> {
    let creator = |id: &str| {
        json!({
            "aioCreatorID": id,
            "statisticData": {"overallPerformance": {"followerCount": 5000}}
        })
    };
    let input = json!({"creators": [creator("a"), creator("a"), creator("b")]}).to_string();

    let mut store = MemoryDedupStore::new();
    let summary = process_with_store(&input, &bounds_config(), &mut store)?;
    assert_eq!(summary.total, 3);
    assert_eq!(summary.accepted, 2);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.processed_records.len(), 3);
    Ok(())
}

#[test]
fn test_scalar_document_is_invalid_input() {
    let err = process("42", &bounds_config()).unwrap_err();
    assert!(matches!(err, ImportError::InvalidInput(_)));
}

#[test]
fn test_hopeless_input_is_unrecoverable() {
    let err = process("complete garbage, no structure at all", &bounds_config()).unwrap_err();
    assert!(matches!(err, ImportError::UnrecoverableInput(_)));
}

#[test]
fn test_document_without_records_reports_none_found() {
    let err = process(r#"{"meta": {"version": 2}}"#, &bounds_config()).unwrap_err();
    assert!(matches!(err, ImportError::NoRecordsFound));
}
