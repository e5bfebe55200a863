//! Parsing of compiled policy labels through the public policies facade.

use agency_portal::workflows::policies::{
    extract, parse_compiled, split, verdict_for_plate, BlockSplitter, CompiledPolicyText,
    PlateVerdict, PolicyStatus,
};
use serde_json::json;

const SINGLE: &str =
    "✅ VENCE 30D | 🚗 AUTO | N° POL: 33333333 | 🏷️ PDL384 | 🅰️ A | ❤️ VIDA: SI | 🔧 AUX";

const THREE: &str = "❌ ANULADA | 🚗 AUTO | N° POL: 111 | 🏷️ ABC123 \
    | ✅ VIGENTE | 🚙 CAMIONETA | N° POL: 222 | 🏷️ XYZ789 | 🔧 AUXILIO AUX \
    | 🔴 BAJA | 🏍️ MOTO | N° POL: 333 | 🏷️ A123BCD";

#[test]
fn reference_label_extracts_every_field() {
    let blocks = split(SINGLE);
    assert_eq!(blocks.len(), 1);

    let record = extract(&blocks[0]);
    assert_eq!(record.number, "33333333");
    assert_eq!(record.plate, "PDL384");
    assert_eq!(record.vehicle_type, "AUTO");
    assert_eq!(record.category, "A");
    assert!(record.has_life_rider);
    assert!(record.has_roadside_rider);
    assert_eq!(record.status, PolicyStatus::Expiring { days: 30 });
    assert_eq!(record.raw_text, SINGLE);
}

#[test]
fn every_strategy_yields_one_block_per_policy() {
    for splitter in [
        BlockSplitter::delimited(),
        BlockSplitter::glyph(),
        BlockSplitter::gated_glyph(),
    ] {
        let records = parse_compiled(&CompiledPolicyText::new(THREE), splitter);
        let numbers: Vec<&str> = records.iter().map(|record| record.number.as_str()).collect();
        assert_eq!(numbers, vec!["111", "222", "333"], "{:?}", splitter.strategy());
    }
}

#[test]
fn list_valued_rollups_parse_like_joined_text() {
    let field = json!([
        "❌ ANULADA | 🚗 AUTO | N° POL: 111 | 🏷️ ABC123",
        "✅ VIGENTE | 🚙 CAMIONETA | N° POL: 222 | 🏷️ XYZ789"
    ]);
    let compiled = CompiledPolicyText::from_field(Some(&field));

    let records = parse_compiled(&compiled, BlockSplitter::default());
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].status, PolicyStatus::Cancelled);
    assert_eq!(records[1].status, PolicyStatus::Active);
}

#[test]
fn verdicts_only_consult_the_matched_block() {
    let records = parse_compiled(&CompiledPolicyText::new(THREE), BlockSplitter::default());

    assert!(matches!(
        verdict_for_plate(&records, "abc123"),
        PlateVerdict::Inactive(record) if record.number == "111"
    ));
    assert!(matches!(
        verdict_for_plate(&records, "XYZ 789"),
        PlateVerdict::Active(record) if record.number == "222" && record.has_roadside_rider
    ));
    assert!(matches!(
        verdict_for_plate(&records, "A123BCD"),
        PlateVerdict::Inactive(_)
    ));
    assert_eq!(verdict_for_plate(&records, "QQQ000"), PlateVerdict::NotFound);
}

#[test]
fn unmarked_text_still_produces_a_record() {
    let records = parse_compiled(
        &CompiledPolicyText::new("N° POL: 555 AUTO AB123CD"),
        BlockSplitter::default(),
    );
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].number, "555");
    assert_eq!(records[0].plate, "AB123CD");
    assert_eq!(records[0].status, PolicyStatus::Unknown);
}
