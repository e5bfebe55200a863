use super::domain::{PolicyRecord, PolicyStatus};
use super::vocabulary::has_cancel_keyword;

/// Upper-cases and removes whitespace. Applying it twice changes nothing.
pub fn normalize_plate(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Finds the policy for `plate` among the records of one client, in block order.
///
/// Containment comes first: extraction misses plates on some label variants, so any
/// record whose raw text carries the plate is a candidate, and an exact extracted-plate
/// match among the candidates is preferred over the first candidate. Records are only
/// compared by extracted plate when no raw text contains the plate at all.
pub fn find_by_plate<'a>(records: &'a [PolicyRecord], plate: &str) -> Option<&'a PolicyRecord> {
    let query = normalize_plate(plate);
    if query.is_empty() {
        return None;
    }

    let candidates: Vec<&PolicyRecord> = records
        .iter()
        .filter(|record| record.raw_text.to_uppercase().contains(&query))
        .collect();

    if let Some(exact) = candidates.iter().find(|record| record.plate == query) {
        return Some(*exact);
    }

    if let Some(first) = candidates.first() {
        return Some(*first);
    }

    records
        .iter()
        .find(|record| !record.plate.is_empty() && normalize_plate(&record.plate) == query)
}

/// A policy is inactive when its status is cancelled or its own block mentions any
/// cancellation keyword.
pub fn is_inactive(record: &PolicyRecord) -> bool {
    if record.status == PolicyStatus::Cancelled {
        return true;
    }

    has_cancel_keyword(&record.raw_text.to_uppercase())
}

/// Outcome of looking a plate up among one client's policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlateVerdict<'a> {
    Active(&'a PolicyRecord),
    Inactive(&'a PolicyRecord),
    NotFound,
}

/// Matches the plate and applies the validity gate to the matched block only.
pub fn verdict_for_plate<'a>(records: &'a [PolicyRecord], plate: &str) -> PlateVerdict<'a> {
    match find_by_plate(records, plate) {
        Some(record) if is_inactive(record) => PlateVerdict::Inactive(record),
        Some(record) => PlateVerdict::Active(record),
        None => PlateVerdict::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(raw: &str, plate: &str, status: PolicyStatus) -> PolicyRecord {
        PolicyRecord {
            plate: plate.to_string(),
            status,
            raw_text: raw.to_string(),
            description: raw.to_string(),
            ..PolicyRecord::default()
        }
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_plate(" ab 123 cd ");
        assert_eq!(once, "AB123CD");
        assert_eq!(normalize_plate(&once), once);
    }

    #[test]
    fn query_is_case_and_whitespace_insensitive() {
        let records = vec![record("VIGENTE AB123CD", "AB123CD", PolicyStatus::Active)];
        for query in ["ab123cd", " AB 123 CD", "Ab123Cd\t"] {
            assert!(find_by_plate(&records, query).is_some(), "{query}");
        }
        assert!(find_by_plate(&records, "   ").is_none());
    }

    #[test]
    fn exact_plate_wins_among_containing_blocks() {
        let records = vec![
            record("VIGENTE ABC1234", "ABC1234", PolicyStatus::Active),
            record("VIGENTE ABC123", "ABC123", PolicyStatus::Active),
        ];
        let found = find_by_plate(&records, "ABC123").expect("match");
        assert_eq!(found.plate, "ABC123");
    }

    #[test]
    fn containment_covers_missing_extraction() {
        let records = vec![
            record("VIGENTE XYZ789", "XYZ789", PolicyStatus::Active),
            record("VIGENTE patente ab123cd", "", PolicyStatus::Active),
        ];
        let found = find_by_plate(&records, "AB123CD").expect("match");
        assert!(found.raw_text.contains("ab123cd"));
    }

    #[test]
    fn first_block_wins_ties() {
        let records = vec![
            record("ANULADA AAA111", "", PolicyStatus::Cancelled),
            record("VIGENTE AAA111", "", PolicyStatus::Active),
        ];
        let found = find_by_plate(&records, "AAA111").expect("match");
        assert_eq!(found.status, PolicyStatus::Cancelled);
    }

    #[test]
    fn extracted_plate_is_the_last_resort() {
        let records = vec![record("sin patente en texto", "QQQ999", PolicyStatus::Active)];
        assert!(find_by_plate(&records, "qqq999").is_some());
        assert!(find_by_plate(&records, "ZZZ000").is_none());
    }

    #[test]
    fn any_cancellation_keyword_makes_a_block_inactive() {
        let expiring = PolicyStatus::Expiring { days: 3 };
        assert!(is_inactive(&record("VENCE 3D BAJA", "", expiring)));
        assert!(is_inactive(&record("VENCE 3D ANULADA", "", expiring)));
        assert!(is_inactive(&record("", "", PolicyStatus::Cancelled)));
        assert!(!is_inactive(&record("VENCE 3D", "", expiring)));
    }

    #[test]
    fn words_containing_a_keyword_do_not_cancel() {
        let active = record("VIGENTE | TRABAJA EN RUTA | AAA111", "AAA111", PolicyStatus::Active);
        assert!(!is_inactive(&active));
        assert!(matches!(
            verdict_for_plate(std::slice::from_ref(&active), "AAA111"),
            PlateVerdict::Active(_)
        ));
    }
}
