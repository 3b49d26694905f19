//! Relationship resolver.
//!
//! CRM relation fields are one-directional, truncated, semicolon-
//! delimited title lists. This module reconstructs the symmetric
//! relationship graph: an adjacency structure keyed by title is built in
//! one pass over every record's raw reference lists, then each record's
//! relation fields are rewritten with the full, deduplicated, sorted set
//! of related titles.
//!
//! References to unknown titles (typos, deleted records) are dropped
//! silently. Self-references are preserved.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, instrument, warn};

use fieldpress_shared::{Record, RecordType, Result, TITLE_LIMIT};

/// Per-record relation sets, one per relation field.
type RelationSets = BTreeMap<&'static str, BTreeSet<String>>;

/// Resolve every relation field across the record set.
///
/// Requires global visibility: a record's backlinks can only be computed
/// with every other record in memory. After this runs, each relation
/// field holds a sorted, semicolon-joined list of full titles, and the
/// relation graph is symmetric.
#[instrument(skip_all, fields(records = records.len()))]
pub fn resolve_relationships(records: &mut [Record]) -> Result<()> {
    let full_titles = truncation_map(records);

    let mut relationships: BTreeMap<String, RelationSets> = records
        .iter()
        .map(|record| (record.title().to_string(), empty_sets()))
        .collect();

    // Backlink pass: record A referencing B under any relation field puts
    // A's title into B's set for A's own type bucket.
    for record in records.iter() {
        let this_title = record.title();
        let this_bucket = record.record_type()?.relation_field();

        for bucket in RecordType::ALL.map(RecordType::relation_field) {
            for reference in record.get(bucket).split(';') {
                let Some(that_title) = full_titles.get(reference) else {
                    if !reference.is_empty() {
                        debug!(reference, "dropping reference to unknown title");
                    }
                    continue;
                };
                if let Some(sets) = relationships.get_mut(that_title) {
                    sets.entry(this_bucket)
                        .or_default()
                        .insert(this_title.to_string());
                }
            }
        }
    }

    // Explicit pass: fold each record's own resolved references into its
    // own sets, in case the other side never declared the reverse link.
    for record in records.iter() {
        let Some(sets) = relationships.get_mut(record.title()) else {
            continue;
        };
        for bucket in RecordType::ALL.map(RecordType::relation_field) {
            for reference in record.get(bucket).split(';') {
                if let Some(full) = full_titles.get(reference) {
                    sets.entry(bucket).or_default().insert(full.clone());
                }
            }
        }
    }

    // Write-back: sorted, deduplicated, semicolon-joined.
    for record in records.iter_mut() {
        let Some(sets) = relationships.get(record.title()) else {
            continue;
        };
        for (bucket, titles) in sets {
            let joined = titles.iter().cloned().collect::<Vec<_>>().join(";");
            record.set(*bucket, joined);
        }
    }

    Ok(())
}

/// Build the title truncation map: the first [`TITLE_LIMIT`] characters
/// of every title → the full title. Every full title also maps to
/// itself, so references already holding a full over-limit title (a
/// previous resolution's write-back) resolve too — without this,
/// re-resolving a record set whose related titles all exceed the limit
/// would drop the relations instead of reaching a fixed point.
///
/// Titles are unique across the record set; a collision inside the
/// truncation window means two records are indistinguishable as
/// references, so the later one wins and we warn.
fn truncation_map(records: &[Record]) -> HashMap<String, String> {
    let mut full_titles = HashMap::with_capacity(records.len() * 2);

    for record in records {
        let title = record.title();
        let key: String = title.chars().take(TITLE_LIMIT).collect();
        if let Some(previous) = full_titles.insert(key, title.to_string()) {
            if previous != title {
                warn!(
                    title,
                    previous, "titles collide within the truncation window"
                );
            }
        }
        full_titles.insert(title.to_string(), title.to_string());
    }

    full_titles
}

fn empty_sets() -> RelationSets {
    RecordType::ALL
        .iter()
        .map(|t| (t.relation_field(), BTreeSet::new()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, record_type: &str) -> Record {
        let mut r = Record::new();
        r.set("title", title);
        r.set("type", record_type);
        r
    }

    fn relation_list(record: &Record, field: &str) -> Vec<String> {
        record
            .get(field)
            .split(';')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    #[test]
    fn backlink_created_on_referenced_record() {
        // A (Solution) lists "Equity" under values; V (Value) lists nothing.
        let mut a = record("Bike Share", "Solution");
        a.set("values", "Equity");
        let v = record("Equity", "Value");

        let mut records = vec![a, v];
        resolve_relationships(&mut records).expect("resolve");

        assert_eq!(relation_list(&records[0], "values"), ["Equity"]);
        assert_eq!(
            relation_list(&records[1], "related_solutions"),
            ["Bike Share"]
        );
    }

    #[test]
    fn symmetry_holds_across_the_set() {
        let mut a = record("Bike Share", "Solution");
        a.set("related_stories", "Car Free Day");
        let mut b = record("Car Free Day", "Story");
        b.set("related_theories", "Degrowth");
        let c = record("Degrowth", "Theory");

        let mut records = vec![a, b, c];
        resolve_relationships(&mut records).expect("resolve");

        // A ↔ B
        assert!(relation_list(&records[0], "related_stories").contains(&"Car Free Day".into()));
        assert!(relation_list(&records[1], "related_solutions").contains(&"Bike Share".into()));
        // B ↔ C
        assert!(relation_list(&records[1], "related_theories").contains(&"Degrowth".into()));
        assert!(relation_list(&records[2], "related_stories").contains(&"Car Free Day".into()));
    }

    #[test]
    fn resolution_is_idempotent() {
        let mut a = record("Bike Share", "Solution");
        a.set("values", "Equity;Solidarity");
        let v = record("Equity", "Value");
        let w = record("Solidarity", "Value");

        let mut records = vec![a, v, w];
        resolve_relationships(&mut records).expect("resolve");
        let after_first = records.clone();

        resolve_relationships(&mut records).expect("resolve again");
        assert_eq!(records, after_first);
    }

    #[test]
    fn resolution_is_idempotent_with_over_limit_titles() {
        // Both ends exceed the truncation window, so after the first
        // resolution each record holds the other's full title — the
        // second pass must resolve those full titles as-is
        let solution_title = "A Very Long Solution Title That Exceeds The Limit";
        let story_title = "An Equally Long Story Title That Also Exceeds The Limit";
        assert!(solution_title.chars().count() > TITLE_LIMIT);
        assert!(story_title.chars().count() > TITLE_LIMIT);

        let a = record(solution_title, "Solution");
        let mut b = record(story_title, "Story");
        let truncated: String = solution_title.chars().take(TITLE_LIMIT).collect();
        b.set("related_solutions", &truncated);

        let mut records = vec![a, b];
        resolve_relationships(&mut records).expect("resolve");

        assert_eq!(
            relation_list(&records[0], "related_stories"),
            [story_title]
        );
        assert_eq!(
            relation_list(&records[1], "related_solutions"),
            [solution_title]
        );

        let after_first = records.clone();
        resolve_relationships(&mut records).expect("resolve again");
        assert_eq!(records, after_first);
    }

    #[test]
    fn truncated_reference_expands_to_full_title() {
        let long_title = "A Very Long Solution Title That Exceeds The Limit";
        let truncated: String = long_title.chars().take(TITLE_LIMIT).collect();
        assert!(long_title.chars().count() > TITLE_LIMIT);

        let a = record(long_title, "Solution");
        let mut b = record("Car Free Day", "Story");
        b.set("related_solutions", &truncated);

        let mut records = vec![a, b];
        resolve_relationships(&mut records).expect("resolve");

        assert_eq!(
            relation_list(&records[1], "related_solutions"),
            [long_title]
        );
        assert_eq!(
            relation_list(&records[0], "related_stories"),
            ["Car Free Day"]
        );
    }

    #[test]
    fn unknown_references_are_dropped_silently() {
        let mut a = record("Bike Share", "Solution");
        a.set("values", "Equity;No Such Record");
        let v = record("Equity", "Value");

        let mut records = vec![a, v];
        resolve_relationships(&mut records).expect("resolve");

        assert_eq!(relation_list(&records[0], "values"), ["Equity"]);
        for r in &records {
            for bucket in RecordType::ALL.map(RecordType::relation_field) {
                assert!(!r.get(bucket).contains("No Such Record"));
            }
        }
    }

    #[test]
    fn relation_lists_are_sorted_and_deduplicated() {
        let mut a = record("Bike Share", "Solution");
        a.set("values", "Solidarity;Equity;Equity");
        let v = record("Equity", "Value");
        let w = record("Solidarity", "Value");

        let mut records = vec![a, v, w];
        resolve_relationships(&mut records).expect("resolve");

        assert_eq!(
            relation_list(&records[0], "values"),
            ["Equity", "Solidarity"]
        );
    }

    #[test]
    fn self_reference_is_preserved() {
        let mut a = record("Bike Share", "Solution");
        a.set("related_solutions", "Bike Share");

        let mut records = vec![a];
        resolve_relationships(&mut records).expect("resolve");

        assert_eq!(
            relation_list(&records[0], "related_solutions"),
            ["Bike Share"]
        );
    }

    #[test]
    fn unknown_record_type_is_fatal() {
        let mut records = vec![record("Mystery", "Essay")];
        let err = resolve_relationships(&mut records).unwrap_err();
        assert!(err.to_string().contains("Essay"));
    }
}
