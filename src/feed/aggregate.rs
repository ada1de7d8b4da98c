use crate::domain::record::{Record, Stats, normalize_label};

/// Summarize a record list. Pure: the same input always gives the same stats.
pub fn aggregate(records: &[Record]) -> Stats {
    let mut stats = Stats {
        total: records.len(),
        ..Stats::default()
    };

    for r in records {
        let label = normalize_label(&r.label);
        *stats.categories.entry(label.to_string()).or_insert(0) += 1;
        if r.is_labeled() {
            stats.labeled += 1;
        }
    }

    stats.unlabeled = stats.total - stats.labeled;
    stats
}
