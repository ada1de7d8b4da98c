use std::cmp::Ordering;

use crate::domain::record::{Record, Stats, normalize_label};
use crate::refresh::Snapshot;

pub const NO_SUBJECT: &str = "No Subject";
pub const CHART_ROWS: usize = 6;
/// Smallest bar drawn for a non-empty category, in percent.
pub const MIN_BAR_PERCENT: f64 = 2.0;

const MAIL_LINK_BASE: &str = "https://mail.google.com/mail/u/0/#inbox/";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LabelFilter {
    #[default]
    All,
    Only(String),
}

impl LabelFilter {
    pub fn matches(&self, r: &Record) -> bool {
        match self {
            LabelFilter::All => true,
            LabelFilter::Only(label) => normalize_label(&r.label) == label,
        }
    }

    /// Next filter in the cycle All -> labels[0] -> ... -> All.
    pub fn next(&self, labels: &[String]) -> LabelFilter {
        let pos = match self {
            LabelFilter::All => None,
            LabelFilter::Only(l) => labels.iter().position(|x| x == l),
        };
        let next = match (self, pos) {
            (LabelFilter::All, _) => 0,
            (_, Some(i)) => i + 1,
            // Current label vanished after a refresh.
            (_, None) => labels.len(),
        };
        labels
            .get(next)
            .map(|l| LabelFilter::Only(l.clone()))
            .unwrap_or(LabelFilter::All)
    }

    pub fn title(&self) -> &str {
        match self {
            LabelFilter::All => "All Categories",
            LabelFilter::Only(l) => l.as_str(),
        }
    }
}

/// Higher numeric ids first; ids without a leading digit after them, by
/// descending text. Equal numeric prefixes keep their feed order.
fn newest_first(a: &Record, b: &Record) -> Ordering {
    match (a.numeric_id(), b.numeric_id()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.id.cmp(&a.id),
    }
}

pub fn sort_newest_first(records: &[Record]) -> Vec<&Record> {
    let mut out: Vec<&Record> = records.iter().collect();
    out.sort_by(|a, b| newest_first(a, b));
    out
}

/// Labels in the order they first appear in `records`.
pub fn distinct_labels(records: &[&Record]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for r in records {
        let l = normalize_label(&r.label);
        if !labels.iter().any(|x| x == l) {
            labels.push(l.to_string());
        }
    }
    labels
}

pub fn filter_records<'a>(records: &[&'a Record], filter: &LabelFilter) -> Vec<&'a Record> {
    records.iter().copied().filter(|r| filter.matches(r)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelGroup<'a> {
    pub label: String,
    pub records: Vec<&'a Record>,
}

/// Group an already newest-first list by label, keeping that order inside
/// each group and ordering the groups by first appearance.
pub fn group_by_label<'a>(records: &[&'a Record]) -> Vec<LabelGroup<'a>> {
    let mut groups: Vec<LabelGroup<'a>> = Vec::new();
    for &r in records {
        let label = normalize_label(&r.label);
        match groups.iter_mut().find(|g| g.label == label) {
            Some(g) => g.records.push(r),
            None => groups.push(LabelGroup {
                label: label.to_string(),
                records: vec![r],
            }),
        }
    }
    groups
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

impl ChartRow {
    pub fn bar_percent(&self) -> f64 {
        self.percent.max(MIN_BAR_PERCENT)
    }

    pub fn rounded_percent(&self) -> u64 {
        self.percent.round() as u64
    }
}

/// Largest categories first, at most `limit` of them. Percentages are taken
/// against every category, not just the rows returned.
pub fn chart_rows(stats: &Stats, limit: usize) -> Vec<ChartRow> {
    let total: usize = stats.categories.values().sum();
    let mut rows: Vec<ChartRow> = stats
        .categories
        .iter()
        .map(|(label, &count)| ChartRow {
            label: label.clone(),
            count,
            percent: if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    rows.truncate(limit);
    rows
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListSummary {
    pub total: usize,
    pub categories: usize,
    pub largest: usize,
    /// Newest id across the whole feed, not only the filtered rows.
    pub latest_id: Option<String>,
}

pub fn list_summary(sorted: &[&Record], filtered: &[&Record]) -> ListSummary {
    let groups = group_by_label(filtered);
    ListSummary {
        total: filtered.len(),
        categories: groups.len(),
        largest: groups.iter().map(|g| g.records.len()).max().unwrap_or(0),
        latest_id: sorted.first().map(|r| r.id.clone()),
    }
}

/// Share of records carrying a real label, in percent.
pub fn classification_rate(stats: &Stats) -> f64 {
    if stats.total == 0 {
        return 0.0;
    }
    stats.labeled as f64 / stats.total as f64 * 100.0
}

pub fn headline(stats: &Stats) -> String {
    format!(
        "Analyzing {} emails. {} are classified, {} need attention.",
        stats.total, stats.labeled, stats.unlabeled
    )
}

pub fn display_subject(r: &Record) -> &str {
    if r.subject.trim().is_empty() { NO_SUBJECT } else { r.subject.as_str() }
}

pub fn display_label(r: &Record) -> &str {
    normalize_label(&r.label)
}

/// First two characters of the mailbox name, upper-cased.
pub fn sender_initials(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    local.chars().take(2).collect::<String>().to_uppercase()
}

pub fn mail_link(id: &str) -> String {
    format!("{MAIL_LINK_BASE}{}", id.trim())
}

/// Everything the dashboard draws, derived from one snapshot.
#[derive(Debug, Clone)]
pub struct DashboardView<'a> {
    pub sorted: Vec<&'a Record>,
    pub labels: Vec<String>,
    pub filtered: Vec<&'a Record>,
    pub groups: Vec<LabelGroup<'a>>,
    pub summary: ListSummary,
    pub chart: Vec<ChartRow>,
    pub classification_rate: f64,
    pub headline: String,
}

impl<'a> DashboardView<'a> {
    pub fn build(snapshot: &'a Snapshot, filter: &LabelFilter) -> Self {
        let sorted = sort_newest_first(&snapshot.records);
        let labels = distinct_labels(&sorted);
        let filtered = filter_records(&sorted, filter);
        let groups = group_by_label(&filtered);
        let summary = list_summary(&sorted, &filtered);

        Self {
            chart: chart_rows(&snapshot.stats, CHART_ROWS),
            classification_rate: classification_rate(&snapshot.stats),
            headline: headline(&snapshot.stats),
            sorted,
            labels,
            filtered,
            groups,
            summary,
        }
    }

    /// Rows in display order: grouped under "All", flat otherwise.
    pub fn rows(&self, filter: &LabelFilter) -> Vec<&'a Record> {
        match filter {
            LabelFilter::All => self
                .groups
                .iter()
                .flat_map(|g| g.records.iter().copied())
                .collect(),
            LabelFilter::Only(_) => self.filtered.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{aggregate, parse_records};
    use crate::domain::record::UNLABELED;
    use std::sync::Arc;

    fn rec(id: &str, label: &str) -> Record {
        Record {
            id: id.to_string(),
            sender_email: "someone@x.com".to_string(),
            subject: format!("subject {id}"),
            label: label.to_string(),
            timestamp: String::new(),
        }
    }

    fn ids(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_sort_numeric_ids_descending() {
        let records = vec![rec("2", "A"), rec("10", "A"), rec("1", "A")];
        assert_eq!(ids(&sort_newest_first(&records)), vec!["10", "2", "1"]);
    }

    #[test]
    fn test_sort_non_numeric_ids_last() {
        let records = vec![rec("abc", "A"), rec("5", "A"), rec("xyz", "A"), rec("7", "A")];
        assert_eq!(
            ids(&sort_newest_first(&records)),
            vec!["7", "5", "xyz", "abc"]
        );
    }

    #[test]
    fn test_sort_by_leading_digits_of_hex_ids() {
        let records = vec![rec("9f1", "A"), rec("18c4", "A"), rec("ab", "A"), rec("18", "A")];
        assert_eq!(
            ids(&sort_newest_first(&records)),
            vec!["18c4", "18", "9f1", "ab"]
        );
    }

    #[test]
    fn test_distinct_labels_and_groups() {
        let records = vec![
            rec("1", "Spam"),
            rec("4", "Social"),
            rec("3", ""),
            rec("2", "Spam"),
        ];
        let sorted = sort_newest_first(&records);
        assert_eq!(distinct_labels(&sorted), vec!["Social", "Unlabeled", "Spam"]);

        let groups = group_by_label(&sorted);
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[2].label, "Spam");
        assert_eq!(ids(&groups[2].records), vec!["2", "1"]);
    }

    #[test]
    fn test_filter_by_label() {
        let records = vec![rec("1", "Spam"), rec("2", ""), rec("3", "Spam")];
        let sorted = sort_newest_first(&records);

        let spam = filter_records(&sorted, &LabelFilter::Only("Spam".into()));
        assert_eq!(ids(&spam), vec!["3", "1"]);

        let unlabeled = filter_records(&sorted, &LabelFilter::Only(UNLABELED.into()));
        assert_eq!(ids(&unlabeled), vec!["2"]);

        assert_eq!(filter_records(&sorted, &LabelFilter::All).len(), 3);
    }

    #[test]
    fn test_filter_cycle() {
        let labels = vec!["Spam".to_string(), "Social".to_string()];
        let f = LabelFilter::All.next(&labels);
        assert_eq!(f, LabelFilter::Only("Spam".into()));
        let f = f.next(&labels);
        assert_eq!(f, LabelFilter::Only("Social".into()));
        assert_eq!(f.next(&labels), LabelFilter::All);

        assert_eq!(LabelFilter::Only("Gone".into()).next(&labels), LabelFilter::All);
        assert_eq!(LabelFilter::All.next(&[]), LabelFilter::All);
    }

    #[test]
    fn test_chart_rows_limit_and_percent() {
        let mut records = Vec::new();
        for (i, label) in ["A", "B", "B", "C", "D", "E", "F", "G", "G", "G"]
            .iter()
            .enumerate()
        {
            records.push(rec(&i.to_string(), label));
        }
        let rows = chart_rows(&aggregate(&records), CHART_ROWS);

        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].label, "G");
        assert_eq!(rows[0].count, 3);
        assert_eq!(rows[0].rounded_percent(), 30);
        assert_eq!(rows[1].label, "B");
        // Ties sorted by label.
        assert_eq!(rows[2].label, "A");
    }

    #[test]
    fn test_chart_rows_empty_and_min_bar() {
        assert!(chart_rows(&Stats::default(), CHART_ROWS).is_empty());

        let row = ChartRow {
            label: "tiny".into(),
            count: 1,
            percent: 0.5,
        };
        assert_eq!(row.bar_percent(), MIN_BAR_PERCENT);
    }

    #[test]
    fn test_list_summary_uses_global_latest_id() {
        let records = vec![rec("9", "Spam"), rec("3", "Social"), rec("4", "Social")];
        let sorted = sort_newest_first(&records);
        let social = filter_records(&sorted, &LabelFilter::Only("Social".into()));

        let s = list_summary(&sorted, &social);
        assert_eq!(s.total, 2);
        assert_eq!(s.categories, 1);
        assert_eq!(s.largest, 2);
        assert_eq!(s.latest_id.as_deref(), Some("9"));

        assert_eq!(list_summary(&[], &[]), ListSummary::default());
    }

    #[test]
    fn test_rate_and_headline() {
        let stats = aggregate(&parse_records(
            "id,sender,subject,label\n3,a@x.com,Hi,Spam\n2,b@x.com,Yo,\n1,c@x.com,Hey,Spam",
        ));
        assert_eq!(format!("{:.1}", classification_rate(&stats)), "66.7");
        assert_eq!(
            headline(&stats),
            "Analyzing 3 emails. 2 are classified, 1 need attention."
        );
        assert_eq!(classification_rate(&Stats::default()), 0.0);
    }

    #[test]
    fn test_display_helpers() {
        let mut r = rec("17", "");
        r.subject = "  ".into();
        assert_eq!(display_subject(&r), NO_SUBJECT);
        assert_eq!(display_label(&r), UNLABELED);

        assert_eq!(sender_initials("jane.doe@example.com"), "JA");
        assert_eq!(sender_initials("x@example.com"), "X");
        assert_eq!(sender_initials(""), "");
        assert_eq!(mail_link(" 17 "), "https://mail.google.com/mail/u/0/#inbox/17");
    }

    #[test]
    fn test_dashboard_view_rows() {
        let records = vec![rec("1", "Spam"), rec("3", "Social"), rec("2", "Spam")];
        let snapshot = Snapshot {
            stats: Arc::new(aggregate(&records)),
            records: Arc::new(records),
            ..Snapshot::default()
        };

        let view = DashboardView::build(&snapshot, &LabelFilter::All);
        assert_eq!(view.labels, vec!["Social", "Spam"]);
        assert_eq!(ids(&view.rows(&LabelFilter::All)), vec!["3", "2", "1"]);

        let spam = LabelFilter::Only("Spam".into());
        let view = DashboardView::build(&snapshot, &spam);
        assert_eq!(ids(&view.rows(&spam)), vec!["2", "1"]);
        assert_eq!(view.summary.latest_id.as_deref(), Some("3"));
    }
}
