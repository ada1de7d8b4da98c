use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Category assigned to rows the classifier has not labeled yet.
pub const UNLABELED: &str = "Unlabeled";

/// One classified (or unclassified) email reference from the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub sender_email: String,
    pub subject: String,
    pub label: String,
    /// RFC 3339 time of the parse pass that produced this record.
    pub timestamp: String,
}

impl Record {
    /// Numeric view of the id, used as a recency proxy.
    ///
    /// Reads the leading run of digits, so a hex message id such as
    /// `18c4f2` counts as 18. `None` when the id does not start with a digit.
    pub fn numeric_id(&self) -> Option<u64> {
        let id = self.id.trim();
        let end = id
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(id.len());
        id[..end].parse().ok()
    }

    pub fn is_labeled(&self) -> bool {
        normalize_label(&self.label) != UNLABELED
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total: usize,
    pub labeled: usize,
    pub unlabeled: usize,
    /// Count per label, in first-seen order.
    pub categories: IndexMap<String, usize>,
}

/// Folds an empty or blank label into [`UNLABELED`].
pub fn normalize_label(label: &str) -> &str {
    let trimmed = label.trim();
    if trimmed.is_empty() { UNLABELED } else { trimmed }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_id(id: &str) -> Record {
        Record {
            id: id.to_string(),
            sender_email: String::new(),
            subject: String::new(),
            label: String::new(),
            timestamp: String::new(),
        }
    }

    #[test]
    fn test_numeric_id_reads_leading_digits() {
        assert_eq!(with_id("42").numeric_id(), Some(42));
        assert_eq!(with_id(" 7 ").numeric_id(), Some(7));
        assert_eq!(with_id("18c4f2").numeric_id(), Some(18));
        assert_eq!(with_id("c418").numeric_id(), None);
        assert_eq!(with_id("").numeric_id(), None);
    }
}
