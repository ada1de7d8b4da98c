//! View model derived from a refresh snapshot: ordering, filtering, grouping,
//! chart rows and summary figures. Rendering lives in `terminal`.

pub mod view;

pub use view::{
    ChartRow, DashboardView, LabelFilter, LabelGroup, ListSummary, chart_rows,
    classification_rate, display_label, display_subject, headline, mail_link, sender_initials,
    sort_newest_first,
};
