use std::collections::VecDeque;
use std::time::{Duration, Instant};

use ratatui::widgets::ListState;

use crate::dashboard::{DashboardView, LabelFilter};
use crate::domain::record::Record;
use crate::refresh::{Notice, Snapshot};

const MAX_TOASTS: usize = 3;

#[derive(Debug, Clone)]
pub struct Toast {
    pub notice: Notice,
    pub until: Instant,
}

pub struct AppState {
    pub snapshot: Snapshot,
    pub filter: LabelFilter,
    pub list_state: ListState,
    pub interval: Duration,

    pub toasts: VecDeque<Toast>,
    /// One-line message for local failures (e.g. browser could not open).
    pub status: Option<String>,
}

impl AppState {
    pub fn new(interval: Duration) -> Self {
        let mut s = Self {
            snapshot: Snapshot::default(),
            filter: LabelFilter::All,
            list_state: ListState::default(),
            interval,
            toasts: VecDeque::new(),
            status: None,
        };
        s.list_state.select(Some(0));
        s
    }

    pub fn view(&self) -> DashboardView<'_> {
        DashboardView::build(&self.snapshot, &self.filter)
    }

    pub fn row_count(&self) -> usize {
        self.view().rows(&self.filter).len()
    }

    /// Take a fresh snapshot and keep the selection inside the new rows.
    pub fn sync(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;

        let labels = self.view().labels;
        if let LabelFilter::Only(l) = &self.filter
            && !labels.contains(l)
        {
            self.filter = LabelFilter::All;
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.row_count();
        if len == 0 {
            self.list_state.select(None);
        } else {
            let cur = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some(cur.min(len - 1)));
        }
    }

    pub fn selected_record(&self) -> Option<Record> {
        let idx = self.list_state.selected()?;
        self.view().rows(&self.filter).get(idx).map(|r| (*r).clone())
    }

    pub fn move_selection(&mut self, delta: i32) {
        let len = self.row_count() as i32;
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let cur = self.list_state.selected().unwrap_or(0) as i32;
        let next = (cur + delta).clamp(0, len - 1) as usize;
        self.list_state.select(Some(next));
    }

    pub fn select_first(&mut self) {
        self.list_state.select(Some(0));
        self.clamp_selection();
    }

    pub fn select_last(&mut self) {
        let len = self.row_count();
        self.list_state.select(len.checked_sub(1));
    }

    pub fn cycle_filter(&mut self) {
        let labels = self.view().labels;
        self.filter = self.filter.next(&labels);
        self.select_first();
    }

    pub fn clear_filter(&mut self) {
        self.filter = LabelFilter::All;
        self.select_first();
    }

    pub fn push_toast(&mut self, notice: Notice, now: Instant) {
        let until = now + notice.display_for();
        self.toasts.push_back(Toast { notice, until });
        while self.toasts.len() > MAX_TOASTS {
            self.toasts.pop_front();
        }
    }

    pub fn expire_toasts(&mut self, now: Instant) {
        self.toasts.retain(|t| t.until > now);
    }
}
