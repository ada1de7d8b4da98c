use chrono::Local;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap,
    },
};

use crate::dashboard::{
    DashboardView, LabelFilter, display_label, display_subject, sender_initials,
};
use crate::domain::record::Record;
use crate::refresh::{NoticeKind, Phase};
use crate::terminal::state::AppState;

const TOAST_WIDTH: u16 = 46;
const TOAST_HEIGHT: u16 = 4;

pub fn label_color(label: &str) -> Color {
    match label {
        "Customer Support" | "Primary" => Color::Blue,
        "Spam" => Color::Red,
        "Promotional" => Color::Magenta,
        "Newsletter" | "Forums" => Color::Green,
        "Social" => Color::Yellow,
        "Updates" => Color::LightRed,
        _ => Color::Gray,
    }
}

pub fn render(f: &mut Frame, state: &AppState) {
    let view = state.view();
    let banner_height = if state.snapshot.error.is_some() { 3 } else { 0 };

    let [header, banner, top, list_area, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(banner_height),
        Constraint::Length(10),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .areas(f.area());

    render_header(f, header, state, &view);
    if let Some(err) = &state.snapshot.error {
        render_error(f, banner, err, state.snapshot.records.len());
    }

    let [cards, chart] =
        Layout::horizontal([Constraint::Percentage(33), Constraint::Percentage(67)]).areas(top);
    render_cards(f, cards, state, &view);
    render_chart(f, chart, &view);

    render_list(f, list_area, state, &view);
    render_footer(f, footer, state);
    render_toasts(f, state);
}

fn render_header(f: &mut Frame, area: Rect, state: &AppState, view: &DashboardView<'_>) {
    let status = match state.snapshot.phase() {
        Phase::Loading => Span::styled(" ⟳ Syncing... ", Style::default().fg(Color::Yellow)),
        _ => Span::styled(" s: Sync Now ", Style::default().fg(Color::DarkGray)),
    };

    let block = Block::default()
        .title(" Email Classification Dashboard ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let p = Paragraph::new(Line::from(vec![
        Span::raw(view.headline.clone()),
        Span::raw("  "),
        status,
    ]))
    .block(block);
    f.render_widget(p, area);
}

fn render_error(f: &mut Frame, area: Rect, err: &str, kept: usize) {
    let mut spans = vec![
        Span::styled("⚠ ", Style::default().fg(Color::Red)),
        Span::styled(err.to_string(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("   press "),
        Span::styled("r", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" to retry"),
    ];
    if kept > 0 {
        spans.push(Span::styled(
            format!("  (showing {kept} emails from the last sync)"),
            Style::default().fg(Color::Gray),
        ));
    }

    let p = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(p, area);
}

fn render_cards(f: &mut Frame, area: Rect, state: &AppState, view: &DashboardView<'_>) {
    let stats = &state.snapshot.stats;
    let [total, classified] =
        Layout::vertical([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

    let card = |title: &'static str, value: usize, note: Span<'static>| {
        Paragraph::new(Text::from(vec![
            Line::from(Span::styled(
                value.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(note),
        ]))
        .block(
            Block::default()
                .title(format!(" {title} "))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
    };

    f.render_widget(
        card(
            "Total Emails",
            stats.total,
            Span::styled("From the feed", Style::default().fg(Color::Gray)),
        ),
        total,
    );
    f.render_widget(
        card(
            "Classified",
            stats.labeled,
            Span::styled(
                format!("{:.1}% accuracy", view.classification_rate),
                Style::default().fg(Color::Green),
            ),
        ),
        classified,
    );
}

fn render_chart(f: &mut Frame, area: Rect, view: &DashboardView<'_>) {
    let total: usize = view.chart.iter().map(|r| r.count).sum();
    let block = Block::default()
        .title(" Email Distribution ")
        .title_bottom(Line::from(format!(" {total} shown ")).alignment(Alignment::Center))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    if view.chart.is_empty() {
        let p = Paragraph::new("No data yet")
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let bars: Vec<Bar> = view
        .chart
        .iter()
        .map(|row| {
            Bar::default()
                .label(Line::from(row.label.clone()))
                .value(row.bar_percent().round() as u64)
                .text_value(format!("{} ({}%)", row.count, row.rounded_percent()))
                .style(Style::default().fg(label_color(&row.label)))
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .max(100)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, area);
}

fn email_item(r: &Record) -> ListItem<'static> {
    let label = display_label(r);
    let first = Line::from(vec![
        Span::styled(
            format!("[{:<2}] ", sender_initials(&r.sender_email)),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            r.sender_email.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!(" {label} "),
            Style::default().fg(Color::Black).bg(label_color(label)),
        ),
    ]);
    let second = Line::from(vec![
        Span::raw("     "),
        Span::raw(display_subject(r).to_string()),
        Span::styled(format!("  ID: {}", r.id), Style::default().fg(Color::Gray)),
    ]);
    ListItem::new(Text::from(vec![first, second]))
}

fn group_header(label: &str, count: usize) -> ListItem<'static> {
    ListItem::new(Line::from(vec![
        Span::styled("● ", Style::default().fg(label_color(label))),
        Span::styled(
            label.to_string(),
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        ),
        Span::styled(format!(" ({count})"), Style::default().fg(Color::Gray)),
    ]))
}

fn render_list(f: &mut Frame, area: Rect, state: &AppState, view: &DashboardView<'_>) {
    let s = &view.summary;
    let summary = format!(
        " Total Emails {} · Categories {} · Largest Category {} · Latest Email ID {} ",
        s.total,
        s.categories,
        s.largest,
        s.latest_id.as_deref().unwrap_or("—")
    );
    let block = Block::default()
        .title(format!(" Email Classification · {} ", state.filter.title()))
        .title_bottom(Line::from(summary))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    if view.filtered.is_empty() {
        let msg = match state.snapshot.phase() {
            Phase::Idle | Phase::Loading if state.snapshot.last_synced.is_none() => {
                "Loading emails..."
            }
            _ => "No emails found",
        };
        let p = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(p, area);
        return;
    }

    // Group headers are items too, so map the selected row onto its item.
    let selected_row = state.list_state.selected();
    let mut items = Vec::new();
    let mut selected_item = None;
    let mut row = 0;
    let mut push_row = |items: &mut Vec<ListItem<'static>>, r: &Record| {
        if selected_row == Some(row) {
            selected_item = Some(items.len());
        }
        items.push(email_item(r));
        row += 1;
    };

    match &state.filter {
        LabelFilter::All => {
            for g in &view.groups {
                items.push(group_header(&g.label, g.records.len()));
                for r in &g.records {
                    push_row(&mut items, *r);
                }
            }
        }
        LabelFilter::Only(_) => {
            for r in &view.filtered {
                push_row(&mut items, *r);
            }
        }
    }

    let list = List::new(items)
        .block(block)
        .highlight_symbol("➜ ")
        .highlight_style(Style::default().fg(Color::Green));

    let mut list_state = ListState::default();
    list_state.select(selected_item);
    f.render_stateful_widget(list, area, &mut list_state);
}

fn render_footer(f: &mut Frame, area: Rect, state: &AppState) {
    if let Some(msg) = &state.status {
        let p = Paragraph::new(Span::styled(msg.clone(), Style::default().fg(Color::Red)));
        f.render_widget(p, area);
        return;
    }

    let updated = state
        .snapshot
        .last_synced
        .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "never".to_string());

    let [keys, info] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(56)]).areas(area);

    let hint = Paragraph::new(Line::from(vec![
        Span::styled("j/k", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" move  "),
        Span::styled("f", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" filter  "),
        Span::styled("s", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" sync  "),
        Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" open  "),
        Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" quit"),
    ]));
    f.render_widget(hint, keys);

    let sync = Paragraph::new(Span::styled(
        format!(
            "Auto-syncing every {} seconds · Last updated: {updated}",
            state.interval.as_secs()
        ),
        Style::default().fg(Color::DarkGray),
    ))
    .alignment(Alignment::Right);
    f.render_widget(sync, info);
}

fn render_toasts(f: &mut Frame, state: &AppState) {
    let screen = f.area();
    if screen.width < TOAST_WIDTH + 2 {
        return;
    }

    for (i, toast) in state.toasts.iter().rev().enumerate() {
        let y = 1 + i as u16 * TOAST_HEIGHT;
        if y + TOAST_HEIGHT > screen.height {
            break;
        }
        let area = Rect::new(screen.width - TOAST_WIDTH - 1, y, TOAST_WIDTH, TOAST_HEIGHT);
        let color = match toast.notice.kind {
            NoticeKind::Success => Color::Green,
            NoticeKind::Failure => Color::Red,
        };

        let p = Paragraph::new(toast.notice.message.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(format!(" {} ", toast.notice.title))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            );
        f.render_widget(Clear, area);
        f.render_widget(p, area);
    }
}
