use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use gc_feed::LogEntry;

use crate::constants::QUOTA_PER_UNIT;
use crate::state::{FILTER_FIELD_ORDER, FilterField, FilterForm, State};

mod theme {
    use ratatui::style::Color;

    pub const ACCENT: Color = Color::Rgb(218, 118, 89);
    pub const SUCCESS: Color = Color::Rgb(134, 188, 111);
    pub const WARNING: Color = Color::Rgb(229, 192, 123);
    pub const ERROR: Color = Color::Rgb(224, 108, 117);

    pub const TEXT: Color = Color::Rgb(240, 240, 240);
    pub const TEXT_SECONDARY: Color = Color::Rgb(180, 180, 180);
    pub const TEXT_MUTED: Color = Color::Rgb(144, 144, 144);

    pub const BG_BASE: Color = Color::Rgb(34, 34, 32);
    pub const BG_SURFACE: Color = Color::Rgb(51, 51, 49);
    pub const BG_SELECTED: Color = Color::Rgb(66, 66, 64);
    pub const BORDER: Color = Color::Rgb(66, 66, 64);
}

/// Column widths for the log table (separators add one space each).
const COLS: &[(&str, usize)] = &[
    ("time", 14),
    ("type", 7),
    ("model", 22),
    ("user", 12),
    ("token", 12),
    ("prompt", 7),
    ("compl", 7),
    ("charge", 10),
];

pub fn render(frame: &mut Frame, state: &mut State) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(theme::BG_BASE)), area);

    let [header_area, filter_area, table_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area, state);
    render_filter_line(frame, filter_area, state);
    render_table(frame, table_area, state);
    render_status(frame, status_area, state);

    if state.detail_open {
        render_detail(frame, area, state);
    }
}

fn render_header(frame: &mut Frame, area: Rect, state: &State) {
    let cache = &state.feed.cache;
    let summary = format!(
        "{} logs · charge ${:.4} ",
        cache.total,
        cache.aggregate / QUOTA_PER_UNIT
    );
    let title = " gateway console · request logs";
    let pad = (area.width as usize)
        .saturating_sub(title.width())
        .saturating_sub(summary.width());
    let line = Line::from(vec![
        Span::styled(title, Style::default().fg(theme::ACCENT).bold()),
        Span::raw(" ".repeat(pad)),
        Span::styled(summary, Style::default().fg(theme::TEXT_SECONDARY)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_filter_line(frame: &mut Frame, area: Rect, state: &State) {
    let line = if let Some(form) = &state.filter_form {
        form_line(form)
    } else {
        let description = describe_filter(state);
        Line::from(vec![
            Span::styled(" filter ", Style::default().fg(theme::TEXT_MUTED)),
            Span::styled(description, Style::default().fg(theme::TEXT_SECONDARY)),
        ])
    };
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(theme::BG_SURFACE)),
        area,
    );
}

fn describe_filter(state: &State) -> String {
    let filter = &state.filter;
    let mut parts: Vec<String> = Vec::new();
    if let Some(kind) = filter.kind {
        parts.push(format!("type={}", kind));
    }
    if !filter.model_name.is_empty() {
        parts.push(format!("model~{}", filter.model_name));
    }
    if !filter.token_name.is_empty() {
        parts.push(format!("token={}", filter.token_name));
    }
    if !filter.username.is_empty() {
        parts.push(format!("user={}", filter.username));
    }
    if !filter.search.is_empty() {
        parts.push(format!("search={}", filter.search));
    }
    if filter.start_ts.is_some() || filter.end_ts.is_some() {
        parts.push("time-range".to_string());
    }
    if parts.is_empty() { "(none) — press f".to_string() } else { parts.join("  ") }
}

fn form_line(form: &FilterForm) -> Line<'static> {
    let mut spans = vec![Span::styled(" edit ", Style::default().fg(theme::WARNING))];
    for (index, field) in FILTER_FIELD_ORDER.iter().enumerate() {
        let (label, value) = match field {
            FilterField::Kind => {
                ("type", form.kind.map(|k| k.to_string()).unwrap_or_else(|| "all".into()))
            }
            FilterField::Model => ("model", form.model_name.clone()),
            FilterField::Token => ("token", form.token_name.clone()),
            FilterField::Username => ("user", form.username.clone()),
            FilterField::Search => ("search", form.search.clone()),
            FilterField::Start => ("from", form.start.clone()),
            FilterField::End => ("to", form.end.clone()),
        };
        let focused = index == form.focus % FILTER_FIELD_ORDER.len();
        let style = if focused {
            Style::default().fg(theme::TEXT).bg(theme::BG_SELECTED).bold()
        } else {
            Style::default().fg(theme::TEXT_SECONDARY)
        };
        spans.push(Span::styled(format!("{}:{}", label, value), style));
        spans.push(Span::raw("  "));
    }
    Line::from(spans)
}

fn render_table(frame: &mut Frame, area: Rect, state: &mut State) {
    let rows = (area.height as usize).saturating_sub(1).max(1);
    state.table_rows = rows;
    state.clamp_cursor();

    let mut lines: Vec<Line> = Vec::with_capacity(rows + 1);
    let header = COLS
        .iter()
        .map(|(label, width)| fit(label, *width))
        .collect::<Vec<_>>()
        .join(" ");
    lines.push(Line::from(Span::styled(
        header,
        Style::default().fg(theme::TEXT_MUTED).underlined(),
    )));

    let cache = &state.feed.cache;
    if cache.items.is_empty() {
        lines.push(Line::from(Span::styled(
            "  no logs match the current filter",
            Style::default().fg(theme::TEXT_MUTED),
        )));
    }

    for (index, entry) in cache.items.iter().enumerate().skip(state.scroll).take(rows) {
        let selected = index == state.cursor;
        let style = if selected {
            Style::default().fg(theme::TEXT).bg(theme::BG_SELECTED)
        } else {
            Style::default().fg(row_color(entry))
        };
        lines.push(Line::from(Span::styled(table_row(entry), style)));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn row_color(entry: &LogEntry) -> Color {
    match entry.kind {
        2 => theme::TEXT,
        5 => theme::ERROR,
        1 => theme::SUCCESS,
        _ => theme::TEXT_SECONDARY,
    }
}

fn table_row(entry: &LogEntry) -> String {
    let time = entry
        .created_local()
        .map(|dt| dt.format("%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "—".to_string());
    let cells = [
        fit(&time, COLS[0].1),
        fit(entry.kind_label(), COLS[1].1),
        fit(&entry.model_name, COLS[2].1),
        fit(&entry.username, COLS[3].1),
        fit(&entry.token_name, COLS[4].1),
        fit(&entry.prompt_tokens.to_string(), COLS[5].1),
        fit(&entry.completion_tokens.to_string(), COLS[6].1),
        fit(&format!("${:.4}", entry.quota as f64 / QUOTA_PER_UNIT), COLS[7].1),
    ];
    cells.join(" ")
}

fn render_status(frame: &mut Frame, area: Rect, state: &State) {
    let line = if let Some(toast) = &state.toast {
        Line::from(Span::styled(
            format!(" {}", toast.message),
            Style::default().fg(theme::ERROR),
        ))
    } else {
        let live = if state.feed.gate_open() {
            Span::styled("updates held (detail open)", Style::default().fg(theme::WARNING))
        } else {
            Span::styled("live", Style::default().fg(theme::SUCCESS))
        };
        Line::from(vec![
            Span::styled(
                " q quit · j/k move · Enter detail · f filter · r refresh   ",
                Style::default().fg(theme::TEXT_MUTED),
            ),
            live,
        ])
    };
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(theme::BG_SURFACE)),
        area,
    );
}

fn render_detail(frame: &mut Frame, area: Rect, state: &State) {
    let Some(entry) = state.feed.cache.items.get(state.cursor) else {
        return;
    };

    let popup = centered(area, 64, 12);
    frame.render_widget(Clear, popup);

    let time = entry
        .created_local()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let field = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:>12}  ", label), Style::default().fg(theme::TEXT_MUTED)),
            Span::styled(value, Style::default().fg(theme::TEXT)),
        ])
    };
    let mut lines = vec![
        field("id", entry.id.to_string()),
        field("time", time),
        field("type", entry.kind_label().to_string()),
        field("model", entry.model_name.clone()),
        field("user", entry.username.clone()),
        field("token", entry.token_name.clone()),
        field(
            "tokens",
            format!("{} prompt / {} completion", entry.prompt_tokens, entry.completion_tokens),
        ),
        field("charge", format!("${:.4}", entry.quota as f64 / QUOTA_PER_UNIT)),
    ];
    if !entry.content.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            entry.content.clone(),
            Style::default().fg(theme::TEXT_SECONDARY),
        )));
    }

    let block = Block::default()
        .title(" log detail (Esc to close) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER))
        .style(Style::default().bg(theme::BG_SURFACE));
    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), popup);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Truncate to `width` display columns (ellipsis on overflow) and pad.
fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        return format!("{}{}", text, " ".repeat(width - text.width()));
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width.saturating_sub(1) {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    used += 1;
    format!("{}{}", out, " ".repeat(width.saturating_sub(used)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_pads_short_and_truncates_long() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdefgh", 5), "abcd…");
        assert_eq!(fit("", 3), "   ");
    }

    #[test]
    fn fit_respects_wide_characters() {
        // Each CJK glyph is two columns wide.
        let out = fit("日本語テスト", 7);
        assert_eq!(out.width(), 7);
        assert!(out.ends_with('…'));
    }
}
