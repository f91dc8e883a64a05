use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap};

use crate::connect::connector::{ConnectorLayout, Flow};
use crate::connect::measure::{Bounds, Measurements};
use crate::connect::route;
use crate::selection::path::{SelectionPath, Stamp};
use crate::selection::reorder::Column;
use crate::tree::model::{Item, Level};

/// Columns leave this many cells between them for connector routes.
const CONNECTOR_GAP: u16 = 5;
/// Width of the column frame between an item and the connector gap.
const COLUMN_FRAME: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidePanel {
    Results,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct ColumnView<'a> {
    pub column: Column<'a>,
    pub title: &'a str,
    /// Cursor row in display order; `Some` only for the focused column.
    pub cursor: Option<usize>,
    pub scroll: usize,
    pub empty_hint: String,
}

#[derive(Debug)]
pub struct TreeRenderData<'a> {
    pub columns: &'a [ColumnView<'a>],
    pub path: &'a SelectionPath,
    pub stamp: Stamp,
    /// `(level name, item name)` for every selected level.
    pub breadcrumb: &'a [(&'a str, &'a str)],
    pub scenario: Option<&'a str>,
    pub side_panel: SidePanel,
    pub refresh_count: u64,
    pub assistant_prompt: Option<&'a str>,
    pub toast: Option<&'a str>,
    pub hints: &'a str,
    pub message: Option<&'a str>,
    pub show_help: bool,
    pub show_descriptions: bool,
    pub show_connectors: bool,
    pub demo: bool,
}

/// What the layout pass learned that the app needs back.
#[derive(Debug, Clone, Default)]
pub struct DrawOutcome {
    pub measurements: Measurements,
    /// First rendered row per level after keeping the cursor in view.
    pub scroll: [usize; 4],
}

pub fn draw(frame: &mut Frame, data: &TreeRenderData<'_>) -> DrawOutcome {
    let area = frame.area().inner(Margin {
        horizontal: 1,
        vertical: 0,
    });

    let mut title_spans = vec![
        Span::styled("techtree view", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled("[?] help", Style::default().fg(Color::DarkGray)),
        Span::raw("  "),
        Span::styled("[q] quit", Style::default().fg(Color::DarkGray)),
    ];
    if data.demo {
        title_spans.push(Span::raw("  "));
        title_spans.push(Span::styled(
            "[DEMO]",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::DarkGray))
        .padding(Padding::new(1, 1, 0, 0))
        .title(Line::from(title_spans));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let scenario_height = u16::from(data.scenario.is_some());
    let [scenario_area, path_area, body_area, status_area] = Layout::vertical([
        Constraint::Length(scenario_height),
        Constraint::Length(1),
        Constraint::Min(6),
        Constraint::Length(4),
    ])
    .areas(inner);

    if let Some(scenario) = data.scenario {
        let line = Line::from(vec![
            Span::styled(
                "SCENARIO ",
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                truncate_text(scenario, usize::from(scenario_area.width).saturating_sub(9)),
                Style::default().fg(Color::Gray),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), scenario_area);
    }
    frame.render_widget(Paragraph::new(breadcrumb_line(data.breadcrumb)), path_area);

    let [tree_area, _, side_area] = Layout::horizontal([
        Constraint::Fill(3),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(body_area);

    let outcome = draw_columns(frame, tree_area, data);
    if data.show_connectors {
        draw_connectors(frame, data, &outcome.measurements);
    }
    draw_side_panel(frame, side_area, data);
    draw_status(frame, status_area, data);

    if data.show_help {
        render_help_overlay(frame);
    }
    outcome
}

fn breadcrumb_line(breadcrumb: &[(&str, &str)]) -> Line<'static> {
    if breadcrumb.is_empty() {
        return Line::from(Span::styled(
            "No selection yet",
            Style::default().fg(Color::DarkGray),
        ));
    }
    let mut spans = Vec::new();
    for (idx, (level_name, item_name)) in breadcrumb.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  ›  ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(
            format!("{level_name}: "),
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(Span::styled(
            item_name.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

fn draw_columns(frame: &mut Frame, area: Rect, data: &TreeRenderData<'_>) -> DrawOutcome {
    let mut outcome = DrawOutcome {
        measurements: Measurements::new(data.stamp, Bounds::from(area)),
        scroll: [0; 4],
    };
    let mut constraints = Vec::with_capacity(data.columns.len() * 2);
    for idx in 0..data.columns.len() {
        if idx > 0 {
            constraints.push(Constraint::Length(CONNECTOR_GAP));
        }
        constraints.push(Constraint::Fill(1));
    }
    let rects = Layout::horizontal(constraints).split(area);
    let item_height: u16 = if data.show_descriptions { 4 } else { 3 };

    for (idx, view) in data.columns.iter().enumerate() {
        let level = view.column.level;
        let column_area = rects[idx * 2];
        let focused = view.cursor.is_some();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(if focused {
                Color::White
            } else {
                Color::DarkGray
            }))
            .title(Line::from(vec![
                Span::styled(
                    format!("LEVEL {}", level.number()),
                    if focused {
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                    } else {
                        Style::default()
                            .fg(Color::Gray)
                            .add_modifier(Modifier::BOLD)
                    },
                ),
                Span::raw("  "),
                Span::styled(view.title.to_string(), Style::default().fg(Color::DarkGray)),
            ]));
        let inner = block.inner(column_area);
        frame.render_widget(block, column_area);

        if view.column.items.is_empty() {
            let hint = Paragraph::new(Span::styled(
                view.empty_hint.clone(),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ))
            .wrap(Wrap { trim: true });
            frame.render_widget(hint, inner);
            continue;
        }

        let capacity = usize::from(inner.height / item_height).max(1);
        let scroll = keep_in_view(view.scroll, view.cursor, capacity, view.column.items.len());
        outcome.scroll[level.index()] = scroll;

        let mut y = inner.y;
        for (row, item) in view.column.items.iter().enumerate().skip(scroll) {
            if y + item_height > inner.bottom() {
                break;
            }
            let rect = Rect::new(inner.x, y, inner.width, item_height);
            let selected = view.column.selected == Some(item.id.as_str());
            let under_cursor = view.cursor == Some(row);
            draw_item(frame, rect, item, selected, under_cursor, data.show_descriptions);
            outcome
                .measurements
                .record(level, &item.id, Bounds::from(rect));
            y += item_height;
        }
        if y < inner.bottom() {
            let hint_area = Rect::new(inner.x, y, inner.width, 1);
            frame.render_widget(
                Paragraph::new(Span::styled(
                    " + custom node [n]",
                    Style::default().fg(Color::DarkGray),
                )),
                hint_area,
            );
        }
    }
    outcome
}

fn keep_in_view(scroll: usize, cursor: Option<usize>, capacity: usize, len: usize) -> usize {
    let max_scroll = len.saturating_sub(capacity);
    let scroll = match cursor {
        Some(c) if c < scroll => c,
        Some(c) if c >= scroll + capacity => c + 1 - capacity,
        _ => scroll,
    };
    scroll.min(max_scroll)
}

fn draw_item(
    frame: &mut Frame,
    rect: Rect,
    item: &Item,
    selected: bool,
    under_cursor: bool,
    show_descriptions: bool,
) {
    let border_style = if selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else if under_cursor {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mut name_style = if selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    if under_cursor {
        name_style = name_style.add_modifier(Modifier::REVERSED);
    }

    let width = usize::from(rect.width.saturating_sub(2));
    let marker = if selected { "● " } else { "" };
    let custom = if item.is_custom { " ✦" } else { "" };
    let name_width = width.saturating_sub(marker.chars().count() + custom.chars().count());
    let mut name_line = vec![Span::styled(
        format!("{marker}{}", truncate_text(&item.name, name_width)),
        name_style,
    )];
    if item.is_custom {
        name_line.push(Span::styled(custom, Style::default().fg(Color::Magenta)));
    }
    let mut lines = vec![Line::from(name_line)];
    if show_descriptions {
        let desc = item.description.as_deref().unwrap_or("");
        lines.push(Line::from(Span::styled(
            truncate_text(desc, width),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style),
    );
    frame.render_widget(paragraph, rect);
}

/// Draw elbow routes for every connector the current measurements support.
fn draw_connectors(frame: &mut Frame, data: &TreeRenderData<'_>, measurements: &Measurements) {
    let deepest = data
        .columns
        .last()
        .map(|c| c.column.level)
        .unwrap_or(Level::Three);
    let layout = ConnectorLayout::compute(
        data.path,
        data.stamp,
        measurements,
        Flow::LeftToRight,
        deepest,
    );
    let container = measurements.container();
    let buf = frame.buffer_mut();
    for pair in layout.drawn() {
        let Some(connector) = pair.connector else {
            continue;
        };
        let connector = connector.inset(Flow::LeftToRight, COLUMN_FRAME);
        for cell in route::elbow(connector, Flow::LeftToRight) {
            let (x, y) = (cell.x + container.x, cell.y + container.y);
            if !container.contains(x, y) {
                continue;
            }
            let (Ok(x), Ok(y)) = (u16::try_from(x), u16::try_from(y)) else {
                continue;
            };
            if let Some(target) = buf.cell_mut((x, y)) {
                target.set_char(cell.ch).set_fg(Color::Cyan);
            }
        }
    }
}

fn draw_side_panel(frame: &mut Frame, area: Rect, data: &TreeRenderData<'_>) {
    let (title, border) = match data.side_panel {
        SidePanel::Results => ("RESULTS", Color::DarkGray),
        SidePanel::Assistant => ("ASSISTANT", Color::Magenta),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
        .padding(Padding::new(1, 1, 0, 0))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ));

    let lines = match data.side_panel {
        SidePanel::Results => results_lines(data),
        SidePanel::Assistant => assistant_lines(data),
    };
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        area,
    );
}

fn results_lines(data: &TreeRenderData<'_>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if data.breadcrumb.is_empty() {
        lines.push(Line::from(Span::styled(
            "Select an item to filter results.",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Filtered by",
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
        )));
        for (level_name, item_name) in data.breadcrumb {
            lines.push(Line::from(vec![
                Span::styled(format!("{level_name}: "), Style::default().fg(Color::DarkGray)),
                Span::styled(item_name.to_string(), Style::default().fg(Color::Cyan)),
            ]));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!("refreshed {} times", data.refresh_count),
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

fn assistant_lines(data: &TreeRenderData<'_>) -> Vec<Line<'static>> {
    let mut lines = data
        .assistant_prompt
        .unwrap_or("")
        .lines()
        .map(|l| Line::from(l.to_string()))
        .collect::<Vec<_>>();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Tab] back to results",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

fn draw_status(frame: &mut Frame, area: Rect, data: &TreeRenderData<'_>) {
    let path = if data.path.is_empty() {
        "—".to_string()
    } else {
        data.path.to_string()
    };
    let mut top = vec![Span::styled(
        format!("PATH: {path}"),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(toast) = data.toast {
        top.push(Span::raw("   "));
        top.push(Span::styled(
            format!("● {toast}"),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ));
    }
    let mut hint_line = data.hints.to_string();
    if let Some(msg) = data.message {
        hint_line.push_str("   ");
        hint_line.push_str(msg);
    }

    let status = Paragraph::new(vec![
        Line::from(top),
        Line::from(Span::styled(hint_line, Style::default().fg(Color::DarkGray))),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray))
            .padding(Padding::new(1, 1, 0, 0)),
    );
    frame.render_widget(status, area);
}

fn truncate_text(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    if max_width <= 3 {
        return text.chars().take(max_width).collect();
    }
    let mut out = text
        .chars()
        .take(max_width.saturating_sub(3))
        .collect::<String>();
    out.push_str("...");
    out
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect(frame.area(), 70, 60);
    frame.render_widget(Clear, area);
    let help = Paragraph::new(vec![
        Line::from("COLUMNS: one per level, selected item always on top"),
        Line::from("  ● selected   ✦ custom node"),
        Line::from(""),
        Line::from("FLOW"),
        Line::from("  1) Left/right (h/l) moves between levels"),
        Line::from("  2) Up/down (j/k) moves within a level, Enter selects"),
        Line::from("     Selecting clears every deeper level"),
        Line::from("  3) n asks the assistant for a custom node at this level"),
        Line::from("  4) e renames, D deletes, Backspace clears the level"),
        Line::from("  5) Tab switches results/assistant, s opens settings"),
        Line::from("  6) Mouse: click an item to select it"),
        Line::from(""),
        Line::from("Esc closes overlays."),
    ])
    .block(Block::default().title("Help").borders(Borders::ALL));
    frame.render_widget(help, area);
}

pub(crate) fn centered_rect(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - height_percent) / 2),
        Constraint::Percentage(height_percent),
        Constraint::Percentage((100 - height_percent) / 2),
    ])
    .flex(Flex::Center)
    .split(area);
    Layout::horizontal([
        Constraint::Percentage((100 - width_percent) / 2),
        Constraint::Percentage(width_percent),
        Constraint::Percentage((100 - width_percent) / 2),
    ])
    .flex(Flex::Center)
    .split(vertical[1])[1]
}
