//! Terminal rendering of the engine state. Read-only: polls the render
//! accessors after every input and frame.

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::app::{App, Confirm};
use crate::format::{format_compact, format_duration};
use crate::time::Millis;

/// Below this width the shop panels stack vertically.
const NARROW_WIDTH: u16 = 70;

pub fn render(f: &mut Frame, app: &App, now: Millis) {
    let size = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Min(9),
            Constraint::Length(7),
            Constraint::Length(3),
        ])
        .split(size);

    render_title(f, chunks[0]);
    render_stats(f, app, now, chunks[1]);

    let shop_direction = if size.width < NARROW_WIDTH {
        Direction::Vertical
    } else {
        Direction::Horizontal
    };
    let shop = Layout::default()
        .direction(shop_direction)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    render_producers(f, app, shop[0]);
    render_upgrades(f, app, shop[1]);

    render_log(f, app, chunks[3]);
    render_help(f, app, chunks[4]);
}

fn bordered(title: &str, color: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title)
}

fn render_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        "Tap to Empire",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )))
    .block(bordered("", Color::DarkGray))
    .alignment(Alignment::Center);
    f.render_widget(title, area);
}

fn render_stats(f: &mut Frame, app: &App, now: Millis, area: Rect) {
    let s = &app.state;
    let boost = if s.boost_active(now) {
        format!(
            "x2 ({} left)",
            format_duration(s.boost_remaining_ms(now) as f64 / 1000.0)
        )
    } else {
        "off".to_string()
    };

    let lines = vec![
        Line::from(vec![
            Span::raw("Coins: "),
            Span::styled(
                format_compact(s.currency),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("   +{}/sec", format_compact(s.passive_rate(now)))),
        ]),
        Line::from(format!(
            "Per tap: {}   Combo: x{:.2}   Crit: {}%",
            format_compact(s.tap_power(now)),
            s.combo.value(),
            (s.crit_chance * 100.0).round()
        )),
        Line::from(format!(
            "Prestige: {} pts (x{:.2})   Next reset: +{}",
            s.prestige_points,
            s.prestige_multiplier(),
            s.prestige_gain()
        )),
        Line::from(format!("Boost: {boost}")),
    ];
    let stats = Paragraph::new(lines).block(bordered(" Empire ", Color::Green));
    f.render_widget(stats, area);
}

fn offer_style(affordable: bool) -> Style {
    if affordable {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_producers(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .state
        .producers
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let affordable = app.state.producer_offer(p.id).map_or(false, |o| o.affordable);
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" [{}] ", i + 1),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(
                        "{} x{}  {}  (+{}/s each)",
                        p.name,
                        p.quantity,
                        format_compact(p.cost()),
                        format_compact(p.base_rate)
                    ),
                    offer_style(affordable),
                ),
            ]))
        })
        .collect();
    f.render_widget(
        List::new(items).block(bordered(" Producers ", Color::Yellow)),
        area,
    );
}

fn render_upgrades(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .state
        .tap_upgrades
        .iter()
        .enumerate()
        .map(|(i, u)| {
            let affordable = app.state.upgrade_offer(u.id).map_or(false, |o| o.affordable);
            let key = (b'a' + i as u8) as char;
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" [{}] ", key.to_ascii_uppercase()),
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(
                        "{} Lv{}  {}  ({})",
                        u.name,
                        u.level,
                        format_compact(u.cost()),
                        u.description
                    ),
                    offer_style(affordable),
                ),
            ]))
        })
        .collect();
    f.render_widget(
        List::new(items).block(bordered(" Tap Upgrades ", Color::Magenta)),
        area,
    );
}

fn render_log(f: &mut Frame, app: &App, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let start = app.log.len().saturating_sub(visible);
    let lines: Vec<Line> = app.log[start..]
        .iter()
        .map(|entry| {
            let style = if entry.is_important {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(entry.text.as_str(), style))
        })
        .collect();
    let log = Paragraph::new(lines)
        .block(bordered(" Log ", Color::Blue))
        .wrap(Wrap { trim: false });
    f.render_widget(log, area);
}

fn render_help(f: &mut Frame, app: &App, area: Rect) {
    let text = match app.pending {
        Some(Confirm::Prestige) => "[P] confirm prestige   any other key cancels",
        Some(Confirm::HardReset) => "[R] confirm hard reset   any other key cancels",
        None => "[Space] tap  [1-5] hire  [A-E] upgrade  [X] boost  [P] prestige  [S] save  [R] reset",
    };
    let help = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(Color::DarkGray),
    )))
    .block(bordered("", Color::DarkGray))
    .alignment(Alignment::Center);
    f.render_widget(help, area);
}
