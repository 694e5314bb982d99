use crate::app::{Focus, Panel, Playback, Screen};
use crate::config::Theme;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

// Layout constants for better maintainability
const HEADER_HEIGHT: u16 = 3;
const CONTROLS_HEIGHT: u16 = 3;
const NOW_PLAYING_HEIGHT: u16 = 4;
const FOOTER_HEIGHT: u16 = 3;
const MARGIN: u16 = 1;

const EMPTY_OPTION: &str = "-- choose a station --";

/// Colours for one theme.
struct Palette {
    background: Color,
    text: Color,
    muted: Color,
    accent: Color,
    highlight_fg: Color,
    highlight_bg: Color,
    border: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                background: Color::White,
                text: Color::Black,
                muted: Color::Gray,
                accent: Color::Magenta,
                highlight_fg: Color::White,
                highlight_bg: Color::Blue,
                border: Color::DarkGray,
            },
            Theme::Dark => Self {
                background: Color::Black,
                text: Color::White,
                muted: Color::DarkGray,
                accent: Color::Yellow,
                highlight_fg: Color::Black,
                highlight_bg: Color::Yellow,
                border: Color::Gray,
            },
        }
    }

    fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    fn block<'a>(&self, title: &'a str, focused: bool) -> Block<'a> {
        let border = if focused { self.accent } else { self.border };
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .style(self.base())
            .title(title)
    }
}

pub fn render_ui(f: &mut Frame, panel: &Panel) {
    let palette = Palette::for_theme(panel.theme);
    f.render_widget(Block::default().style(palette.base()), f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(MARGIN)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(5),
            Constraint::Length(CONTROLS_HEIGHT),
            Constraint::Length(NOW_PLAYING_HEIGHT),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(f.area());

    render_header(f, chunks[0], panel, &palette);
    render_selector(f, chunks[1], panel, &palette);
    render_controls(f, chunks[2], panel, &palette);
    render_now_playing(f, chunks[3], panel, &palette);
    render_footer(f, chunks[4], &palette);

    if panel.screen == Screen::Options {
        render_options(f, panel, &palette);
    }
}

fn render_header(f: &mut Frame, area: Rect, panel: &Panel, palette: &Palette) {
    let status = match panel.playback() {
        Playback::Playing => "PLAYING",
        Playback::Paused if panel.selected().is_some() => "PAUSED",
        Playback::Paused => "IDLE",
    };

    let line = Line::from(vec![
        Span::styled("SomaFM", Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)),
        Span::styled(" panel  ", Style::default().fg(palette.muted)),
        Span::styled(status, Style::default().fg(palette.text).add_modifier(Modifier::BOLD)),
    ]);

    let header = Paragraph::new(line).block(palette.block("Soma FM", false));
    f.render_widget(header, area);
}

fn render_selector(f: &mut Frame, area: Rect, panel: &Panel, palette: &Palette) {
    let enabled = panel.selector_enabled();
    let row_style = if enabled {
        Style::default().fg(palette.text)
    } else {
        Style::default().fg(palette.muted)
    };

    let mut items = Vec::with_capacity(panel.option_count());
    items.push(ListItem::new(EMPTY_OPTION).style(Style::default().fg(palette.muted)));
    for station in &panel.stations {
        let mut style = row_style;
        if Some(station.id.as_str()) == panel.selected() {
            style = style.add_modifier(Modifier::BOLD);
        }
        items.push(ListItem::new(station.title.as_str()).style(style));
    }

    let title = if enabled {
        format!("Stations ({})", panel.stations.len())
    } else {
        "Stations (loading…)".to_string()
    };

    let list = List::new(items)
        .block(palette.block(&title, panel.focus == Focus::Selector))
        .highlight_style(
            Style::default()
                .fg(palette.highlight_fg)
                .bg(palette.highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(" > ");

    let mut state = ListState::default().with_selected(Some(panel.cursor));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_controls(f: &mut Frame, area: Rect, panel: &Panel, palette: &Palette) {
    let control = if panel.pause_visible() {
        Span::styled("[ ❚❚ Pause ]", Style::default().fg(palette.accent).add_modifier(Modifier::BOLD))
    } else if panel.play_enabled() {
        Span::styled("[ ▶ Play ]", Style::default().fg(palette.accent).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("[ ▶ Play ]", Style::default().fg(palette.muted).add_modifier(Modifier::DIM))
    };

    let controls = Paragraph::new(Line::from(control))
        .alignment(Alignment::Center)
        .block(palette.block("Controls", panel.focus == Focus::Controls));
    f.render_widget(controls, area);
}

fn render_now_playing(f: &mut Frame, area: Rect, panel: &Panel, palette: &Palette) {
    let block = palette.block("Now Playing", false);
    let Some(track) = panel.track() else {
        f.render_widget(block, area);
        return;
    };

    let text = Text::from(vec![
        Line::from(Span::styled(
            track.title.as_str(),
            Style::default().fg(palette.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(track.artist.as_str(), Style::default().fg(palette.muted))),
    ]);
    f.render_widget(Paragraph::new(text).block(block), area);
}

fn render_footer(f: &mut Frame, area: Rect, palette: &Palette) {
    let key = |k: &'static str| {
        Span::styled(k, Style::default().fg(palette.accent).add_modifier(Modifier::BOLD))
    };
    let label = |l: &'static str| Span::styled(l, Style::default().fg(palette.text));

    let controls_text = Line::from(vec![
        key("↑/↓ "),
        label("Browse • "),
        key("SPACE "),
        label("Choose • "),
        key("ENTER "),
        label("Play/Pause • "),
        key("TAB "),
        label("Focus • "),
        key("O "),
        label("Options • "),
        key("W "),
        label("somafm.com • "),
        key("Q "),
        label("Quit"),
    ]);

    let footer = Paragraph::new(controls_text)
        .alignment(Alignment::Center)
        .block(palette.block("Keys", false));
    f.render_widget(footer, area);
}

fn render_options(f: &mut Frame, panel: &Panel, palette: &Palette) {
    let area = centered(f.area(), 40, 7);
    let text = Text::from(vec![
        Line::from(vec![
            Span::styled("Theme: ", Style::default().fg(palette.muted)),
            Span::styled(panel.theme.name(), Style::default().fg(palette.text).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(""),
        Line::from(Span::styled("T toggle theme • ESC back", Style::default().fg(palette.muted))),
    ]);

    f.render_widget(Clear, area);
    f.render_widget(Paragraph::new(text).block(palette.block("Options", true)), area);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 30);
        assert_eq!(centered(area, 40, 7), Rect::new(30, 11, 40, 7));

        let small = Rect::new(0, 0, 20, 5);
        assert_eq!(centered(small, 40, 7), small);
    }
}
