use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::grid::{draw_step_grid, rgb};
use crate::shared::{DisplayState, LyricLine};

const HELP: &str =
    "space play/pause  ⌫ stop  ↑↓ row  1-4 q-r a-f z-v steps  [ ] - = tempo  i AI fill  0 clear  k check  b bake  m rhymes  l reload  esc quit";

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState, blink_on: bool) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // transport screen
            Constraint::Length(10), // step grid
            Constraint::Min(5),     // lyrics
            Constraint::Length(3),  // analytics
            Constraint::Length(1),  // help
        ])
        .split(area);

    draw_screen(frame, sections[0], state, blink_on);
    draw_grid(frame, sections[1], state);
    draw_lyrics(frame, sections[2], state);
    draw_analytics(frame, sections[3], state);
    frame.render_widget(
        Paragraph::new(Span::styled(HELP, Style::default().fg(Color::DarkGray))),
        sections[4],
    );
}

fn draw_screen(frame: &mut Frame, area: Rect, state: &DisplayState, blink_on: bool) {
    let play = if state.playing {
        Span::styled("▶ PLAY", Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("■ STOP", Style::default().fg(Color::Gray))
    };
    let status = if state.generating && !blink_on {
        String::new()
    } else {
        state.status_text.clone()
    };
    let line = Line::from(vec![
        play,
        Span::raw("   "),
        Span::styled(format!("TEMPO {:>3}", state.bpm), Style::default().fg(Color::Cyan)),
        Span::raw("   "),
        Span::styled(
            format!("STEP {:>2}", state.current_step + 1),
            Style::default().fg(Color::Magenta),
        ),
        Span::raw("   "),
        Span::styled(state.style.clone(), Style::default().fg(Color::Gray)),
        Span::raw("   "),
        Span::styled(format!("audio: {}", state.audio_state), Style::default().fg(Color::DarkGray)),
        Span::raw("   "),
        Span::styled(status, Style::default().fg(Color::Yellow)),
    ]);
    let block = Block::default().borders(Borders::ALL).title(" rapbeat ");
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_grid(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let block = Block::default().borders(Borders::ALL).title(" studio ");
    let inner = block.inner(area);
    frame.render_widget(block, area);
    draw_step_grid(frame, inner, state);
}

fn draw_lyrics(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let lines: Vec<Line> = state
        .lyric_lines
        .iter()
        .map(|l| match l {
            LyricLine::Section(title) => Line::from(Span::styled(
                title.clone(),
                Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
            )),
            LyricLine::Blank => Line::default(),
            LyricLine::Words(spans) => Line::from(
                spans
                    .iter()
                    .flat_map(|s| {
                        let style = match s.color {
                            Some(c) => Style::default().fg(rgb(c)).add_modifier(Modifier::BOLD),
                            None => Style::default().fg(Color::Gray),
                        };
                        [Span::styled(s.text.clone(), style), Span::raw(" ")]
                    })
                    .collect::<Vec<_>>(),
            ),
        })
        .collect();

    let title = if state.show_rhymes { " lyrics · rhymes on " } else { " lyrics " };
    let block = Block::default().borders(Borders::ALL).title(title);
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn draw_analytics(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let line = Line::from(vec![
        Span::styled("rhymes ", Style::default().fg(Color::DarkGray)),
        Span::styled(state.rhyme_count.to_string(), Style::default().fg(Color::White)),
        Span::raw("   "),
        Span::styled("flow intensity ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{}%", state.intensity), Style::default().fg(Color::Magenta)),
        Span::raw("   "),
        Span::styled("words ", Style::default().fg(Color::DarkGray)),
        Span::styled(state.word_count.to_string(), Style::default().fg(Color::Blue)),
    ]);
    let block = Block::default().borders(Borders::ALL).title(" analytics ");
    frame.render_widget(Paragraph::new(line).block(block), area);
}
