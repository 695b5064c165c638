use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::shared::{DisplayState, Instrument, NUM_INSTRUMENTS, NUM_STEPS, Rgb};

const LABEL_WIDTH: u16 = 10;

pub fn rgb(c: Rgb) -> Color {
    Color::Rgb(c.0, c.1, c.2)
}

// 4 instrument rows x 16 steps, playhead column lit, selected row marked
pub fn draw_step_grid(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, NUM_INSTRUMENTS as u32); NUM_INSTRUMENTS])
        .split(area);

    for (instrument, row_area) in Instrument::ALL.into_iter().zip(rows.iter()) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(LABEL_WIDTH), Constraint::Min(NUM_STEPS as u16)])
            .split(*row_area);

        let color = rgb(instrument.color());
        let selected = instrument == state.selected_instrument;
        let marker = if selected { "▶ " } else { "  " };
        let mut label_style = Style::default().fg(color);
        if selected {
            label_style = label_style.add_modifier(Modifier::BOLD);
        }
        frame.render_widget(
            Paragraph::new(Span::styled(format!("{marker}{}", instrument.label()), label_style)),
            cols[0],
        );

        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, NUM_STEPS as u32); NUM_STEPS])
            .split(cols[1]);

        let row = &state.grid[instrument.index()];
        for (step, cell_area) in cells.iter().enumerate() {
            let on = row[step];
            let playhead = step == state.current_step as usize;
            let style = match (on, playhead) {
                (true, true) => Style::default().bg(Color::White).fg(color),
                (true, false) => Style::default().bg(color).fg(color),
                (false, true) => Style::default().bg(Color::Gray).fg(Color::Gray),
                (false, false) => Style::default().fg(Color::DarkGray),
            };
            // bar lines every 4 steps
            let borders = if step % 4 == 0 { Borders::LEFT } else { Borders::NONE };
            let block = Block::default()
                .borders(borders)
                .border_style(Style::default().fg(Color::DarkGray))
                .style(style);
            frame.render_widget(block, *cell_area);
        }
    }
}
