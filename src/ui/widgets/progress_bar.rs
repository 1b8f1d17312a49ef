//! Item progress bar widget
//!
//! Renders `label  ████░░░░  v/max` on a single row.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::Widget,
};

const FILLED: char = '█';
const EMPTY: char = '░';

/// Number of filled cells for `value/max` on a bar of `width` cells
pub fn filled_cells(value: u32, max: u32, width: u16) -> u16 {
    if max == 0 || width == 0 {
        return 0;
    }
    let ratio = (value as f64 / max as f64).clamp(0.0, 1.0);
    (ratio * width as f64).round() as u16
}

/// Compact bar as a span, for table cells
pub fn progress_span(value: u32, max: u32, width: u16) -> Span<'static> {
    let filled = filled_cells(value, max, width) as usize;
    let bar: String = std::iter::repeat(FILLED)
        .take(filled)
        .chain(std::iter::repeat(EMPTY).take(width as usize - filled))
        .collect();
    Span::styled(bar, Style::default().fg(bar_color(value, max)))
}

fn bar_color(value: u32, max: u32) -> Color {
    if max > 0 && value >= max {
        Color::Green
    } else {
        Color::Rgb(90, 140, 220)
    }
}

/// Single-row progress bar with a label and a `value/max` counter
pub struct ProgressBar<'a> {
    label: &'a str,
    value: u32,
    max: u32,
    focused: bool,
    label_width: u16,
}

impl<'a> ProgressBar<'a> {
    pub fn new(value: u32, max: u32) -> Self {
        Self {
            label: "",
            value,
            max,
            focused: false,
            label_width: 16,
        }
    }

    pub fn label(mut self, label: &'a str) -> Self {
        self.label = label;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    pub fn label_width(mut self, width: u16) -> Self {
        self.label_width = width;
        self
    }
}

impl<'a> Widget for ProgressBar<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let label_style = if self.focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        let prefix = if self.focused { "> " } else { "  " };
        let label: String = format!("{}{}", prefix, self.label)
            .chars()
            .take(self.label_width as usize)
            .collect();
        buf.set_string(area.x, area.y, &label, label_style);

        let counter = format!(" {}/{}", self.value, self.max);
        let bar_x = area.x + self.label_width.min(area.width);
        let right = area.x + area.width;
        let bar_width = right
            .saturating_sub(bar_x)
            .saturating_sub(counter.chars().count() as u16);
        if bar_width == 0 {
            return;
        }

        let filled = filled_cells(self.value, self.max, bar_width);
        let color = bar_color(self.value, self.max);
        for i in 0..bar_width {
            let (glyph, fg) = if i < filled {
                (FILLED, color)
            } else {
                (EMPTY, Color::Rgb(60, 60, 70))
            };
            if let Some(cell) = buf.cell_mut((bar_x + i, area.y)) {
                cell.set_char(glyph).set_style(Style::default().fg(fg));
            }
        }
        buf.set_string(bar_x + bar_width, area.y, &counter, Style::default().fg(Color::Gray));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_cells() {
        assert_eq!(filled_cells(0, 10, 10), 0);
        assert_eq!(filled_cells(5, 10, 10), 5);
        assert_eq!(filled_cells(10, 10, 10), 10);
        assert_eq!(filled_cells(3, 0, 10), 0);
        assert_eq!(filled_cells(1, 3, 6), 2);
    }

    #[test]
    fn test_progress_span_width() {
        let span = progress_span(2, 4, 8);
        assert_eq!(span.content.chars().count(), 8);
        assert_eq!(span.content.chars().filter(|c| *c == FILLED).count(), 4);
    }

    #[test]
    fn test_render_counter() {
        let area = Rect::new(0, 0, 40, 1);
        let mut buf = Buffer::empty(area);
        ProgressBar::new(3, 10).label("Sello").render(area, &mut buf);
        let line: String = (0..40)
            .map(|x| buf.cell((x, 0)).map(|c| c.symbol().to_string()).unwrap_or_default())
            .collect();
        assert!(line.contains("Sello"));
        assert!(line.trim_end().ends_with("3/10"));
    }
}
