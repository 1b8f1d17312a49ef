//! Rank badges

use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
};

use crate::progression::{rank_tone, Rank, Tone};

/// Get the color for a badge tone
pub fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Gray => Color::Gray,
        Tone::Blue => Color::Rgb(90, 140, 220),
        Tone::Green => Color::Rgb(80, 180, 100),
        Tone::Amber => Color::Rgb(230, 170, 40),
        Tone::Red => Color::Rgb(200, 50, 50),
    }
}

pub fn rank_badge(rank: &Rank) -> Span<'static> {
    Span::styled(
        format!("[{}]", rank.name),
        Style::default()
            .fg(tone_color(rank_tone(&rank.name)))
            .add_modifier(Modifier::BOLD),
    )
}
