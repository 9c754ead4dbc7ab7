use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Produce a rectangle horizontally centered within `area` that spans
/// `percent_x` of the width and exactly `height` rows (clamped to the area).
/// Used for modal notices.
pub(crate) fn centered_popup(percent_x: u16, height: u16, area: Rect) -> Rect {
    let height = height.min(area.height);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}

/// Number of wrapped lines `text` needs at `width` columns. Sizes notices so
/// long database errors stay readable.
pub(crate) fn wrapped_height(text: &str, width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let lines: usize = text
        .lines()
        .map(|line| line.chars().count().max(1).div_ceil(width))
        .sum();
    u16::try_from(lines.max(1)).unwrap_or(u16::MAX)
}
