use ratatui::{prelude::*, widgets::*};

use crate::network::LinkState;

/// Width of one stack cell, borders included
pub const CELL_WIDTH: u16 = 22;
/// Height of one stack cell, borders included
pub const CELL_HEIGHT: u16 = 4;

/// Renders tabs
pub fn render_tabs<'a>(titles: &[&'a str], selected: usize) -> Tabs<'a> {
    let titles: Vec<Line> = titles.iter().map(|t| Line::from(*t)).collect();

    Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .divider("|")
}

/// Positions of the cells visible in `area`, scrolled so `selected` stays on screen
///
/// Returns `(index, rect)` pairs in element order.
pub fn grid_layout(area: Rect, count: usize, selected: Option<usize>) -> Vec<(usize, Rect)> {
    let columns = (area.width / CELL_WIDTH).max(1) as usize;
    let visible_rows = (area.height / CELL_HEIGHT) as usize;
    if count == 0 || visible_rows == 0 {
        return Vec::new();
    }

    let selected_row = selected.map(|i| i / columns).unwrap_or(0);
    let first_row = selected_row.saturating_sub(visible_rows - 1);
    let first = first_row * columns;
    let last = (first + visible_rows * columns).min(count);

    (first..last)
        .map(|index| {
            let offset = index - first;
            let col = (offset % columns) as u16;
            let row = (offset / columns) as u16;
            let rect = Rect::new(
                area.x + col * CELL_WIDTH,
                area.y + row * CELL_HEIGHT,
                CELL_WIDTH.min(area.width),
                CELL_HEIGHT,
            );
            (index, rect)
        })
        .collect()
}

/// Truncate to `width` characters, marking the cut with `~`
pub fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push('~');
    out
}

/// Connection state color
pub fn link_color(state: LinkState) -> Color {
    match state {
        LinkState::Open => Color::Green,
        LinkState::Connecting => Color::Yellow,
        LinkState::Closed => Color::Red,
        LinkState::Stopped => Color::DarkGray,
    }
}

/// Fuel gauge color
pub fn fuel_color(fuel: &str) -> Color {
    match fuel.parse::<i64>() {
        Ok(n) if n <= 0 => Color::Red,
        Ok(n) if n < 1000 => Color::Yellow,
        Ok(_) => Color::Green,
        Err(_) => Color::White,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_layout_wraps_rows() {
        let area = Rect::new(1, 1, 50, 8);
        let cells = grid_layout(area, 5, None);
        // two columns, two rows visible
        let indices: Vec<usize> = cells.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(cells[1].1, Rect::new(23, 1, 22, 4));
        assert_eq!(cells[2].1, Rect::new(1, 5, 22, 4));
    }

    #[test]
    fn test_grid_layout_scrolls_to_selection() {
        let area = Rect::new(0, 0, 44, 8);
        let cells = grid_layout(area, 9, Some(8));
        let indices: Vec<usize> = cells.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![6, 7, 8]);
        assert_eq!(cells[0].1.y, 0);
    }

    #[test]
    fn test_grid_layout_too_small() {
        assert!(grid_layout(Rect::new(0, 0, 40, 3), 4, None).is_empty());
        assert!(grid_layout(Rect::new(0, 0, 40, 8), 0, None).is_empty());
    }

    #[test]
    fn test_fit() {
        assert_eq!(fit("Oak Log", 10), "Oak Log");
        assert_eq!(fit("Polished Andesite", 8), "Polishe~");
        assert_eq!(fit("abc", 0), "");
    }
}
