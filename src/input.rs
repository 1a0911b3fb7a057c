//! Input plumbing between the DOM and the game: pixel to cell conversion,
//! the click target registry filled during render, and the event type the
//! game dispatches on.

use ratzilla::ratatui::layout::Rect;

/// All possible input events, normalized from keyboard, mouse, and touch sources.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A key press from keyboard.
    Key(char),
    /// A click/tap on a registered target, identified by a semantic action ID
    /// from `game::actions`.
    Click(u16),
}

/// A region on screen that can be tapped/clicked to trigger an action.
#[derive(Debug, Clone)]
pub struct ClickTarget {
    /// Hit region in terminal cells.
    pub rect: Rect,
    pub action_id: u16,
}

/// Shared between the draw loop (which fills it every frame) and the mouse
/// handler (which hit-tests against it).
#[derive(Default)]
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame: record the terminal size and drop old targets.
    pub fn begin_frame(&mut self, cols: u16, rows: u16) {
        self.terminal_cols = cols;
        self.terminal_rows = rows;
        self.targets.clear();
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// Register a full-width target on `row` of `area`. Rows outside the
    /// area are ignored.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.y + area.height {
            self.add_click_target(Rect::new(area.x, row, area.width, 1), action_id);
        }
    }

    /// Register click targets for a horizontal tab bar based on actual text widths.
    ///
    /// Each entry in `tab_widths` is `(display_width, action_id)` for the **padded**
    /// label text of that tab (e.g. `" 1 Mine "` → display_width = 8).
    /// `separator_width` is the display width of the separator string between tabs.
    ///
    /// Each target covers its label plus half of the adjacent separator(s).
    /// The first tab extends to the left edge and the last tab to the right
    /// edge of the area, so the whole bar is tappable.
    pub fn register_tab_targets(
        &mut self,
        tab_widths: &[(u16, u16)],
        separator_width: u16,
        x: u16,
        y: u16,
        total_width: u16,
        height: u16,
    ) {
        let n = tab_widths.len();
        if n == 0 || total_width == 0 {
            return;
        }

        // Starting column of each label
        let mut starts: Vec<u16> = Vec::with_capacity(n);
        let mut cursor: u16 = 0;
        for (i, &(w, _)) in tab_widths.iter().enumerate() {
            if i > 0 {
                cursor += separator_width;
            }
            starts.push(cursor);
            cursor += w;
        }

        for (i, &(width, action_id)) in tab_widths.iter().enumerate() {
            let left = if i == 0 {
                0
            } else {
                let prev_end = starts[i - 1] + tab_widths[i - 1].0;
                prev_end + (starts[i] - prev_end) / 2
            };
            let right = if i == n - 1 {
                total_width
            } else {
                let cur_end = starts[i] + width;
                cur_end + (starts[i + 1] - cur_end) / 2
            };

            let w = right.saturating_sub(left);
            if w > 0 {
                self.add_click_target(Rect::new(x + left, y, w, height), action_id);
            }
        }
    }

    /// Action ID at a terminal cell. When targets overlap the one registered
    /// last (drawn on top) wins.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets.iter().rev().find_map(|t| {
            let r = &t.rect;
            if col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height {
                Some(t.action_id)
            } else {
                None
            }
        })
    }

    /// Resolve a pixel position inside the grid container to a click event.
    pub fn click_at(
        &self,
        click_x: f64,
        click_y: f64,
        grid_width: f64,
        grid_height: f64,
    ) -> Option<InputEvent> {
        let col = pixel_x_to_col(click_x, grid_width, self.terminal_cols)?;
        let row = pixel_y_to_row(click_y, grid_height, self.terminal_rows)?;
        self.hit_test(col, row).map(InputEvent::Click)
    }
}

/// Whether a screen width (in columns) should use the compact layout.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 60
}

/// Convert a pixel Y coordinate to a terminal row index.
///
/// `click_y` is relative to the grid container's top edge.
/// `grid_height` is the total pixel height of the grid container.
/// `terminal_rows` is the number of rows in the terminal.
///
/// Returns `None` if the click is outside the grid or inputs are invalid.
pub fn pixel_y_to_row(click_y: f64, grid_height: f64, terminal_rows: u16) -> Option<u16> {
    if grid_height <= 0.0 || terminal_rows == 0 || click_y < 0.0 {
        return None;
    }
    let cell_height = grid_height / terminal_rows as f64;
    let row = (click_y / cell_height) as u16;
    if row >= terminal_rows { None } else { Some(row) }
}

/// Convert a pixel X coordinate to a terminal column index.
pub fn pixel_x_to_col(click_x: f64, grid_width: f64, terminal_cols: u16) -> Option<u16> {
    if grid_width <= 0.0 || terminal_cols == 0 || click_x < 0.0 {
        return None;
    }
    let cell_width = grid_width / terminal_cols as f64;
    let col = (click_x / cell_width) as u16;
    if col >= terminal_cols { None } else { Some(col) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::actions::*;

    // ── hit_test ────────────────────────────────────────────────────

    #[test]
    fn hit_test_rows_and_columns() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 5, 10, 1), RECHARGE_SMALL);
        cs.add_click_target(Rect::new(10, 5, 10, 1), RECHARGE_LARGE);
        cs.add_click_target(Rect::new(0, 6, 20, 2), CLAIM_DAILY);

        assert_eq!(cs.hit_test(9, 5), Some(RECHARGE_SMALL));
        assert_eq!(cs.hit_test(10, 5), Some(RECHARGE_LARGE));
        assert_eq!(cs.hit_test(3, 7), Some(CLAIM_DAILY));
        assert_eq!(cs.hit_test(20, 5), None);
        assert_eq!(cs.hit_test(3, 8), None);
    }

    #[test]
    fn later_target_wins_on_overlap() {
        let mut cs = ClickState::new();
        // Whole content panel taps the hen, a button drawn over it does not
        cs.add_click_target(Rect::new(0, 5, 40, 7), TAP);
        cs.add_click_target(Rect::new(5, 8, 10, 1), FREE_BOOST);

        assert_eq!(cs.hit_test(7, 8), Some(FREE_BOOST));
        assert_eq!(cs.hit_test(0, 8), Some(TAP));
        assert_eq!(cs.hit_test(20, 6), Some(TAP));
    }

    #[test]
    fn empty_state_hits_nothing() {
        assert_eq!(ClickState::new().hit_test(0, 0), None);
    }

    #[test]
    fn add_row_target_clips_to_area() {
        let mut cs = ClickState::new();
        let area = Rect::new(5, 10, 30, 5);
        cs.add_row_target(area, 12, CLAIM_DAILY);
        cs.add_row_target(area, 9, TAP);
        cs.add_row_target(area, 15, TAP);

        assert_eq!(cs.targets.len(), 1);
        assert_eq!(cs.hit_test(15, 12), Some(CLAIM_DAILY));
        assert_eq!(cs.hit_test(4, 12), None);
    }

    #[test]
    fn begin_frame_resets_targets() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 1, 80, 1), TAP);
        cs.begin_frame(100, 40);
        assert!(cs.targets.is_empty());
        assert_eq!((cs.terminal_cols, cs.terminal_rows), (100, 40));
    }

    #[test]
    fn narrow_layout_threshold() {
        assert!(is_narrow_layout(37));
        assert!(is_narrow_layout(59));
        assert!(!is_narrow_layout(60));
        assert!(!is_narrow_layout(120));
    }

    // ── pixel conversion ───────────────────────────────────────────

    #[test]
    fn pixel_to_row_cells() {
        // 30 rows in 450px → 15px rows
        assert_eq!(pixel_y_to_row(0.0, 450.0, 30), Some(0));
        assert_eq!(pixel_y_to_row(14.0, 450.0, 30), Some(0));
        assert_eq!(pixel_y_to_row(15.0, 450.0, 30), Some(1));
        assert_eq!(pixel_y_to_row(449.0, 450.0, 30), Some(29));
        // Fractional cell height: 400px / 24 rows
        assert_eq!(pixel_y_to_row(17.0, 400.0, 24), Some(1));
    }

    #[test]
    fn pixel_to_row_rejects_outside_or_degenerate() {
        assert_eq!(pixel_y_to_row(450.0, 450.0, 30), None);
        assert_eq!(pixel_y_to_row(-1.0, 450.0, 30), None);
        assert_eq!(pixel_y_to_row(10.0, 0.0, 30), None);
        assert_eq!(pixel_y_to_row(10.0, 450.0, 0), None);
    }

    #[test]
    fn pixel_to_col_cells() {
        assert_eq!(pixel_x_to_col(0.0, 800.0, 80), Some(0));
        assert_eq!(pixel_x_to_col(10.0, 800.0, 80), Some(1));
        assert_eq!(pixel_x_to_col(799.0, 800.0, 80), Some(79));
        assert_eq!(pixel_x_to_col(800.0, 800.0, 80), None);
        assert_eq!(pixel_x_to_col(-1.0, 800.0, 80), None);
    }

    #[test]
    fn click_at_maps_pixels_to_action() {
        let mut cs = ClickState::new();
        cs.begin_frame(40, 50);
        cs.add_click_target(Rect::new(0, 7, 40, 7), TAP);
        cs.add_click_target(Rect::new(0, 20, 40, 1), CLAIM_DAILY);

        // 10px wide, 15px tall cells
        let (w, h) = (400.0, 750.0);
        assert_eq!(cs.click_at(55.0, 7.5 * 15.0, w, h), Some(InputEvent::Click(TAP)));
        assert_eq!(
            cs.click_at(395.0, 20.5 * 15.0, w, h),
            Some(InputEvent::Click(CLAIM_DAILY))
        );
        assert_eq!(cs.click_at(55.0, 2.0 * 15.0, w, h), None);
        assert_eq!(cs.click_at(55.0, 800.0, w, h), None);
    }

    #[test]
    fn click_at_before_first_frame_is_none() {
        let cs = ClickState::new();
        assert_eq!(cs.click_at(1.0, 1.0, 400.0, 750.0), None);
    }

    // ── register_tab_targets ───────────────────────────────────────

    #[test]
    fn tab_targets_split_separators() {
        // 3 tabs of 6 cols, separator " │ " (3 cols): [6][3][6][3][6]
        let mut cs = ClickState::new();
        let tabs = [(6, TAB_MINE), (6, TAB_BOOST), (6, TAB_REWARDS)];
        cs.register_tab_targets(&tabs, 3, 0, 5, 80, 1);

        assert_eq!(cs.targets.len(), 3);
        // Tab 0: cols 0..7
        assert_eq!(cs.hit_test(0, 5), Some(TAB_MINE));
        assert_eq!(cs.hit_test(6, 5), Some(TAB_MINE));
        // Tab 1: cols 7..16
        assert_eq!(cs.hit_test(7, 5), Some(TAB_BOOST));
        assert_eq!(cs.hit_test(15, 5), Some(TAB_BOOST));
        // Tab 2: cols 16..80, last tab runs to the edge
        assert_eq!(cs.hit_test(16, 5), Some(TAB_REWARDS));
        assert_eq!(cs.hit_test(79, 5), Some(TAB_REWARDS));
    }

    #[test]
    fn tab_targets_unequal_labels() {
        // " 1 Mine "(8) │ " 3 Rewards(2) "(14) │ " 5 Wallet "(10), separator 1 col
        let mut cs = ClickState::new();
        let tabs = [(8, TAB_MINE), (14, TAB_REWARDS), (10, TAB_WALLET)];
        cs.register_tab_targets(&tabs, 1, 0, 0, 60, 1);

        // Tab 0: 0..8, tab 1: 8..23, tab 2: 23..60
        assert_eq!(cs.hit_test(7, 0), Some(TAB_MINE));
        assert_eq!(cs.hit_test(8, 0), Some(TAB_REWARDS));
        assert_eq!(cs.hit_test(22, 0), Some(TAB_REWARDS));
        assert_eq!(cs.hit_test(23, 0), Some(TAB_WALLET));
        assert_eq!(cs.hit_test(59, 0), Some(TAB_WALLET));
    }

    #[test]
    fn tab_targets_offset_and_height() {
        // Inside a bordered block: x starts at 1, full bar height tappable
        let mut cs = ClickState::new();
        let tabs = [(6, BOARD_COINS), (6, BOARD_LEVEL)];
        cs.register_tab_targets(&tabs, 1, 1, 3, 30, 3);

        assert_eq!(cs.hit_test(1, 3), Some(BOARD_COINS));
        assert_eq!(cs.hit_test(1, 5), Some(BOARD_COINS));
        assert_eq!(cs.hit_test(0, 3), None);
        assert_eq!(cs.hit_test(30, 4), Some(BOARD_LEVEL));
    }

    #[test]
    fn tab_targets_single_and_empty() {
        let mut cs = ClickState::new();
        cs.register_tab_targets(&[], 3, 0, 0, 80, 1);
        assert!(cs.targets.is_empty());

        cs.register_tab_targets(&[(8, TAB_MINE)], 3, 5, 10, 40, 1);
        assert_eq!(cs.hit_test(5, 10), Some(TAB_MINE));
        assert_eq!(cs.hit_test(44, 10), Some(TAB_MINE));
    }
}
