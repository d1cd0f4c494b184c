//! CanvasView: maps `State` values into a terminal framebuffer.
//!
//! The view keeps a retained sprite scene keyed by piece id, the terminal
//! analogue of a renderer that reuses one visual element per cube: pieces
//! listed in `remove` are retracted, everything else is created-or-updated in
//! place. Painting itself does no I/O and can be unit-tested.

use std::collections::HashMap;

use blockfall_core::State;
use blockfall_types::{
    Tint, CELL_HEIGHT, CELL_WIDTH, GRID_HEIGHT, GRID_WIDTH, PREVIEW_HEIGHT, PREVIEW_WIDTH,
    SPAWN_ROW_CELLS,
};

use crate::fb::{CellStyle, FrameBuffer, Rgb};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Sprite {
    x: i32,
    y: i32,
    tint: Tint,
}

/// Identity-keyed scene renderer for the playfield.
pub struct CanvasView {
    /// Sprites currently on the canvas, keyed by piece id.
    sprites: HashMap<u32, Sprite>,
    /// Ids of the falling block as of the last sync.
    falling_ids: Option<[u32; 4]>,
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
}

impl Default for CanvasView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            sprites: HashMap::new(),
            falling_ids: None,
            cell_w: 2,
            cell_h: 1,
        }
    }
}

impl CanvasView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a state into the retained scene: retract removed ids, then
    /// create-or-update a sprite for every live cube.
    fn sync(&mut self, state: &State) {
        for piece in &state.remove {
            self.sprites.remove(&piece.id.0);
        }

        // A falling block replaced without settling (reset) leaves sprites
        // behind that no state field references anymore; purge them.
        let next_ids = state.piece_in_play.ids().map(|id| id.0);
        if let Some(prev_ids) = self.falling_ids {
            if prev_ids != next_ids {
                for id in prev_ids {
                    let settled = state.cubes.iter().any(|c| c.id.0 == id);
                    if !settled {
                        self.sprites.remove(&id);
                    }
                }
            }
        }
        self.falling_ids = Some(next_ids);

        for piece in state
            .cubes
            .iter()
            .chain(state.piece_in_play.pieces.iter())
        {
            self.sprites.insert(
                piece.id.0,
                Sprite {
                    x: piece.x,
                    y: piece.y,
                    tint: piece.tint,
                },
            );
        }
    }

    /// Render the current game state into a framebuffer.
    pub fn render(&mut self, state: &State, viewport: Viewport) -> FrameBuffer {
        self.sync(state);

        let mut fb = FrameBuffer::new(viewport.width, viewport.height);

        let board_px_w = (GRID_WIDTH as u16) * self.cell_w;
        let board_px_h = (GRID_HEIGHT as u16) * self.cell_h;
        let frame_w = board_px_w + 2;
        let frame_h = board_px_h + 2;

        let start_x = viewport.width.saturating_sub(frame_w) / 2;
        let start_y = viewport.height.saturating_sub(frame_h) / 2;

        let bg = CellStyle {
            fg: Rgb::new(80, 80, 90),
            bg: Rgb::new(20, 20, 28),
            bold: false,
            dim: false,
        };
        let border = CellStyle {
            fg: Rgb::new(200, 200, 200),
            bg: Rgb::new(0, 0, 0),
            bold: false,
            dim: false,
        };

        // Play area background and frame.
        fb.fill_rect(start_x + 1, start_y + 1, board_px_w, board_px_h, ' ', bg);
        draw_border(&mut fb, start_x, start_y, frame_w, frame_h, border);

        // Scene sprites (settled cubes and the falling block). Rows above the
        // visible top are simply not painted.
        for sprite in self.sprites.values() {
            let col = sprite.x / CELL_WIDTH;
            let row = sprite.y / CELL_HEIGHT;
            if col < 0 || col >= GRID_WIDTH || row < 0 || row >= GRID_HEIGHT {
                continue;
            }
            self.fill_cell(
                &mut fb,
                start_x + 1,
                start_y + 1,
                col as u16,
                row as u16,
                '█',
                tint_style(sprite.tint, bg.bg),
            );
        }

        // Side panel: preview pane, line counts.
        self.draw_side_panel(&mut fb, state, viewport, start_x, start_y, frame_w, border);

        // Overlay.
        if state.game_end {
            draw_overlay_text(&mut fb, start_x, start_y, frame_w, frame_h, "GAME OVER");
        }

        fb
    }

    fn fill_cell(
        &self,
        fb: &mut FrameBuffer,
        origin_x: u16,
        origin_y: u16,
        cell_x: u16,
        cell_y: u16,
        ch: char,
        style: CellStyle,
    ) {
        let px = origin_x + cell_x * self.cell_w;
        let py = origin_y + cell_y * self.cell_h;
        fb.fill_rect(px, py, self.cell_w, self.cell_h, ch, style);
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        state: &State,
        viewport: Viewport,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
        border: CellStyle,
    ) {
        let panel_x = start_x.saturating_add(frame_w).saturating_add(2);
        if panel_x >= viewport.width {
            return;
        }
        let panel_w = viewport.width - panel_x;
        let pane_cells_w = (PREVIEW_WIDTH / CELL_WIDTH) as u16;
        let pane_cells_h = (PREVIEW_HEIGHT / CELL_HEIGHT) as u16;
        if panel_w < pane_cells_w * self.cell_w + 2 {
            return;
        }

        let label = CellStyle {
            fg: Rgb::new(220, 220, 220),
            bg: Rgb::new(0, 0, 0),
            bold: true,
            dim: false,
        };
        let value = CellStyle {
            fg: Rgb::new(200, 200, 200),
            bg: Rgb::new(0, 0, 0),
            bold: false,
            dim: false,
        };

        let mut y = start_y;
        fb.put_str(panel_x, y, "NEXT", label);
        y = y.saturating_add(1);

        // Preview pane with its own frame. Pieces keep their spawn column
        // offset and are pushed back below the pane's top edge.
        let pane_w = pane_cells_w * self.cell_w + 2;
        let pane_h = pane_cells_h * self.cell_h + 2;
        draw_border(fb, panel_x, y, pane_w, pane_h, border);
        for piece in &state.preview_piece.pieces {
            let col = piece.x / CELL_WIDTH;
            let row = piece.y / CELL_HEIGHT - SPAWN_ROW_CELLS;
            if col < 0 || col >= pane_cells_w as i32 || row < 0 || row >= pane_cells_h as i32 {
                continue;
            }
            self.fill_cell(
                fb,
                panel_x + 1,
                y + 1,
                col as u16,
                row as u16,
                '█',
                tint_style(piece.tint, Rgb::new(0, 0, 0)),
            );
        }
        y = y.saturating_add(pane_h).saturating_add(1);

        fb.put_str(panel_x, y, "LINES", label);
        y = y.saturating_add(1);
        fb.put_str(panel_x, y, &format!("{}", state.lines_cleared), value);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "HIGH", label);
        y = y.saturating_add(1);
        fb.put_str(panel_x, y, &format!("{}", state.highscore), value);
    }
}

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
    if w < 2 || h < 2 {
        return;
    }

    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);

    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

fn draw_overlay_text(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, text: &str) {
    let mid_y = y.saturating_add(h / 2);
    let text_w = text.chars().count() as u16;
    let tx = x.saturating_add(w.saturating_sub(text_w) / 2);
    let style = CellStyle {
        fg: Rgb::new(255, 255, 255),
        bg: Rgb::new(0, 0, 0),
        bold: true,
        dim: false,
    };
    fb.put_str(tx, mid_y, text, style);
}

fn tint_style(tint: Tint, bg: Rgb) -> CellStyle {
    let fg = match tint {
        Tint::Yellow => Rgb::new(255, 255, 0),
        Tint::Orange => Rgb::new(255, 165, 0),
        Tint::Blue => Rgb::new(0, 0, 255),
        Tint::Orchid => Rgb::new(221, 10, 178),
        Tint::Cyan => Rgb::new(0, 255, 255),
        Tint::Green => Rgb::new(0, 255, 0),
        Tint::Red => Rgb::new(255, 0, 0),
        Tint::Ash => Rgb::new(127, 127, 127),
    };
    CellStyle {
        fg,
        bg,
        bold: true,
        dim: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockfall_core::state::settled_cube;
    use blockfall_core::State;

    fn glyph_count(fb: &FrameBuffer, ch: char) -> usize {
        let mut count = 0;
        for y in 0..fb.height() {
            for x in 0..fb.width() {
                if fb.get(x, y).map(|c| c.ch) == Some(ch) {
                    count += 1;
                }
            }
        }
        count
    }

    #[test]
    fn test_settled_cube_is_painted() {
        let mut view = CanvasView::new();
        let mut s = State::initial();
        s.cubes = vec![settled_cube(0, 19, Tint::Red, 100)];

        let fb = view.render(&s, Viewport::new(80, 30));
        // One board cube (2 chars) plus four preview cubes (8 chars).
        assert_eq!(glyph_count(&fb, '█'), 10);
    }

    #[test]
    fn test_removed_cube_is_retracted() {
        let mut view = CanvasView::new();
        let cube = settled_cube(0, 19, Tint::Red, 100);

        let mut s = State::initial();
        s.cubes = vec![cube];
        view.render(&s, Viewport::new(80, 30));

        let mut after = s.clone();
        after.cubes = Vec::new();
        after.remove = vec![cube];
        let fb = view.render(&after, Viewport::new(80, 30));
        // Only the preview cubes remain.
        assert_eq!(glyph_count(&fb, '█'), 8);
    }

    #[test]
    fn test_stale_falling_sprites_are_purged() {
        let mut view = CanvasView::new();
        let mut s = State::initial();
        // Put the falling block inside the visible board.
        s.piece_in_play = s.piece_in_play.translated(0, 10 * CELL_HEIGHT);
        view.render(&s, Viewport::new(80, 30));

        // A reset swaps in a block with fresh ids; the old one never settled.
        let reset = s.apply(&blockfall_types::Action::Reset);
        let fb = view.render(&reset, Viewport::new(80, 30));
        // New falling block is above the visible top, so only the preview
        // cubes should be painted.
        assert_eq!(glyph_count(&fb, '█'), 8);
    }

    #[test]
    fn test_panel_shows_line_counts() {
        let mut view = CanvasView::new();
        let mut s = State::initial();
        s.lines_cleared = 12;
        s.highscore = 34;

        let fb = view.render(&s, Viewport::new(80, 30));
        assert!(fb_contains(&fb, "LINES"));
        assert!(fb_contains(&fb, "12"));
        assert!(fb_contains(&fb, "HIGH"));
        assert!(fb_contains(&fb, "34"));
    }

    #[test]
    fn test_game_over_overlay() {
        let mut view = CanvasView::new();
        let mut s = State::initial();
        s.game_end = true;

        let fb = view.render(&s, Viewport::new(80, 30));
        assert!(fb_contains(&fb, "GAME OVER"));

        s.game_end = false;
        let fb = view.render(&s, Viewport::new(80, 30));
        assert!(!fb_contains(&fb, "GAME OVER"));
    }

    fn fb_contains(fb: &FrameBuffer, needle: &str) -> bool {
        for y in 0..fb.height() {
            let row: String = (0..fb.width())
                .map(|x| fb.get(x, y).map(|c| c.ch).unwrap_or(' '))
                .collect();
            if row.contains(needle) {
                return true;
            }
        }
        false
    }
}
