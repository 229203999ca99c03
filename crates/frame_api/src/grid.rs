//! The maze board: fixed wall layout, movement rules, and the pure mapping
//! from a player position to a renderable scene.

use renderer::{Color, Node, Scene};
use shared::domain::{Action, Cell, Position, Transition};

pub const ROWS: usize = 6;
pub const COLS: usize = 6;

const O: Cell = Cell::Open;
const W: Cell = Cell::Wall;

/// Row-major with row 0 at the top. `x` indexes columns from the left and
/// `y` rows from the bottom, so a lookup is `MAZE[ROWS - 1 - y][x]` and
/// `Up` increments `y`.
pub const MAZE: [[Cell; COLS]; ROWS] = [
    [W, O, O, O, O, W],
    [O, O, W, W, O, O],
    [O, W, O, O, O, O],
    [O, O, O, O, W, O],
    [O, W, W, O, O, O],
    [W, O, O, O, W, W],
];

/// Where new players enter the maze.
pub const SPAWN: Position = Position::new(2, 2);

const WALL_FILL: Color = Color::rgb(30, 41, 59);
const OPEN_FILL: Color = Color::rgb(226, 232, 240);
const MARKER_FILL: Color = Color::rgb(220, 38, 38);

pub fn cell_at(position: Position) -> Option<Cell> {
    if position.x < 0 || position.y < 0 {
        return None;
    }
    let (x, y) = (position.x as usize, position.y as usize);
    if x >= COLS || y >= ROWS {
        return None;
    }
    Some(MAZE[ROWS - 1 - y][x])
}

/// Apply one action. A target off the board or inside a wall blocks the
/// move and keeps the current position.
pub fn step(position: Position, action: Action) -> Transition {
    let (dx, dy) = action.delta();
    let target = Position::new(position.x + dx, position.y + dy);
    match cell_at(target) {
        Some(Cell::Open) => Transition::Moved(target),
        _ => Transition::Blocked(position),
    }
}

/// Build the board scene: one wrapping container, `ROWS * COLS` cells in
/// reading order, and a disc marker on the player's cell. Deterministic for
/// equal inputs.
pub fn scene(position: Position, side: u32) -> Scene {
    let board = side as f32;
    let cell_size = board / COLS as f32;
    let mut cells = Vec::with_capacity(ROWS * COLS);
    for (row_index, row) in MAZE.iter().enumerate() {
        for (col_index, cell) in row.iter().enumerate() {
            let here = Position::new(col_index as i64, (ROWS - 1 - row_index) as i64);
            let fill = match cell {
                Cell::Wall => WALL_FILL,
                Cell::Open => OPEN_FILL,
            };
            let children = if here == position {
                vec![Node::Disc {
                    diameter: cell_size * 0.6,
                    fill: MARKER_FILL,
                }]
            } else {
                Vec::new()
            };
            cells.push(Node::Rect {
                width: cell_size,
                height: cell_size,
                fill,
                children,
            });
        }
    }
    Scene {
        width: side,
        height: side,
        root: Node::Flex {
            width: board,
            height: board,
            fill: None,
            children: cells,
        },
    }
}
