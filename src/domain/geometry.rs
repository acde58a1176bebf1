/// Board geometry: positions, directions and the two coordinate spaces.
///
/// ## Coordinate spaces
///
///   - **Offset**: board-relative, `(0, 0)` is the board center.
///     The robot lives here.
///   - **Absolute**: screen cells. Mines and the person live here.
///
/// `BoardGeometry` is the only place that converts between them:
///   `absolute = offset + (cols/2, rows/2) + origin`

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// One unit step in `dir`.
    #[inline]
    pub fn offset(self, dir: Direction) -> Position {
        let (dx, dy) = dir.delta();
        Position { x: self.x + dx, y: self.y + dy }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// Fixed enumeration order. The navigator's tie-break depends on it.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Screen rows grow downwards, so North is y - 1.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East  => (1, 0),
            Direction::South => (0, 1),
            Direction::West  => (-1, 0),
        }
    }

    pub fn reverse(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East  => Direction::West,
            Direction::South => Direction::North,
            Direction::West  => Direction::East,
        }
    }
}

/// Size of the play area and where it sits on screen.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BoardGeometry {
    pub rows: i32,
    pub cols: i32,
    /// Absolute cell of the board's top-left (border) corner.
    pub origin: Position,
}

impl BoardGeometry {
    pub fn new(cols: i32, rows: i32, origin: Position) -> Self {
        BoardGeometry { rows, cols, origin }
    }

    /// Center a `cols × rows` board on a `screen_cols × screen_rows` screen.
    /// Screens smaller than the board pin the board to the top-left.
    pub fn centered(screen_cols: i32, screen_rows: i32, cols: i32, rows: i32) -> Self {
        let origin = Position::new(
            ((screen_cols - cols) / 2).max(0),
            ((screen_rows - rows) / 2).max(0),
        );
        BoardGeometry::new(cols, rows, origin)
    }

    #[inline]
    fn half(&self) -> Position {
        Position::new(self.cols / 2, self.rows / 2)
    }

    /// Board-relative offset → absolute screen cell.
    #[inline]
    pub fn to_absolute(&self, offset: Position) -> Position {
        let h = self.half();
        Position::new(offset.x + h.x + self.origin.x, offset.y + h.y + self.origin.y)
    }

    /// Absolute screen cell → board-relative offset.
    #[inline]
    pub fn to_offset(&self, absolute: Position) -> Position {
        let h = self.half();
        Position::new(absolute.x - h.x - self.origin.x, absolute.y - h.y - self.origin.y)
    }

    /// Does this offset touch (or pass) the board border?
    #[inline]
    pub fn is_wall(&self, offset: Position) -> bool {
        let h = self.half();
        offset.x.abs() >= h.x || offset.y.abs() >= h.y
    }

    /// Absolute x range `[lo, hi)` for random placement with `margin`
    /// cells skipped from the left border.
    pub fn x_band(&self, margin: i32) -> (i32, i32) {
        let lo = self.origin.x + margin;
        (lo, lo + (self.cols - 4).max(1))
    }

    /// Same as `x_band`, vertically.
    pub fn y_band(&self, margin: i32) -> (i32, i32) {
        let lo = self.origin.y + margin;
        (lo, lo + (self.rows - 4).max(1))
    }

    /// Is the absolute cell strictly inside the border?
    pub fn is_interior(&self, absolute: Position) -> bool {
        !self.is_wall(self.to_offset(absolute))
    }
}

/// Manhattan distance between two absolute cells.
#[inline]
pub fn manhattan(a: Position, b: Position) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Distance from a robot offset to an absolute target.
#[inline]
pub fn distance_from_offset(geom: &BoardGeometry, offset: Position, target: Position) -> i32 {
    manhattan(geom.to_absolute(offset), target)
}
