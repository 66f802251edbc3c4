use crate::grid::{Direction, Extent, OccupancyGrid, Position};
use crate::history::History;
use crate::layout::{CreateError, Layout, MAX_BOXES};
use crate::pathfinder::find_path;
use crate::state::{IllegalMove, Push, PuzzleState};
use log::warn;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A playable puzzle: a shared layout plus the history of states reached
/// from its initial state.
#[derive(Debug, Clone)]
pub struct Puzzle {
    layout: Arc<Layout>,
    initial: PuzzleState,
    history: History<PuzzleState>,
}

impl Puzzle {
    pub fn new(
        walls: &OccupancyGrid,
        targets: BTreeSet<Position>,
        boxes: BTreeSet<Position>,
        player: Position,
    ) -> Result<Self, CreateError> {
        if boxes.len() > MAX_BOXES {
            return Err(CreateError::TooManyBoxes(boxes.len()));
        }
        if boxes.len() != targets.len() {
            return Err(CreateError::BoxTargetMismatch {
                boxes: boxes.len(),
                targets: targets.len(),
            });
        }

        let layout = Layout::new(walls, targets, player)?;
        let initial = PuzzleState::new(&layout, boxes, player)?;

        Ok(Puzzle {
            layout: Arc::new(layout),
            history: History::new(initial.clone()),
            initial,
        })
    }

    /// Parse a puzzle in XSB format: `#` wall, ` ` floor, `.` target, `$` box,
    /// `*` box on target, `@` player, `+` player on target. Short lines are
    /// padded with floor.
    pub fn from_text(text: &str) -> Result<Self, CreateError> {
        let lines: Vec<&str> = text.lines().collect();
        if lines.is_empty() {
            return Err(CreateError::EmptyBoard);
        }

        let rows = lines.len();
        let cols = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);
        let mut walls = OccupancyGrid::new(Extent::new(rows as i32, cols as i32), false);
        let mut targets = BTreeSet::new();
        let mut boxes = BTreeSet::new();
        let mut player = None;

        for (row, line) in lines.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let pos = Position::new(row as i32, col as i32);
                match ch {
                    '#' => walls.set(pos, true),
                    ' ' => {}
                    '.' => {
                        targets.insert(pos);
                    }
                    '$' => {
                        boxes.insert(pos);
                    }
                    '*' => {
                        targets.insert(pos);
                        boxes.insert(pos);
                    }
                    '@' | '+' => {
                        if player.is_some() {
                            return Err(CreateError::MultiplePlayers);
                        }
                        player = Some(pos);
                        if ch == '+' {
                            targets.insert(pos);
                        }
                    }
                    _ => return Err(CreateError::InvalidCharacter { ch, row, col }),
                }
            }
        }

        let player = player.ok_or(CreateError::NoPlayer)?;
        Self::new(&walls, targets, boxes, player)
    }

    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    pub fn initial(&self) -> &PuzzleState {
        &self.initial
    }

    pub fn current(&self) -> &PuzzleState {
        self.history.current()
    }

    pub fn is_solved(&self) -> bool {
        self.current().is_goal(&self.layout)
    }

    /// Discard the history and go back to the initial state.
    pub fn restart(&mut self) {
        self.history.reset(self.initial.clone());
    }

    /// Replace the current state. Earlier states are kept, later ones dropped.
    pub fn set_current(&mut self, player: Position, boxes: BTreeSet<Position>) -> Result<(), CreateError> {
        let state = PuzzleState::new(&self.layout, boxes, player)?;
        self.history.replace_current(state);
        Ok(())
    }

    /// Drop every state after the current one and, if given, append `state`.
    pub fn set_next(&mut self, state: Option<PuzzleState>) {
        self.history.set_next(state);
    }

    pub fn has_next(&self) -> bool {
        self.history.has_next()
    }

    pub fn has_previous(&self) -> bool {
        self.history.has_previous()
    }

    pub fn next(&mut self) -> Option<&PuzzleState> {
        self.history.next()
    }

    pub fn previous(&mut self) -> Option<&PuzzleState> {
        self.history.previous()
    }

    /// The final state of the forward branch.
    pub fn last(&self) -> &PuzzleState {
        self.history.last()
    }

    pub fn set_last(&mut self, state: Option<PuzzleState>) {
        self.history.set_last(state);
    }

    /// Move the player one cell. Walking replaces the current state; pushing
    /// a box starts a new one.
    pub fn step(&mut self, direction: Direction) -> Result<(), IllegalMove> {
        let current = self.current();
        let target = current.player().adjacent(direction);

        if current.is_reachable(target) {
            let boxes = current.boxes().clone();
            self.set_current(target, boxes)?;
        } else if current.has_box(target) {
            let next = current.apply_push(&self.layout, Push::new(target, direction))?;
            self.history.set_next(Some(next));
            self.history.next();
        } else {
            return Err(IllegalMove::StepBlocked(direction));
        }
        Ok(())
    }

    /// Walk the player to `position` along a shortest path, returning the
    /// directions taken.
    pub fn move_to(&mut self, position: Position) -> Result<Vec<Direction>, IllegalMove> {
        let current = self.current();
        let path = find_path(current.reachable(), current.player(), position)
            .ok_or(IllegalMove::Unreachable(position))?;
        for &direction in &path {
            self.step(direction)?;
        }
        Ok(path)
    }

    /// Append the states produced by `pushes` after the current one,
    /// replacing any forward branch. On failure the forward branch is
    /// cleared.
    pub fn replay(&mut self, pushes: &[Push]) -> Result<(), IllegalMove> {
        self.history.set_next(None);
        for &push in pushes {
            match self.history.last().apply_push(&self.layout, push) {
                Ok(next) => self.history.set_last(Some(next)),
                Err(err) => {
                    warn!("solution does not replay: {} failed: {}", push, err);
                    self.history.set_next(None);
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Render `state` over this puzzle's layout.
    pub fn render<'a>(&'a self, state: &'a PuzzleState) -> Rendered<'a> {
        Rendered {
            layout: &self.layout,
            state,
        }
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(self.current()))
    }
}

/// A state drawn in XSB form.
pub struct Rendered<'a> {
    layout: &'a Layout,
    state: &'a PuzzleState,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extent = self.layout.extent();
        for row in 0..extent.rows {
            let mut line = String::new();
            for col in 0..extent.cols {
                let pos = Position::new(row, col);
                let target = self.layout.is_target(pos);
                let ch = if pos == self.state.player() {
                    if target { '+' } else { '@' }
                } else if self.state.has_box(pos) {
                    if target { '*' } else { '$' }
                } else if self.layout.is_wall(pos) {
                    '#'
                } else if target {
                    '.'
                } else {
                    ' '
                };
                line.push(ch);
            }
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: i32, col: i32) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn test_parse() {
        let input = "####\n\
                     # .#\n\
                     #  ###\n\
                     #*@  #\n\
                     #  $ #\n\
                     #  ###\n\
                     ####";
        let puzzle = Puzzle::from_text(input).unwrap();

        assert_eq!(puzzle.layout().extent(), Extent::new(7, 6));
        assert_eq!(puzzle.current().player(), pos(3, 2));
        assert_eq!(puzzle.current().boxes(), &BTreeSet::from([pos(3, 1), pos(4, 3)]));
        assert_eq!(puzzle.layout().targets(), &BTreeSet::from([pos(1, 2), pos(3, 1)]));
        assert!(puzzle.layout().is_wall(pos(2, 5)));
        assert!(!puzzle.is_solved());
    }

    #[test]
    fn test_display() {
        let input = "####\n\
                     # .#\n\
                     #  ###\n\
                     #*@  #\n\
                     #  $ #\n\
                     #  ###\n\
                     ####";
        let puzzle = Puzzle::from_text(input).unwrap();
        assert_eq!(puzzle.to_string().trim_end(), input);
    }

    #[test]
    fn test_player_on_target() {
        let input = "#####\n\
                     #$+ #\n\
                     #$. #\n\
                     #####";
        let puzzle = Puzzle::from_text(input).unwrap();
        assert_eq!(puzzle.current().player(), pos(1, 2));
        assert!(puzzle.layout().is_target(pos(1, 2)));
        assert_eq!(puzzle.to_string().trim_end(), input);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Puzzle::from_text("").unwrap_err(), CreateError::EmptyBoard);
        assert_eq!(
            Puzzle::from_text("####\n#  #\n####").unwrap_err(),
            CreateError::NoPlayer
        );
        assert_eq!(
            Puzzle::from_text("####\n#@@#\n####").unwrap_err(),
            CreateError::MultiplePlayers
        );
        assert_eq!(
            Puzzle::from_text("####\n#@x#\n####").unwrap_err(),
            CreateError::InvalidCharacter {
                ch: 'x',
                row: 1,
                col: 2
            }
        );
        assert_eq!(
            Puzzle::from_text("#####\n#@$$.#\n#####").unwrap_err(),
            CreateError::BoxTargetMismatch { boxes: 2, targets: 1 }
        );
        assert_eq!(
            Puzzle::from_text("####\n#@ #\n####").unwrap_err(),
            CreateError::NoTargets
        );
    }

    #[test]
    fn test_too_many_boxes() {
        let walls = OccupancyGrid::new(Extent::new(10, 10), false);
        let cells: Vec<Position> = Extent::new(10, 10).positions().collect();
        let boxes: BTreeSet<Position> = cells[1..=MAX_BOXES + 1].iter().copied().collect();
        let targets = boxes.clone();
        assert_eq!(
            Puzzle::new(&walls, targets, boxes, cells[0]).unwrap_err(),
            CreateError::TooManyBoxes(MAX_BOXES + 1)
        );
    }

    #[test]
    fn test_step_walk_and_push() {
        let mut puzzle = Puzzle::from_text(
            "######\n\
             #@ $.#\n\
             ######",
        )
        .unwrap();

        puzzle.step(Direction::East).unwrap();
        assert_eq!(puzzle.current().player(), pos(1, 2));
        // Walking does not grow the history.
        assert!(!puzzle.has_previous());

        puzzle.step(Direction::East).unwrap();
        assert_eq!(puzzle.current().player(), pos(1, 3));
        assert!(puzzle.current().has_box(pos(1, 4)));
        assert!(puzzle.has_previous());
        assert!(puzzle.is_solved());

        assert_eq!(puzzle.step(Direction::East), Err(IllegalMove::Blocked {
            from: pos(1, 4),
            direction: Direction::East
        }));
        assert_eq!(puzzle.step(Direction::North), Err(IllegalMove::StepBlocked(Direction::North)));

        puzzle.previous();
        assert_eq!(puzzle.current().player(), pos(1, 2));
        assert!(puzzle.has_next());
    }

    #[test]
    fn test_move_to() {
        let mut puzzle = Puzzle::from_text(
            "######\n\
             #@   #\n\
             # ## #\n\
             #  $.#\n\
             ######",
        )
        .unwrap();

        let path = puzzle.move_to(pos(3, 2)).unwrap();
        assert_eq!(path, vec![Direction::South, Direction::South, Direction::East]);
        assert_eq!(puzzle.current().player(), pos(3, 2));
        assert!(!puzzle.has_previous());

        assert_eq!(puzzle.move_to(pos(3, 3)), Err(IllegalMove::Unreachable(pos(3, 3))));
        assert_eq!(puzzle.move_to(pos(0, 0)), Err(IllegalMove::Unreachable(pos(0, 0))));
    }

    #[test]
    fn test_set_current() {
        let mut puzzle = Puzzle::from_text(
            "#####\n\
             #@$.#\n\
             #   #\n\
             #####",
        )
        .unwrap();

        puzzle.set_current(pos(2, 3), BTreeSet::from([pos(1, 2)])).unwrap();
        assert_eq!(puzzle.current().player(), pos(2, 3));
        assert_eq!(
            puzzle.set_current(pos(1, 2), BTreeSet::from([pos(1, 2)])),
            Err(CreateError::PlayerOnBox(pos(1, 2)))
        );
        assert_eq!(puzzle.current().player(), pos(2, 3));

        puzzle.restart();
        assert_eq!(puzzle.current(), puzzle.initial());
    }

    #[test]
    fn test_replay() {
        let mut puzzle = Puzzle::from_text(
            "#######\n\
             #@$  .#\n\
             #######",
        )
        .unwrap();
        let pushes = [
            Push::new(pos(1, 2), Direction::East),
            Push::new(pos(1, 3), Direction::East),
            Push::new(pos(1, 4), Direction::East),
        ];

        puzzle.replay(&pushes).unwrap();
        assert!(puzzle.last().is_goal(puzzle.layout()));
        assert_eq!(puzzle.current(), puzzle.initial());

        let mut seen = 0;
        while puzzle.next().is_some() {
            seen += 1;
        }
        assert_eq!(seen, 3);
        assert!(puzzle.is_solved());
    }

    #[test]
    fn test_replay_failure_clears_forward() {
        let mut puzzle = Puzzle::from_text(
            "######\n\
             #@$ .#\n\
             ######",
        )
        .unwrap();
        let pushes = [
            Push::new(pos(1, 2), Direction::East),
            Push::new(pos(1, 2), Direction::East),
        ];

        assert_eq!(puzzle.replay(&pushes), Err(IllegalMove::NoBox(pos(1, 2))));
        assert!(!puzzle.has_next());
        assert_eq!(puzzle.last(), puzzle.initial());
    }

    #[test]
    fn test_render_state() {
        let puzzle = Puzzle::from_text(
            "#####\n\
             #@$.#\n\
             #####",
        )
        .unwrap();
        let next = puzzle
            .current()
            .apply_push(puzzle.layout(), Push::new(pos(1, 2), Direction::East))
            .unwrap();
        assert_eq!(puzzle.render(&next).to_string(), "#####\n# @*#\n#####\n");
    }
}
