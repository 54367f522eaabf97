//! Tests for the board grid and piece geometry
//!
//! Test categories:
//! - Reset and lock-in
//! - Placement validity
//! - Match marking and row compaction
//! - Shape templates and rotation
//! - Piece providers

use blockdrop::config::{DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH};
use blockdrop::game::test_helpers::*;
use blockdrop::{
    Board, CellState, Piece, PieceProvider, Position, RandomPieceProvider, SeededPieceProvider,
    SequencePieceProvider, TetrominoType,
};

const W: usize = DEFAULT_GRID_WIDTH;
const H: usize = DEFAULT_GRID_HEIGHT;

fn non_empty_rows(board: &Board) -> usize {
    (0..board.height())
        .filter(|&y| board.filled_count_in_row(y) > 0)
        .count()
}

// ============================================================================
// Reset and Lock-in
// ============================================================================

mod lock_in {
    use super::*;

    #[test]
    fn new_board_is_empty() {
        let board = Board::new(W, H);

        assert_eq!(board.width(), W);
        assert_eq!(board.height(), H);
        assert_eq!(board.total_filled_cells(), 0);
    }

    #[test]
    fn reset_empties_every_cell() {
        let mut grid = empty_grid();
        fill_row(&mut grid, H - 1);
        fill_row_with_gap(&mut grid, H - 2, 3);
        grid[0][0] = CellState::Filled(TetrominoType::L);
        let mut board = Board::with_grid(grid);
        board.check_for_matches();

        board.reset();

        assert!(board.cells().iter().flatten().all(|cell| *cell == CellState::Empty));
        assert!(board.pending_matches().is_empty());
        assert_eq!(board.height(), H);
        assert_eq!(board.width(), W);
    }

    #[test]
    fn lock_in_writes_square_cells() {
        let mut board = Board::new(W, H);
        let piece = Piece::new_at(TetrominoType::O, 4, 13);

        board.lock_in_piece(&piece);

        for (x, y) in [(4, 13), (5, 13), (4, 14), (5, 14)] {
            assert_eq!(board.cell(x, y), Some(CellState::Filled(TetrominoType::O)));
        }
        assert_eq!(board.total_filled_cells(), 4);
    }

    #[test]
    fn lock_in_skips_empty_shape_cells() {
        let mut board = Board::new(W, H);
        board.lock_in_piece(&Piece::new_at(TetrominoType::T, 0, 13));

        // ###
        // .#.
        assert_eq!(board.cell(0, 13), Some(CellState::Filled(TetrominoType::T)));
        assert_eq!(board.cell(2, 13), Some(CellState::Filled(TetrominoType::T)));
        assert_eq!(board.cell(1, 14), Some(CellState::Filled(TetrominoType::T)));
        assert_eq!(board.cell(0, 14), Some(CellState::Empty));
        assert_eq!(board.cell(2, 14), Some(CellState::Empty));
    }

    #[test]
    fn lock_in_does_not_overwrite_with_empty_cells() {
        let mut grid = empty_grid();
        grid[14][0] = CellState::Filled(TetrominoType::J);
        let mut board = Board::with_grid(grid);

        board.lock_in_piece(&Piece::new_at(TetrominoType::T, 0, 13));

        assert_eq!(board.cell(0, 14), Some(CellState::Filled(TetrominoType::J)));
    }
}

// ============================================================================
// Placement Validity
// ============================================================================

mod validity {
    use super::*;

    #[test]
    fn rejects_left_wall() {
        let board = Board::new(W, H);
        let shape = TetrominoType::O.shape();

        assert!(!board.is_valid_on_board(Position::new(-1, 5), &shape));
        assert!(board.is_valid_on_board(Position::new(0, 5), &shape));
    }

    #[test]
    fn rejects_right_wall() {
        let board = Board::new(W, H);
        let shape = TetrominoType::O.shape();

        assert!(!board.is_valid_on_board(Position::new(W as i16 - 1, 5), &shape));
        assert!(board.is_valid_on_board(Position::new(W as i16 - 2, 5), &shape));
    }

    #[test]
    fn rejects_floor() {
        let board = Board::new(W, H);
        let shape = TetrominoType::O.shape();

        assert!(!board.is_valid_on_board(Position::new(4, H as i16 - 1), &shape));
        assert!(board.is_valid_on_board(Position::new(4, H as i16 - 2), &shape));
    }

    #[test]
    fn rejects_overlap_with_stack() {
        let mut grid = empty_grid();
        grid[6][5] = CellState::Filled(TetrominoType::Z);
        let board = Board::with_grid(grid);
        let shape = TetrominoType::O.shape();

        assert!(!board.is_valid_on_board(Position::new(4, 5), &shape));
        assert!(board.is_valid_on_board(Position::new(6, 5), &shape));
    }

    #[test]
    fn empty_shape_cells_may_cover_stack() {
        let mut grid = empty_grid();
        grid[14][0] = CellState::Filled(TetrominoType::Z);
        let board = Board::with_grid(grid);

        // Bottom-left of the T shape is empty.
        assert!(board.is_valid_on_board(Position::new(0, 13), &TetrominoType::T.shape()));
    }

    #[test]
    fn above_board_skips_overlap_test() {
        let mut grid = empty_grid();
        fill_row(&mut grid, 0);
        let board = Board::with_grid(grid);
        let shape = TetrominoType::O.shape();

        assert!(board.is_valid_on_board(Position::new(4, -1), &shape));
        assert!(!board.is_valid_on_board(Position::new(4, 0), &shape));
    }

    #[test]
    fn above_board_still_checks_walls() {
        let board = Board::new(W, H);
        let shape = TetrominoType::O.shape();

        assert!(!board.is_valid_on_board(Position::new(-1, -3), &shape));
        assert!(!board.is_valid_on_board(Position::new(W as i16 - 1, -3), &shape));
    }

    #[test]
    fn move_check_does_not_move_piece() {
        let board = Board::new(W, H);
        let piece = Piece::new_at(TetrominoType::O, 4, 5);

        assert!(board.is_move_valid(Position::DOWN, &piece));
        assert!(board.is_move_valid(Position::LEFT, &piece));
        assert_eq!(piece.top_left(), Position::new(4, 5));
    }

    #[test]
    fn move_check_rejects_floor() {
        let board = Board::new(W, H);
        let piece = Piece::new_at(TetrominoType::O, 4, H as i16 - 2);

        assert!(!board.is_move_valid(Position::DOWN, &piece));
        assert!(board.is_move_valid(Position::UP, &piece));
    }
}

// ============================================================================
// Match Marking and Row Compaction
// ============================================================================

mod matching {
    use super::*;

    #[test]
    fn marks_only_complete_rows() {
        let mut grid = empty_grid();
        fill_row(&mut grid, H - 1);
        fill_row_with_gap(&mut grid, H - 2, 5);
        fill_row(&mut grid, H - 3);
        let mut board = Board::with_grid(grid);

        let matched = board.check_for_matches();

        assert_eq!(matched, 2);
        assert_eq!(board.pending_matches(), &[H - 3, H - 1]);
        assert!(board.cells()[H - 1].iter().all(|c| *c == CellState::Matched));
        assert!(board.cells()[H - 3].iter().all(|c| *c == CellState::Matched));
        assert!(!board.cells()[H - 2].contains(&CellState::Matched));
        assert_eq!(board.filled_count_in_row(H - 2), W - 1);
    }

    #[test]
    fn no_complete_rows_matches_nothing() {
        let mut grid = empty_grid();
        fill_row_with_gap(&mut grid, H - 1, 0);
        let mut board = Board::with_grid(grid.clone());

        assert_eq!(board.check_for_matches(), 0);
        assert!(board.pending_matches().is_empty());
        assert_eq!(board.cells(), grid.as_slice());
    }

    #[test]
    fn matched_cells_use_reserved_tag() {
        assert_eq!(CellState::Matched.tag(), 8);
        assert_eq!(CellState::Empty.tag(), 0);
        assert_eq!(CellState::Filled(TetrominoType::J).tag(), 7);
    }

    #[test]
    fn clearing_without_matches_changes_nothing() {
        let mut grid = empty_grid();
        grid[H - 1][3] = CellState::Filled(TetrominoType::S);
        let mut board = Board::with_grid(grid.clone());

        assert_eq!(board.clear_matched_rows(), 0);
        assert_eq!(board.cells(), grid.as_slice());
    }

    #[test]
    fn rows_above_cleared_line_fall_down() {
        let mut grid = empty_grid();
        fill_row(&mut grid, H - 1);
        grid[H - 2][0] = CellState::Filled(TetrominoType::J);
        let mut board = Board::with_grid(grid);

        board.check_for_matches();
        let cleared = board.clear_matched_rows();

        assert_eq!(cleared, 1);
        assert_eq!(board.cell(0, H - 1), Some(CellState::Filled(TetrominoType::J)));
        assert_eq!(board.filled_count_in_row(H - 1), 1);
        assert_eq!(board.filled_count_in_row(H - 2), 0);
        assert!(board.pending_matches().is_empty());
    }

    #[test]
    fn non_contiguous_rows_compact_in_order() {
        let mut grid = empty_grid();
        fill_row(&mut grid, H - 1);
        grid[H - 2][3] = CellState::Filled(TetrominoType::T);
        fill_row(&mut grid, H - 3);
        grid[H - 4][0] = CellState::Filled(TetrominoType::L);
        let mut board = Board::with_grid(grid);
        let rows_before = non_empty_rows(&board);

        assert_eq!(board.check_for_matches(), 2);
        assert_eq!(board.clear_matched_rows(), 2);

        assert_eq!(board.cell(3, H - 1), Some(CellState::Filled(TetrominoType::T)));
        assert_eq!(board.cell(0, H - 2), Some(CellState::Filled(TetrominoType::L)));
        assert_eq!(board.total_filled_cells(), 2);
        assert_eq!(non_empty_rows(&board), rows_before - 2);
    }

    #[test]
    fn adjacent_rows_compact() {
        let mut grid = empty_grid();
        for y in (H - 4)..H {
            fill_row(&mut grid, y);
        }
        grid[H - 5][7] = CellState::Filled(TetrominoType::I);
        let mut board = Board::with_grid(grid);

        assert_eq!(board.check_for_matches(), 4);
        board.clear_matched_rows();

        assert_eq!(board.total_filled_cells(), 1);
        assert_eq!(board.cell(7, H - 1), Some(CellState::Filled(TetrominoType::I)));
    }

    #[test]
    fn top_row_is_empty_after_clear() {
        let mut grid = empty_grid();
        fill_row(&mut grid, 0);
        grid[1][2] = CellState::Filled(TetrominoType::O);
        let mut board = Board::with_grid(grid);

        board.check_for_matches();
        board.clear_matched_rows();

        assert_eq!(board.filled_count_in_row(0), 0);
        assert_eq!(board.cell(2, 1), Some(CellState::Filled(TetrominoType::O)));
    }

    #[test]
    fn all_rows_filled_and_cleared() {
        let mut grid = empty_grid();
        for y in 0..H {
            fill_row(&mut grid, y);
        }
        let mut board = Board::with_grid(grid);

        assert_eq!(board.check_for_matches(), H as u32);
        assert_eq!(board.clear_matched_rows(), H as u32);
        assert_eq!(board.total_filled_cells(), 0);
    }
}

// ============================================================================
// Shape Templates and Rotation
// ============================================================================

mod rotation {
    use super::*;

    fn filled(kind: TetrominoType, pattern: &[&str]) -> Vec<Vec<CellState>> {
        pattern
            .iter()
            .map(|row| {
                row.chars()
                    .map(|c| {
                        if c == '#' {
                            CellState::Filled(kind)
                        } else {
                            CellState::Empty
                        }
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn template_dimensions() {
        let expected = [
            (TetrominoType::I, 1, 4),
            (TetrominoType::Z, 3, 2),
            (TetrominoType::S, 3, 2),
            (TetrominoType::T, 3, 2),
            (TetrominoType::O, 2, 2),
            (TetrominoType::L, 2, 3),
            (TetrominoType::J, 2, 3),
        ];

        for (kind, width, height) in expected {
            let shape = kind.shape();
            assert_eq!((shape.width(), shape.height()), (width, height), "{kind:?}");
            assert_eq!(shape.filled_cells().count(), 4, "{kind:?}");
        }
    }

    #[test]
    fn tags_are_distinct_and_in_range() {
        let mut tags: Vec<u8> = TetrominoType::ALL.iter().map(|k| k.tag()).collect();
        tags.sort_unstable();
        assert_eq!(tags, vec![1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn top_left_is_anchor_minus_pivot() {
        let piece = Piece::new(TetrominoType::T, Position::new(5, -2));

        assert_eq!(piece.position(), Position::new(5, -2));
        assert_eq!(piece.pivot(), Position::new(1, 0));
        assert_eq!(piece.top_left(), Position::new(4, -2));
        assert!(piece.is_spawning());
    }

    #[test]
    fn clockwise_turns_t_stem_left() {
        let board = Board::new(W, H);
        let mut piece = Piece::new_at(TetrominoType::T, 4, 5);

        assert!(piece.rotate_clockwise(&board));

        assert_eq!(
            piece.shape().rows(),
            filled(TetrominoType::T, &[".#", "##", ".#"]).as_slice()
        );
        assert_eq!((piece.width(), piece.height()), (2, 3));
    }

    #[test]
    fn counter_clockwise_turns_t_stem_right() {
        let board = Board::new(W, H);
        let mut piece = Piece::new_at(TetrominoType::T, 4, 5);

        assert!(piece.rotate_counter_clockwise(&board));

        assert_eq!(
            piece.shape().rows(),
            filled(TetrominoType::T, &["#.", "##", "#."]).as_slice()
        );
    }

    #[test]
    fn clockwise_l_lies_flat() {
        let board = Board::new(W, H);
        let mut piece = Piece::new_at(TetrominoType::L, 4, 5);

        assert!(piece.rotate_clockwise(&board));

        assert_eq!(
            piece.shape().rows(),
            filled(TetrominoType::L, &["###", "#.."]).as_slice()
        );
    }

    #[test]
    fn rotation_swaps_dimensions() {
        let board = Board::new(W, H);
        let mut piece = Piece::new_at(TetrominoType::I, 3, 5);

        assert!(piece.rotate_clockwise(&board));

        assert_eq!((piece.width(), piece.height()), (4, 1));
        assert_eq!(piece.top_left(), Position::new(3, 5));
    }

    #[test]
    fn four_rotations_restore_every_shape() {
        let board = Board::new(W, H);

        for kind in TetrominoType::ALL {
            let original = Piece::new_at(kind, 3, 5);

            let mut clockwise = original.clone();
            for _ in 0..4 {
                assert!(clockwise.rotate_clockwise(&board), "{kind:?}");
            }
            assert_eq!(clockwise, original, "{kind:?} clockwise");

            let mut counter = original.clone();
            for _ in 0..4 {
                assert!(counter.rotate_counter_clockwise(&board), "{kind:?}");
            }
            assert_eq!(counter, original, "{kind:?} counter-clockwise");
        }
    }

    #[test]
    fn opposite_rotations_cancel() {
        let board = Board::new(W, H);

        for kind in TetrominoType::ALL {
            let original = Piece::new_at(kind, 3, 5);
            let mut piece = original.clone();

            assert!(piece.rotate_clockwise(&board));
            assert!(piece.rotate_counter_clockwise(&board));
            assert_eq!(piece, original, "{kind:?}");
        }
    }

    #[test]
    fn rotation_into_wall_is_rejected() {
        let board = Board::new(W, H);
        let mut piece = Piece::new_at(TetrominoType::I, W as i16 - 1, 5);
        let before = piece.clone();

        assert!(!piece.rotate_clockwise(&board));
        assert!(!piece.rotate_counter_clockwise(&board));
        assert_eq!(piece, before);
    }

    #[test]
    fn rotation_into_floor_is_rejected() {
        let board = Board::new(W, H);
        let mut piece = Piece::new_at(TetrominoType::Z, 4, H as i16 - 2);
        let before = piece.clone();

        // Turning Z upright needs three rows.
        assert!(!piece.rotate_clockwise(&board));
        assert_eq!(piece, before);
    }

    #[test]
    fn rotation_into_stack_is_rejected() {
        let mut grid = empty_grid();
        grid[5][5] = CellState::Filled(TetrominoType::O);
        let board = Board::with_grid(grid);
        let mut piece = Piece::new_at(TetrominoType::I, 3, 5);
        let before = piece.clone();

        assert!(!piece.rotate_clockwise(&board));
        assert_eq!(piece, before);
    }

    #[test]
    fn rotation_disabled_while_spawning() {
        let board = Board::new(W, H);
        let mut piece = Piece::new_at(TetrominoType::T, 4, -1);
        let before = piece.clone();

        assert!(!piece.rotate_clockwise(&board));
        assert!(!piece.rotate_counter_clockwise(&board));
        assert_eq!(piece, before);
    }

    #[test]
    fn blocks_are_absolute_positions() {
        let piece = Piece::new_at(TetrominoType::O, 4, 5);
        let blocks = piece.blocks();

        assert_eq!(blocks.len(), 4);
        for block in [(4, 5), (5, 5), (4, 6), (5, 6)] {
            assert!(blocks.contains(&Position::new(block.0, block.1)));
        }
    }

    #[test]
    fn reset_returns_to_spawn_with_new_kind() {
        let spawn = Position::new(5, -2);
        let mut provider = SequencePieceProvider::new(vec![TetrominoType::S]);
        let mut piece = Piece::new(TetrominoType::I, spawn);
        piece.translate(Position::DOWN);
        piece.translate(Position::LEFT);

        piece.reset(&mut provider);

        assert_eq!(piece.kind(), TetrominoType::S);
        assert_eq!(piece.position(), spawn);
        assert_eq!(piece.shape(), &TetrominoType::S.shape());
    }

    #[test]
    fn translate_moves_anchor() {
        let mut piece = Piece::new_at(TetrominoType::O, 4, 5);

        piece.translate(Position::RIGHT);
        piece.translate(Position::DOWN);

        assert_eq!(piece.top_left(), Position::new(5, 6));
    }
}

// ============================================================================
// Piece Providers
// ============================================================================

mod providers {
    use super::*;

    #[test]
    fn sequence_provider_cycles() {
        let mut provider = SequencePieceProvider::new(vec![TetrominoType::I, TetrominoType::O]);

        assert_eq!(provider.next_piece(), TetrominoType::I);
        assert_eq!(provider.next_piece(), TetrominoType::O);
        assert_eq!(provider.next_piece(), TetrominoType::I);
    }

    #[test]
    fn seeded_provider_is_reproducible() {
        let mut first = SeededPieceProvider::new(42);
        let mut second = SeededPieceProvider::new(42);

        let a: Vec<_> = (0..32).map(|_| first.next_piece()).collect();
        let b: Vec<_> = (0..32).map(|_| second.next_piece()).collect();

        assert_eq!(a, b);
    }

    #[test]
    fn random_provider_draws_every_kind() {
        let mut provider = RandomPieceProvider;
        let mut seen = Vec::new();

        for _ in 0..1000 {
            let kind = provider.next_piece();
            if !seen.contains(&kind) {
                seen.push(kind);
            }
        }

        assert_eq!(seen.len(), TetrominoType::ALL.len());
    }
}
