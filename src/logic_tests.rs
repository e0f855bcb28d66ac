#[cfg(test)]
mod tests {
    use crate::core::{Board, PlayerId, Token};
    use crate::logic::{
        evaluate, legal_moves, match_pattern, outcome, winning_line, Outcome,
        WINNING_LINES,
    };

    #[test]
    fn test_every_winning_line_matches() {
        for line in WINNING_LINES {
            for token in [Token::A, Token::B] {
                let mut board = Board::new();
                for cell in line {
                    board.set(cell, token);
                }
                assert!(match_pattern(&board, token), "line {:?} for {:?}", line, token);
                assert!(!match_pattern(&board, token_opponent(token)));
                assert_eq!(winning_line(&board, token), Some(line));
            }
        }
    }

    fn token_opponent(token: Token) -> Token {
        match token {
            Token::A => Token::B,
            _ => Token::A,
        }
    }

    #[test]
    fn test_no_line_does_not_match() {
        // O O X
        // X X O
        // O X O
        let board = Board::from_glyphs("OOXXXOOXO").unwrap();
        assert!(!match_pattern(&board, Token::A));
        assert!(!match_pattern(&board, Token::B));
        assert_eq!(outcome(&board), Some(Outcome::Draw));

        assert!(!match_pattern(&Board::from_glyphs("OO X     ").unwrap(), Token::A));
    }

    #[test]
    fn test_outcome_and_evaluate() {
        let a_wins = Board::from_glyphs("OOOXX    ").unwrap();
        assert_eq!(outcome(&a_wins), Some(Outcome::Win(PlayerId::PlayerA)));
        assert_eq!(evaluate(&a_wins), 10);

        let b_wins = Board::from_glyphs("X O XO  X").unwrap();
        assert_eq!(outcome(&b_wins), Some(Outcome::Win(PlayerId::PlayerB)));
        assert_eq!(evaluate(&b_wins), -10);

        let running = Board::from_glyphs("O   X    ").unwrap();
        assert_eq!(outcome(&running), None);
        assert_eq!(evaluate(&running), 0);
    }

    #[test]
    fn test_legal_moves_stop_after_win() {
        let board = Board::from_glyphs("OOOXX    ").unwrap();
        assert!(legal_moves(&board).is_empty());

        let board = Board::from_glyphs("O   X    ").unwrap();
        assert_eq!(legal_moves(&board), vec![1, 2, 3, 5, 6, 7, 8]);
    }
}
