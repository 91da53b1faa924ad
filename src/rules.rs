//! Round resolution rules
//!
//! Pure comparison of two simultaneous moves. Rock beats scissors, scissors
//! beat paper, paper beats rock; identical moves tie.

use crate::types::{Move, Outcome};

/// Resolve a pair of moves into an outcome
///
/// Total over the 3x3 move space, no side effects, no failure modes.
pub fn resolve(first: Move, second: Move) -> Outcome {
    if first == second {
        Outcome::Tie
    } else if first.beats() == second {
        Outcome::FirstWins
    } else {
        Outcome::SecondWins
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identical_moves_tie() {
        for mv in Move::ALL {
            assert_eq!(resolve(mv, mv), Outcome::Tie);
        }
    }

    #[test]
    fn test_winning_cycle() {
        assert_eq!(resolve(Move::Rock, Move::Scissors), Outcome::FirstWins);
        assert_eq!(resolve(Move::Scissors, Move::Paper), Outcome::FirstWins);
        assert_eq!(resolve(Move::Paper, Move::Rock), Outcome::FirstWins);

        assert_eq!(resolve(Move::Scissors, Move::Rock), Outcome::SecondWins);
        assert_eq!(resolve(Move::Paper, Move::Scissors), Outcome::SecondWins);
        assert_eq!(resolve(Move::Rock, Move::Paper), Outcome::SecondWins);
    }

    #[test]
    fn test_total_over_all_nine_pairs() {
        let mut ties = 0;
        for a in Move::ALL {
            for b in Move::ALL {
                match resolve(a, b) {
                    Outcome::Tie => {
                        ties += 1;
                        assert_eq!(a, b);
                    }
                    Outcome::FirstWins => assert_eq!(a.beats(), b),
                    Outcome::SecondWins => assert_eq!(b.beats(), a),
                }
            }
        }
        assert_eq!(ties, 3);
    }

    fn any_move() -> impl Strategy<Value = Move> {
        prop::sample::select(Move::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_resolution_is_antisymmetric(a in any_move(), b in any_move()) {
            let forward = resolve(a, b);
            let reverse = resolve(b, a);
            match forward {
                Outcome::Tie => prop_assert_eq!(reverse, Outcome::Tie),
                Outcome::FirstWins => prop_assert_eq!(reverse, Outcome::SecondWins),
                Outcome::SecondWins => prop_assert_eq!(reverse, Outcome::FirstWins),
            }
        }

        #[test]
        fn prop_every_move_beats_exactly_one(a in any_move()) {
            let beaten: Vec<Move> = Move::ALL
                .into_iter()
                .filter(|b| resolve(a, *b) == Outcome::FirstWins)
                .collect();
            prop_assert_eq!(beaten, vec![a.beats()]);
        }
    }
}
