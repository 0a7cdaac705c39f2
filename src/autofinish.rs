use crate::game::CardGame;
use crate::pile::Pile;
use crate::region::{Move, RegionKind};

/// Outcome of asking the driver for its next move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Play this move next.
    Moved(Move),
    /// Nothing left to do.
    Won,
    /// Some row is out of order; finishing automatically is not safe.
    Unavailable,
    /// Rows are sorted but no foundation accepts any top card.
    Stalled,
}

/// True when every row's ranks never increase from bottom to top.
pub fn rows_sorted(game: &dyn CardGame) -> bool {
    game.regions_of(RegionKind::Row)
        .into_iter()
        .filter_map(|region| game.pile(region))
        .all(Pile::is_descending)
}

/// Can the rest of the game be played out automatically?
pub fn available(game: &dyn CardGame) -> bool {
    !game.is_game_won() && rows_sorted(game)
}

/// The next greedy move: the first row, scanning from row 0, whose top card
/// some foundation (scanning from 0) accepts.
///
/// With every row sorted each such move is safe, so playing `next_step`
/// until it reports [`Step::Won`] finishes the game without backtracking.
pub fn next_step(game: &dyn CardGame) -> Step {
    if game.is_game_won() {
        return Step::Won;
    }
    if !rows_sorted(game) {
        return Step::Unavailable;
    }
    let foundations = game.regions_of(RegionKind::Foundation);
    for from in game.regions_of(RegionKind::Row) {
        if let Some(&to) = foundations.iter().find(|&&to| game.is_legal_move(from, to)) {
            return Step::Moved(Move::new(from, to));
        }
    }
    Step::Stalled
}

/// Upper bound on the moves needed to finish: one per card still in a row.
pub fn move_budget(game: &dyn CardGame) -> usize {
    game.regions_of(RegionKind::Row)
        .into_iter()
        .filter_map(|region| game.pile(region))
        .map(Pile::len)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, Rank, Suit};
    use crate::castle::tests::{card, foundations_up_to};
    use crate::castle::{Castle, Variant};
    use crate::region::Region;

    /// Play greedy moves directly on the game until it stops.
    fn play_out(game: &mut Castle) -> (Step, usize) {
        let budget = move_budget(game);
        let mut moves = 0;
        loop {
            match next_step(game) {
                Step::Moved(mv) => {
                    assert!(game.move_card(mv.from, mv.to));
                    moves += 1;
                    assert!(moves <= budget, "driver exceeded its move budget");
                }
                other => return (other, moves),
            }
        }
    }

    #[test]
    fn unsorted_row_blocks_auto_finish() {
        let mut game = Castle::from_piles(
            Variant::BeleagueredCastle,
            vec![vec![card(Rank::Two, Suit::Clubs), card(Rank::Three, Suit::Clubs)]],
            foundations_up_to([Some(Rank::Ace), None, None, None]),
        );
        assert!(!available(&game));
        let before: Vec<_> = game.rows().iter().map(Pile::ids).collect();
        assert_eq!(next_step(&game), Step::Unavailable);
        assert_eq!(play_out(&mut game), (Step::Unavailable, 0));
        let after: Vec<_> = game.rows().iter().map(Pile::ids).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn one_card_left() {
        let mut tops = [Some(Rank::King); 4];
        tops[3] = Some(Rank::Queen);
        let mut game = Castle::from_piles(
            Variant::BeleagueredCastle,
            vec![vec![], vec![], vec![], vec![], vec![], vec![card(Rank::King, Suit::Spades)]],
            foundations_up_to(tops),
        );
        assert!(available(&game));
        assert_eq!(
            next_step(&game),
            Step::Moved(Move::new(Region::row(5), Region::foundation(3)))
        );
        assert_eq!(play_out(&mut game), (Step::Won, 1));
        assert!(!available(&game));
    }

    #[test]
    fn sorted_rows_finish_in_budget() {
        // Every row holds one suit from King down to Two; interleave suits so
        // the driver must hop between rows.
        let rows: Vec<Vec<Card>> = Suit::ALL
            .iter()
            .flat_map(|&suit| {
                let high: Vec<Card> = Rank::ALL[7..].iter().rev().map(|&r| card(r, suit)).collect();
                let low: Vec<Card> = Rank::ALL[1..7].iter().rev().map(|&r| card(r, suit)).collect();
                [high, low]
            })
            .collect();
        let mut game = Castle::from_piles(
            Variant::BeleagueredCastle,
            rows,
            foundations_up_to([Some(Rank::Ace); 4]),
        );
        assert!(available(&game));
        let budget = move_budget(&game);
        assert_eq!(budget, 48);
        assert_eq!(play_out(&mut game), (Step::Won, 48));
        assert!(game.is_game_won());
    }

    #[test]
    fn missing_card_stalls_instead_of_looping() {
        // 2♣ is out of play, so 3♣ can never reach its foundation.
        let mut game = Castle::from_piles(
            Variant::BeleagueredCastle,
            vec![vec![card(Rank::Four, Suit::Clubs), card(Rank::Three, Suit::Clubs)]],
            foundations_up_to([Some(Rank::Ace), None, None, None]),
        );
        assert!(available(&game));
        assert_eq!(play_out(&mut game), (Step::Stalled, 0));
    }
}
