//! Level 3: memory match
//!
//! Pairs of cards dealt face down in shuffled order. Two mismatched cards
//! stay visible until the session's flip-back timer fires; the board is
//! locked meanwhile.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Serialize;

use super::state::Progress;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub id: usize,
    /// Index into the puzzle's symbol list
    pub symbol: usize,
    pub face_up: bool,
    pub matched: bool,
}

/// What a card selection did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Locked board, unknown id, already face up, or puzzle finished
    Ignored,
    /// First card of a pair turned over
    Flipped,
    /// Second card matched the first
    Matched,
    /// Second card differs; the board is locked until `conceal_mismatch`
    Mismatched,
    /// Last pair matched; a flower was awarded
    Completed,
}

/// Card as the surface should draw it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView<'a> {
    pub id: usize,
    /// `None` while face down
    pub face: Option<&'a str>,
    pub matched: bool,
}

#[derive(Debug, Clone)]
pub struct MemoryPuzzle {
    symbols: Vec<String>,
    pub cards: Vec<Card>,
    first: Option<usize>,
    second: Option<usize>,
    pub locked: bool,
    pub completed: bool,
}

impl MemoryPuzzle {
    /// Deal two cards per symbol and shuffle them (Fisher-Yates)
    pub fn new(rng: &mut impl Rng, symbols: &[String]) -> Self {
        let mut deck: Vec<usize> = (0..symbols.len()).chain(0..symbols.len()).collect();
        deck.shuffle(rng);

        let cards = deck
            .into_iter()
            .enumerate()
            .map(|(id, symbol)| Card {
                id,
                symbol,
                face_up: false,
                matched: false,
            })
            .collect();

        Self {
            symbols: symbols.to_vec(),
            cards,
            first: None,
            second: None,
            locked: false,
            completed: false,
        }
    }

    pub fn symbol(&self, card: &Card) -> &str {
        &self.symbols[card.symbol]
    }

    pub fn select(&mut self, id: usize, progress: &mut Progress) -> SelectOutcome {
        if self.locked || self.completed {
            return SelectOutcome::Ignored;
        }
        match self.cards.get_mut(id) {
            Some(card) if !card.face_up => card.face_up = true,
            _ => return SelectOutcome::Ignored,
        }

        let Some(first) = self.first else {
            self.first = Some(id);
            return SelectOutcome::Flipped;
        };

        if self.cards[first].symbol != self.cards[id].symbol {
            self.second = Some(id);
            self.locked = true;
            return SelectOutcome::Mismatched;
        }

        self.cards[first].matched = true;
        self.cards[id].matched = true;
        self.first = None;

        if self.cards.iter().all(|c| c.matched) {
            self.completed = true;
            progress.award_flower();
            log::info!("Memory match completed");
            return SelectOutcome::Completed;
        }
        SelectOutcome::Matched
    }

    /// Turn a mismatched pair back face down and unlock the board
    pub fn conceal_mismatch(&mut self) -> bool {
        let (Some(first), Some(second)) = (self.first.take(), self.second.take()) else {
            return false;
        };
        self.cards[first].face_up = false;
        self.cards[second].face_up = false;
        self.locked = false;
        true
    }

    pub fn views(&self) -> Vec<CardView<'_>> {
        self.cards
            .iter()
            .map(|card| CardView {
                id: card.id,
                face: card.face_up.then(|| self.symbol(card)),
                matched: card.matched,
            })
            .collect()
    }
}
