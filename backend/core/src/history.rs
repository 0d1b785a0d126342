use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Number of past exchanges forwarded to the model.
pub const DEFAULT_HISTORY_CAP: usize = 3;

/// One past exchange as the model sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub instruction: String,
    pub explanation: String,
}

/// Bounded model-context history. Once full, the oldest exchange is evicted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelHistory {
    cap: usize,
    turns: VecDeque<HistoryTurn>,
}

impl ModelHistory {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            turns: VecDeque::with_capacity(cap),
        }
    }

    pub fn push(&mut self, instruction: impl Into<String>, explanation: impl Into<String>) {
        if self.cap == 0 {
            return;
        }
        while self.turns.len() >= self.cap {
            self.turns.pop_front();
        }
        self.turns.push_back(HistoryTurn {
            instruction: instruction.into(),
            explanation: explanation.into(),
        });
    }

    /// Forget the most recent exchange.
    pub fn pop_latest(&mut self) -> Option<HistoryTurn> {
        self.turns.pop_back()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Oldest first.
    pub fn turns(&self) -> Vec<HistoryTurn> {
        self.turns.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for ModelHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}
