//! Committed/redoable position log
//!
//! Two views over one linear history: `committed` is what the board shows and
//! what gets persisted, `full` additionally holds positions undone since the
//! last commit. The starting entry is stored separately so neither list can
//! ever be empty.
//!
//! Redo only replays stored positions; nothing here consults the rules.

use chess_rules::Position;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryBuffer {
    start: Position,
    /// Positions after the start, up to the current one
    committed: Vec<Position>,
    /// Positions after the start, up to the live edge
    full: Vec<Position>,
}

impl HistoryBuffer {
    pub fn new(start: Position) -> Self {
        Self {
            start,
            committed: Vec::new(),
            full: Vec::new(),
        }
    }

    /// Append a new position, discarding any redo tail
    pub fn commit(&mut self, position: Position) {
        self.full.truncate(self.committed.len());
        self.committed.push(position.clone());
        self.full.push(position);
    }

    /// Step back up to `steps_back` entries, never past the start
    ///
    /// Returns how many entries were removed.
    pub fn undo(&mut self, steps_back: usize) -> usize {
        let removed = steps_back.min(self.committed.len());
        self.committed.truncate(self.committed.len() - removed);
        debug!(
            "[HISTORY] Undo {} of {} requested, {} committed / {} total",
            removed,
            steps_back,
            self.committed_len(),
            self.full_len()
        );
        removed
    }

    /// Replay up to `steps_forward` undone entries
    ///
    /// Returns how many entries were restored.
    pub fn redo(&mut self, steps_forward: usize) -> usize {
        let available = self.full.len() - self.committed.len();
        let added = steps_forward.min(available);
        let from = self.committed.len();
        self.committed
            .extend_from_slice(&self.full[from..from + added]);
        debug!(
            "[HISTORY] Redo {} of {} requested, {} committed / {} total",
            added,
            steps_forward,
            self.committed_len(),
            self.full_len()
        );
        added
    }

    /// Collapse to a single starting entry
    pub fn reset(&mut self, start: Position) {
        self.start = start;
        self.committed.clear();
        self.full.clear();
    }

    /// Drop the redo tail so the current position becomes the live edge
    pub fn truncate_future(&mut self) {
        self.full.truncate(self.committed.len());
    }

    /// Replace everything with a persisted history
    ///
    /// Returns `false` and leaves the buffer untouched when `history` is empty.
    pub fn restore(&mut self, history: &[Position]) -> bool {
        let Some((start, rest)) = history.split_first() else {
            return false;
        };
        self.start = start.clone();
        self.committed = rest.to_vec();
        self.full = rest.to_vec();
        true
    }

    pub fn start(&self) -> &Position {
        &self.start
    }

    /// Position the board shows
    pub fn current(&self) -> &Position {
        self.committed.last().unwrap_or(&self.start)
    }

    /// Last position of the full history
    pub fn live_edge(&self) -> &Position {
        self.full.last().unwrap_or(&self.start)
    }

    /// Number of committed entries, including the start
    pub fn committed_len(&self) -> usize {
        self.committed.len() + 1
    }

    /// Number of entries up to the live edge, including the start
    pub fn full_len(&self) -> usize {
        self.full.len() + 1
    }

    /// Browsing the past: some committed entries have been undone
    pub fn is_view_mode(&self) -> bool {
        self.committed.len() < self.full.len()
    }

    /// Committed history as a list, starting position first
    pub fn committed(&self) -> Vec<Position> {
        std::iter::once(&self.start)
            .chain(self.committed.iter())
            .cloned()
            .collect()
    }

    /// Whether committed history is a prefix of full history
    pub fn is_consistent(&self) -> bool {
        self.full.starts_with(&self.committed)
    }
}
