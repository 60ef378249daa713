use crate::Position;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellContent {
    Empty,
    Mine,
    Number(u8),
    Question,
    Surprise,
}

impl CellContent {
    pub fn is_mine(self) -> bool {
        matches!(self, CellContent::Mine)
    }

    pub fn is_special(self) -> bool {
        matches!(self, CellContent::Question | CellContent::Surprise)
    }

    /// Whether revealing this content keeps the cascade going.
    pub fn spreads(self) -> bool {
        matches!(
            self,
            CellContent::Empty | CellContent::Question | CellContent::Surprise
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Hidden,
    Revealed,
    Flagged,
}

/// A single square of a board. Fields are only mutated by the owning `Board`.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    position: Position,
    content: CellContent,
    visibility: Visibility,
    used: bool,
    question_id: Option<u32>,
}

impl Cell {
    pub(crate) fn new(position: Position) -> Self {
        Self {
            position,
            content: CellContent::Empty,
            visibility: Visibility::Hidden,
            used: false,
            question_id: None,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn content(&self) -> CellContent {
        self.content
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    /// Id of the question shown when this cell was activated.
    pub fn question_id(&self) -> Option<u32> {
        self.question_id
    }

    pub fn is_mine(&self) -> bool {
        self.content.is_mine()
    }

    pub fn is_revealed(&self) -> bool {
        self.visibility == Visibility::Revealed
    }

    pub fn is_flagged(&self) -> bool {
        self.visibility == Visibility::Flagged
    }

    pub fn is_hidden(&self) -> bool {
        self.visibility == Visibility::Hidden
    }

    /// Read-only projection for renderers. Content stays unknown until revealed.
    pub fn view(&self) -> CellView {
        CellView {
            position: self.position,
            visibility: self.visibility,
            content: self.is_revealed().then_some(self.content),
            used: self.used,
        }
    }

    pub(crate) fn set_content(&mut self, content: CellContent) {
        self.content = content;
    }

    pub(crate) fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    pub(crate) fn mark_used(&mut self, question_id: Option<u32>) {
        self.used = true;
        if question_id.is_some() {
            self.question_id = question_id;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellView {
    pub position: Position,
    pub visibility: Visibility,
    pub content: Option<CellContent>,
    pub used: bool,
}
