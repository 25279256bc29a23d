use serde::{Deserialize, Serialize};

use crate::sprite::SpriteData;
use crate::state::{Category, DisplayRecord, FocusArea, Quantity};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,

    CategorySelect(Category),
    CategoryNext,
    CategoryPrev,
    QuantitySelect(Quantity),
    QuantityNext,
    QuantityPrev,

    /// Re-run the current filters without changing them.
    RosterFetch,
    RosterDidLoad { cycle: u64, records: Vec<DisplayRecord> },
    RosterDidError { cycle: u64, error: String },

    CardMove(i16),
    CardMoveRow(i16),
    CardJumpTop,
    CardJumpBottom,
    CardSelect(usize),
    CardOpen,
    ModalClose,

    ArtworkDidLoad { name: String, sprite: SpriteData },
    ArtworkDidError { name: String, error: String },

    FocusNext,
    FocusPrev,
    FocusSet(FocusArea),

    UiTerminalResize(u16, u16),
    Tick,
    Quit,
}
