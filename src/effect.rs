use crate::state::{Category, Quantity};

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    /// Run one roster fetch cycle; results carry `cycle` back.
    LoadRoster {
        cycle: u64,
        category: Category,
        quantity: Quantity,
    },
    LoadArtwork { name: String, url: String },
}
