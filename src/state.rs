use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::sprite::SpriteData;

/// Width of one roster card in terminal cells.
pub const CARD_WIDTH: u16 = 22;
/// Height of one roster card in terminal cells.
pub const CARD_HEIGHT: u16 = 6;
/// Rows taken by everything that is not the grid body.
const CHROME_ROWS: u16 = 12;

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Normal,
    Fire,
    Water,
    Grass,
    Electric,
    Rock,
    Steel,
    Flying,
    Fighting,
    Poison,
    Ground,
    Ice,
    Psychic,
    Bug,
    Ghost,
    Dragon,
    Dark,
    Fairy,
}

impl Category {
    pub const ALL: [Category; 18] = [
        Category::Normal,
        Category::Fire,
        Category::Water,
        Category::Grass,
        Category::Electric,
        Category::Rock,
        Category::Steel,
        Category::Flying,
        Category::Fighting,
        Category::Poison,
        Category::Ground,
        Category::Ice,
        Category::Psychic,
        Category::Bug,
        Category::Ghost,
        Category::Dragon,
        Category::Dark,
        Category::Fairy,
    ];

    /// Path segment used by the `/type/{slug}` endpoint.
    pub fn slug(self) -> &'static str {
        match self {
            Category::Normal => "normal",
            Category::Fire => "fire",
            Category::Water => "water",
            Category::Grass => "grass",
            Category::Electric => "electric",
            Category::Rock => "rock",
            Category::Steel => "steel",
            Category::Flying => "flying",
            Category::Fighting => "fighting",
            Category::Poison => "poison",
            Category::Ground => "ground",
            Category::Ice => "ice",
            Category::Psychic => "psychic",
            Category::Bug => "bug",
            Category::Ghost => "ghost",
            Category::Dragon => "dragon",
            Category::Dark => "dark",
            Category::Fairy => "fairy",
        }
    }

    /// Button label: first letter upper-cased.
    pub fn label(self) -> String {
        let slug = self.slug();
        let mut chars = slug.chars();
        match chars.next() {
            Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
            None => String::new(),
        }
    }

    pub fn heading(self) -> String {
        self.slug().to_ascii_uppercase()
    }

    fn index(self) -> usize {
        Self::ALL
            .iter()
            .position(|category| *category == self)
            .unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let len = Self::ALL.len();
        Self::ALL[(self.index() + len - 1) % len]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.slug() == value)
            .ok_or_else(|| format!("unknown category '{value}'"))
    }
}

/// How many roster members to show: a fixed limit or everything.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quantity {
    Limit(u16),
    All,
}

impl Quantity {
    pub const OPTIONS: [Quantity; 5] = [
        Quantity::Limit(50),
        Quantity::Limit(100),
        Quantity::Limit(300),
        Quantity::Limit(1000),
        Quantity::All,
    ];

    pub fn limit(self) -> Option<usize> {
        match self {
            Quantity::Limit(limit) => Some(limit as usize),
            Quantity::All => None,
        }
    }

    /// Keeps a strict prefix of `items`; `All` keeps everything.
    pub fn truncate<T>(self, mut items: Vec<T>) -> Vec<T> {
        if let Some(limit) = self.limit() {
            items.truncate(limit);
        }
        items
    }

    fn index(self) -> usize {
        Self::OPTIONS
            .iter()
            .position(|option| *option == self)
            .unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::OPTIONS[(self.index() + 1) % Self::OPTIONS.len()]
    }

    pub fn prev(self) -> Self {
        let len = Self::OPTIONS.len();
        Self::OPTIONS[(self.index() + len - 1) % len]
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Quantity::Limit(50)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::Limit(limit) => write!(f, "{limit}"),
            Quantity::All => f.write_str("All"),
        }
    }
}

impl FromStr for Quantity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("all") {
            return Ok(Quantity::All);
        }
        let options = || {
            Self::OPTIONS
                .iter()
                .map(|option| option.to_string().to_ascii_lowercase())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let limit: u16 = value
            .parse()
            .map_err(|_| format!("invalid quantity '{value}', expected one of {}", options()))?;
        let quantity = Quantity::Limit(limit);
        if Self::OPTIONS.contains(&quantity) {
            Ok(quantity)
        } else {
            Err(format!(
                "unsupported quantity '{value}', expected one of {}",
                options()
            ))
        }
    }
}

/// Flattened card data derived from a `/pokemon/{id}` payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRecord {
    pub id: u16,
    pub name: String,
    pub image: String,
    pub attack: u16,
    pub defense: u16,
    pub types: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusArea {
    Categories,
    Quantity,
    Grid,
}

impl FocusArea {
    pub fn next(self) -> Self {
        match self {
            FocusArea::Categories => FocusArea::Quantity,
            FocusArea::Quantity => FocusArea::Grid,
            FocusArea::Grid => FocusArea::Categories,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FocusArea::Categories => FocusArea::Grid,
            FocusArea::Quantity => FocusArea::Categories,
            FocusArea::Grid => FocusArea::Quantity,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub terminal_size: (u16, u16),
    pub focus: FocusArea,

    pub category: Category,
    pub quantity: Quantity,

    /// Roster lifecycle: Empty → Loading → Loaded/Failed.
    pub roster: DataResource<Vec<DisplayRecord>>,
    /// A cycle is running while an older roster stays on screen.
    pub is_refreshing: bool,
    /// Last failure of a cycle that ran while a roster was already shown.
    pub refresh_error: Option<String>,
    /// Sequence number of the most recently started fetch cycle.
    pub cycle: u64,

    pub cursor: usize,
    pub selected: Option<usize>,

    pub show_artwork: bool,
    pub artwork: HashMap<String, SpriteData>,
    pub artwork_pending: Option<String>,
    pub artwork_failed: HashSet<String>,

    pub tick: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Category::Fire, Quantity::default(), true)
    }
}

impl AppState {
    pub fn new(category: Category, quantity: Quantity, show_artwork: bool) -> Self {
        Self {
            terminal_size: (80, 24),
            focus: FocusArea::Grid,
            category,
            quantity,
            roster: DataResource::Empty,
            is_refreshing: false,
            refresh_error: None,
            cycle: 0,
            cursor: 0,
            selected: None,
            show_artwork,
            artwork: HashMap::new(),
            artwork_pending: None,
            artwork_failed: HashSet::new(),
            tick: 0,
        }
    }

    pub fn records(&self) -> &[DisplayRecord] {
        self.roster.data().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cursor_record(&self) -> Option<&DisplayRecord> {
        self.records().get(self.cursor)
    }

    /// The record shown in the modal, if it is open.
    pub fn selected_record(&self) -> Option<&DisplayRecord> {
        self.selected.and_then(|index| self.records().get(index))
    }

    pub fn modal_open(&self) -> bool {
        self.selected_record().is_some()
    }

    pub fn is_busy(&self) -> bool {
        self.roster.is_loading() || self.is_refreshing || self.artwork_pending.is_some()
    }

    /// Grid columns for the current terminal width (grid block borders excluded).
    pub fn grid_columns(&self) -> usize {
        grid_columns(self.terminal_size.0.saturating_sub(2))
    }

    /// Whole card rows visible at once for the current terminal height.
    pub fn grid_page_rows(&self) -> usize {
        (self.terminal_size.1.saturating_sub(CHROME_ROWS) / CARD_HEIGHT).max(1) as usize
    }
}

pub fn grid_columns(width: u16) -> usize {
    (width / CARD_WIDTH).max(1) as usize
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("Filters")
                .entry("category", ron_string(&self.category))
                .entry("quantity", ron_string(&self.quantity))
                .entry("focus", ron_string(&self.focus)),
            DebugSection::new("Roster")
                .entry("cycle", ron_string(&self.cycle))
                .entry("records", ron_string(&self.records().len()))
                .entry("loading", ron_string(&self.roster.is_loading()))
                .entry("refreshing", ron_string(&self.is_refreshing))
                .entry("failed", ron_string(&self.roster.error()))
                .entry("refresh_error", ron_string(&self.refresh_error)),
            DebugSection::new("Selection")
                .entry("cursor", ron_string(&self.cursor))
                .entry("selected", ron_string(&self.selected))
                .entry(
                    "record",
                    ron_string(&self.selected_record().map(|record| record.name.clone())),
                )
                .entry("artwork_pending", ron_string(&self.artwork_pending)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_labels() {
        assert_eq!(Category::Fire.slug(), "fire");
        assert_eq!(Category::Fire.label(), "Fire");
        assert_eq!(Category::Psychic.heading(), "PSYCHIC");
        assert_eq!(Category::ALL.len(), 18);
    }

    #[test]
    fn category_cycles_wrap() {
        assert_eq!(Category::Fairy.next(), Category::Normal);
        assert_eq!(Category::Normal.prev(), Category::Fairy);
        assert_eq!(Category::Fire.next(), Category::Water);
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Water".parse::<Category>(), Ok(Category::Water));
        assert!("shadow".parse::<Category>().is_err());
    }

    #[test]
    fn quantity_truncates_to_prefix() {
        let items: Vec<u32> = (0..120).collect();
        let kept = Quantity::Limit(50).truncate(items.clone());
        assert_eq!(kept, (0..50).collect::<Vec<_>>());
        assert_eq!(Quantity::All.truncate(items.clone()).len(), 120);
        assert_eq!(Quantity::Limit(300).truncate(items).len(), 120);
    }

    #[test]
    fn quantity_parse_and_display() {
        assert_eq!("all".parse::<Quantity>(), Ok(Quantity::All));
        assert_eq!("ALL".parse::<Quantity>(), Ok(Quantity::All));
        assert_eq!("300".parse::<Quantity>(), Ok(Quantity::Limit(300)));
        assert!("7".parse::<Quantity>().is_err());
        assert!("many".parse::<Quantity>().is_err());
        assert_eq!(Quantity::All.to_string(), "All");
        assert_eq!(Quantity::Limit(1000).to_string(), "1000");
    }

    #[test]
    fn quantity_cycles_through_options() {
        assert_eq!(Quantity::default(), Quantity::Limit(50));
        assert_eq!(Quantity::Limit(1000).next(), Quantity::All);
        assert_eq!(Quantity::All.next(), Quantity::Limit(50));
        assert_eq!(Quantity::Limit(50).prev(), Quantity::All);
    }

    #[test]
    fn grid_columns_follow_width() {
        assert_eq!(grid_columns(0), 1);
        assert_eq!(grid_columns(CARD_WIDTH * 3 + 5), 3);
        let state = AppState {
            terminal_size: (CARD_WIDTH * 4 + 2, 40),
            ..Default::default()
        };
        assert_eq!(state.grid_columns(), 4);
    }

    #[test]
    fn selected_record_requires_loaded_roster() {
        let mut state = AppState {
            selected: Some(0),
            ..Default::default()
        };
        assert!(state.selected_record().is_none());
        assert!(!state.modal_open());

        state.roster = DataResource::Loaded(vec![DisplayRecord {
            id: 4,
            name: "charmander".into(),
            image: "https://img/4.png".into(),
            attack: 52,
            defense: 43,
            types: vec!["fire".into()],
        }]);
        assert_eq!(state.selected_record().map(|r| r.id), Some(4));
        assert!(state.modal_open());
    }
}
