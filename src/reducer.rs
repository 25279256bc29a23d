use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::effect::Effect;
use crate::state::{AppState, DisplayRecord};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init | Action::RosterFetch => begin_cycle(state),

        Action::CategorySelect(category) => {
            if state.category == category {
                return DispatchResult::unchanged();
            }
            state.category = category;
            begin_cycle(state)
        }
        Action::CategoryNext => {
            state.category = state.category.next();
            begin_cycle(state)
        }
        Action::CategoryPrev => {
            state.category = state.category.prev();
            begin_cycle(state)
        }

        Action::QuantitySelect(quantity) => {
            if state.quantity == quantity {
                return DispatchResult::unchanged();
            }
            state.quantity = quantity;
            begin_cycle(state)
        }
        Action::QuantityNext => {
            state.quantity = state.quantity.next();
            begin_cycle(state)
        }
        Action::QuantityPrev => {
            state.quantity = state.quantity.prev();
            begin_cycle(state)
        }

        Action::RosterDidLoad { cycle, records } => {
            if cycle != state.cycle {
                return DispatchResult::unchanged();
            }
            let selected_name = state.selected_record().map(|record| record.name.clone());
            state.selected = selected_name.and_then(|name| position_of(&records, &name));
            state.cursor = state.selected.unwrap_or(0);
            state.roster = DataResource::Loaded(records);
            state.is_refreshing = false;
            state.refresh_error = None;
            DispatchResult::changed()
        }

        Action::RosterDidError { cycle, error } => {
            if cycle != state.cycle {
                return DispatchResult::unchanged();
            }
            if state.roster.is_loaded() {
                state.is_refreshing = false;
                state.refresh_error = Some(error);
            } else {
                state.roster = DataResource::Failed(error);
            }
            DispatchResult::changed()
        }

        Action::CardMove(delta) => move_cursor(state, delta as isize),
        Action::CardMoveRow(delta) => {
            let columns = state.grid_columns() as isize;
            move_cursor(state, delta as isize * columns)
        }
        Action::CardJumpTop => set_cursor(state, 0),
        Action::CardJumpBottom => {
            let last = state.records().len().saturating_sub(1);
            set_cursor(state, last)
        }

        Action::CardSelect(index) => open_card(state, index),
        Action::CardOpen => open_card(state, state.cursor),

        Action::ModalClose => {
            if state.selected.is_none() {
                return DispatchResult::unchanged();
            }
            state.selected = None;
            DispatchResult::changed()
        }

        Action::ArtworkDidLoad { name, sprite } => {
            if state.artwork_pending.as_deref() == Some(name.as_str()) {
                state.artwork_pending = None;
            }
            state.artwork_failed.remove(&name);
            state.artwork.insert(name, sprite);
            DispatchResult::changed()
        }

        Action::ArtworkDidError { name, error: _ } => {
            if state.artwork_pending.as_deref() == Some(name.as_str()) {
                state.artwork_pending = None;
            }
            state.artwork_failed.insert(name);
            DispatchResult::changed()
        }

        Action::FocusNext => {
            state.focus = state.focus.next();
            DispatchResult::changed()
        }
        Action::FocusPrev => {
            state.focus = state.focus.prev();
            DispatchResult::changed()
        }
        Action::FocusSet(area) => {
            if state.focus == area {
                return DispatchResult::unchanged();
            }
            state.focus = area;
            DispatchResult::changed()
        }

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size == (width, height) {
                return DispatchResult::unchanged();
            }
            state.terminal_size = (width, height);
            DispatchResult::changed()
        }

        Action::Tick => {
            state.tick = state.tick.wrapping_add(1);
            if state.is_busy() {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => DispatchResult::unchanged(),
    }
}

/// Starts a new fetch cycle for the current filters. A roster already on
/// screen stays there until the cycle resolves.
fn begin_cycle(state: &mut AppState) -> DispatchResult<Effect> {
    state.cycle += 1;
    state.refresh_error = None;
    if state.roster.is_loaded() {
        state.is_refreshing = true;
    } else {
        state.roster = DataResource::Loading;
    }
    DispatchResult::changed_with(Effect::LoadRoster {
        cycle: state.cycle,
        category: state.category,
        quantity: state.quantity,
    })
}

fn position_of(records: &[DisplayRecord], name: &str) -> Option<usize> {
    records.iter().position(|record| record.name == name)
}

fn move_cursor(state: &mut AppState, delta: isize) -> DispatchResult<Effect> {
    let len = state.records().len();
    if len == 0 {
        return DispatchResult::unchanged();
    }
    let target = (state.cursor as isize + delta).clamp(0, len as isize - 1);
    set_cursor(state, target as usize)
}

fn set_cursor(state: &mut AppState, index: usize) -> DispatchResult<Effect> {
    let len = state.records().len();
    if len == 0 {
        return DispatchResult::unchanged();
    }
    let index = index.min(len - 1);
    if index == state.cursor {
        return DispatchResult::unchanged();
    }
    state.cursor = index;
    DispatchResult::changed()
}

fn open_card(state: &mut AppState, index: usize) -> DispatchResult<Effect> {
    let Some(record) = state.records().get(index) else {
        return DispatchResult::unchanged();
    };
    let name = record.name.clone();
    let url = record.image.clone();
    state.selected = Some(index);
    state.cursor = index;
    state.focus = crate::state::FocusArea::Grid;

    let wants_artwork = state.show_artwork
        && !state.artwork.contains_key(&name)
        && !state.artwork_failed.contains(&name)
        && state.artwork_pending.as_deref() != Some(name.as_str());
    if !wants_artwork {
        return DispatchResult::changed();
    }
    state.artwork_pending = Some(name.clone());
    DispatchResult::changed_with(Effect::LoadArtwork { name, url })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::SpriteData;
    use crate::state::{Category, FocusArea, Quantity};
    use pretty_assertions::assert_eq;

    fn record(id: u16, name: &str) -> DisplayRecord {
        DisplayRecord {
            id,
            name: name.into(),
            image: format!("http://img/{id}.png"),
            attack: 50,
            defense: 40,
            types: vec!["fire".into()],
        }
    }

    fn loaded(names: &[&str]) -> AppState {
        let records = names
            .iter()
            .enumerate()
            .map(|(i, name)| record(i as u16 + 1, name))
            .collect();
        AppState {
            roster: DataResource::Loaded(records),
            cycle: 1,
            ..Default::default()
        }
    }

    #[test]
    fn init_starts_first_cycle() {
        let mut state = AppState::default();
        let result = reducer(&mut state, Action::Init);

        assert!(result.changed);
        assert!(state.roster.is_loading());
        assert_eq!(state.cycle, 1);
        assert_eq!(
            result.effects,
            vec![Effect::LoadRoster {
                cycle: 1,
                category: Category::Fire,
                quantity: Quantity::Limit(50),
            }]
        );
    }

    #[test]
    fn same_filter_is_a_noop() {
        let mut state = AppState::default();
        let result = reducer(&mut state, Action::CategorySelect(Category::Fire));
        assert!(!result.changed);
        assert!(result.effects.is_empty());

        let result = reducer(&mut state, Action::QuantitySelect(Quantity::Limit(50)));
        assert!(!result.changed);
        assert_eq!(state.cycle, 0);
    }

    #[test]
    fn filter_change_keeps_shown_roster() {
        let mut state = loaded(&["charmander", "vulpix"]);
        let result = reducer(&mut state, Action::CategorySelect(Category::Water));

        assert!(result.changed);
        assert!(state.roster.is_loaded());
        assert!(state.is_refreshing);
        assert_eq!(state.cycle, 2);
        assert!(matches!(
            result.effects[0],
            Effect::LoadRoster {
                cycle: 2,
                category: Category::Water,
                ..
            }
        ));
    }

    #[test]
    fn stale_results_are_discarded() {
        let mut state = AppState::default();
        reducer(&mut state, Action::Init);
        reducer(&mut state, Action::CategorySelect(Category::Water));
        assert_eq!(state.cycle, 2);

        let stale = reducer(
            &mut state,
            Action::RosterDidLoad {
                cycle: 1,
                records: vec![record(4, "charmander")],
            },
        );
        assert!(!stale.changed);
        assert!(state.roster.is_loading());

        let stale_error = reducer(
            &mut state,
            Action::RosterDidError {
                cycle: 1,
                error: "boom".into(),
            },
        );
        assert!(!stale_error.changed);
        assert!(state.roster.is_loading());

        reducer(
            &mut state,
            Action::RosterDidLoad {
                cycle: 2,
                records: vec![record(7, "squirtle")],
            },
        );
        assert_eq!(state.records()[0].name, "squirtle");
    }

    #[test]
    fn first_failure_marks_roster_failed() {
        let mut state = AppState::default();
        reducer(&mut state, Action::Init);
        reducer(
            &mut state,
            Action::RosterDidError {
                cycle: 1,
                error: "HTTP 500".into(),
            },
        );
        assert_eq!(state.roster.error(), Some("HTTP 500"));
        assert!(state.refresh_error.is_none());
    }

    #[test]
    fn refresh_failure_keeps_roster_and_sets_banner() {
        let mut state = loaded(&["charmander"]);
        reducer(&mut state, Action::RosterFetch);
        reducer(
            &mut state,
            Action::RosterDidError {
                cycle: 2,
                error: "timeout".into(),
            },
        );
        assert!(state.roster.is_loaded());
        assert!(!state.is_refreshing);
        assert_eq!(state.refresh_error.as_deref(), Some("timeout"));

        reducer(&mut state, Action::RosterFetch);
        assert!(state.refresh_error.is_none());
    }

    #[test]
    fn reload_repoints_selection_by_name() {
        let mut state = loaded(&["charmander", "vulpix", "growlithe"]);
        reducer(&mut state, Action::CardSelect(1));
        reducer(&mut state, Action::QuantitySelect(Quantity::All));
        reducer(
            &mut state,
            Action::RosterDidLoad {
                cycle: 2,
                records: vec![record(1, "ponyta"), record(2, "vulpix")],
            },
        );
        assert_eq!(state.selected, Some(1));
        assert_eq!(state.cursor, 1);

        reducer(&mut state, Action::RosterFetch);
        reducer(
            &mut state,
            Action::RosterDidLoad {
                cycle: 3,
                records: vec![record(1, "ponyta")],
            },
        );
        assert_eq!(state.selected, None);
        assert_eq!(state.cursor, 0);
    }

    #[test]
    fn opening_card_requests_artwork_once() {
        let mut state = loaded(&["charmander", "vulpix"]);
        let result = reducer(&mut state, Action::CardSelect(1));
        assert_eq!(state.selected_record().map(|r| r.name.as_str()), Some("vulpix"));
        assert_eq!(
            result.effects,
            vec![Effect::LoadArtwork {
                name: "vulpix".into(),
                url: "http://img/2.png".into(),
            }]
        );

        reducer(&mut state, Action::ModalClose);
        let again = reducer(&mut state, Action::CardSelect(1));
        assert!(again.effects.is_empty(), "pending artwork is not refetched");

        reducer(
            &mut state,
            Action::ArtworkDidError {
                name: "vulpix".into(),
                error: "404".into(),
            },
        );
        reducer(&mut state, Action::ModalClose);
        let after_failure = reducer(&mut state, Action::CardSelect(1));
        assert!(after_failure.effects.is_empty());
        assert!(state.artwork_failed.contains("vulpix"));
    }

    #[test]
    fn artwork_disabled_skips_effect() {
        let mut state = loaded(&["charmander"]);
        state.show_artwork = false;
        let result = reducer(&mut state, Action::CardOpen);
        assert!(result.changed);
        assert!(result.effects.is_empty());
        assert!(state.modal_open());
    }

    #[test]
    fn artwork_load_clears_pending() {
        let mut state = loaded(&["charmander"]);
        reducer(&mut state, Action::CardOpen);
        assert_eq!(state.artwork_pending.as_deref(), Some("charmander"));
        let sprite = SpriteData {
            payload: "QUJD".into(),
            width: 4,
            height: 4,
        };
        reducer(
            &mut state,
            Action::ArtworkDidLoad {
                name: "charmander".into(),
                sprite: sprite.clone(),
            },
        );
        assert!(state.artwork_pending.is_none());
        assert_eq!(state.artwork.get("charmander"), Some(&sprite));
    }

    #[test]
    fn close_clears_selection() {
        let mut state = loaded(&["charmander"]);
        assert!(!reducer(&mut state, Action::ModalClose).changed);
        reducer(&mut state, Action::CardOpen);
        assert!(state.modal_open());
        assert!(reducer(&mut state, Action::ModalClose).changed);
        assert!(!state.modal_open());
        assert!(state.selected_record().is_none());
    }

    #[test]
    fn out_of_range_card_is_ignored() {
        let mut state = loaded(&["charmander"]);
        let result = reducer(&mut state, Action::CardSelect(5));
        assert!(!result.changed);
        assert!(state.selected.is_none());
    }

    #[test]
    fn cursor_moves_clamp_to_roster() {
        let names: Vec<String> = (0..10).map(|i| format!("mon{i}")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut state = loaded(&names);
        state.terminal_size = (crate::state::CARD_WIDTH * 3 + 2, 40);

        assert!(!reducer(&mut state, Action::CardMove(-1)).changed);
        reducer(&mut state, Action::CardMove(2));
        assert_eq!(state.cursor, 2);
        reducer(&mut state, Action::CardMoveRow(1));
        assert_eq!(state.cursor, 5);
        reducer(&mut state, Action::CardMoveRow(10));
        assert_eq!(state.cursor, 9);
        reducer(&mut state, Action::CardJumpTop);
        assert_eq!(state.cursor, 0);
        reducer(&mut state, Action::CardJumpBottom);
        assert_eq!(state.cursor, 9);
    }

    #[test]
    fn tick_renders_only_while_busy() {
        let mut state = loaded(&["charmander"]);
        assert!(!reducer(&mut state, Action::Tick).changed);
        reducer(&mut state, Action::RosterFetch);
        assert!(reducer(&mut state, Action::Tick).changed);
    }

    #[test]
    fn focus_cycles() {
        let mut state = AppState::default();
        assert_eq!(state.focus, FocusArea::Grid);
        reducer(&mut state, Action::FocusNext);
        assert_eq!(state.focus, FocusArea::Categories);
        reducer(&mut state, Action::FocusPrev);
        assert_eq!(state.focus, FocusArea::Grid);
        assert!(!reducer(&mut state, Action::FocusSet(FocusArea::Grid)).changed);
    }
}
