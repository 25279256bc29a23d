use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::{Component, EventContext, EventKind, EventRoutingState, HandlerResponse, RenderContext};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    centered_rect, BaseStyle, Modal, ModalBehavior, ModalProps, ModalStyle, Padding, StatusBar,
    StatusBarHint, StatusBarItem, StatusBarProps, StatusBarSection, StatusBarStyle,
};

use crate::action::Action;
use crate::sprite;
use crate::sprite_backend;
use crate::state::{
    grid_columns, AppState, Category, DisplayRecord, FocusArea, Quantity, CARD_HEIGHT, CARD_WIDTH,
};

const BG_BASE: Color = Color::Rgb(16, 14, 24);
const BG_PANEL: Color = Color::Rgb(28, 26, 40);
const BG_CARD_ACTIVE: Color = Color::Rgb(58, 44, 72);
const TEXT_MAIN: Color = Color::Rgb(238, 236, 244);
const TEXT_DIM: Color = Color::Rgb(160, 156, 178);
const ACCENT: Color = Color::Rgb(244, 124, 72);
const ACCENT_ALT: Color = Color::Rgb(250, 208, 96);
const ERROR: Color = Color::Rgb(236, 88, 96);

const MODAL_WIDTH: u16 = 72;
const MODAL_HEIGHT: u16 = 20;
const ARTWORK_COLS: u16 = 30;
const CLOSE_LABEL: &str = "[ x Close ]";
const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum RosterComponentId {
    Categories,
    Quantity,
    Grid,
    Modal,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RosterContext {
    Categories,
    Quantity,
    Grid,
    Modal,
}

impl EventRoutingState<RosterComponentId, RosterContext> for AppState {
    fn focused(&self) -> Option<RosterComponentId> {
        if self.modal_open() {
            return Some(RosterComponentId::Modal);
        }
        match self.focus {
            FocusArea::Categories => Some(RosterComponentId::Categories),
            FocusArea::Quantity => Some(RosterComponentId::Quantity),
            FocusArea::Grid => Some(RosterComponentId::Grid),
        }
    }

    fn modal(&self) -> Option<RosterComponentId> {
        self.modal_open().then_some(RosterComponentId::Modal)
    }

    fn binding_context(&self, id: RosterComponentId) -> RosterContext {
        match id {
            RosterComponentId::Categories => RosterContext::Categories,
            RosterComponentId::Quantity => RosterContext::Quantity,
            RosterComponentId::Grid => RosterContext::Grid,
            RosterComponentId::Modal => RosterContext::Modal,
        }
    }

    fn default_context(&self) -> RosterContext {
        RosterContext::Grid
    }
}

/// Screen regions from the last frame, used to resolve mouse clicks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HitMap {
    pub categories: Vec<(Category, Rect)>,
    pub quantities: Vec<(Quantity, Rect)>,
    /// Inner area of the card grid.
    pub grid: Rect,
    pub columns: usize,
    pub scroll_row: usize,
    pub card_count: usize,
    pub modal: Option<Rect>,
    pub close: Option<Rect>,
}

impl HitMap {
    pub fn category_at(&self, x: u16, y: u16) -> Option<Category> {
        self.categories
            .iter()
            .find(|(_, rect)| contains(*rect, x, y))
            .map(|(category, _)| *category)
    }

    pub fn quantity_at(&self, x: u16, y: u16) -> Option<Quantity> {
        self.quantities
            .iter()
            .find(|(_, rect)| contains(*rect, x, y))
            .map(|(quantity, _)| *quantity)
    }

    pub fn card_at(&self, x: u16, y: u16) -> Option<usize> {
        if !contains(self.grid, x, y) || self.columns == 0 {
            return None;
        }
        let column = ((x - self.grid.x) / CARD_WIDTH) as usize;
        if column >= self.columns {
            return None;
        }
        let row = ((y - self.grid.y) / CARD_HEIGHT) as usize + self.scroll_row;
        let index = row * self.columns + column;
        (index < self.card_count).then_some(index)
    }

    /// Actions for a left click at `(x, y)`. While the modal is open only
    /// closing is possible.
    pub fn click(&self, state: &AppState, x: u16, y: u16) -> Vec<Action> {
        if state.modal_open() {
            let inside_close = self.close.is_some_and(|rect| contains(rect, x, y));
            let inside_modal = self.modal.is_some_and(|rect| contains(rect, x, y));
            if inside_close || !inside_modal {
                return vec![Action::ModalClose];
            }
            return Vec::new();
        }
        if let Some(category) = self.category_at(x, y) {
            return vec![Action::FocusSet(FocusArea::Categories), Action::CategorySelect(category)];
        }
        if let Some(quantity) = self.quantity_at(x, y) {
            return vec![Action::FocusSet(FocusArea::Quantity), Action::QuantitySelect(quantity)];
        }
        match self.card_at(x, y) {
            Some(index) => vec![Action::CardSelect(index)],
            None => Vec::new(),
        }
    }
}

fn contains(rect: Rect, x: u16, y: u16) -> bool {
    rect.contains(Position { x, y })
}

pub struct RosterUi {
    status_bar: StatusBar,
    modal: Modal,
    hits: HitMap,
}

impl Default for RosterUi {
    fn default() -> Self {
        Self::new()
    }
}

impl RosterUi {
    pub fn new() -> Self {
        Self {
            status_bar: StatusBar::new(),
            modal: Modal::new(),
            hits: HitMap::default(),
        }
    }

    pub fn hits(&self) -> &HitMap {
        &self.hits
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        _render_ctx: RenderContext,
        event_ctx: &mut EventContext<RosterComponentId>,
    ) {
        let regions = self.draw(frame, area, state);
        event_ctx.set_component_area(RosterComponentId::Categories, regions.categories);
        event_ctx.set_component_area(RosterComponentId::Quantity, regions.quantity);
        event_ctx.set_component_area(RosterComponentId::Grid, regions.grid);
        match self.hits.modal {
            Some(modal_area) => event_ctx.set_component_area(RosterComponentId::Modal, modal_area),
            None => {
                event_ctx.component_areas.remove(&RosterComponentId::Modal);
            }
        }
    }

    /// Draws the whole screen and refreshes the hit map.
    pub fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) -> Regions {
        frame.render_widget(Block::default().style(Style::default().bg(BG_BASE)), area);
        let regions = Regions::split(area);
        let mut hits = HitMap::default();

        hits.categories = render_categories(frame, regions.categories, state);
        hits.quantities = render_quantity(frame, regions.quantity, state);
        render_heading(frame, regions.heading, state);
        let scroll = self.hits.scroll_row;
        render_grid(frame, regions.grid, state, scroll, &mut hits);
        render_footer(frame, regions.footer, state, &mut self.status_bar);

        if state.modal_open() {
            render_modal(frame, area, state, &mut self.modal, &mut hits);
        } else {
            sprite_backend::hide_artwork();
        }
        self.hits = hits;
        regions
    }

    pub fn handle_categories_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let actions = match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Left | KeyCode::Char('h') => vec![Action::CategoryPrev],
                KeyCode::Right | KeyCode::Char('l') => vec![Action::CategoryNext],
                KeyCode::Down | KeyCode::Enter => vec![Action::FocusSet(FocusArea::Quantity)],
                _ => vec![],
            },
            EventKind::Mouse(mouse) => self.mouse_actions(mouse, state),
            _ => vec![],
        };
        handler_response(actions)
    }

    pub fn handle_quantity_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let actions = match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Left | KeyCode::Char('h') => vec![Action::QuantityPrev],
                KeyCode::Right | KeyCode::Char('l') => vec![Action::QuantityNext],
                KeyCode::Up => vec![Action::FocusSet(FocusArea::Categories)],
                KeyCode::Down | KeyCode::Enter => vec![Action::FocusSet(FocusArea::Grid)],
                _ => vec![],
            },
            EventKind::Mouse(mouse) => self.mouse_actions(mouse, state),
            _ => vec![],
        };
        handler_response(actions)
    }

    pub fn handle_grid_event(&mut self, event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
        let page = state.grid_page_rows() as i16;
        let actions = match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Left | KeyCode::Char('h') => vec![Action::CardMove(-1)],
                KeyCode::Right | KeyCode::Char('l') => vec![Action::CardMove(1)],
                KeyCode::Up | KeyCode::Char('k') => vec![Action::CardMoveRow(-1)],
                KeyCode::Down | KeyCode::Char('j') => vec![Action::CardMoveRow(1)],
                KeyCode::PageUp => vec![Action::CardMoveRow(-page)],
                KeyCode::PageDown => vec![Action::CardMoveRow(page)],
                KeyCode::Char('g') | KeyCode::Home => vec![Action::CardJumpTop],
                KeyCode::Char('G') | KeyCode::End => vec![Action::CardJumpBottom],
                KeyCode::Enter | KeyCode::Char(' ') => vec![Action::CardOpen],
                _ => vec![],
            },
            EventKind::Scroll { delta, .. } => vec![Action::CardMoveRow(*delta as i16)],
            EventKind::Mouse(mouse) => self.mouse_actions(mouse, state),
            _ => vec![],
        };
        handler_response(actions)
    }

    pub fn handle_modal_event(&mut self, event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
        let actions = match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('x') => vec![Action::ModalClose],
                _ => vec![],
            },
            EventKind::Mouse(mouse) => self.mouse_actions(mouse, state),
            _ => vec![],
        };
        if !actions.is_empty() {
            return handler_response(actions);
        }

        let mut noop_render = |_frame: &mut Frame, _area: Rect| {};
        let props = ModalProps {
            is_open: state.modal_open(),
            is_focused: true,
            area: self.hits.modal.unwrap_or_default(),
            style: modal_style(),
            behavior: ModalBehavior {
                close_on_esc: true,
                close_on_backdrop: true,
            },
            on_close: || Action::ModalClose,
            render_content: &mut noop_render,
        };
        let actions: Vec<_> = self.modal.handle_event(event, props).into_iter().collect();
        handler_response(actions)
    }

    fn mouse_actions(&self, mouse: &MouseEvent, state: &AppState) -> Vec<Action> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.hits.click(state, mouse.column, mouse.row)
            }
            _ => vec![],
        }
    }
}

/// Keys that work regardless of focus.
pub fn handle_global_event(event: &EventKind, state: &AppState) -> HandlerResponse<Action> {
    match event {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(*width, *height)).with_render()
        }
        EventKind::Key(key) => match key.code {
            KeyCode::Char('q') => HandlerResponse::action(Action::Quit),
            KeyCode::Tab if !state.modal_open() => HandlerResponse::action(Action::FocusNext),
            KeyCode::BackTab if !state.modal_open() => HandlerResponse::action(Action::FocusPrev),
            KeyCode::Char('[') => HandlerResponse::action(Action::CategoryPrev),
            KeyCode::Char(']') => HandlerResponse::action(Action::CategoryNext),
            KeyCode::Char('-') => HandlerResponse::action(Action::QuantityPrev),
            KeyCode::Char('+') | KeyCode::Char('=') => HandlerResponse::action(Action::QuantityNext),
            KeyCode::Char('r') => HandlerResponse::action(Action::RosterFetch),
            _ => HandlerResponse::ignored(),
        },
        _ => HandlerResponse::ignored(),
    }
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

/// Top-level vertical layout of one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Regions {
    pub categories: Rect,
    pub quantity: Rect,
    pub heading: Rect,
    pub grid: Rect,
    pub footer: Rect,
}

impl Regions {
    pub fn split(area: Rect) -> Self {
        let button_rows = category_rows(area.width.saturating_sub(2));
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(button_rows + 2),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(CARD_HEIGHT + 2),
                Constraint::Length(3),
            ])
            .split(area);
        Self {
            categories: layout[0],
            quantity: layout[1],
            heading: layout[2],
            grid: layout[3],
            footer: layout[4],
        }
    }
}

fn button_width(label: &str) -> u16 {
    label.chars().count() as u16 + 2
}

/// Lays category buttons left to right, wrapping when a row is full.
pub fn category_buttons(inner: Rect) -> Vec<(Category, Rect)> {
    let mut buttons = Vec::with_capacity(Category::ALL.len());
    let mut x = inner.x;
    let mut y = inner.y;
    for category in Category::ALL {
        let width = button_width(&category.label());
        if x > inner.x && x + width > inner.x + inner.width {
            x = inner.x;
            y += 1;
        }
        buttons.push((category, Rect::new(x, y, width.min(inner.width), 1)));
        x += width + 1;
    }
    buttons
}

fn category_rows(width: u16) -> u16 {
    let inner = Rect::new(0, 0, width.clamp(1, 600), 100);
    category_buttons(inner)
        .last()
        .map(|(_, rect)| rect.y + 1)
        .unwrap_or(1)
}

fn render_categories(frame: &mut Frame, area: Rect, state: &AppState) -> Vec<(Category, Rect)> {
    let block = panel_block("Type", state.focus == FocusArea::Categories);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let buttons: Vec<_> = category_buttons(inner)
        .into_iter()
        .filter(|(_, rect)| rect.y < inner.y + inner.height)
        .collect();
    for (category, rect) in &buttons {
        let style = if *category == state.category {
            Style::default()
                .fg(BG_BASE)
                .bg(type_color(category.slug()))
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(type_color(category.slug()))
        };
        let label = Paragraph::new(format!(" {} ", category.label())).style(style);
        frame.render_widget(label, *rect);
    }
    buttons
}

fn render_quantity(frame: &mut Frame, area: Rect, state: &AppState) -> Vec<(Quantity, Rect)> {
    let block = panel_block("Show", state.focus == FocusArea::Quantity);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut options = Vec::with_capacity(Quantity::OPTIONS.len());
    let mut x = inner.x;
    for quantity in Quantity::OPTIONS {
        let label = format!(" {quantity} ");
        let width = (label.len() as u16).min((inner.x + inner.width).saturating_sub(x));
        if width == 0 {
            break;
        }
        let rect = Rect::new(x, inner.y, width, 1.min(inner.height));
        let style = if quantity == state.quantity {
            Style::default()
                .fg(BG_BASE)
                .bg(ACCENT_ALT)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(TEXT_DIM)
        };
        frame.render_widget(Paragraph::new(label).style(style), rect);
        options.push((quantity, rect));
        x += width + 1;
    }
    options
}

fn render_heading(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![Span::styled(
        format!(" {} Pokémon", state.category.heading()),
        Style::default()
            .fg(type_color(state.category.slug()))
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(records) = state.roster.data() {
        spans.push(Span::styled(
            format!("  {} shown", records.len()),
            Style::default().fg(TEXT_DIM),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// First card row to draw so the cursor row stays visible.
pub fn scroll_for_cursor(scroll: usize, cursor_row: usize, visible_rows: usize) -> usize {
    let visible_rows = visible_rows.max(1);
    if cursor_row < scroll {
        cursor_row
    } else if cursor_row >= scroll + visible_rows {
        cursor_row + 1 - visible_rows
    } else {
        scroll
    }
}

fn render_grid(frame: &mut Frame, area: Rect, state: &AppState, scroll: usize, hits: &mut HitMap) {
    let block = panel_block("Roster", state.focus == FocusArea::Grid);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    hits.grid = inner;

    let records = match state.roster.data() {
        Some(records) if !records.is_empty() => records,
        Some(_) => {
            render_notice(
                frame,
                inner,
                vec![Line::styled(
                    format!("No {} Pokémon found.", state.category.label()),
                    Style::default().fg(TEXT_DIM),
                )],
            );
            return;
        }
        None => {
            render_notice(frame, inner, roster_notice(state));
            return;
        }
    };

    let columns = grid_columns(inner.width);
    let visible_rows = (inner.height / CARD_HEIGHT).max(1) as usize;
    let scroll = scroll_for_cursor(scroll, state.cursor / columns, visible_rows);
    hits.columns = columns;
    hits.scroll_row = scroll;
    hits.card_count = records.len();

    let first = scroll * columns;
    let last = ((scroll + visible_rows) * columns).min(records.len());
    for (index, record) in records.iter().enumerate().take(last).skip(first) {
        let slot = index - first;
        let x = inner.x + (slot % columns) as u16 * CARD_WIDTH;
        let y = inner.y + (slot / columns) as u16 * CARD_HEIGHT;
        let width = CARD_WIDTH.min(inner.x + inner.width - x);
        let height = CARD_HEIGHT.min(inner.y + inner.height - y);
        let active = index == state.cursor && state.focus == FocusArea::Grid;
        render_card(frame, Rect::new(x, y, width, height), record, active);
    }
}

fn roster_notice(state: &AppState) -> Vec<Line<'static>> {
    if let Some(error) = state.roster.error() {
        return vec![
            Line::styled(
                "Could not load the roster.",
                Style::default().fg(ERROR).add_modifier(Modifier::BOLD),
            ),
            Line::styled(error.to_string(), Style::default().fg(TEXT_DIM)),
            Line::from(""),
            Line::styled("Press r to try again.", Style::default().fg(ACCENT_ALT)),
        ];
    }
    if state.roster.is_loading() {
        return vec![Line::styled(
            format!(
                "{} Loading {} Pokémon...",
                spinner(state.tick),
                state.category.heading()
            ),
            Style::default().fg(ACCENT_ALT),
        )];
    }
    vec![Line::styled(
        "Press r to load the roster.",
        Style::default().fg(TEXT_DIM),
    )]
}

fn render_notice(frame: &mut Frame, area: Rect, lines: Vec<Line<'static>>) {
    let top = area.height.saturating_sub(lines.len() as u16) / 2;
    let area = Rect::new(area.x, area.y + top, area.width, area.height - top);
    let paragraph = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_card(frame: &mut Frame, area: Rect, record: &DisplayRecord, active: bool) {
    let border = if active { ACCENT } else { TEXT_DIM };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(if active { BG_CARD_ACTIVE } else { BG_PANEL }))
        .title(Span::styled(
            format!("#{:03}", record.id),
            Style::default().fg(TEXT_DIM),
        ));

    let types: Vec<Span> = record
        .types
        .iter()
        .map(|name| Span::styled(format!("{name} "), Style::default().fg(type_color(name))))
        .collect();
    let text = Text::from(vec![
        Line::styled(
            format_name(&record.name),
            Style::default().fg(TEXT_MAIN).add_modifier(Modifier::BOLD),
        ),
        Line::from(types),
        Line::styled(
            format!("ATK {:>3}  DEF {:>3}", record.attack, record.defense),
            Style::default().fg(ACCENT_ALT),
        ),
        Line::styled(image_label(&record.image), Style::default().fg(TEXT_DIM)),
    ]);
    frame.render_widget(Paragraph::new(text).block(block), area);
}

/// Short form of a card's artwork URL; the full URL is in the modal.
pub fn image_label(url: &str) -> String {
    let file = url.rsplit('/').find(|part| !part.is_empty()).unwrap_or(url);
    format!("img {file}")
}

pub fn modal_rect(area: Rect) -> Rect {
    centered_rect(MODAL_WIDTH.min(area.width), MODAL_HEIGHT.min(area.height), area)
}

fn render_modal(frame: &mut Frame, area: Rect, state: &AppState, modal: &mut Modal, hits: &mut HitMap) {
    let Some(record) = state.selected_record() else {
        return;
    };
    let modal_area = modal_rect(area);
    let mut close = None;
    let mut render_content = |frame: &mut Frame, inner: Rect| {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(inner);
        let art_cols = if state.show_artwork {
            ARTWORK_COLS.min(rows[0].width / 2)
        } else {
            0
        };
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(art_cols)])
            .split(rows[0]);

        frame.render_widget(
            Paragraph::new(record_details(record)).wrap(Wrap { trim: false }),
            columns[0],
        );
        if state.show_artwork {
            render_artwork(frame, columns[1], state, record);
        } else {
            sprite_backend::hide_artwork();
        }

        let width = (CLOSE_LABEL.len() as u16).min(rows[1].width);
        let close_area = Rect::new(
            rows[1].x + rows[1].width - width,
            rows[1].y,
            width,
            rows[1].height,
        );
        frame.render_widget(
            Paragraph::new(CLOSE_LABEL).style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
            close_area,
        );
        close = Some(close_area);
    };

    let props = ModalProps {
        is_open: true,
        is_focused: true,
        area: modal_area,
        style: modal_style(),
        behavior: ModalBehavior {
            close_on_esc: true,
            close_on_backdrop: true,
        },
        on_close: || Action::ModalClose,
        render_content: &mut render_content,
    };
    modal.render(frame, area, props);

    hits.modal = Some(modal_area);
    hits.close = close;
}

fn record_details(record: &DisplayRecord) -> Text<'static> {
    let label = Style::default().fg(TEXT_DIM);
    let value = Style::default().fg(TEXT_MAIN);
    let types: Vec<Span> = record
        .types
        .iter()
        .flat_map(|name| {
            [
                Span::styled(
                    format!(" {name} "),
                    Style::default().fg(BG_BASE).bg(type_color(name)),
                ),
                Span::raw(" "),
            ]
        })
        .collect();
    Text::from(vec![
        Line::styled(
            banner_name(&record.name),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
        Line::from(vec![
            Span::styled("ID       ", label),
            Span::styled(format!("#{:03}", record.id), value),
        ]),
        Line::from([vec![Span::styled("Types    ", label)], types].concat()),
        Line::from(vec![
            Span::styled("Attack   ", label),
            Span::styled(record.attack.to_string(), value),
        ]),
        Line::from(vec![
            Span::styled("Defense  ", label),
            Span::styled(record.defense.to_string(), value),
        ]),
        Line::from(""),
        Line::styled("Image", label),
        Line::styled(record.image.clone(), Style::default().fg(TEXT_DIM)),
    ])
}

fn render_artwork(frame: &mut Frame, area: Rect, state: &AppState, record: &DisplayRecord) {
    if let Some(artwork) = state.artwork.get(&record.name) {
        let (cols, rows) = sprite::fit_cells(artwork, area.width, area.height);
        match sprite::kitty_sequence(artwork, cols, rows) {
            Ok(sequence) => {
                let x = area.x + area.width.saturating_sub(cols) / 2;
                let y = area.y + area.height.saturating_sub(rows) / 2;
                sprite_backend::show_artwork(x, y, sequence);
                return;
            }
            Err(error) => tracing::warn!(pokemon = %record.name, %error, "artwork encode failed"),
        }
    }

    sprite_backend::hide_artwork();
    let content = if state.artwork_pending.as_deref() == Some(record.name.as_str()) {
        format!("{} loading artwork", spinner(state.tick))
    } else if state.artwork_failed.contains(&record.name) {
        "artwork unavailable".to_string()
    } else {
        String::new()
    };
    let paragraph = Paragraph::new(content)
        .alignment(Alignment::Center)
        .style(Style::default().fg(TEXT_DIM));
    frame.render_widget(paragraph, Rect::new(area.x, area.y + area.height / 2, area.width, 1.min(area.height)));
}

fn render_footer(frame: &mut Frame, area: Rect, state: &AppState, status_bar: &mut StatusBar) {
    let (status, color) = status_line(state);
    let left_hints = focus_hints(state);
    let center_hints = [
        StatusBarHint::new("Tab", "Focus"),
        StatusBarHint::new("[ ]", "Type"),
        StatusBarHint::new("- +", "Count"),
        StatusBarHint::new("r", "Refresh"),
        StatusBarHint::new("q", "Quit"),
    ];
    let status_items = [StatusBarItem::span(Span::styled(
        status,
        Style::default().fg(color),
    ))];

    let style = StatusBarStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT)),
            }),
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        text: Style::default().fg(TEXT_DIM),
        hint_key: Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        hint_label: Style::default().fg(TEXT_DIM),
        separator: Style::default().fg(TEXT_DIM),
    };
    let props = StatusBarProps {
        left: StatusBarSection::hints(&left_hints).with_separator("  "),
        center: StatusBarSection::hints(&center_hints).with_separator("  "),
        right: StatusBarSection::items(&status_items).with_separator("  "),
        style,
        is_focused: false,
    };
    Component::<Action>::render(status_bar, frame, area, props);
}

fn focus_hints(state: &AppState) -> Vec<StatusBarHint<'static>> {
    if state.modal_open() {
        return vec![StatusBarHint::new("Esc/x", "Close")];
    }
    match state.focus {
        FocusArea::Categories => vec![StatusBarHint::new("←/→", "Type")],
        FocusArea::Quantity => vec![StatusBarHint::new("←/→", "Count")],
        FocusArea::Grid => vec![
            StatusBarHint::new("hjkl", "Move"),
            StatusBarHint::new("Enter", "Open"),
        ],
    }
}

/// Right-hand status text and its color.
pub fn status_line(state: &AppState) -> (String, Color) {
    if let Some(error) = state.refresh_error.as_deref() {
        return (format!("Refresh failed: {error}"), ERROR);
    }
    if state.is_refreshing {
        return (format!("{} Refreshing", spinner(state.tick)), ACCENT_ALT);
    }
    if state.roster.is_loading() {
        return (format!("{} Loading", spinner(state.tick)), ACCENT_ALT);
    }
    if state.roster.is_failed() {
        return ("Load failed".to_string(), ERROR);
    }
    match state.roster.data() {
        Some(records) => (format!("{} Pokémon", records.len()), TEXT_DIM),
        None => (String::new(), TEXT_DIM),
    }
}

fn spinner(tick: u64) -> &'static str {
    SPINNER[(tick / 2 % SPINNER.len() as u64) as usize]
}

fn panel_block(title: &str, is_focused: bool) -> Block<'_> {
    let border = if is_focused {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_DIM)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .title(title)
}

fn modal_style() -> ModalStyle {
    ModalStyle {
        base: BaseStyle {
            border: Some(BorderStyle {
                borders: Borders::ALL,
                style: Style::default().fg(TEXT_DIM),
                focused_style: Some(Style::default().fg(ACCENT)),
            }),
            padding: Padding::xy(2, 1),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        ..Default::default()
    }
}

pub fn format_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Letter-spaced upper-case name for the modal title.
fn banner_name(name: &str) -> String {
    format_name(name)
        .to_uppercase()
        .chars()
        .map(|ch| ch.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn type_color(name: &str) -> Color {
    match name {
        "normal" => Color::Rgb(168, 167, 122),
        "fire" => Color::Rgb(238, 129, 48),
        "water" => Color::Rgb(99, 144, 240),
        "grass" => Color::Rgb(122, 199, 76),
        "electric" => Color::Rgb(247, 208, 44),
        "rock" => Color::Rgb(182, 161, 54),
        "steel" => Color::Rgb(183, 183, 206),
        "flying" => Color::Rgb(169, 143, 243),
        "fighting" => Color::Rgb(194, 46, 40),
        "poison" => Color::Rgb(163, 62, 161),
        "ground" => Color::Rgb(226, 191, 101),
        "ice" => Color::Rgb(150, 217, 214),
        "psychic" => Color::Rgb(249, 85, 135),
        "bug" => Color::Rgb(166, 185, 26),
        "ghost" => Color::Rgb(115, 87, 151),
        "dragon" => Color::Rgb(111, 53, 252),
        "dark" => Color::Rgb(112, 87, 70),
        "fairy" => Color::Rgb(214, 133, 173),
        _ => TEXT_DIM,
    }
}
