use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::OnceLock;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::Terminal;
use tui_dispatch::{EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, Keybindings, TaskKey};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{DebugRunOutput, DebugSession, DebugSessionError, ReplayItem};

use typedex::action::Action;
use typedex::api::HttpSource;
use typedex::config::Args;
use typedex::effect::Effect;
use typedex::reducer::reducer;
use typedex::roster::RosterPipeline;
use typedex::sprite;
use typedex::sprite_backend::{self, ArtworkBackend};
use typedex::state::AppState;
use typedex::telemetry;
use typedex::ui::{self, RosterComponentId, RosterContext, RosterUi};

const TICK_MS: u64 = 120;

static PIPELINE: OnceLock<RosterPipeline<HttpSource>> = OnceLock::new();

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = Args::parse();

    match telemetry::init(args.log_file.as_deref(), args.verbose) {
        Ok(path) => tracing::info!(log = %path.display(), "typedex starting"),
        Err(error) => eprintln!("typedex: logging disabled: {error}"),
    }

    let pipeline = RosterPipeline::new(
        HttpSource::new(&args.api_base),
        &args.sprite_base,
        args.concurrency as usize,
    );
    if PIPELINE.set(pipeline).is_err() {
        return Err(io::Error::other("roster pipeline already initialised"));
    }
    tracing::info!(
        api_base = %args.api_base,
        concurrency = args.concurrency,
        category = %args.category,
        quantity = %args.quantity,
        "configured"
    );

    let kitty_graphics = sprite::kitty_graphics_supported(|name| std::env::var(name).ok());
    let show_artwork = args.show_artwork(kitty_graphics);
    if !show_artwork {
        tracing::info!(no_artwork = args.no_artwork, kitty_graphics, "artwork disabled");
    }

    let Args {
        category,
        quantity,
        debug: debug_args,
        ..
    } = args;
    let debug = DebugSession::new(debug_args);

    let state = debug
        .load_state_or_else_async(move || async move {
            let mut state = AppState::new(category, quantity, show_artwork);
            if let Ok(size) = crossterm::terminal::size() {
                state.terminal_size = size;
            }
            Ok::<AppState, io::Error>(state)
        })
        .await
        .map_err(debug_error)?;
    let replay_actions = debug.load_replay_items().map_err(debug_error)?;
    let (middleware, recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = ArtworkBackend::new(stdout, sprite_backend::artwork_slot());
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions).await;

    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug.save_actions(recorder.as_ref()).map_err(debug_error)?;
    tracing::info!("typedex stopped");
    Ok(())
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(RosterUi::new()));
    let mut bus: EventBus<AppState, Action, RosterComponentId, RosterContext> = EventBus::new();
    let keybindings: Keybindings<RosterContext> = Keybindings::new();

    let ui_categories = Rc::clone(&ui);
    bus.register(RosterComponentId::Categories, move |event, state| {
        ui_categories
            .borrow_mut()
            .handle_categories_event(&event.kind, state)
    });

    let ui_quantity = Rc::clone(&ui);
    bus.register(RosterComponentId::Quantity, move |event, state| {
        ui_quantity
            .borrow_mut()
            .handle_quantity_event(&event.kind, state)
    });

    let ui_grid = Rc::clone(&ui);
    bus.register(RosterComponentId::Grid, move |event, state| {
        ui_grid.borrow_mut().handle_grid_event(&event.kind, state)
    });

    let ui_modal = Rc::clone(&ui);
    bus.register(RosterComponentId::Modal, move |event, state| {
        ui_modal.borrow_mut().handle_modal_event(&event.kind, state)
    });

    bus.register_global(|event, state| ui::handle_global_event(&event.kind, state));

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }
                runtime
                    .subscriptions()
                    .interval("tick", Duration::from_millis(TICK_MS), || Action::Tick);
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            handle_effect,
        )
        .await
}

fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>) {
    let Some(pipeline) = PIPELINE.get() else {
        tracing::error!(?effect, "effect dropped: roster pipeline not initialised");
        return;
    };
    match effect {
        Effect::LoadRoster {
            cycle,
            category,
            quantity,
        } => {
            tracing::info!(cycle, %category, %quantity, "fetch cycle started");
            // Same key: a new cycle replaces the task of the previous one.
            ctx.tasks().spawn(TaskKey::new("roster"), async move {
                match pipeline.fetch(category, quantity).await {
                    Ok(records) => {
                        tracing::info!(cycle, count = records.len(), "fetch cycle finished");
                        Action::RosterDidLoad { cycle, records }
                    }
                    Err(error) => {
                        tracing::error!(cycle, %category, %error, "fetch cycle failed");
                        Action::RosterDidError {
                            cycle,
                            error: error.to_string(),
                        }
                    }
                }
            });
        }
        Effect::LoadArtwork { name, url } => {
            let key = format!("artwork_{name}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                let bytes = match pipeline.source().fetch_bytes(&url).await {
                    Ok(bytes) => bytes,
                    Err(error) => {
                        tracing::warn!(pokemon = %name, %error, "artwork download failed");
                        return Action::ArtworkDidError {
                            name,
                            error: error.to_string(),
                        };
                    }
                };
                match tokio::task::spawn_blocking(move || sprite::decode_artwork(&bytes)).await {
                    Ok(Ok(sprite)) => Action::ArtworkDidLoad { name, sprite },
                    Ok(Err(error)) => {
                        tracing::warn!(pokemon = %name, %error, "artwork decode failed");
                        Action::ArtworkDidError { name, error }
                    }
                    Err(error) => Action::ArtworkDidError {
                        name,
                        error: error.to_string(),
                    },
                }
            });
        }
    }
}
