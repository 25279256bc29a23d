//! Crossterm backend that draws one kitty-graphics image after each frame.
//!
//! Rendering code publishes the artwork placement through [`show_artwork`]
//! and [`hide_artwork`]; the backend replays it after ratatui flushes cells.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use crossterm::{cursor::MoveTo, queue, style::Print};
use ratatui::backend::{Backend, ClearType, CrosstermBackend, WindowSize};
use ratatui::buffer::Cell;
use ratatui::layout::{Position, Size};

/// Deletes every image placement we made.
const KITTY_DELETE_ALL: &str = "\x1b_Ga=d,d=a\x1b\\";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub x: u16,
    pub y: u16,
    pub sequence: String,
}

#[derive(Default, Debug)]
pub struct ArtworkSlot {
    current: Option<Placement>,
}

impl ArtworkSlot {
    pub fn show(&mut self, placement: Placement) {
        self.current = Some(placement);
    }

    pub fn hide(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&Placement> {
        self.current.as_ref()
    }
}

static SLOT: OnceLock<Arc<Mutex<ArtworkSlot>>> = OnceLock::new();

pub fn artwork_slot() -> Arc<Mutex<ArtworkSlot>> {
    SLOT.get_or_init(|| Arc::new(Mutex::new(ArtworkSlot::default())))
        .clone()
}

fn lock(slot: &Mutex<ArtworkSlot>) -> MutexGuard<'_, ArtworkSlot> {
    // A panic while holding the lock leaves plain data behind; keep using it.
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub fn show_artwork(x: u16, y: u16, sequence: String) {
    let slot = artwork_slot();
    lock(&slot).show(Placement { x, y, sequence });
}

pub fn hide_artwork() {
    let slot = artwork_slot();
    lock(&slot).hide();
}

#[derive(Debug)]
pub struct ArtworkBackend<W: Write> {
    inner: CrosstermBackend<W>,
    slot: Arc<Mutex<ArtworkSlot>>,
    drawn: Option<Placement>,
}

impl<W: Write> ArtworkBackend<W> {
    pub fn new(writer: W, slot: Arc<Mutex<ArtworkSlot>>) -> Self {
        Self {
            inner: CrosstermBackend::new(writer),
            slot,
            drawn: None,
        }
    }
}

impl<W: Write> Backend for ArtworkBackend<W> {
    fn draw<'a, I>(&mut self, content: I) -> io::Result<()>
    where
        I: Iterator<Item = (u16, u16, &'a Cell)>,
    {
        self.inner.draw(content)?;
        let wanted = lock(&self.slot).current().cloned();
        if wanted == self.drawn {
            return Ok(());
        }
        if self.drawn.is_some() {
            queue!(self.inner, Print(KITTY_DELETE_ALL))?;
        }
        if let Some(placement) = &wanted {
            queue!(
                self.inner,
                MoveTo(placement.x, placement.y),
                Print(&placement.sequence)
            )?;
        }
        self.drawn = wanted;
        Ok(())
    }

    fn append_lines(&mut self, n: u16) -> io::Result<()> {
        self.inner.append_lines(n)
    }

    fn hide_cursor(&mut self) -> io::Result<()> {
        self.inner.hide_cursor()
    }

    fn show_cursor(&mut self) -> io::Result<()> {
        self.inner.show_cursor()
    }

    fn get_cursor_position(&mut self) -> io::Result<Position> {
        self.inner.get_cursor_position()
    }

    fn set_cursor_position<P: Into<Position>>(&mut self, position: P) -> io::Result<()> {
        self.inner.set_cursor_position(position)
    }

    fn clear(&mut self) -> io::Result<()> {
        self.drawn = None;
        self.inner.clear()
    }

    fn clear_region(&mut self, clear_type: ClearType) -> io::Result<()> {
        self.inner.clear_region(clear_type)
    }

    fn size(&self) -> io::Result<Size> {
        self.inner.size()
    }

    fn window_size(&mut self) -> io::Result<WindowSize> {
        self.inner.window_size()
    }

    fn flush(&mut self) -> io::Result<()> {
        Backend::flush(&mut self.inner)
    }
}

impl<W: Write> Write for ArtworkBackend<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Write::flush(&mut self.inner)
    }
}
