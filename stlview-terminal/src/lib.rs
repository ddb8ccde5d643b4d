/// Terminal front end for stlview: crossterm events in, ASCII frames out
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal,
};
use log::{debug, info};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use stlview_core::{InputEvent, Viewer};

pub mod renderer;

pub use renderer::{AsciiRenderer, CELL_HEIGHT_PX, CELL_WIDTH_PX};

/// What the application should do in response to a terminal event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Input(InputEvent),
    ResetView,
    Quit,
}

/// Translates crossterm events into viewer input, turning absolute mouse
/// cells into pixel deltas.
#[derive(Debug, Default)]
pub struct EventMapper {
    last_pointer: Option<(u16, u16)>,
}

impl EventMapper {
    pub fn map(&mut self, event: &Event) -> Option<Command> {
        match event {
            Event::Key(key) => map_key(key),
            Event::Mouse(mouse) => self.map_mouse(mouse).map(Command::Input),
            Event::Resize(cols, rows) => Some(Command::Input(InputEvent::Resize {
                width: *cols as f32 * CELL_WIDTH_PX,
                height: *rows as f32 * CELL_HEIGHT_PX,
            })),
            _ => None,
        }
    }

    fn map_mouse(&mut self, mouse: &MouseEvent) -> Option<InputEvent> {
        let position = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.last_pointer = Some(position);
                Some(InputEvent::PointerDown)
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.last_pointer = Some(position);
                Some(InputEvent::PointerUp)
            }
            MouseEventKind::Drag(_) | MouseEventKind::Moved => {
                let (last_col, last_row) = self.last_pointer.replace(position)?;
                Some(InputEvent::PointerMove {
                    dx: (position.0 as f32 - last_col as f32) * CELL_WIDTH_PX,
                    dy: (position.1 as f32 - last_row as f32) * CELL_HEIGHT_PX,
                })
            }
            _ => None,
        }
    }
}

fn map_key(key: &KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => Some(Command::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Char('r') => Some(Command::ResetView),
        _ => None,
    }
}

/// Main application struct for terminal model viewing
pub struct TerminalApp {
    viewer: Viewer,
    renderer: AsciiRenderer,
    mapper: EventMapper,
    running: bool,
    tick: Duration,
    last_tick: Instant,
    last_fps_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(mut viewer: Viewer, fps: f64) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        viewer.handle_event(InputEvent::Resize {
            width: width as f32 * CELL_WIDTH_PX,
            height: height as f32 * CELL_HEIGHT_PX,
        });

        Ok(Self {
            viewer,
            renderer: AsciiRenderer::new(width as usize, height as usize),
            mapper: EventMapper::default(),
            running: true,
            tick: Duration::from_secs_f64(1.0 / fps.max(1.0)),
            last_tick: Instant::now(),
            last_fps_sample: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;
        debug!("Entering main loop.");

        let result = self.main_loop();

        // Cleanup
        debug!("Exiting main loop.");
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        while self.running {
            // Block until the next input event or the next tick, whichever is first
            let timeout = self.tick.saturating_sub(self.last_tick.elapsed());
            if event::poll(timeout)? {
                let ev = event::read()?;
                self.handle_event(&ev);
            }

            if self.last_tick.elapsed() >= self.tick {
                self.last_tick = Instant::now();
                self.viewer.handle_event(InputEvent::Tick);
            }

            // Only redraw once the event queue has drained
            if !event::poll(Duration::ZERO)? && self.viewer.take_redraw() {
                self.render()?;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, ev: &Event) {
        if let Event::Resize(cols, rows) = ev {
            self.renderer.resize(*cols as usize, *rows as usize);
        }

        match self.mapper.map(ev) {
            Some(Command::Input(input)) => {
                self.viewer.handle_event(input);
            }
            Some(Command::ResetView) => self.viewer.reset_orientation(),
            Some(Command::Quit) => {
                info!("Quit requested.");
                self.running = false;
            }
            None => {}
        }
    }

    fn render(&mut self) -> io::Result<()> {
        let frame = self.viewer.render_frame();

        self.renderer.clear();
        self.renderer.render_frame(&frame);

        let mut stdout = stdout();
        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        let stats = self.viewer.stats();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::White),
            Print(format!(
                "Faces: {}. Verts: {}. Gradient. ESC exit. | Drag=Rotate R=Reset | FPS: {:.1}",
                stats.faces, stats.vertices, self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        self.update_fps();
        Ok(())
    }

    fn update_fps(&mut self) {
        self.frame_count += 1;
        let elapsed = self.last_fps_sample.elapsed();
        if elapsed.as_secs() >= 1 {
            self.fps = self.frame_count as f32 / elapsed.as_secs_f32();
            self.frame_count = 0;
            self.last_fps_sample = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_drag_becomes_pixel_deltas() {
        let mut mapper = EventMapper::default();
        assert_eq!(
            mapper.map(&mouse(MouseEventKind::Down(MouseButton::Left), 10, 5)),
            Some(Command::Input(InputEvent::PointerDown))
        );
        assert_eq!(
            mapper.map(&mouse(MouseEventKind::Drag(MouseButton::Left), 13, 4)),
            Some(Command::Input(InputEvent::PointerMove {
                dx: 3.0 * CELL_WIDTH_PX,
                dy: -CELL_HEIGHT_PX,
            }))
        );
        assert_eq!(
            mapper.map(&mouse(MouseEventKind::Up(MouseButton::Left), 13, 4)),
            Some(Command::Input(InputEvent::PointerUp))
        );
    }

    #[test]
    fn test_first_motion_has_no_reference() {
        let mut mapper = EventMapper::default();
        assert_eq!(mapper.map(&mouse(MouseEventKind::Moved, 3, 3)), None);
        assert_eq!(
            mapper.map(&mouse(MouseEventKind::Moved, 4, 3)),
            Some(Command::Input(InputEvent::PointerMove {
                dx: CELL_WIDTH_PX,
                dy: 0.0
            }))
        );
    }

    #[test]
    fn test_keys() {
        let mut mapper = EventMapper::default();
        let press = |code| Event::Key(KeyEvent::new(code, KeyModifiers::NONE));
        assert_eq!(mapper.map(&press(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(mapper.map(&press(KeyCode::Char('r'))), Some(Command::ResetView));
        assert_eq!(mapper.map(&press(KeyCode::Char('x'))), None);
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(mapper.map(&ctrl_c), Some(Command::Quit));
    }

    #[test]
    fn test_resize_in_pixels() {
        let mut mapper = EventMapper::default();
        assert_eq!(
            mapper.map(&Event::Resize(100, 30)),
            Some(Command::Input(InputEvent::Resize {
                width: 100.0 * CELL_WIDTH_PX,
                height: 30.0 * CELL_HEIGHT_PX,
            }))
        );
    }
}
