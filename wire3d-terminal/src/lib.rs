/// Terminal wireframe viewer driving a wire3d camera
use crossterm::{
    cursor,
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use wire3d_core::{Camera, CameraCommand, CameraError, ViewConfig, WireframeBuffers};

pub mod canvas;
pub mod input;
pub mod renderer;

pub use canvas::Canvas;
pub use input::{InputAction, InputMapper};
pub use renderer::{FrameStats, WireframeRenderer};

/// Rows reserved above the canvas for the status line
const STATUS_ROWS: u16 = 1;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
    #[error("camera error: {0}")]
    Camera(#[from] CameraError),
}

/// Main application struct for terminal wireframe rendering
pub struct TerminalApp {
    buffers: WireframeBuffers,
    camera: Camera,
    renderer: WireframeRenderer,
    input: InputMapper,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
    stats: FrameStats,
}

impl TerminalApp {
    pub fn new(buffers: WireframeBuffers, config: &ViewConfig) -> Result<Self, AppError> {
        let (columns, rows) = terminal::size()?;
        Self::with_size(buffers, config, columns, rows)
    }

    /// Builds the app for a terminal of `columns` x `rows` cells
    pub fn with_size(
        buffers: WireframeBuffers,
        config: &ViewConfig,
        columns: u16,
        rows: u16,
    ) -> Result<Self, AppError> {
        let renderer = WireframeRenderer::new(
            columns as usize,
            rows.saturating_sub(STATUS_ROWS) as usize,
        );
        let camera = config.camera_with_resolution(renderer.resolution())?;

        Ok(Self {
            buffers,
            camera,
            renderer,
            input: InputMapper::new(config),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
            stats: FrameStats::default(),
        })
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn run(&mut self) -> Result<(), AppError> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;
        tracing::info!(edges = self.buffers.edge_count(), "viewer started");

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        tracing::info!("viewer stopped");

        result
    }

    fn main_loop(&mut self) -> Result<(), AppError> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Drain everything that arrived since the last frame
            while event::poll(Duration::ZERO)? {
                let event = event::read()?;
                let aspect = self.camera.resolution().aspect();
                if let Some(action) = self.input.map_event(&event, aspect) {
                    self.handle_action(action)?;
                }
            }

            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_action(&mut self, action: InputAction) -> Result<(), AppError> {
        match action {
            InputAction::Quit => self.running = false,
            InputAction::Camera(command) => {
                // Out-of-range fov or focal length edits are dropped, not fatal
                if let Err(e) = self.camera.apply(command) {
                    tracing::warn!(?command, "ignored camera command: {e}");
                }
            }
            InputAction::Resize(columns, rows) => {
                self.renderer
                    .resize(columns as usize, rows.saturating_sub(STATUS_ROWS) as usize);
                // Resolution changes keep the old fov; re-derive it here
                let resized = self
                    .camera
                    .apply(CameraCommand::Resize(self.renderer.resolution()))
                    .and_then(|()| self.camera.apply(CameraCommand::RefreshFov));
                if let Err(e) = resized {
                    tracing::warn!(columns, rows, "keeping previous camera after resize: {e}");
                }
                execute!(stdout(), terminal::Clear(ClearType::All))?;
            }
        }
        Ok(())
    }

    fn render(&mut self) -> io::Result<()> {
        self.renderer.clear();
        self.stats = self.renderer.render(&self.buffers, &self.camera);

        let mut stdout = stdout();
        self.renderer.draw(&mut stdout, STATUS_ROWS)?;

        // Draw UI overlay
        let (width, _) = terminal::size()?;
        let mut status = self.status_line();
        status.truncate(width as usize);
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(status),
            ResetColor
        )?;

        stdout.flush()
    }

    fn status_line(&self) -> String {
        let p = self.camera.position;
        format!(
            "Position: [{:.2}, {:.2}, {:.2}] | FOV: {:.0} | Focal: {:.3} | Edges: {}/{} | FPS: {:.1} | \
             WASD/Space/C=Move Arrows/Drag=Look U/O=Roll +/-=FOV [/]=Focal Q=Quit",
            p.x,
            p.y,
            p.z,
            self.camera.fov().horizontal,
            self.camera.focal_length(),
            self.stats.drawn,
            self.stats.edges,
            self.fps
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wire3d_core::{Color, Fov, Resolution};

    fn app(columns: u16, rows: u16) -> TerminalApp {
        let buffers = WireframeBuffers::cube(1.0, Color::WHITE);
        TerminalApp::with_size(buffers, &ViewConfig::default(), columns, rows).unwrap()
    }

    #[test]
    fn test_starts_in_tall_terminal() {
        let app = app(20, 61);
        assert_eq!(app.camera().resolution(), Resolution::new(20, 120).unwrap());
        assert!(app.camera().fov().vertical < 180.0);
    }

    #[test]
    fn test_resize_to_portrait_keeps_running() {
        let mut app = app(80, 25);
        app.handle_action(InputAction::Resize(40, 41)).unwrap();

        assert!(app.running);
        assert_eq!(app.camera().resolution(), Resolution::new(40, 80).unwrap());
        assert_eq!(app.camera().fov().horizontal, 120.0);
        assert!(app.camera().fov().vertical < 180.0);
    }

    #[test]
    fn test_resize_refreshes_fov() {
        let mut app = app(80, 25);
        app.handle_action(InputAction::Resize(100, 26)).unwrap();
        assert_eq!(app.camera().fov(), Fov::new(120.0, 60.0));
    }

    #[test]
    fn test_rejected_camera_command_is_ignored() {
        let mut app = app(80, 25);
        let before = app.camera().fov();
        app.handle_action(InputAction::Camera(CameraCommand::AdjustFov(500.0)))
            .unwrap();
        assert!(app.running);
        assert_eq!(app.camera().fov(), before);

        app.handle_action(InputAction::Quit).unwrap();
        assert!(!app.running);
    }
}
