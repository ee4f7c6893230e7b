/// Keyboard and mouse mapping onto camera commands
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use wire3d_core::{CameraCommand, Orientation, ViewConfig};

/// Seconds of movement a single key press is worth
const MOVE_STEP: f32 = 0.1;

/// What the app loop should do in response to one input event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    Quit,
    Camera(CameraCommand),
    /// The terminal now has this many columns and rows
    Resize(u16, u16),
}

/// Translates terminal events using the speeds and steps from a [`ViewConfig`]
pub struct InputMapper {
    move_speed: f32,
    fast_move_speed: f32,
    rotate_step: f32,
    mouse_sensitivity: f32,
    fov_step: f32,
    focal_step: f32,
    drag_from: Option<(u16, u16)>,
}

impl InputMapper {
    pub fn new(config: &ViewConfig) -> Self {
        Self {
            move_speed: config.move_speed,
            fast_move_speed: config.fast_move_speed,
            rotate_step: config.rotate_step,
            mouse_sensitivity: config.mouse_sensitivity,
            fov_step: config.fov_step,
            focal_step: config.focal_step,
            drag_from: None,
        }
    }

    /// `aspect` is the render target's height over width, used to even out
    /// horizontal mouse look
    pub fn map_event(&mut self, event: &Event, aspect: f32) -> Option<InputAction> {
        match event {
            Event::Key(key) => self.map_key(key),
            Event::Mouse(mouse) => self.map_mouse(mouse, aspect),
            Event::Resize(columns, rows) => Some(InputAction::Resize(*columns, *rows)),
            _ => None,
        }
    }

    fn map_key(&self, key: &KeyEvent) -> Option<InputAction> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        let camera = InputAction::Camera;
        let action = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => InputAction::Quit,
            KeyCode::Char('q') | KeyCode::Esc => InputAction::Quit,
            KeyCode::Char(c @ ('w' | 's' | 'a' | 'd' | ' ' | 'c' | 'W' | 'S' | 'A' | 'D' | 'C')) => {
                let speed = if c.is_ascii_uppercase() || key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.fast_move_speed
                } else {
                    self.move_speed
                };
                let step = speed * MOVE_STEP;
                let (forward, right, up) = match c.to_ascii_lowercase() {
                    'w' => (step, 0.0, 0.0),
                    's' => (-step, 0.0, 0.0),
                    'a' => (0.0, -step, 0.0),
                    'd' => (0.0, step, 0.0),
                    ' ' => (0.0, 0.0, step),
                    _ => (0.0, 0.0, -step),
                };
                camera(CameraCommand::Walk { forward, right, up })
            }
            KeyCode::Left => camera(self.rotate(-self.rotate_step, 0.0, 0.0)),
            KeyCode::Right => camera(self.rotate(self.rotate_step, 0.0, 0.0)),
            KeyCode::Up => camera(self.rotate(0.0, self.rotate_step, 0.0)),
            KeyCode::Down => camera(self.rotate(0.0, -self.rotate_step, 0.0)),
            KeyCode::Char('u') => camera(self.rotate(0.0, 0.0, -self.rotate_step)),
            KeyCode::Char('o') => camera(self.rotate(0.0, 0.0, self.rotate_step)),
            KeyCode::Char('+') | KeyCode::Char('=') => camera(CameraCommand::AdjustFov(self.fov_step)),
            KeyCode::Char('-') => camera(CameraCommand::AdjustFov(-self.fov_step)),
            KeyCode::Char(']') => camera(CameraCommand::ScaleFocalLength(self.focal_step)),
            KeyCode::Char('[') => camera(CameraCommand::ScaleFocalLength(1.0 / self.focal_step)),
            _ => return None,
        };
        Some(action)
    }

    fn map_mouse(&mut self, mouse: &MouseEvent, aspect: f32) -> Option<InputAction> {
        let position = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag_from = Some(position);
                None
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let from = self.drag_from.replace(position)?;
                let dx = position.0 as f32 - from.0 as f32;
                let dy = position.1 as f32 - from.1 as f32;
                let yaw = dx * self.mouse_sensitivity * aspect;
                let pitch = -dy * self.mouse_sensitivity;
                Some(InputAction::Camera(self.rotate(yaw, pitch, 0.0)))
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.drag_from = None;
                None
            }
            MouseEventKind::ScrollUp => Some(InputAction::Camera(CameraCommand::AdjustFov(self.fov_step))),
            MouseEventKind::ScrollDown => {
                Some(InputAction::Camera(CameraCommand::AdjustFov(-self.fov_step)))
            }
            _ => None,
        }
    }

    fn rotate(&self, yaw: f32, pitch: f32, roll: f32) -> CameraCommand {
        CameraCommand::Rotate(Orientation::new(yaw, pitch, roll))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> InputMapper {
        InputMapper::new(&ViewConfig::default())
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_quit_keys() {
        let mut m = mapper();
        assert_eq!(m.map_event(&key(KeyCode::Char('q')), 1.0), Some(InputAction::Quit));
        assert_eq!(m.map_event(&key(KeyCode::Esc), 1.0), Some(InputAction::Quit));
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(m.map_event(&ctrl_c, 1.0), Some(InputAction::Quit));
    }

    #[test]
    fn test_movement_keys() {
        let mut m = mapper();
        assert_eq!(
            m.map_event(&key(KeyCode::Char('w')), 1.0),
            Some(InputAction::Camera(CameraCommand::Walk {
                forward: 2.0 * MOVE_STEP,
                right: 0.0,
                up: 0.0
            }))
        );
        assert_eq!(
            m.map_event(&key(KeyCode::Char('A')), 1.0),
            Some(InputAction::Camera(CameraCommand::Walk {
                forward: 0.0,
                right: -5.0 * MOVE_STEP,
                up: 0.0
            }))
        );
        assert_eq!(
            m.map_event(&key(KeyCode::Char('c')), 1.0),
            Some(InputAction::Camera(CameraCommand::Walk {
                forward: 0.0,
                right: 0.0,
                up: -2.0 * MOVE_STEP
            }))
        );
    }

    #[test]
    fn test_release_is_ignored() {
        let mut m = mapper();
        let mut release = KeyEvent::new(KeyCode::Char('w'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert_eq!(m.map_event(&Event::Key(release), 1.0), None);
    }

    #[test]
    fn test_fov_and_focal_keys() {
        let mut m = mapper();
        assert_eq!(
            m.map_event(&key(KeyCode::Char('+')), 1.0),
            Some(InputAction::Camera(CameraCommand::AdjustFov(1.0)))
        );
        assert_eq!(
            m.map_event(&key(KeyCode::Char('[')), 1.0),
            Some(InputAction::Camera(CameraCommand::ScaleFocalLength(0.5)))
        );
        assert_eq!(
            m.map_event(&mouse(MouseEventKind::ScrollDown, 0, 0), 1.0),
            Some(InputAction::Camera(CameraCommand::AdjustFov(-1.0)))
        );
    }

    #[test]
    fn test_mouse_drag_turns_camera() {
        let mut m = mapper();
        assert_eq!(m.map_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 5, 5), 0.5), None);
        assert_eq!(m.map_event(&mouse(MouseEventKind::Down(MouseButton::Left), 10, 10), 0.5), None);

        let action = m.map_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 14, 8), 0.5);
        let Some(InputAction::Camera(CameraCommand::Rotate(delta))) = action else {
            panic!("expected a rotation, got {action:?}");
        };
        assert!((delta.yaw - 4.0 / 100.0 * 0.5).abs() < 1e-6);
        assert!((delta.pitch - 2.0 / 100.0).abs() < 1e-6);

        m.map_event(&mouse(MouseEventKind::Up(MouseButton::Left), 14, 8), 0.5);
        assert_eq!(m.map_event(&mouse(MouseEventKind::Drag(MouseButton::Left), 20, 8), 0.5), None);
    }

    #[test]
    fn test_resize_event() {
        let mut m = mapper();
        assert_eq!(m.map_event(&Event::Resize(120, 40), 1.0), Some(InputAction::Resize(120, 40)));
    }
}
