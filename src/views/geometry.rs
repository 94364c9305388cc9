//! Floating widget placement: drag and resize

pub const MIN_WIDTH: f64 = 300.0;
pub const MAX_WIDTH: f64 = 800.0;
pub const MIN_HEIGHT: f64 = 400.0;
pub const MAX_HEIGHT: f64 = 800.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    /// Pointer offset from the widget origin at drag start
    Dragging { grab: Point },
    /// Pointer and size at resize start
    Resizing { origin: Point, start: Size },
}

/// Position and size of the floating chat window
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetGeometry {
    pub position: Point,
    pub size: Size,
    gesture: Gesture,
}

impl Default for WidgetGeometry {
    fn default() -> Self {
        Self {
            position: Point::new(100.0, 100.0),
            size: Size::new(400.0, 600.0),
            gesture: Gesture::Idle,
        }
    }
}

impl WidgetGeometry {
    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self.gesture, Gesture::Resizing { .. })
    }

    pub fn start_drag(&mut self, pointer: Point) {
        self.gesture = Gesture::Dragging {
            grab: Point::new(pointer.x - self.position.x, pointer.y - self.position.y),
        };
    }

    /// Move with the pointer, keeping the whole widget inside the viewport.
    /// A viewport smaller than the widget pins it to the top-left corner.
    pub fn drag_to(&mut self, pointer: Point, viewport: Size) {
        let Gesture::Dragging { grab } = self.gesture else {
            return;
        };

        self.position = Point::new(
            clamp_axis(pointer.x - grab.x, viewport.width - self.size.width),
            clamp_axis(pointer.y - grab.y, viewport.height - self.size.height),
        );
    }

    pub fn start_resize(&mut self, pointer: Point) {
        self.gesture = Gesture::Resizing {
            origin: pointer,
            start: self.size,
        };
    }

    /// Resize by the pointer's travel since the resize started
    pub fn resize_to(&mut self, pointer: Point) {
        let Gesture::Resizing { origin, start } = self.gesture else {
            return;
        };

        self.size = Size::new(
            (start.width + pointer.x - origin.x).clamp(MIN_WIDTH, MAX_WIDTH),
            (start.height + pointer.y - origin.y).clamp(MIN_HEIGHT, MAX_HEIGHT),
        );
    }

    /// Pointer released: ends a drag or a resize
    pub fn release(&mut self) {
        self.gesture = Gesture::Idle;
    }
}

fn clamp_axis(value: f64, max: f64) -> f64 {
    value.min(max).max(0.0)
}
