use glam::Vec2;

/// Axis-aligned region of the window in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    // Edges count as inside
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left
            && point.x <= self.left + self.width
            && point.y >= self.top
            && point.y <= self.top + self.height
    }

    /// True when the two rectangles share a region of non-zero area.
    pub fn intersects(&self, other: &Rect) -> bool {
        let overlap_x =
            (self.left + self.width).min(other.left + other.width) - self.left.max(other.left);
        let overlap_y =
            (self.top + self.height).min(other.top + other.height) - self.top.max(other.top);
        overlap_x > 0.0 && overlap_y > 0.0
    }
}

/// Pointer interaction state for one registered region.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    /// Pixel position relative to the region's top-left corner
    pub position: Vec2,
    /// Normalized position in [-1, 1], Y pointing up
    pub normalized: Vec2,
    pub hover: bool,
    /// Set while a touch that started or entered the region is held
    pub touching: bool,
}

impl PointerState {
    pub(crate) fn track(&mut self, pointer: Vec2, bounds: &Rect) {
        self.position = Vec2::new(pointer.x - bounds.left, pointer.y - bounds.top);
        self.normalized = Vec2::new(
            (self.position.x / bounds.width) * 2.0 - 1.0,
            (-self.position.y / bounds.height) * 2.0 + 1.0,
        );
    }
}

pub type PointerCallback = Box<dyn FnMut(&PointerState)>;

/// Callbacks fired for one registered region. Unset callbacks are skipped.
#[derive(Default)]
pub struct PointerHandlers {
    pub on_enter: Option<PointerCallback>,
    pub on_move: Option<PointerCallback>,
    pub on_click: Option<PointerCallback>,
    pub on_leave: Option<PointerCallback>,
}

impl PointerHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_enter(mut self, callback: impl FnMut(&PointerState) + 'static) -> Self {
        self.on_enter = Some(Box::new(callback));
        self
    }

    pub fn on_move(mut self, callback: impl FnMut(&PointerState) + 'static) -> Self {
        self.on_move = Some(Box::new(callback));
        self
    }

    pub fn on_click(mut self, callback: impl FnMut(&PointerState) + 'static) -> Self {
        self.on_click = Some(Box::new(callback));
        self
    }

    pub fn on_leave(mut self, callback: impl FnMut(&PointerState) + 'static) -> Self {
        self.on_leave = Some(Box::new(callback));
        self
    }
}
