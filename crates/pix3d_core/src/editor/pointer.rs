//! Pointer state for viewport picking
//!
//! Tracks the cursor in window pixels and tells clicks from drags.

/// Movement below this many pixels between press and release is a click
pub const DRAG_THRESHOLD: f64 = 5.0;

/// What a button release turned out to be
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerRelease {
    /// Press and release at (nearly) the same spot, in NDC
    Click {
        /// NDC x
        ndc_x: f32,
        /// NDC y
        ndc_y: f32,
    },
    /// The pointer travelled past the drag threshold
    DragEnd,
    /// No press was in progress
    Idle,
}

/// Cursor position and button state over the viewport
#[derive(Debug, Clone)]
pub struct PointerState {
    /// Screen-space X position (pixels from left)
    pub screen_x: f64,
    /// Screen-space Y position (pixels from top)
    pub screen_y: f64,
    /// Viewport width in pixels
    pub viewport_width: u32,
    /// Viewport height in pixels
    pub viewport_height: u32,
    press_origin: Option<(f64, f64)>,
}

impl PointerState {
    /// Pointer over a viewport of the given size
    pub fn new(viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            screen_x: 0.0,
            screen_y: 0.0,
            viewport_width,
            viewport_height,
            press_origin: None,
        }
    }

    /// Normalized device coordinates, X right and Y up, both in [-1, 1]
    pub fn to_ndc(&self) -> (f32, f32) {
        let width = f64::from(self.viewport_width.max(1));
        let height = f64::from(self.viewport_height.max(1));
        let ndc_x = (self.screen_x / width) * 2.0 - 1.0;
        let ndc_y = 1.0 - (self.screen_y / height) * 2.0;
        (ndc_x as f32, ndc_y as f32)
    }

    /// Move the cursor
    pub fn update_position(&mut self, x: f64, y: f64) {
        self.screen_x = x;
        self.screen_y = y;
    }

    /// Track a viewport resize
    pub fn update_viewport_size(&mut self, width: u32, height: u32) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// Primary button went down at the current position
    pub fn press(&mut self) {
        self.press_origin = Some((self.screen_x, self.screen_y));
    }

    /// Whether the button is held
    pub fn is_pressed(&self) -> bool {
        self.press_origin.is_some()
    }

    /// Whether the held pointer has moved past the drag threshold
    pub fn is_dragging(&self) -> bool {
        self.press_origin.is_some_and(|(start_x, start_y)| {
            let dx = self.screen_x - start_x;
            let dy = self.screen_y - start_y;
            (dx * dx + dy * dy).sqrt() >= DRAG_THRESHOLD
        })
    }

    /// Primary button went up
    pub fn release(&mut self) -> PointerRelease {
        if self.press_origin.is_none() {
            return PointerRelease::Idle;
        }
        let dragged = self.is_dragging();
        self.press_origin = None;
        if dragged {
            PointerRelease::DragEnd
        } else {
            let (ndc_x, ndc_y) = self.to_ndc();
            PointerRelease::Click { ndc_x, ndc_y }
        }
    }
}
