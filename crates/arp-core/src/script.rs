use crate::Position;

/// Viewport dimensions in the same coordinate space as [`Position`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A pre-recorded gesture as (x%, y%) pairs relative to the viewport.
///
/// Steps stay normalized; [`GestureScript::absolute`] scales a step against
/// whatever viewport is current when it is played.
#[derive(Debug)]
pub struct GestureScript {
    steps: &'static [[f32; 2]],
}

impl GestureScript {
    /// Wrap a step table. Returns `None` for scripts shorter than two steps.
    pub const fn new(steps: &'static [[f32; 2]]) -> Option<Self> {
        if steps.len() < 2 {
            None
        } else {
            Some(Self { steps })
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    #[inline]
    pub fn last_index(&self) -> usize {
        self.steps.len() - 1
    }

    /// Absolute position of step `index` within `viewport`, if the step exists.
    pub fn absolute(&self, index: usize, viewport: Viewport) -> Option<Position> {
        self.steps.get(index).map(|[x_pct, y_pct]| Position {
            left: x_pct / 100.0 * viewport.width,
            top: y_pct / 100.0 * viewport.height,
        })
    }
}

// Onboarding swipe: a loop from the upper middle round the left side and back up the right.
static INTRO_SWIPE_STEPS: [[f32; 2]; 56] = [
    [50.0, 31.0], [48.0, 30.0], [46.0, 30.0], [44.0, 30.0], [41.0, 30.0], [38.0, 30.0],
    [35.0, 30.0], [33.0, 30.0], [32.0, 31.0], [30.0, 33.0], [29.0, 34.0], [28.0, 36.0],
    [27.0, 38.0], [26.0, 41.0], [25.0, 43.0], [24.0, 46.0], [23.0, 49.0], [23.0, 51.0],
    [23.0, 53.0], [22.0, 55.0], [22.0, 56.0], [22.0, 57.0], [22.0, 57.0], [23.0, 59.0],
    [24.0, 60.0], [27.0, 63.0], [29.0, 65.0], [32.0, 67.0], [34.0, 68.0], [39.0, 70.0],
    [43.0, 71.0], [47.0, 71.0], [50.0, 71.0], [53.0, 71.0], [56.0, 71.0], [58.0, 70.0],
    [60.0, 69.0], [62.0, 68.0], [64.0, 67.0], [66.0, 65.0], [68.0, 63.0], [69.0, 61.0],
    [71.0, 59.0], [73.0, 56.0], [74.0, 54.0], [76.0, 51.0], [77.0, 49.0], [78.0, 46.0],
    [78.0, 43.0], [79.0, 40.0], [79.0, 36.0], [79.0, 33.0], [79.0, 30.0], [79.0, 28.0],
    [79.0, 26.0], [79.0, 25.0],
];

// Checked at compile time.
pub static INTRO_SWIPE: GestureScript = match GestureScript::new(&INTRO_SWIPE_STEPS) {
    Some(script) => script,
    None => panic!("onboarding swipe needs at least two steps"),
};
