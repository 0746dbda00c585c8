// src/pipeline/hud.rs
//
// What to draw on top of a frame, kept free of any imaging library so that
// sessions can describe their overlay without touching pixels.

/// Colors are BGR, matching OpenCV's channel order.
pub type Bgr = (u8, u8, u8);

pub const GREEN: Bgr = (0, 255, 0);
pub const RED: Bgr = (0, 0, 255);
pub const WHITE: Bgr = (255, 255, 255);
pub const CYAN: Bgr = (255, 255, 0);
pub const YELLOW: Bgr = (0, 255, 255);
pub const ORANGE: Bgr = (0, 165, 255);
pub const PANEL_BLUE: Bgr = (245, 117, 16);

#[derive(Debug, Clone, PartialEq)]
pub struct HudPanel {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub color: Bgr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudText {
    pub text: String,
    pub origin: (i32, i32),
    pub scale: f64,
    pub color: Bgr,
    pub thickness: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hud {
    pub panels: Vec<HudPanel>,
    pub texts: Vec<HudText>,
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn panel(mut self, x: i32, y: i32, width: i32, height: i32, color: Bgr) -> Self {
        self.panels.push(HudPanel {
            x,
            y,
            width,
            height,
            color,
        });
        self
    }

    pub fn text(
        mut self,
        text: impl Into<String>,
        origin: (i32, i32),
        scale: f64,
        color: Bgr,
        thickness: i32,
    ) -> Self {
        self.texts.push(HudText {
            text: text.into(),
            origin,
            scale,
            color,
            thickness,
        });
        self
    }

    #[cfg(test)]
    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts.iter().any(|t| t.text.contains(needle))
    }
}
