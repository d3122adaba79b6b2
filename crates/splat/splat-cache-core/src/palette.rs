//! Colors, renderer categories, and palettes.

use serde::{Deserialize, Serialize};

/// sRGB color with alpha, components in [0, 1].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Color {
    pub const GRAY: Color = Color::rgb(0.5, 0.5, 0.5);
    pub const YELLOW: Color = Color::rgb(1.0, 0.92, 0.016);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Fixed set of recolorable renderer groups.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Category {
    Wall,
    Obstacle,
    /// Paint marks, particles, and the player.
    Paint,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Wall, Category::Obstacle, Category::Paint];

    /// Map a sorting-layer name to its category. Unlisted layers are not recolored.
    pub fn from_sorting_layer(layer: &str) -> Option<Category> {
        match layer {
            "Wall" => Some(Category::Wall),
            "Obstacles" => Some(Category::Obstacle),
            "Paint" | "Player" => Some(Category::Paint),
            _ => None,
        }
    }
}

/// One color per category. The wall color doubles as the scene background.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub name: String,
    pub wall_and_background: Color,
    pub paint_and_player: Color,
    pub obstacle: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            wall_and_background: Color::GRAY,
            paint_and_player: Color::YELLOW,
            obstacle: Color::RED,
        }
    }
}

impl Palette {
    pub fn color_for(&self, category: Category) -> Color {
        match category {
            Category::Wall => self.wall_and_background,
            Category::Obstacle => self.obstacle,
            Category::Paint => self.paint_and_player,
        }
    }

    #[inline]
    pub fn background(&self) -> Color {
        self.wall_and_background
    }
}
