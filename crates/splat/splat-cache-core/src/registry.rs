//! Registry of recolorable renderers.
//!
//! Dynamically spawned visuals join the registry so a palette change reaches them
//! without a scene scan. The registry only holds handles; it never owns or
//! destroys the renderers behind them.

use hashbrown::HashMap;
use indexmap::IndexSet;

use crate::ids::RendererId;
use crate::palette::{Category, Color, Palette};

/// Host-side paint target.
pub trait ColorSink {
    /// Whether the renderer behind `renderer` still exists.
    fn is_alive(&self, _renderer: RendererId) -> bool {
        true
    }

    fn paint(&mut self, renderer: RendererId, category: Category, color: Color);

    fn paint_background(&mut self, _color: Color) {}
}

/// One recorded paint.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Paint {
    pub renderer: RendererId,
    pub category: Category,
    pub color: Color,
}

/// Sink that records paints for the host to apply later.
#[derive(Clone, Debug, Default)]
pub struct PaintBatch {
    pub paints: Vec<Paint>,
    pub background: Option<Color>,
}

impl PaintBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.paints.is_empty() && self.background.is_none()
    }

    pub fn clear(&mut self) {
        self.paints.clear();
        self.background = None;
    }
}

impl ColorSink for PaintBatch {
    fn paint(&mut self, renderer: RendererId, category: Category, color: Color) {
        self.paints.push(Paint {
            renderer,
            category,
            color,
        });
    }

    fn paint_background(&mut self, color: Color) {
        self.background = Some(color);
    }
}

#[derive(Debug, Default)]
pub struct RendererColorRegistry {
    categories: HashMap<Category, IndexSet<RendererId>>,
    /// Reverse index; a renderer sits in at most one category.
    membership: HashMap<RendererId, Category>,
    current: Option<Palette>,
}

impl RendererColorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that paints new members with `palette` straight away.
    pub fn with_palette(palette: Palette) -> Self {
        Self {
            current: Some(palette),
            ..Self::default()
        }
    }

    pub fn current_palette(&self) -> Option<&Palette> {
        self.current.as_ref()
    }

    pub fn len(&self) -> usize {
        self.membership.len()
    }

    pub fn is_empty(&self) -> bool {
        self.membership.is_empty()
    }

    pub fn category_of(&self, renderer: RendererId) -> Option<Category> {
        self.membership.get(&renderer).copied()
    }

    pub fn contains(&self, renderer: RendererId) -> bool {
        self.membership.contains_key(&renderer)
    }

    /// Members of `category`, in registration order.
    pub fn members(&self, category: Category) -> impl Iterator<Item = RendererId> + '_ {
        self.categories
            .get(&category)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Add `renderer` to `category` and paint it with the active palette.
    ///
    /// Dead renderers are ignored. Re-registering moves the renderer if the
    /// category differs. Returns whether the renderer is registered afterwards.
    pub fn register(
        &mut self,
        renderer: RendererId,
        category: Category,
        sink: &mut dyn ColorSink,
    ) -> bool {
        if !sink.is_alive(renderer) {
            log::debug!("register ignored for dead renderer {renderer:?}");
            return false;
        }
        match self.membership.insert(renderer, category) {
            Some(prev) if prev == category => {}
            Some(prev) => {
                if let Some(set) = self.categories.get_mut(&prev) {
                    set.shift_remove(&renderer);
                }
                self.categories.entry(category).or_default().insert(renderer);
            }
            None => {
                self.categories.entry(category).or_default().insert(renderer);
            }
        }
        if let Some(palette) = &self.current {
            sink.paint(renderer, category, palette.color_for(category));
        }
        true
    }

    /// Remove `renderer` from whichever category holds it. Unknown handles are a no-op.
    pub fn unregister(&mut self, renderer: RendererId) -> bool {
        let Some(category) = self.membership.remove(&renderer) else {
            return false;
        };
        if let Some(set) = self.categories.get_mut(&category) {
            set.shift_remove(&renderer);
        }
        true
    }

    /// Make `palette` current and repaint every registered renderer plus the background.
    ///
    /// Renderers the sink reports dead are pruned. Returns how many were pruned.
    pub fn apply_palette(&mut self, palette: Palette, sink: &mut dyn ColorSink) -> usize {
        log::debug!("applying palette '{}'", palette.name);
        self.current = Some(palette);
        self.repaint(sink)
    }

    /// Repaint with the current palette. Warns and does nothing when none was applied yet.
    pub fn reapply(&mut self, sink: &mut dyn ColorSink) -> usize {
        if self.current.is_none() {
            log::warn!("no palette to reapply");
            return 0;
        }
        self.repaint(sink)
    }

    fn repaint(&mut self, sink: &mut dyn ColorSink) -> usize {
        let Some(palette) = &self.current else {
            return 0;
        };
        sink.paint_background(palette.background());

        let mut pruned = Vec::new();
        for category in Category::ALL {
            let Some(set) = self.categories.get_mut(&category) else {
                continue;
            };
            let color = palette.color_for(category);
            set.retain(|&renderer| {
                if sink.is_alive(renderer) {
                    sink.paint(renderer, category, color);
                    true
                } else {
                    pruned.push(renderer);
                    false
                }
            });
        }
        for renderer in &pruned {
            self.membership.remove(renderer);
        }
        if !pruned.is_empty() {
            log::debug!("pruned {} dead renderers", pruned.len());
        }
        pruned.len()
    }
}
