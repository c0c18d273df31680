//! Drop-target resolution for drag gestures.
//!
//! A release point is matched against the slots in two passes:
//! 1. a hit test on the topmost element under the pointer, walking up to the
//!    nearest drop target (the drag ghost is hidden for the duration);
//! 2. a scan of every drop target's rectangle grown by a tolerance margin,
//!    first match in declaration order.

use crate::types::PairId;
use serde::{Deserialize, Serialize};

/// Viewport coordinate in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box, as measured by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Grow the rectangle by `margin` on every side.
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            left: self.left - margin,
            top: self.top - margin,
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
        }
    }

    /// Edge-inclusive containment.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }
}

/// Extra margin around slots, wider on narrow (touch) viewports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropTolerance {
    /// Viewports narrower than this use `narrow_px`.
    pub breakpoint_px: f64,
    pub narrow_px: f64,
    pub wide_px: f64,
}

impl Default for DropTolerance {
    fn default() -> Self {
        Self {
            breakpoint_px: 768.0,
            narrow_px: 10.0,
            wide_px: 0.0,
        }
    }
}

impl DropTolerance {
    /// Margin for a viewport of the given width.
    pub fn resolve(&self, viewport_width: f64) -> f64 {
        if viewport_width < self.breakpoint_px {
            self.narrow_px
        } else {
            self.wide_px
        }
    }
}

/// The rendered board as seen by the resolver.
pub trait DropSurface {
    /// Show or hide the drag ghost that follows the pointer.
    fn set_overlay_visible(&mut self, visible: bool);

    /// Nearest drop target at or above the topmost element under `point`.
    fn hit_test(&self, point: Point) -> Option<PairId>;

    /// Live bounding boxes of every drop target, in declaration order.
    fn drop_targets(&self) -> Vec<(PairId, Rect)>;
}

/// Hides the overlay until dropped.
struct HiddenOverlay<'a, S: DropSurface + ?Sized> {
    surface: &'a mut S,
}

impl<'a, S: DropSurface + ?Sized> HiddenOverlay<'a, S> {
    fn new(surface: &'a mut S) -> Self {
        surface.set_overlay_visible(false);
        Self { surface }
    }
}

impl<S: DropSurface + ?Sized> Drop for HiddenOverlay<'_, S> {
    fn drop(&mut self) {
        self.surface.set_overlay_visible(true);
    }
}

/// Finds the slot under a release point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropResolver {
    tolerance_px: f64,
}

impl DropResolver {
    pub fn new(tolerance_px: f64) -> Self {
        Self { tolerance_px }
    }

    pub fn for_viewport(tolerance: &DropTolerance, viewport_width: f64) -> Self {
        Self::new(tolerance.resolve(viewport_width))
    }

    pub fn tolerance_px(&self) -> f64 {
        self.tolerance_px
    }

    /// Slot under `point`, or `None` for a void drop.
    pub fn resolve<S: DropSurface + ?Sized>(&self, surface: &mut S, point: Point) -> Option<PairId> {
        let hit = {
            let hidden = HiddenOverlay::new(surface);
            hidden.surface.hit_test(point)
        };
        if hit.is_some() {
            return hit;
        }

        surface
            .drop_targets()
            .into_iter()
            .find(|(_, rect)| rect.expand(self.tolerance_px).contains(point))
            .map(|(slot, _)| slot)
    }
}

/// Index of a node in a [`LayoutTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct LayoutNode {
    rect: Rect,
    parent: Option<NodeId>,
    drop_target: Option<PairId>,
    overlay: bool,
}

/// In-memory element tree in paint order (later nodes paint on top).
///
/// Hosts that cannot hit-test a live document rebuild one of these from
/// measured rectangles.
#[derive(Debug, Clone)]
pub struct LayoutTree {
    nodes: Vec<LayoutNode>,
    overlay_visible: bool,
}

impl Default for LayoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutTree {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            overlay_visible: true,
        }
    }

    /// One flat drop target per rectangle.
    pub fn from_targets(targets: impl IntoIterator<Item = (PairId, Rect)>) -> Self {
        let mut tree = Self::new();
        for (slot, rect) in targets {
            tree.add_drop_target(slot, rect, None);
        }
        tree
    }

    /// Plain element, e.g. a label inside a slot.
    pub fn add_element(&mut self, rect: Rect, parent: Option<NodeId>) -> NodeId {
        self.push(LayoutNode {
            rect,
            parent,
            drop_target: None,
            overlay: false,
        })
    }

    pub fn add_drop_target(&mut self, slot: PairId, rect: Rect, parent: Option<NodeId>) -> NodeId {
        self.push(LayoutNode {
            rect,
            parent,
            drop_target: Some(slot),
            overlay: false,
        })
    }

    /// The drag ghost; always painted above existing nodes.
    pub fn add_overlay(&mut self, rect: Rect) -> NodeId {
        self.push(LayoutNode {
            rect,
            parent: None,
            drop_target: None,
            overlay: true,
        })
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    fn push(&mut self, node: LayoutNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    fn topmost(&self, point: Point) -> Option<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, node)| self.overlay_visible || !node.overlay)
            .find(|(_, node)| node.rect.contains(point))
            .map(|(i, _)| NodeId(i))
    }
}

impl DropSurface for LayoutTree {
    fn set_overlay_visible(&mut self, visible: bool) {
        self.overlay_visible = visible;
    }

    fn hit_test(&self, point: Point) -> Option<PairId> {
        let mut current = self.topmost(point);
        while let Some(NodeId(i)) = current {
            let node = self.nodes.get(i)?;
            if let Some(slot) = &node.drop_target {
                return Some(slot.clone());
            }
            current = node.parent;
        }
        None
    }

    fn drop_targets(&self) -> Vec<(PairId, Rect)> {
        self.nodes
            .iter()
            .filter_map(|node| node.drop_target.clone().map(|slot| (slot, node.rect)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn id(n: i64) -> PairId {
        PairId::Number(n)
    }

    fn two_slots() -> LayoutTree {
        LayoutTree::from_targets([
            (id(1), Rect::new(100.0, 100.0, 200.0, 50.0)),
            (id(2), Rect::new(100.0, 200.0, 200.0, 50.0)),
        ])
    }

    #[test]
    fn tolerance_depends_on_viewport_width() {
        let tolerance = DropTolerance::default();
        assert_eq!(tolerance.resolve(375.0), 10.0);
        assert_eq!(tolerance.resolve(1280.0), 0.0);
        assert_eq!(tolerance.resolve(768.0), 0.0);
    }

    #[test]
    fn release_just_outside_slot_counts_on_narrow_viewport() {
        let tolerance = DropTolerance::default();
        let point = Point::new(308.0, 120.0);

        let mut layout = two_slots();
        let narrow = DropResolver::for_viewport(&tolerance, 390.0);
        assert_eq!(narrow.resolve(&mut layout, point), Some(id(1)));

        let wide = DropResolver::for_viewport(&tolerance, 1440.0);
        assert_eq!(wide.resolve(&mut layout, point), None);
    }

    #[test]
    fn hit_test_walks_up_to_drop_target() {
        let mut layout = LayoutTree::new();
        let slot = layout.add_drop_target(id(7), Rect::new(0.0, 0.0, 100.0, 100.0), None);
        let label = layout.add_element(Rect::new(10.0, 10.0, 50.0, 20.0), Some(slot));
        layout.add_element(Rect::new(12.0, 12.0, 10.0, 10.0), Some(label));

        let resolver = DropResolver::new(0.0);
        assert_eq!(resolver.resolve(&mut layout, Point::new(15.0, 15.0)), Some(id(7)));
    }

    #[test]
    fn overlay_is_ignored_and_restored() {
        let mut layout = two_slots();
        layout.add_overlay(Rect::new(90.0, 90.0, 240.0, 80.0));
        assert_eq!(layout.hit_test(Point::new(150.0, 120.0)), None);

        let resolver = DropResolver::new(0.0);
        assert_eq!(
            resolver.resolve(&mut layout, Point::new(150.0, 120.0)),
            Some(id(1))
        );
        assert!(layout.overlay_visible());

        assert_eq!(resolver.resolve(&mut layout, Point::new(5.0, 5.0)), None);
        assert!(layout.overlay_visible());
    }

    #[test]
    fn overlapping_margins_prefer_first_declared() {
        let mut layout = LayoutTree::from_targets([
            (id(1), Rect::new(0.0, 0.0, 100.0, 40.0)),
            (id(2), Rect::new(0.0, 50.0, 100.0, 40.0)),
        ]);
        let resolver = DropResolver::new(10.0);
        // Gap between the two slots: within both margins.
        assert_eq!(resolver.resolve(&mut layout, Point::new(50.0, 45.0)), Some(id(1)));
    }

    #[test]
    fn rect_expand_is_symmetric() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0).expand(5.0);
        assert_eq!(rect, Rect::new(5.0, 5.0, 30.0, 30.0));
        assert!(rect.contains(Point::new(35.0, 35.0)));
        assert!(!rect.contains(Point::new(35.1, 20.0)));
    }
}
