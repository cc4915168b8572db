//! The interactive transform engine.
//!
//! Turns pointer input into geometric mutations of the scene: moving the
//! selection with alignment-guide snapping, resizing and rotating single
//! items and groups, dragging line endpoints, rubber-band selection and
//! polygon vertex editing. Every completed gesture is recorded in the
//! command log, wrapped in a macro when it touched more than one item.
//!
//! Gestures mutate the scene live. Until the pointer is released that state
//! is provisional: cancelling (Escape, focus loss, or a new press arriving
//! before the release) restores the snapshots taken at gesture start and
//! records nothing.

mod gesture;
mod vertex;

#[cfg(test)]
mod tests;

pub(crate) use gesture::Gesture;
use vertex::VertexSession;

use crate::config::Settings;
use crate::guides::{GuideEngine, GuideLine};
use crate::handles::{Handle, hit_handle, item_handles, vertex_handles};
use crate::history::{Command, CommandLog};
use crate::input::{Key, Modifiers, MouseButton, PointerEvent};
use crate::item::{Item, ItemId};
use crate::scene::Scene;
use kurbo::{Point, Rect};

/// Click tolerance for picking items, in screen units.
pub const HIT_TOLERANCE: f64 = 3.0;

/// Owns the scene and its history, and processes input one event at a time.
#[derive(Debug)]
pub struct TransformEngine {
    scene: Scene,
    history: CommandLog,
    guides: GuideEngine,
    settings: Settings,
    /// Current zoom; screen-unit settings are divided by it.
    view_scale: f64,
    gesture: Gesture,
    vertex: Option<VertexSession>,
}

impl Default for TransformEngine {
    fn default() -> Self {
        Self::new(Scene::new(), Settings::default())
    }
}

impl TransformEngine {
    pub fn new(scene: Scene, settings: Settings) -> Self {
        Self {
            scene,
            history: CommandLog::with_limit(settings.undo_limit),
            guides: GuideEngine::new(),
            settings,
            view_scale: 1.0,
            gesture: Gesture::Idle,
            vertex: None,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Direct access for external edits. Group bounds made stale this way
    /// are refit before the next group-level gesture.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn history(&self) -> &CommandLog {
        &self.history
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.history.set_limit(settings.undo_limit);
        self.settings = settings;
    }

    pub fn view_scale(&self) -> f64 {
        self.view_scale
    }

    pub fn set_view_scale(&mut self, scale: f64) {
        if scale > 0.0 && scale.is_finite() {
            self.view_scale = scale;
        } else {
            log::warn!("Ignoring invalid view scale {scale}");
        }
    }

    fn snap_distance(&self) -> f64 {
        self.settings.snap.snap_distance / self.view_scale
    }

    fn handle_tolerance(&self) -> f64 {
        self.settings.handle_tolerance / self.view_scale
    }

    fn hit_tolerance(&self) -> f64 {
        HIT_TOLERANCE / self.view_scale
    }

    /// Whether a press/drag/release sequence is in progress.
    pub fn is_gesture_active(&self) -> bool {
        self.gesture.is_active()
    }

    /// Guides matched during the current drag, for rendering.
    pub fn active_guides(&self) -> &[GuideLine] {
        self.guides.active_guides()
    }

    /// Current rubber-band rectangle, if one is being dragged.
    pub fn rubber_band_rect(&self) -> Option<Rect> {
        match &self.gesture {
            Gesture::RubberBand(band) => Some(band.rect()),
            _ => None,
        }
    }

    /// Handles to draw: vertex handles in vertex mode, otherwise the
    /// handles of a single selected unlocked item.
    pub fn handles(&self) -> Vec<Handle> {
        if let Some(session) = &self.vertex {
            return self
                .scene
                .get(session.target)
                .map(vertex_handles)
                .unwrap_or_default();
        }
        self.handle_target()
            .and_then(|id| self.scene.get(id))
            .map(item_handles)
            .unwrap_or_default()
    }

    fn handle_target(&self) -> Option<ItemId> {
        match self.scene.selection() {
            [only] => self.scene.get(*only).filter(|item| !item.locked).map(Item::id),
            _ => None,
        }
    }

    // --- Input dispatch ---

    /// Route a pointer event. Only the left button drives gestures.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
                modifiers,
            } => self.pointer_down(position, modifiers),
            PointerEvent::Move {
                position,
                modifiers,
            } => self.pointer_move(position, modifiers),
            PointerEvent::Up {
                position,
                button: MouseButton::Left,
                modifiers,
            } => self.pointer_up(position, modifiers),
            PointerEvent::DoubleClick { position } => self.double_click(position),
            PointerEvent::Down { .. } | PointerEvent::Up { .. } => {}
        }
    }

    pub fn handle_key(&mut self, key: Key) {
        match key {
            Key::Escape => self.escape(),
            Key::Delete | Key::Backspace => {
                self.delete_selection();
            }
        }
    }

    pub fn pointer_down(&mut self, pos: Point, mods: Modifiers) {
        if self.gesture.is_active() {
            log::debug!("Press during an unfinished {} gesture", self.gesture.name());
            self.cancel_gesture();
        }

        if self.vertex.is_some() {
            if self.begin_vertex_drag(pos) {
                return;
            }
            if self.vertex_target_contains(pos) {
                return;
            }
            self.exit_vertex_mode();
        }

        if let Some(target) = self.handle_target() {
            let handles = self
                .scene
                .get(target)
                .map(item_handles)
                .unwrap_or_default();
            if let Some(kind) = hit_handle(&handles, pos, self.handle_tolerance()) {
                self.begin_handle_drag(target, kind, pos);
                return;
            }
        }

        let hit = self
            .scene
            .item_at(pos, self.hit_tolerance())
            .filter(|id| self.scene.get(*id).is_some_and(|item| !item.locked));
        match hit {
            Some(id) => {
                let id = self.scene.parent_of(id).unwrap_or(id);
                if mods.shift {
                    self.scene.toggle_selection(id);
                } else if !self.scene.is_selected(id) {
                    self.scene.select(id);
                }
                self.begin_move(pos);
            }
            None => {
                if !mods.shift {
                    self.scene.clear_selection();
                }
                self.gesture = Gesture::RubberBand(gesture::RubberBand {
                    origin: pos,
                    current: pos,
                    additive: mods.shift,
                });
            }
        }
    }

    pub fn pointer_move(&mut self, pos: Point, mods: Modifiers) {
        let mut gesture = std::mem::take(&mut self.gesture);
        match &mut gesture {
            Gesture::Idle => {}
            Gesture::Move(g) => self.update_move(g, pos),
            Gesture::Resize(g) => self.update_resize(g, pos),
            Gesture::Rotate(g) => self.update_rotate(g, pos, mods),
            Gesture::Endpoint(g) => self.update_endpoint(g, pos, mods),
            Gesture::RubberBand(band) => band.current = pos,
            Gesture::Vertex(g) => self.update_vertex_drag(g, pos),
        }
        self.gesture = gesture;
    }

    pub fn pointer_up(&mut self, pos: Point, mods: Modifiers) {
        if !self.gesture.is_active() {
            return;
        }
        self.pointer_move(pos, mods);
        let gesture = std::mem::take(&mut self.gesture);
        log::debug!("Committing {} gesture", gesture.name());
        match gesture {
            Gesture::Idle => {}
            Gesture::Move(g) => self.commit_move(g),
            Gesture::Resize(g) => self.commit_resize(g),
            Gesture::Rotate(g) => self.commit_rotate(g),
            Gesture::Endpoint(g) => self.commit_endpoint(g),
            Gesture::RubberBand(band) => self.finish_rubber_band(band),
            Gesture::Vertex(g) => self.commit_vertex_drag(g),
        }
    }

    /// Double-click on an ungrouped polygon enters vertex mode; anywhere
    /// else it leaves vertex mode.
    pub fn double_click(&mut self, pos: Point) {
        if self.gesture.is_active() {
            self.cancel_gesture();
        }
        let hit = self.scene.item_at(pos, self.hit_tolerance());
        let polygon = hit.filter(|id| {
            self.scene.parent_of(*id).is_none()
                && self
                    .scene
                    .get(*id)
                    .is_some_and(|item| item.is_polygon() && !item.locked)
        });
        match polygon {
            Some(id) => self.enter_vertex_mode(id),
            None if self.vertex.is_some() => self.exit_vertex_mode(),
            None => {}
        }
    }

    /// Cancel the active gesture, else leave vertex mode, else clear the
    /// selection.
    pub fn escape(&mut self) {
        if self.gesture.is_active() {
            self.cancel_gesture();
        } else if self.vertex.is_some() {
            self.exit_vertex_mode();
        } else {
            self.scene.clear_selection();
        }
    }

    /// Focus loss or any other interruption: discard provisional state.
    pub fn interrupt(&mut self) {
        if self.gesture.is_active() {
            self.cancel_gesture();
        }
    }

    /// Restore the snapshots of the active gesture without recording anything.
    fn cancel_gesture(&mut self) {
        let gesture = std::mem::take(&mut self.gesture);
        log::debug!("Cancelling {} gesture", gesture.name());
        let snapshots = gesture.snapshots();
        let ids: Vec<ItemId> = snapshots.iter().map(|item| item.id()).collect();
        for original in snapshots {
            match self.scene.get_mut(original.id()) {
                Some(item) => *item = original.clone(),
                None => log::warn!("Cannot restore item {}: it no longer exists", original.id()),
            }
        }
        self.guides.end();
        self.refit_groups(&ids);
    }

    // --- History ---

    pub fn undo(&mut self) -> bool {
        self.interrupt();
        let done = self.history.undo(&mut self.scene);
        self.drop_stale_vertex_session();
        done
    }

    pub fn redo(&mut self) -> bool {
        self.interrupt();
        let done = self.history.redo(&mut self.scene);
        self.drop_stale_vertex_session();
        done
    }

    /// Push the commands of one gesture; more than one (or `force_macro`)
    /// records them as a single macro.
    fn record(&mut self, label: &str, commands: Vec<Command>, force_macro: bool) {
        if commands.is_empty() {
            return;
        }
        let use_macro = force_macro || commands.len() > 1;
        if use_macro {
            self.history.begin_macro(label);
        }
        for command in commands {
            self.history.push(&mut self.scene, command);
        }
        if use_macro {
            self.history.end_macro();
        }
    }

    /// Refit every group that is, or owns, one of the given items.
    fn refit_groups(&mut self, ids: &[ItemId]) {
        let mut groups: Vec<ItemId> = Vec::new();
        for &id in ids {
            let group = match self.scene.get(id) {
                Some(item) if item.is_group() => Some(id),
                Some(_) => self.scene.parent_of(id),
                None => None,
            };
            if let Some(group) = group.filter(|g| !groups.contains(g)) {
                groups.push(group);
            }
        }
        for group in groups {
            self.scene.recompute_group_bounds(group);
        }
    }

    // --- Structure ---

    /// Group the selected items (at least two ungrouped leaves) and select
    /// the new group.
    pub fn group_selection(&mut self) -> Option<ItemId> {
        self.interrupt();
        let selection = self.scene.selection().to_vec();
        let group = self.scene.build_group(&selection)?;
        let id = group.id();
        self.record("Group Items", vec![Command::Group { group }], false);
        self.scene.select(id);
        Some(id)
    }

    /// Dissolve every selected group and select the released children.
    pub fn ungroup_selection(&mut self) -> bool {
        self.interrupt();
        let groups: Vec<Item> = self
            .scene
            .selection()
            .iter()
            .filter_map(|id| self.scene.get(*id))
            .filter(|item| item.is_group())
            .cloned()
            .collect();
        if groups.is_empty() {
            return false;
        }
        let children: Vec<ItemId> = groups
            .iter()
            .flat_map(|group| self.scene.children_of(group.id()))
            .collect();
        let commands = groups
            .into_iter()
            .map(|group| Command::Ungroup { group })
            .collect();
        self.record("Ungroup Items", commands, false);
        self.scene.set_selection(children);
        true
    }

    /// Delete the selected items; deleting a group deletes its children.
    /// Selecting every child of a group deletes the group as well.
    pub fn delete_selection(&mut self) -> bool {
        self.interrupt();
        let mut commands = Vec::new();
        for id in self.deletion_roots() {
            let Some(item) = self.scene.get(id).cloned() else {
                continue;
            };
            let children = self.scene.children_of(id);
            let parent = if item.is_group() {
                None
            } else {
                self.scene.parent_of(id)
            };
            commands.push(Command::Remove { item, parent });
            for child in children {
                if let Some(child) = self.scene.get(child).cloned() {
                    commands.push(Command::Remove {
                        item: child,
                        parent: None,
                    });
                }
            }
        }
        if commands.is_empty() {
            return false;
        }
        self.record("Delete Items", commands, false);
        self.drop_stale_vertex_session();
        true
    }

    /// The selection with groups standing in for their children when the
    /// group is selected or every child is.
    fn deletion_roots(&self) -> Vec<ItemId> {
        let selection = self.scene.selection();
        let mut roots: Vec<ItemId> = Vec::new();
        for &id in selection {
            let root = match self.scene.parent_of(id) {
                Some(group)
                    if selection.contains(&group)
                        || self
                            .scene
                            .children_of(group)
                            .iter()
                            .all(|child| selection.contains(child)) =>
                {
                    group
                }
                _ => id,
            };
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        roots
    }
}
