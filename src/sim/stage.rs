//! Stage: the top-level simulation context
//!
//! Owns the shared `SimContext` and every scene by name. One scene is
//! current; overlays are floating sub-scenes stepped and drawn on top of it.
//! Raw input goes to the topmost overlay if there is one, else the current
//! scene.

use std::collections::BTreeMap;

use super::actor::ActorDefinition;
use super::context::SimContext;
use super::event::{KeyboardEvent, PointerEvent};
use super::scene::Scene;
use crate::error::{Error, Result};
use crate::renderer::Renderer;

#[derive(Debug, Default)]
pub struct Stage {
    sim: SimContext,
    scenes: BTreeMap<String, Scene>,
    current: Option<String>,
    overlays: Vec<String>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sim(&self) -> &SimContext {
        &self.sim
    }

    pub fn sim_mut(&mut self) -> &mut SimContext {
        &mut self.sim
    }

    pub fn define_actor(&mut self, def: ActorDefinition) -> Result<()> {
        self.sim.define_actor(def)
    }

    /// Register a scene; names are unique within the stage
    pub fn add_scene(&mut self, scene: Scene) -> Result<()> {
        if self.scenes.contains_key(scene.name()) {
            return Err(Error::duplicate("scene", scene.name()));
        }
        self.scenes.insert(scene.name().to_string(), scene);
        Ok(())
    }

    pub fn scene(&self, name: &str) -> Result<&Scene> {
        self.scenes
            .get(name)
            .ok_or_else(|| Error::not_found("scene", name))
    }

    pub fn scene_mut(&mut self, name: &str) -> Result<&mut Scene> {
        self.scenes
            .get_mut(name)
            .ok_or_else(|| Error::not_found("scene", name))
    }

    /// Split borrow of a scene and the shared context, for driving a scene
    /// directly (e.g. spawning content)
    pub fn scene_with_sim(&mut self, name: &str) -> Result<(&mut Scene, &mut SimContext)> {
        let scene = self
            .scenes
            .get_mut(name)
            .ok_or_else(|| Error::not_found("scene", name))?;
        Ok((scene, &mut self.sim))
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn overlays(&self) -> &[String] {
        &self.overlays
    }

    /// Make `name` the current scene: the old one is suspended, the new one
    /// is initialised and starts (or resumes) on the next step
    pub fn switch_to(&mut self, name: &str) -> Result<()> {
        if !self.scenes.contains_key(name) {
            return Err(Error::not_found("scene", name));
        }
        if self.current.as_deref() == Some(name) {
            return Ok(());
        }
        if let Some(old) = self.current.take() {
            if let Some(scene) = self.scenes.get_mut(&old) {
                scene.suspend(&mut self.sim);
            }
        }
        if let Some(scene) = self.scenes.get_mut(name) {
            scene.init();
        }
        log::debug!("Switched to scene `{name}`");
        self.current = Some(name.to_string());
        Ok(())
    }

    /// Float a scene over the current one
    pub fn push_overlay(&mut self, name: &str) -> Result<()> {
        let scene = self
            .scenes
            .get_mut(name)
            .ok_or_else(|| Error::not_found("scene", name))?;
        if self.overlays.iter().any(|o| o == name) || self.current.as_deref() == Some(name) {
            return Err(Error::duplicate("overlay", name));
        }
        scene.init();
        self.overlays.push(name.to_string());
        Ok(())
    }

    /// Remove the topmost overlay, suspending it
    pub fn pop_overlay(&mut self) -> Option<String> {
        let name = self.overlays.pop()?;
        if let Some(scene) = self.scenes.get_mut(&name) {
            scene.suspend(&mut self.sim);
        }
        Some(name)
    }

    /// Drop a scene entirely, running its destroy hook
    pub fn remove_scene(&mut self, name: &str) -> Result<()> {
        let scene = self
            .scenes
            .remove(name)
            .ok_or_else(|| Error::not_found("scene", name))?;
        if self.current.as_deref() == Some(name) {
            self.current = None;
        }
        self.overlays.retain(|o| o != name);
        scene.finish(&mut self.sim);
        Ok(())
    }

    /// Advance the current scene, then overlays bottom to top
    pub fn step(&mut self) {
        let order = self.current.iter().chain(&self.overlays);
        for name in order {
            if let Some(scene) = self.scenes.get_mut(name) {
                scene.step(&mut self.sim);
            }
        }
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) {
        for name in self.current.iter().chain(&self.overlays) {
            if let Some(scene) = self.scenes.get(name) {
                scene.draw(renderer);
            }
        }
    }

    fn input_target(&mut self) -> Option<&mut Scene> {
        let name = self.overlays.last().or(self.current.as_ref())?;
        self.scenes.get_mut(name)
    }

    pub fn on_keyboard_event(&mut self, event: KeyboardEvent) {
        if let Some(scene) = self.input_target() {
            scene.on_keyboard_event(event);
        }
    }

    pub fn on_pointer_event(&mut self, event: PointerEvent) {
        if let Some(scene) = self.input_target() {
            scene.on_pointer_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::scene::SceneState;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn scene(name: &str) -> Scene {
        Scene::new(name, 100.0, 100.0).unwrap().persistent(true)
    }

    #[test]
    fn test_registration_and_lookup() {
        let mut stage = Stage::new();
        stage.add_scene(scene("title")).unwrap();
        assert!(matches!(
            stage.add_scene(scene("title")),
            Err(Error::Duplicate { kind: "scene", .. })
        ));
        assert!(matches!(stage.scene("level"), Err(Error::NotFound { .. })));
        assert!(stage.switch_to("level").is_err());
        assert!(stage.current().is_none());
    }

    #[test]
    fn test_switching_suspends_and_resumes() {
        let mut stage = Stage::new();
        stage.add_scene(scene("title")).unwrap();
        stage.add_scene(scene("level")).unwrap();

        stage.switch_to("title").unwrap();
        stage.step();
        assert_eq!(stage.scene("title").unwrap().state(), SceneState::Running);

        stage.switch_to("level").unwrap();
        assert_eq!(stage.scene("title").unwrap().state(), SceneState::Suspended);
        assert_eq!(stage.scene("level").unwrap().state(), SceneState::Starting);
        stage.step();
        assert_eq!(stage.scene("level").unwrap().state(), SceneState::Running);

        stage.switch_to("title").unwrap();
        assert_eq!(stage.scene("title").unwrap().state(), SceneState::Resuming);
        stage.step();
        assert_eq!(stage.scene("title").unwrap().state(), SceneState::Running);
        assert_eq!(stage.current(), Some("title"));
    }

    #[test]
    fn test_overlay_captures_input() {
        let keys: Rc<RefCell<Vec<String>>> = Rc::default();
        let (a, b) = (keys.clone(), keys.clone());
        let mut stage = Stage::new();
        let level = scene("level").on_key("esc", move |_, _, _| {
            a.borrow_mut().push("level".into())
        });
        let pause = scene("pause").on_key("esc", move |_, _, _| {
            b.borrow_mut().push("pause".into())
        });
        stage.add_scene(level).unwrap();
        stage.add_scene(pause).unwrap();

        stage.switch_to("level").unwrap();
        stage.step();
        stage.push_overlay("pause").unwrap();
        assert!(stage.push_overlay("pause").is_err());
        stage.step();

        stage.on_keyboard_event(KeyboardEvent::down("esc"));
        stage.step();
        assert_eq!(stage.pop_overlay().as_deref(), Some("pause"));
        stage.on_keyboard_event(KeyboardEvent::down("esc"));
        stage.step();
        assert_eq!(*keys.borrow(), vec!["pause", "level"]);
    }

    #[test]
    fn test_remove_scene_runs_destroy_hook() {
        let gone = Rc::new(RefCell::new(false));
        let g = gone.clone();
        let mut stage = Stage::new();
        stage
            .add_scene(scene("level").on_destroy(move |_, _| *g.borrow_mut() = true))
            .unwrap();
        stage.switch_to("level").unwrap();
        stage.remove_scene("level").unwrap();
        assert!(*gone.borrow());
        assert!(stage.current().is_none());
        assert!(stage.remove_scene("level").is_err());
    }
}
