// SPDX-License-Identifier: MIT OR Apache-2.0
//! Demo scene and the property store its commands write into.

use motion_gfx_core::{
    tween, ActionClip, ChainClip, CommandTime, Ease, GroupClip, Scene, WaitClip,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Named scalar properties animated by the demo commands
#[derive(Debug, Clone, Default)]
pub struct PropertyStore {
    values: Arc<Mutex<BTreeMap<String, f32>>>,
}

impl PropertyStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of a property
    pub fn get(&self, name: &str) -> Option<f32> {
        self.values.lock().get(name).copied()
    }

    /// Set a property
    pub fn set(&self, name: &str, value: f32) {
        self.values.lock().insert(name.to_string(), value);
    }

    /// Copy of every property
    pub fn snapshot(&self) -> BTreeMap<String, f32> {
        self.values.lock().clone()
    }

    /// Setter for one property
    pub fn setter(&self, name: &str) -> impl FnMut(f32) + Send + 'static {
        let store = self.clone();
        let name = name.to_string();
        move |value| store.set(&name, value)
    }

    /// Setter writing a 2D value into `<name>.x` and `<name>.y`
    pub fn vec2_setter(&self, name: &str) -> impl FnMut([f32; 2]) + Send + 'static {
        let store = self.clone();
        let x = format!("{name}.x");
        let y = format!("{name}.y");
        move |[vx, vy]: [f32; 2]| {
            store.set(&x, vx);
            store.set(&y, vy);
        }
    }
}

/// Command that emits `rate` particles per second of elapsed time
pub fn emitter(store: &PropertyStore, name: &str, rate: f32) -> impl FnMut(CommandTime) + Send + 'static {
    let mut set = store.setter(name);
    move |time: CommandTime| set((time.elapsed * rate).floor())
}

/// Build the demo scene: a title fade, staggered cards, a particle burst, a fade out
pub fn build_demo_scene(store: &PropertyStore) -> Scene {
    let mut scene = Scene::new("Demo");

    scene.push_clip(
        ChainClip::new("Intro")
            .then(ActionClip::new(
                "Fade In",
                1.0,
                tween(0.0, 1.0, Ease::OutQuad, store.setter("title.opacity")),
            ))
            .then(WaitClip::new(0.25)),
    );

    let mut cards = GroupClip::new("Cards").stagger(0.2);
    for card in ["card_a", "card_b", "card_c"] {
        cards = cards.with(ActionClip::new(
            card,
            0.8,
            tween([0.0, -50.0], [0.0, 0.0], Ease::OutCubic, store.vec2_setter(card)),
        ));
    }
    scene.push_clip(cards);

    scene.push_clip(ActionClip::new(
        "Sparkles",
        1.5,
        emitter(store, "sparkles.count", 40.0),
    ));

    scene.push_clip(ActionClip::new(
        "Fade Out",
        0.5,
        tween(1.0, 0.0, Ease::InQuad, store.setter("title.opacity")),
    ));

    scene
}

#[cfg(test)]
mod tests {
    use super::*;
    use motion_gfx_core::SequenceHolder;

    #[test]
    fn test_demo_layout() {
        let store = PropertyStore::new();
        let mut scene = build_demo_scene(&store);

        let duration = scene.rebuild();
        assert!((duration - 4.45).abs() < 1e-5);
        assert!(scene.content_issues().is_empty());
        assert_eq!(scene.clip_count(), 4);
        assert_eq!(scene.holder_count(), 4);
    }

    #[test]
    fn test_demo_commands_write_properties() {
        let store = PropertyStore::new();
        let mut scene = build_demo_scene(&store);
        scene.rebuild();

        scene.init_evaluation(0.0);
        scene.evaluate(0.0);
        assert_eq!(store.get("title.opacity"), Some(0.0));

        scene.evaluate(1.0);
        assert_eq!(store.get("title.opacity"), Some(1.0));
        assert_eq!(store.get("card_a.y"), None);

        scene.evaluate(1.25 + 0.8);
        assert!(store.get("card_a.y").is_some_and(|y| y.abs() < 1e-3));
        assert!(store.get("card_c.y").is_some_and(|y| y < 0.0));
    }

    #[test]
    fn test_emitter_restarts_after_scrub() {
        let store = PropertyStore::new();
        let mut scene = build_demo_scene(&store);
        scene.rebuild();

        let sparkles_start = 1.25 + 1.2;
        scene.init_evaluation(sparkles_start);
        scene.evaluate(sparkles_start);
        scene.evaluate(sparkles_start + 1.0);
        assert_eq!(store.get("sparkles.count"), Some(40.0));

        scene.evaluate(sparkles_start + 0.5);
        assert_eq!(store.get("sparkles.count"), Some(0.0));
    }
}
