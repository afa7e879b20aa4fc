use std::sync::Arc;

use crate::animation::action::AnimationAction;
use crate::animation::binding::{PropertyBinding, TargetPath};
use crate::animation::clip::{AnimationClip, TrackData};
use crate::animation::values::MorphWeightData;
use crate::errors::{Error, Result};
use crate::scene::{NodeHandle, Scene};

/// Drives a set of animation clips against one model instance.
///
/// One action per clip; any number may play concurrently, each with its
/// own weight and loop mode. Track targets are resolved by node name
/// inside the bound subtree at [`bind`](Self::bind) time, so a mixer is
/// only valid for the model it was bound against and is dropped together
/// with it.
pub struct AnimationMixer {
    actions: Vec<AnimationAction>,

    /// Global playback rate multiplier, applied on top of per-action
    /// `time_scale`.
    pub time_scale: f32,
}

impl AnimationMixer {
    /// Creates one action per clip, resolving each track's node name
    /// within the subtree rooted at `root`. Tracks whose target node does
    /// not exist are skipped with a warning and simply never applied.
    ///
    /// The first clip auto-plays, looping. Zero clips produce a no-op
    /// mixer.
    #[must_use]
    pub fn bind(scene: &Scene, root: NodeHandle, clips: &[Arc<AnimationClip>]) -> Self {
        let mut actions: Vec<AnimationAction> = clips
            .iter()
            .map(|clip| {
                let mut action = AnimationAction::new(Arc::clone(clip));
                action.bindings = resolve_bindings(scene, root, clip);
                action.enabled = false;
                action
            })
            .collect();

        if let Some(first) = actions.first_mut() {
            first.reset();
            first.enabled = true;
        }

        Self {
            actions,
            time_scale: 1.0,
        }
    }

    /// Names of all bound clips, in clip order.
    #[must_use]
    pub fn clip_names(&self) -> Vec<&str> {
        self.actions
            .iter()
            .map(|a| a.clip().name.as_str())
            .collect()
    }

    /// True while at least one action is advancing.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.actions.iter().any(|a| a.enabled && !a.paused)
    }

    pub fn action(&self, name: &str) -> Option<&AnimationAction> {
        self.actions.iter().find(|a| a.clip().name == name)
    }

    pub fn action_mut(&mut self, name: &str) -> Option<&mut AnimationAction> {
        self.actions.iter_mut().find(|a| a.clip().name == name)
    }

    /// Starts the named clip from the beginning. Other playing clips keep
    /// playing; callers wanting exclusive playback stop them first.
    pub fn play(&mut self, name: &str) -> Result<()> {
        let action = self
            .action_mut(name)
            .ok_or_else(|| Error::ClipNotFound { clip: name.into() })?;
        action.reset();
        action.enabled = true;
        Ok(())
    }

    /// Halts the named clip, leaving the scene in its current pose.
    pub fn stop(&mut self, name: &str) -> Result<()> {
        let action = self
            .action_mut(name)
            .ok_or_else(|| Error::ClipNotFound { clip: name.into() })?;
        action.enabled = false;
        Ok(())
    }

    /// Halts every clip.
    pub fn stop_all(&mut self) {
        for action in &mut self.actions {
            action.enabled = false;
        }
    }

    /// Advances all playing clips by `dt` seconds (scaled by `time_scale`)
    /// and writes the sampled poses into the scene. Non-positive `dt` is a
    /// no-op so a stalled or backwards clock cannot corrupt playback.
    pub fn advance(&mut self, dt: f32, scene: &mut Scene) {
        if dt <= 0.0 {
            return;
        }

        let dt = dt * self.time_scale;
        for action in &mut self.actions {
            if !action.enabled || action.weight <= 0.0 {
                continue;
            }
            action.update(dt);
            apply_action(action, scene);
        }
    }
}

/// Resolves a clip's track targets to node handles under `root`.
fn resolve_bindings(
    scene: &Scene,
    root: NodeHandle,
    clip: &AnimationClip,
) -> Vec<PropertyBinding> {
    let mut bindings = Vec::with_capacity(clip.tracks.len());

    for (track_index, track) in clip.tracks.iter().enumerate() {
        match scene.find_node_by_name(root, &track.meta.node_name) {
            Some(node) => bindings.push(PropertyBinding {
                track_index,
                node,
                target: track.meta.target,
            }),
            None => log::warn!(
                "Animation clip '{}': target node '{}' not found, track skipped",
                clip.name,
                track.meta.node_name
            ),
        }
    }

    bindings
}

/// Samples every bound track at the action's current time and writes the
/// results into node transforms and morph weights.
fn apply_action(action: &mut AnimationAction, scene: &mut Scene) {
    let clip = Arc::clone(action.clip());
    let time = action.time;

    for i in 0..action.bindings.len() {
        let binding = action.bindings[i];
        let track = &clip.tracks[binding.track_index];
        let cursor = &mut action.track_cursors[binding.track_index];

        match (&track.data, binding.target) {
            (TrackData::Vector3(t), TargetPath::Translation) => {
                if let Some(node) = scene.get_node_mut(binding.node) {
                    node.transform.position = t.sample_with_cursor(time, cursor);
                }
            }
            (TrackData::Vector3(t), TargetPath::Scale) => {
                if let Some(node) = scene.get_node_mut(binding.node) {
                    node.transform.scale = t.sample_with_cursor(time, cursor);
                }
            }
            (TrackData::Quaternion(t), TargetPath::Rotation) => {
                if let Some(node) = scene.get_node_mut(binding.node) {
                    node.transform.rotation = t.sample_with_cursor(time, cursor);
                }
            }
            (TrackData::MorphWeights(t), TargetPath::Weights) => {
                let weights = t.sample_with_cursor(time, cursor);
                apply_morph_weights(scene, binding.node, &weights);
            }
            _ => {
                log::warn!(
                    "Animation clip '{}': track {} has mismatched data/target types",
                    clip.name,
                    binding.track_index
                );
            }
        }
    }
}

/// Writes sampled morph weights to the target node, or — when the target
/// carries no mesh because its primitives were expanded into child nodes at
/// instantiation — to every mesh-bearing child.
fn apply_morph_weights(scene: &mut Scene, handle: NodeHandle, weights: &MorphWeightData) {
    let targets: Vec<NodeHandle> = match scene.get_node(handle) {
        Some(node) if node.mesh.is_some() => vec![handle],
        Some(node) => node
            .children()
            .iter()
            .copied()
            .filter(|&child| scene.get_node(child).is_some_and(|n| n.mesh.is_some()))
            .collect(),
        None => Vec::new(),
    };

    for target in targets {
        let target_count = scene
            .get_node(target)
            .and_then(|n| n.mesh)
            .and_then(|key| scene.meshes.get(key))
            .map(|mesh| mesh.geometry.morph_targets.len())
            .unwrap_or(0);
        if target_count == 0 {
            continue;
        }

        if let Some(node) = scene.get_node_mut(target) {
            let count = target_count.min(weights.weights.len());
            node.morph_weights.clear();
            node.morph_weights.extend_from_slice(&weights.weights[..count]);
        }
    }
}
