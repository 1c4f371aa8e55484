//! Named animation states bound to clip indices

use crate::core::Error;

/// A named state playing one clip of an animator
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationState {
    pub name: String,
    pub clip: usize,
    pub looping: bool,
}

/// Ordered registry of animation states with an active and a default state
#[derive(Clone, Debug, Default)]
pub struct AnimationStates {
    states: Vec<AnimationState>,
    current: Option<String>,
    default: Option<String>,
    /// Editor preview toggle
    pub preview: bool,
}

impl AnimationStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a state and make it active
    ///
    /// The first state added also becomes the default.
    pub fn add_state(&mut self, name: impl Into<String>, clip: usize) -> Result<(), Error> {
        let name = name.into();
        if self.contains(&name) {
            return Err(Error::InvalidArgument(format!(
                "animation state '{}' already exists",
                name
            )));
        }

        if self.states.is_empty() {
            self.default = Some(name.clone());
        }
        self.current = Some(name.clone());
        self.states.push(AnimationState {
            name,
            clip,
            looping: true,
        });

        Ok(())
    }

    /// Remove a state; the active state falls back to the first remaining one
    pub fn remove_state(&mut self, name: &str) -> Result<AnimationState, Error> {
        let position = self.position(name)?;
        let removed = self.states.remove(position);

        let first = self.states.first().map(|state| state.name.clone());
        if self.default.as_deref() == Some(name) {
            self.default = first.clone();
        }
        self.current = first;

        Ok(removed)
    }

    pub fn set_default(&mut self, name: &str) -> Result<(), Error> {
        self.position(name)?;
        self.default = Some(name.to_string());
        Ok(())
    }

    pub fn set_active(&mut self, name: &str) -> Result<(), Error> {
        self.position(name)?;
        self.current = Some(name.to_string());
        Ok(())
    }

    /// Make the default state active again
    pub fn reset_to_default(&mut self) {
        self.current = self.default.clone();
    }

    pub fn set_looping(&mut self, name: &str, looping: bool) -> Result<(), Error> {
        let position = self.position(name)?;
        self.states[position].looping = looping;
        Ok(())
    }

    pub fn current(&self) -> Option<&AnimationState> {
        self.current.as_deref().and_then(|name| self.get(name))
    }

    pub fn default_state(&self) -> Option<&AnimationState> {
        self.default.as_deref().and_then(|name| self.get(name))
    }

    /// Clip index of the active state
    pub fn current_clip(&self) -> Option<usize> {
        self.current().map(|state| state.clip)
    }

    pub fn clip_for(&self, name: &str) -> Option<usize> {
        self.get(name).map(|state| state.clip)
    }

    pub fn get(&self, name: &str) -> Option<&AnimationState> {
        self.states.iter().find(|state| state.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// State names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(|state| state.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    fn position(&self, name: &str) -> Result<usize, Error> {
        self.states
            .iter()
            .position(|state| state.name == name)
            .ok_or_else(|| Error::InvalidArgument(format!("unknown animation state '{}'", name)))
    }
}
