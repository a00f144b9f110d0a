//! Named collision channels for filtering collision detection
//!
//! Every collision shape belongs to one channel. Rigidbodies and queries
//! carry a [`TestChannels`] set naming the channels they test against, so a
//! bullet can ignore other bullets while still hitting walls.
//!
//! Channel names are interned into small ids; a test set is a bit mask over
//! those ids, which caps a world at 32 channels.

use std::collections::HashMap;

/// Collision channel errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// Every bit of the mask is taken
    #[error("Too many collision channels (max {max}), cannot add '{name}'")]
    TooManyChannels {
        /// Channel that did not fit
        name: String,
        /// Channel limit
        max: usize,
    },

    /// No test channel was registered under that name
    #[error("Unknown test channel: {0}")]
    UnknownTestChannel(String),
}

/// Interned collision channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(u8);

impl ChannelId {
    /// Channel every registry starts with
    pub const DEFAULT: ChannelId = ChannelId(0);

    fn bit(self) -> u32 {
        1u32 << self.0
    }
}

/// Set of channels a body or a query tests against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TestChannels(u32);

impl TestChannels {
    /// Tests nothing
    pub const NONE: TestChannels = TestChannels(0);

    /// Tests every channel
    pub const ALL: TestChannels = TestChannels(u32::MAX);

    /// Build a set from channel ids
    pub fn from_channels(channels: &[ChannelId]) -> Self {
        Self(channels.iter().fold(0, |acc, channel| acc | channel.bit()))
    }

    /// Whether `channel` is in the set
    pub fn contains(&self, channel: ChannelId) -> bool {
        self.0 & channel.bit() != 0
    }

    /// Copy of this set with `channel` added
    pub fn with(self, channel: ChannelId) -> Self {
        Self(self.0 | channel.bit())
    }

    /// Copy of this set with `channel` removed
    pub fn without(self, channel: ChannelId) -> Self {
        Self(self.0 & !channel.bit())
    }

    /// Raw bit mask
    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl Default for TestChannels {
    fn default() -> Self {
        Self::ALL
    }
}

/// Check if two bodies should collide based on their channels and test sets
///
/// Each body's channel must be in the other's test set.
pub fn should_collide(channel_a: ChannelId, tests_a: TestChannels, channel_b: ChannelId, tests_b: TestChannels) -> bool {
    tests_b.contains(channel_a) && tests_a.contains(channel_b)
}

/// Registry of channel names and named test sets
#[derive(Debug, Clone)]
pub struct CollisionChannels {
    names: Vec<String>,
    ids: HashMap<String, ChannelId>,
    test_channels: HashMap<String, TestChannels>,
}

impl CollisionChannels {
    /// Maximum number of channels
    pub const MAX_CHANNELS: usize = 32;

    /// Name of [`ChannelId::DEFAULT`]
    pub const DEFAULT_NAME: &'static str = "default";

    /// Create a registry holding only the default channel
    pub fn new() -> Self {
        let mut ids = HashMap::new();
        ids.insert(Self::DEFAULT_NAME.to_string(), ChannelId::DEFAULT);
        Self {
            names: vec![Self::DEFAULT_NAME.to_string()],
            ids,
            test_channels: HashMap::new(),
        }
    }

    /// Id of `name`, registering the channel on first use
    pub fn channel(&mut self, name: &str) -> Result<ChannelId, ChannelError> {
        if let Some(id) = self.ids.get(name) {
            return Ok(*id);
        }
        if self.names.len() >= Self::MAX_CHANNELS {
            return Err(ChannelError::TooManyChannels {
                name: name.to_string(),
                max: Self::MAX_CHANNELS,
            });
        }

        let id = ChannelId(self.names.len() as u8);
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        log::debug!("Registered collision channel '{}' as {:?}", name, id);
        Ok(id)
    }

    /// Id of an already registered channel
    pub fn find(&self, name: &str) -> Option<ChannelId> {
        self.ids.get(name).copied()
    }

    /// Name of a channel
    pub fn name(&self, id: ChannelId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    /// Build a test set from channel names, registering unknown ones
    pub fn test_set(&mut self, names: &[&str]) -> Result<TestChannels, ChannelError> {
        let mut set = TestChannels::NONE;
        for name in names {
            set = set.with(self.channel(name)?);
        }
        Ok(set)
    }

    /// Register a named test set, replacing any previous one
    pub fn register_test_channel(&mut self, name: &str, channels: &[&str]) -> Result<TestChannels, ChannelError> {
        let set = self.test_set(channels)?;
        self.test_channels.insert(name.to_string(), set);
        Ok(set)
    }

    /// Look up a named test set
    pub fn test_channel(&self, name: &str) -> Result<TestChannels, ChannelError> {
        self.test_channels
            .get(name)
            .copied()
            .ok_or_else(|| ChannelError::UnknownTestChannel(name.to_string()))
    }

    /// Number of registered channels
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false, the default channel is always present
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for CollisionChannels {
    fn default() -> Self {
        Self::new()
    }
}
