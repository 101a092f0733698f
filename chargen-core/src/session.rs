//! CreationSession - the primary public API for character creation.
//!
//! This module wraps the creation flow and the slot save file into a
//! single object, so no character or session state lives in globals.

use crate::creation::{CreationFlow, CreationStep, FlowError};
use crate::dice::Dice;
use crate::persist::{CharacterMetadata, PersistError, SaveFile, SlotId, DEFAULT_SLOT_COUNT};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding a fixed dice seed.
pub const SEED_ENV: &str = "CHARGEN_SEED";

/// Environment variable overriding the save file location.
pub const SAVE_PATH_ENV: &str = "CHARGEN_SAVE_PATH";

/// Errors from CreationSession operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Creation error: {0}")]
    Flow(#[from] FlowError),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("No such slot: {0}")]
    UnknownSlot(SlotId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Configuration for creating a new session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Dice seed; `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Where the save file lives.
    pub save_path: PathBuf,

    /// Number of save slots offered.
    pub slot_count: u8,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            save_path: PathBuf::from("saves/characters.json"),
            slot_count: DEFAULT_SLOT_COUNT,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default config with overrides from `CHARGEN_SEED` and
    /// `CHARGEN_SAVE_PATH`.
    pub fn from_env() -> Result<Self, SessionError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SessionError> {
        let mut config = Self::default();
        if let Some(seed) = lookup(SEED_ENV) {
            let seed = seed
                .trim()
                .parse()
                .map_err(|_| SessionError::InvalidConfig(format!("{SEED_ENV}={seed}")))?;
            config.seed = Some(seed);
        }
        if let Some(path) = lookup(SAVE_PATH_ENV) {
            if !path.trim().is_empty() {
                config.save_path = PathBuf::from(path);
            }
        }
        Ok(config)
    }

    /// Set a fixed dice seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the save file path.
    pub fn with_save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_path = path.into();
        self
    }

    /// Set the number of save slots.
    pub fn with_slot_count(mut self, count: u8) -> Self {
        self.slot_count = count;
        self
    }

    fn dice(&self) -> Dice {
        match self.seed {
            Some(seed) => Dice::new(seed),
            None => Dice::from_entropy(),
        }
    }
}

/// One line of the slot listing.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotSummary {
    pub slot: SlotId,
    /// `None` for an empty slot.
    pub metadata: Option<CharacterMetadata>,
}

/// A character creation session with its save slots.
pub struct CreationSession {
    config: SessionConfig,
    flow: CreationFlow<Dice>,
    saves: SaveFile,
}

impl CreationSession {
    /// Start a session, reading existing saves from the configured path.
    pub async fn new(config: SessionConfig) -> Result<Self, SessionError> {
        let saves = SaveFile::load_json(&config.save_path).await?;
        let flow = CreationFlow::new(config.dice());
        tracing::debug!(
            save_path = %config.save_path.display(),
            seed = ?config.seed,
            "session started"
        );
        Ok(Self {
            config,
            flow,
            saves,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn save_path(&self) -> &Path {
        &self.config.save_path
    }

    pub fn flow(&self) -> &CreationFlow<Dice> {
        &self.flow
    }

    pub fn flow_mut(&mut self) -> &mut CreationFlow<Dice> {
        &mut self.flow
    }

    /// Abandon the current character and start over.
    pub fn restart(&mut self) {
        self.flow.restart();
    }

    fn check_slot(&self, slot: &SlotId) -> Result<(), SessionError> {
        match slot.index() {
            Some(index) if index < self.config.slot_count && *slot == SlotId::new(index) => Ok(()),
            _ => Err(SessionError::UnknownSlot(slot.clone())),
        }
    }

    /// Every slot with metadata for the occupied ones.
    pub fn list_slots(&self) -> Vec<SlotSummary> {
        self.saves
            .list_slots(self.config.slot_count)
            .into_iter()
            .map(|(slot, metadata)| SlotSummary { slot, metadata })
            .collect()
    }

    /// Save the finished character to a slot and write the save file.
    pub async fn save_to_slot(&mut self, slot: &SlotId) -> Result<(), SessionError> {
        self.check_slot(slot)?;
        if !self.flow.is_complete() {
            return Err(FlowError::WrongStep {
                expected: CreationStep::Complete,
                actual: self.flow.step(),
            }
            .into());
        }

        self.saves.store(slot.clone(), self.flow.character())?;
        self.saves.save_json(&self.config.save_path).await?;
        Ok(())
    }

    /// Load a slot into the session. Returns `Ok(false)` and leaves the
    /// current flow untouched when the slot is empty.
    pub fn load_from_slot(&mut self, slot: &SlotId) -> Result<bool, SessionError> {
        self.check_slot(slot)?;
        match self.saves.load(slot)? {
            Some(character) => {
                tracing::info!(slot = %slot, name = %character.name, "loaded character");
                self.flow = CreationFlow::from_character(character, self.config.dice());
                Ok(true)
            }
            None => {
                tracing::debug!(slot = %slot, "slot is empty");
                Ok(false)
            }
        }
    }

    /// Empty a slot and write the save file.
    pub async fn clear_slot(&mut self, slot: &SlotId) -> Result<bool, SessionError> {
        self.check_slot(slot)?;
        let cleared = self.saves.clear(slot);
        if cleared {
            self.saves.save_json(&self.config.save_path).await?;
        }
        Ok(cleared)
    }
}
