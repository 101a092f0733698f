//! Basic Fantasy character creation engine.
//!
//! This crate provides:
//! - Ability rolls, race/class eligibility and derived statistics
//! - Equipment, encumbrance and armor class bookkeeping
//! - A step-by-step creation flow with back navigation
//! - Slot-based character persistence
//!
//! # Quick Start
//!
//! ```ignore
//! use chargen_core::{CreationSession, SessionConfig, SlotId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = CreationSession::new(SessionConfig::from_env()?).await?;
//!     let flow = session.flow_mut();
//!
//!     while !flow.roll_abilities()? {}
//!     flow.advance()?;
//!     flow.choose_random()?;
//!     flow.advance()?;
//!     // ... spells, languages, name and money ...
//!
//!     session.save_to_slot(&SlotId::new(0)).await?;
//!     Ok(())
//! }
//! ```

pub mod abilities;
pub mod character;
pub mod class_data;
pub mod creation;
pub mod dice;
pub mod eligibility;
pub mod items;
pub mod persist;
pub mod session;
pub mod testing;

// Primary public API
pub use abilities::{Abilities, Ability, AbilityScore};
pub use character::{Character, CharacterError, Encumbrance};
pub use class_data::{CharacterClass, RaceType, SavingThrow, SavingThrows};
pub use creation::{CreationFlow, CreationStep, FlowError, Shop};
pub use dice::{roll_dice, Dice, DieType, Roller};
pub use eligibility::PossibleCharacter;
pub use items::{Item, ItemKind};
pub use persist::{CharacterRecord, PersistError, SaveFile, SlotId};
pub use session::{CreationSession, SessionConfig, SessionError};
