use std::sync::Arc;

use shared::{
    Character, CharacterDetailResponse, CharacterFilter, CharacterRequest, CharacterSummary,
    EventPointsResponse, PaymentStatus, MAX_CHARACTER_EXP, WEEKLY_PAYMENT_CAP,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::clock::{format_timestamp, Clock};
use crate::domain::errors::{PortalError, PortalResult};
use crate::domain::payment_ledger::PaymentLedger;
use crate::storage::{CharacterRepository, ProfileRepository};

/// Admin operations on characters, their event points and weekly payments
#[derive(Clone)]
pub struct CharacterService {
    characters: CharacterRepository,
    profiles: ProfileRepository,
    ledger: PaymentLedger,
    clock: Arc<dyn Clock>,
}

impl CharacterService {
    pub fn new(
        characters: CharacterRepository,
        profiles: ProfileRepository,
        ledger: PaymentLedger,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            characters,
            profiles,
            ledger,
            clock,
        }
    }

    /// List characters matching the filter, each with its weekly payment count
    pub async fn list_characters(&self, filter: CharacterFilter) -> PortalResult<Vec<CharacterSummary>> {
        info!("Listing characters with filter: {:?}", filter);

        let filter = CharacterFilter {
            owner: filter.owner.filter(|o| !o.trim().is_empty()),
            name: filter.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            level: filter.level,
        };
        let characters = self.characters.list_characters(&filter).await?;
        let summaries = self.summarize(characters).await?;

        info!("Found {} characters", summaries.len());
        Ok(summaries)
    }

    /// Attach weekly payment counts to a list of characters
    pub async fn summarize(&self, characters: Vec<Character>) -> PortalResult<Vec<CharacterSummary>> {
        let ids: Vec<String> = characters.iter().map(|c| c.id.clone()).collect();
        let counts = self.ledger.weekly_counts(&ids).await?;

        Ok(characters
            .into_iter()
            .map(|character| CharacterSummary {
                weekly_payments: counts.get(&character.id).copied().unwrap_or(0),
                weekly_cap: WEEKLY_PAYMENT_CAP,
                character,
            })
            .collect())
    }

    pub async fn get_character(&self, character_id: &str) -> PortalResult<CharacterDetailResponse> {
        let character = self.require_character(character_id).await?;
        let payments = self.ledger.status(character_id).await?;
        Ok(CharacterDetailResponse { character, payments })
    }

    pub async fn create_character(&self, request: CharacterRequest) -> PortalResult<Character> {
        info!("Creating character: name={}, owner={}", request.name, request.owner);

        let request = self.validate_request(request).await?;
        let character = Character {
            id: Uuid::new_v4().to_string(),
            owner: request.owner,
            name: request.name,
            exp: request.exp,
            level: request.level,
            items: request.items,
            event_points: 0,
            created_at: format_timestamp(self.clock.now()),
        };

        self.characters.store_character(&character).await?;

        info!("Created character: {} with ID: {}", character.name, character.id);
        Ok(character)
    }

    pub async fn update_character(&self, character_id: &str, request: CharacterRequest) -> PortalResult<Character> {
        info!("Updating character: {}", character_id);

        let request = self.validate_request(request).await?;
        let mut character = self.require_character(character_id).await?;
        character.owner = request.owner;
        character.name = request.name;
        character.exp = request.exp;
        character.level = request.level;
        character.items = request.items;

        if !self.characters.update_character(&character).await? {
            return Err(PortalError::not_found(format!("Character {}", character_id)));
        }

        info!("Updated character: {} with ID: {}", character.name, character.id);
        Ok(character)
    }

    /// Delete a character together with its payment history
    pub async fn delete_character(&self, character_id: &str) -> PortalResult<()> {
        info!("Deleting character: {}", character_id);

        if !self.characters.delete_character(character_id).await? {
            warn!("Character not found: {}", character_id);
            return Err(PortalError::not_found(format!("Character {}", character_id)));
        }

        info!("Deleted character: {}", character_id);
        Ok(())
    }

    pub async fn increment_event_points(&self, character_id: &str) -> PortalResult<EventPointsResponse> {
        let event_points = self
            .characters
            .increment_event_points(character_id)
            .await?
            .ok_or_else(|| PortalError::not_found(format!("Character {}", character_id)))?;

        info!("Character {} now has {} event points", character_id, event_points);
        Ok(EventPointsResponse {
            character_id: character_id.to_string(),
            event_points,
        })
    }

    /// Remove one event point; never goes below zero
    pub async fn decrement_event_points(&self, character_id: &str) -> PortalResult<EventPointsResponse> {
        let event_points = self
            .characters
            .decrement_event_points(character_id)
            .await?
            .ok_or_else(|| PortalError::not_found(format!("Character {}", character_id)))?;

        info!("Character {} now has {} event points", character_id, event_points);
        Ok(EventPointsResponse {
            character_id: character_id.to_string(),
            event_points,
        })
    }

    pub async fn payment_status(&self, character_id: &str) -> PortalResult<PaymentStatus> {
        self.require_character(character_id).await?;
        self.ledger.status(character_id).await
    }

    /// Mark a payment and return the updated weekly status
    pub async fn increment_payment(&self, character_id: &str) -> PortalResult<PaymentStatus> {
        self.require_character(character_id).await?;
        self.ledger.increment(character_id).await?;
        self.ledger.status(character_id).await
    }

    /// Undo the newest payment of the week and return the updated status
    pub async fn decrement_payment(&self, character_id: &str) -> PortalResult<PaymentStatus> {
        self.require_character(character_id).await?;
        if !self.ledger.decrement(character_id).await? {
            info!("No payment to remove this week for character {}", character_id);
        }
        self.ledger.status(character_id).await
    }

    async fn require_character(&self, character_id: &str) -> PortalResult<Character> {
        match self.characters.get_character(character_id).await? {
            Some(character) => Ok(character),
            None => {
                warn!("Character not found: {}", character_id);
                Err(PortalError::not_found(format!("Character {}", character_id)))
            }
        }
    }

    /// Trim and check a create/update request before anything is written
    async fn validate_request(&self, request: CharacterRequest) -> PortalResult<CharacterRequest> {
        let owner = request.owner.trim().to_string();
        let name = request.name.trim().to_string();

        if owner.is_empty() {
            return Err(PortalError::validation("Owner is required"));
        }
        if name.is_empty() {
            return Err(PortalError::validation("Name is required"));
        }
        if !(0..=MAX_CHARACTER_EXP).contains(&request.exp) {
            return Err(PortalError::validation(format!(
                "Experience must be between 0 and {}",
                MAX_CHARACTER_EXP
            )));
        }
        if request.level < 1 {
            return Err(PortalError::validation("Level must be at least 1"));
        }
        if self.profiles.get_profile(&owner).await?.is_none() {
            return Err(PortalError::validation(format!("Unknown owner {}", owner)));
        }

        Ok(CharacterRequest {
            owner,
            name,
            exp: request.exp,
            level: request.level,
            items: request.items,
        })
    }
}
