use shared::DashboardResponse;
use tracing::info;

use crate::domain::character_service::CharacterService;
use crate::domain::errors::PortalResult;
use crate::storage::CharacterRepository;

/// Builds the signed-in member's own view of their characters
#[derive(Clone)]
pub struct DashboardService {
    characters: CharacterRepository,
    character_service: CharacterService,
}

impl DashboardService {
    pub fn new(characters: CharacterRepository, character_service: CharacterService) -> Self {
        Self {
            characters,
            character_service,
        }
    }

    /// The member's characters ordered by name, with this week's payment counts
    pub async fn dashboard(&self, user_id: &str) -> PortalResult<DashboardResponse> {
        info!("Building dashboard for {}", user_id);

        let owned = self.characters.list_by_owner(user_id).await?;
        let characters = self.character_service.summarize(owned).await?;

        Ok(DashboardResponse { characters })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::SystemClock;
    use crate::domain::payment_ledger::PaymentLedger;
    use crate::storage::test_utils::{seed_character, seed_profile};
    use crate::storage::{DbConnection, PaymentRepository, ProfileRepository};
    use chrono::FixedOffset;
    use shared::WEEKLY_PAYMENT_CAP;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_dashboard_lists_only_own_characters_with_counts() {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let clock = Arc::new(SystemClock);
        let ledger = PaymentLedger::new(
            Arc::new(PaymentRepository::new(db.clone(), true)),
            clock.clone(),
            FixedOffset::east_opt(0).unwrap(),
        );
        let characters = CharacterRepository::new(db.clone());
        let character_service =
            CharacterService::new(characters.clone(), ProfileRepository::new(db.clone()), ledger.clone(), clock);
        let service = DashboardService::new(characters, character_service);

        let lia = seed_profile(&db, "Lia", false).await;
        let bo = seed_profile(&db, "Bo", false).await;
        let zora = seed_character(&db, &lia, "Zora").await;
        seed_character(&db, &lia, "Arn").await;
        seed_character(&db, &bo, "Other").await;
        ledger.increment(&zora).await.unwrap();

        let dashboard = service.dashboard(&lia).await.unwrap();
        let rows: Vec<(String, u32)> = dashboard
            .characters
            .iter()
            .map(|s| (s.character.name.clone(), s.weekly_payments))
            .collect();
        assert_eq!(rows, vec![("Arn".to_string(), 0), ("Zora".to_string(), 1)]);
        assert!(dashboard.characters.iter().all(|s| s.weekly_cap == WEEKLY_PAYMENT_CAP));

        let empty = service.dashboard("nobody").await.unwrap();
        assert!(empty.characters.is_empty());
    }
}
