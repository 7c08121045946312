use std::sync::Arc;

use rand::Rng;
use shared::{CreateUserRequest, Profile, ProfileOption, UpdateUserRequest, DEFAULT_CHARACTER_LIMIT};
use tracing::{info, warn};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};
use uuid::Uuid;

use crate::domain::clock::{format_timestamp, Clock};
use crate::domain::errors::{PortalError, PortalResult};
use crate::storage::ProfileRepository;

/// Characters used for the random suffix of placeholder emails (no 0/o, 1/l/i)
const SUFFIX_ALPHABET: &[u8] = b"abcdefghjkmnpqrstuvwxyz23456789";
const SUFFIX_LEN: usize = 6;

/// Admin management of member profiles
#[derive(Clone)]
pub struct UserService {
    profiles: ProfileRepository,
    clock: Arc<dyn Clock>,
    email_domain: String,
}

impl UserService {
    pub fn new(profiles: ProfileRepository, clock: Arc<dyn Clock>, email_domain: impl Into<String>) -> Self {
        Self {
            profiles,
            clock,
            email_domain: email_domain.into(),
        }
    }

    pub async fn list_users(&self) -> PortalResult<Vec<Profile>> {
        info!("Listing all users");
        let users = self.profiles.list_profiles().await?;
        info!("Found {} users", users.len());
        Ok(users)
    }

    /// ID and name of every member, for owner selects
    pub async fn list_options(&self) -> PortalResult<Vec<ProfileOption>> {
        Ok(self.profiles.list_profile_options().await?)
    }

    pub async fn get_user(&self, user_id: &str) -> PortalResult<Profile> {
        self.profiles
            .get_profile(user_id)
            .await?
            .ok_or_else(|| PortalError::not_found(format!("User {}", user_id)))
    }

    pub async fn create_user(&self, request: CreateUserRequest) -> PortalResult<Profile> {
        info!("Creating user: name={}", request.name);

        let name = required_name(&request.name)?;
        let character_limit = character_limit(request.character_limit)?;
        let email = match normalize_email(request.email.as_deref()) {
            Some(email) => email,
            None => self.placeholder_email(&name),
        };
        if self.profiles.email_in_use(&email, None).await? {
            return Err(PortalError::validation(format!("Email {} is already in use", email)));
        }

        let profile = Profile {
            id: Uuid::new_v4().to_string(),
            name: Some(name),
            email: Some(email),
            discord_id: optional_text(request.discord_id.as_deref()),
            character_limit,
            is_admin: request.is_admin,
            created_at: format_timestamp(self.clock.now()),
        };
        self.profiles.store_profile(&profile).await?;

        info!("Created user: {} with ID: {}", profile.display_name(), profile.id);
        Ok(profile)
    }

    pub async fn update_user(&self, user_id: &str, request: UpdateUserRequest) -> PortalResult<Profile> {
        info!("Updating user: {}", user_id);

        let name = required_name(&request.name)?;
        let character_limit = character_limit(request.character_limit)?;
        let mut profile = self.get_user(user_id).await?;

        if let Some(email) = normalize_email(request.email.as_deref()) {
            if self.profiles.email_in_use(&email, Some(user_id)).await? {
                return Err(PortalError::validation(format!("Email {} is already in use", email)));
            }
            profile.email = Some(email);
        }
        profile.name = Some(name);
        profile.discord_id = optional_text(request.discord_id.as_deref());
        profile.character_limit = character_limit;
        profile.is_admin = request.is_admin;

        if !self.profiles.update_profile(&profile).await? {
            return Err(PortalError::not_found(format!("User {}", user_id)));
        }

        info!("Updated user: {} with ID: {}", profile.display_name(), profile.id);
        Ok(profile)
    }

    /// Delete a member and everything they own. Admins cannot delete themselves.
    pub async fn delete_user(&self, caller_id: &str, user_id: &str) -> PortalResult<()> {
        info!("Deleting user: {}", user_id);

        if caller_id == user_id {
            warn!("User {} attempted to delete their own profile", caller_id);
            return Err(PortalError::validation("You cannot delete your own user"));
        }
        if !self.profiles.delete_profile(user_id).await? {
            return Err(PortalError::not_found(format!("User {}", user_id)));
        }

        info!("Deleted user: {}", user_id);
        Ok(())
    }

    fn placeholder_email(&self, name: &str) -> String {
        format!("{}-{}@{}", slugify(name), random_suffix(), self.email_domain)
    }
}

fn required_name(raw: &str) -> PortalResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(PortalError::validation("Name is required"));
    }
    Ok(name.to_string())
}

fn character_limit(requested: Option<i64>) -> PortalResult<i64> {
    let limit = requested.unwrap_or(DEFAULT_CHARACTER_LIMIT);
    if limit < 0 {
        return Err(PortalError::validation("Character limit cannot be negative"));
    }
    Ok(limit)
}

fn normalize_email(raw: Option<&str>) -> Option<String> {
    optional_text(raw).map(|email| email.to_lowercase())
}

fn optional_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Lowercase ASCII slug. Diacritics are stripped (NFD, then combining marks
/// dropped) and runs of anything else outside `a-z0-9` become one dash.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    let base_letters = name.nfd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase);
    for c in base_letters {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "user".to_string()
    } else {
        slug
    }
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::clock::ManualClock;
    use crate::storage::test_utils::{seed_character, seed_profile, seed_session};
    use crate::storage::{DbConnection, SessionRepository};
    use chrono::{TimeZone, Utc};

    async fn setup_test() -> (UserService, DbConnection) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 2, 1, 10, 0, 0).unwrap()));
        let service = UserService::new(ProfileRepository::new(db.clone()), clock, "users.example.test");
        (service, db)
    }

    fn create(name: &str, email: Option<&str>) -> CreateUserRequest {
        CreateUserRequest {
            name: name.to_string(),
            email: email.map(str::to_string),
            discord_id: None,
            character_limit: None,
            is_admin: false,
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Lia Storm"), "lia-storm");
        assert_eq!(slugify("  --Bo__42!! "), "bo-42");
        assert_eq!(slugify("!!!"), "user");
        assert_eq!(slugify("Zoë"), "zoe");
        assert_eq!(slugify("Martín García"), "martin-garcia");
        assert_eq!(slugify("ÁLVARO Núñez"), "alvaro-nunez");
        assert_eq!(slugify("Ørjan"), "rjan");
    }

    #[test]
    fn test_random_suffix_uses_alphabet() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            let suffix = random_suffix();
            assert_eq!(suffix.len(), SUFFIX_LEN);
            assert!(suffix.bytes().all(|b| SUFFIX_ALPHABET.contains(&b)));
            seen.extend(suffix.bytes());
        }
        // 1200 draws over 31 symbols reach every one of them
        assert_eq!(seen.len(), SUFFIX_ALPHABET.len());
    }

    #[tokio::test]
    async fn test_create_user_with_defaults_and_placeholder_email() {
        let (service, _db) = setup_test().await;

        let profile = service.create_user(create("  Lia Storm ", None)).await.unwrap();
        assert_eq!(profile.name.as_deref(), Some("Lia Storm"));
        assert_eq!(profile.character_limit, DEFAULT_CHARACTER_LIMIT);
        assert!(!profile.is_admin);
        assert_eq!(profile.created_at, "2025-02-01T10:00:00.000Z");

        let email = profile.email.clone().unwrap();
        assert!(email.starts_with("lia-storm-"), "{}", email);
        assert!(email.ends_with("@users.example.test"), "{}", email);

        assert_eq!(service.get_user(&profile.id).await.unwrap(), profile);

        let accented = service.create_user(create("Martín García", None)).await.unwrap();
        let email = accented.email.unwrap();
        assert!(email.starts_with("martin-garcia-"), "{}", email);
    }

    #[tokio::test]
    async fn test_create_user_normalizes_email_and_rejects_duplicates() {
        let (service, _db) = setup_test().await;

        let profile = service
            .create_user(CreateUserRequest {
                discord_id: Some("  ".to_string()),
                ..create("Bo", Some("  Bo@Example.COM "))
            })
            .await
            .unwrap();
        assert_eq!(profile.email.as_deref(), Some("bo@example.com"));
        assert_eq!(profile.discord_id, None);

        let err = service.create_user(create("Other", Some("BO@example.com"))).await.unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let (service, _db) = setup_test().await;

        assert!(matches!(
            service.create_user(create("   ", None)).await,
            Err(PortalError::Validation(_))
        ));
        let negative = CreateUserRequest {
            character_limit: Some(-1),
            ..create("Lia", None)
        };
        assert!(matches!(service.create_user(negative).await, Err(PortalError::Validation(_))));
        assert!(service.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_user() {
        let (service, _db) = setup_test().await;
        let created = service.create_user(create("Lia", Some("lia@example.com"))).await.unwrap();

        let updated = service
            .update_user(
                &created.id,
                UpdateUserRequest {
                    name: "Lia R.".to_string(),
                    email: None,
                    discord_id: Some("lia#0001".to_string()),
                    character_limit: Some(6),
                    is_admin: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.email.as_deref(), Some("lia@example.com"));
        assert_eq!(updated.discord_id.as_deref(), Some("lia#0001"));
        assert_eq!(updated.character_limit, 6);
        assert!(updated.is_admin);

        let renamed = UpdateUserRequest {
            name: "Lia".to_string(),
            email: Some("New@Example.com".to_string()),
            discord_id: None,
            character_limit: None,
            is_admin: false,
        };
        let updated = service.update_user(&created.id, renamed.clone()).await.unwrap();
        assert_eq!(updated.email.as_deref(), Some("new@example.com"));
        assert_eq!(updated.character_limit, DEFAULT_CHARACTER_LIMIT);

        assert!(matches!(
            service.update_user("missing", renamed).await,
            Err(PortalError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_user_refuses_self_and_cascades() {
        let (service, db) = setup_test().await;
        let admin = seed_profile(&db, "Root", true).await;
        let member = seed_profile(&db, "Lia", false).await;
        seed_character(&db, &member, "Kael").await;
        let token = seed_session(&db, &member).await;

        assert!(matches!(
            service.delete_user(&admin, &admin).await,
            Err(PortalError::Validation(_))
        ));
        assert!(service.get_user(&admin).await.is_ok());

        service.delete_user(&admin, &member).await.unwrap();
        assert!(matches!(service.get_user(&member).await, Err(PortalError::NotFound(_))));
        assert!(SessionRepository::new(db.clone()).find_user_id(&token).await.unwrap().is_none());

        let characters: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM characters WHERE owner = ?")
            .bind(&member)
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(characters, 0);

        assert!(matches!(
            service.delete_user(&admin, &member).await,
            Err(PortalError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_options_ordered_by_name() {
        let (service, _db) = setup_test().await;
        service.create_user(create("Zed", None)).await.unwrap();
        service.create_user(create("Ana", None)).await.unwrap();

        let names: Vec<Option<String>> = service
            .list_options()
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.name)
            .collect();
        assert_eq!(names, vec![Some("Ana".to_string()), Some("Zed".to_string())]);
    }
}
