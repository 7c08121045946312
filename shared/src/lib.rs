use serde::{Deserialize, Deserializer, Serialize};

/// Highest experience value a character can hold before levelling up
pub const MAX_CHARACTER_EXP: i64 = 74;

/// Maximum number of payments counted per accounting week
pub const WEEKLY_PAYMENT_CAP: u32 = 5;

/// Default number of characters a new member may own
pub const DEFAULT_CHARACTER_LIMIT: i64 = 4;

/// A member profile as stored by the portal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: Option<String>,
    /// Login email (lowercase); placeholder addresses are generated for members without one
    pub email: Option<String>,
    pub discord_id: Option<String>,
    pub character_limit: i64,
    pub is_admin: bool,
    /// RFC 3339 UTC timestamp
    pub created_at: String,
}

impl Profile {
    /// Name shown in listings and confirmation prompts
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

/// Minimal profile projection used to fill owner selects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileOption {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: Option<String>,
    pub discord_id: Option<String>,
    pub character_limit: Option<i64>,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    /// Replaces the login email when present
    pub email: Option<String>,
    pub discord_id: Option<String>,
    pub character_limit: Option<i64>,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<Profile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    /// Profile ID of the member who plays this character
    pub owner: String,
    pub name: String,
    pub exp: i64,
    pub level: i64,
    /// Free-form inventory text
    pub items: String,
    pub event_points: i64,
    pub created_at: String,
}

/// Request body shared by character creation and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRequest {
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub exp: i64,
    #[serde(default = "default_level")]
    pub level: i64,
    #[serde(default)]
    pub items: String,
}

fn default_level() -> i64 {
    1
}

/// Query parameters for the admin character listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterFilter {
    pub owner: Option<String>,
    pub name: Option<String>,
    /// Empty or non-numeric values mean "any level"
    #[serde(default, deserialize_with = "lenient_level")]
    pub level: Option<i64>,
}

/// Filter forms submit every field, so `level=` or `level=abc` must not reject the request
fn lenient_level<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLevel {
        Number(i64),
        Text(String),
    }

    Ok(match Option::<RawLevel>::deserialize(deserializer)? {
        Some(RawLevel::Number(level)) => Some(level),
        Some(RawLevel::Text(raw)) => raw.trim().parse().ok(),
        None => None,
    })
}

/// A character together with its payment count for the current week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterSummary {
    pub character: Character,
    pub weekly_payments: u32,
    pub weekly_cap: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterListResponse {
    pub characters: Vec<CharacterSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDetailResponse {
    pub character: Character,
    pub payments: PaymentStatus,
}

/// Weekly payment tally for one character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentStatus {
    pub character_id: String,
    pub count: u32,
    pub cap: u32,
    pub limit_reached: bool,
    /// Start of the current accounting week (RFC 3339 UTC)
    pub week_start: String,
    /// Instant the tally resets (RFC 3339 UTC)
    pub resets_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPointsResponse {
    pub character_id: String,
    pub event_points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsPost {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateNewsRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsListResponse {
    pub news: Vec<NewsPost>,
}

/// Member dashboard: the caller's own characters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub characters: Vec<CharacterSummary>,
}

/// Error body returned for non-redirect failures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
