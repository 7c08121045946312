/// Identity resolved by the authorization gate for the current request.
/// Rebuilt from the profile store on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub is_admin: bool,
}
