//! # Domain Module
//!
//! Business logic of the portal. Services validate input, apply the rules
//! and delegate persistence to the storage layer. The weekly payment ledger
//! and the authorization gate are the core; character, user, news and
//! dashboard services build the admin and member features on top of them.

pub mod authorization;
pub mod character_service;
pub mod clock;
pub mod dashboard_service;
pub mod errors;
pub mod models;
pub mod news_service;
pub mod payment_ledger;
pub mod user_service;
pub mod week;

pub use authorization::AuthorizationGate;
pub use character_service::CharacterService;
pub use clock::{Clock, SystemClock};
pub use dashboard_service::DashboardService;
pub use errors::{PortalError, PortalResult};
pub use models::caller::Caller;
pub use news_service::{NewsService, HOME_NEWS_LIMIT};
pub use payment_ledger::PaymentLedger;
pub use user_service::UserService;
pub use week::AccountingWeek;
