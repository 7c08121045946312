// Repository modules
pub mod character_repository;
pub mod news_repository;
pub mod payment_repository;
pub mod profile_repository;
pub mod session_repository;

// Re-export repository types
pub use character_repository::CharacterRepository;
pub use news_repository::NewsRepository;
pub use payment_repository::PaymentRepository;
pub use profile_repository::ProfileRepository;
pub use session_repository::SessionRepository;
