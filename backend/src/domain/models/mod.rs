pub mod caller;
pub mod payment;
