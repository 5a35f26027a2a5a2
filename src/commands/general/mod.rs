pub mod badge;
pub mod ping;
