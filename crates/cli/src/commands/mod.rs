pub mod chat;
pub mod inspect;
pub mod onboard;
