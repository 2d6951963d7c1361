pub mod language_model;
pub mod ticket_store;

pub use language_model::LanguageModelService;
pub use ticket_store::TicketStore;
