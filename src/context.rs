use std::sync::Arc;

use crate::services::{LanguageModelService, TicketStore};

/// Collaborators shared by every command.
#[derive(Clone)]
pub struct AppContext {
    pub tickets: Arc<dyn TicketStore>,
    pub language_model: Arc<dyn LanguageModelService>,
}

impl AppContext {
    pub fn new(tickets: Arc<dyn TicketStore>, language_model: Arc<dyn LanguageModelService>) -> Self {
        Self {
            tickets,
            language_model,
        }
    }
}
