pub mod llm;
pub mod ticket_file;
