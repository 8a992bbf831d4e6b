pub mod cli;
pub mod katanaid;
