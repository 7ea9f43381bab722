pub mod audit;
pub mod capital_stacks;
pub mod contacts;
pub mod documents;
pub mod files;
pub mod health;
pub mod investors;
pub mod notices;
pub mod projects;
pub mod updates;
