pub mod health;
pub mod pages;
pub mod profile;
pub mod root;
