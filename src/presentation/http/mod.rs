pub mod admin;
pub mod forms;
pub mod health;
pub mod portal;
