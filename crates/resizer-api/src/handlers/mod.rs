pub mod health;
pub mod resize;
