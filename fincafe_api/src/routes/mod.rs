pub mod farms;
pub mod health;
pub mod tenant;
