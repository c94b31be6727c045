pub mod adventure;
pub mod health;
pub mod status;
