pub mod avatar;
pub mod gateway;
