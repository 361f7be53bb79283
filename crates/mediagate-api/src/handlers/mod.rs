pub mod health;
pub mod media;
pub mod objects;
pub mod secure_upload;
pub mod upload_url;
