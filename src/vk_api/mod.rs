mod client;
mod photos;
mod response;

pub use client::{Client, ClientDebug};
pub use photos::{SavedPhoto, UploadServer, UploadedPhoto, WallPost};
pub use response::Response;
