pub mod document;
pub mod position;
pub mod providers;
pub mod server;

pub use server::Backend;
