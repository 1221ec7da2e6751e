pub extern crate serde;
pub extern crate serde_json;

mod message;
mod names;
mod types;

pub use message::*;
pub use names::*;
pub use types::*;
