pub mod channel;
pub mod keycode;
pub mod types;

pub use channel::ChannelClient;
pub use types::*;
