pub mod compact;
pub mod walker;

pub use compact::CompactDecoder;
pub use walker::{RecordSlot, RecordWalker};
