mod mem;
mod read_only;
mod sled;

pub use self::sled::*;
pub use mem::*;
pub use read_only::*;
