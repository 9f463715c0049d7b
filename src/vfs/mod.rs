mod channel;
mod fs;
mod path;
mod read_dir;
mod store;

pub use channel::{BufferedChannel, RandomAccess, StreamingChannel};
pub use fs::ResourceFs;
pub use path::{SEPARATOR, StoreId, VirtualPath};
pub use read_dir::ReadDir;
pub use store::FileStore;
