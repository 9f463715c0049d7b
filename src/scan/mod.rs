mod config;
mod dir_scan;
mod mem_scan;
mod record;
mod scanner;

pub use config::{ResourceFilter, ScanConfig};
pub use dir_scan::DirScanner;
pub use mem_scan::MemoryScanner;
pub use record::{ResourceIndex, ResourceRecord};
pub use scanner::ResourceScanner;
