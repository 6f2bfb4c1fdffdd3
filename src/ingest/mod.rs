pub mod detector;
pub mod watcher;

pub use detector::TypeDetector;
pub use watcher::FileWatcher;
