mod discovery;

pub use discovery::{BUILD_LOG_DIR, OUTPUT_DIR, STYLE_LOG_DIR, discover_java_sources, relative};
