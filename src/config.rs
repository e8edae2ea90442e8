// ABOUTME: Version and banner constants for the CLI front end

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const WELCOME_MESSAGE: &str = "TinySCM";
pub const WELCOME_SUBTITLE: &str = "a tree-walking Scheme interpreter";
