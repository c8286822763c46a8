pub mod manifest;

pub use manifest::handle_hooks_manifest;
