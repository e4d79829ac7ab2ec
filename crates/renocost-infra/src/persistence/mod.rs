//! Persistence implementations of the domain repository traits

mod file_provider_directory;

pub use file_provider_directory::FileProviderDirectory;
