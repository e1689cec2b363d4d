pub mod builders;
pub mod fake_directory;
pub mod strategies;

// Not every test crate uses every helper
#[allow(unused_imports)]
pub use builders::*;
#[allow(unused_imports)]
pub use fake_directory::*;
