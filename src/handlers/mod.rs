pub mod health;
pub mod diagnostics;
pub mod operators;
pub mod feed;

pub use health::*;
pub use diagnostics::*;
pub use operators::*;
pub use feed::*;
