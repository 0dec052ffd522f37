pub mod health;
pub mod ready;
pub mod diagnostics;
pub mod error;
pub mod feed;
pub mod messages;
pub mod operator;

pub use health::*;
pub use ready::*;
pub use diagnostics::*;
pub use error::*;
pub use feed::*;
pub use messages::*;
pub use operator::*;
