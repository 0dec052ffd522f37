pub mod operator;
pub mod room;
pub mod sweep;
