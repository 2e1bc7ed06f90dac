pub mod clock;
pub mod members;
pub mod storage;
