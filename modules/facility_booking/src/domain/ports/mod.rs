pub mod clock;
pub mod members;

pub use clock::Clock;
pub use members::MemberDirectory;
