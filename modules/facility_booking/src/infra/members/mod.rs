pub mod http;
pub mod in_memory;

pub use http::HttpMemberDirectory;
pub use in_memory::InMemoryMemberDirectory;
