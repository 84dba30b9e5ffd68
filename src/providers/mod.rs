pub mod traits;
pub mod internode;
pub mod response;

pub use internode::InternodeProvider;
pub use response::{parse_services, parse_usage, ParseError};
pub use traits::*;
