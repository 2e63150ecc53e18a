/*
[INPUT]:  ERC-4361 grammar and backend endpoint schemas
[OUTPUT]: Typed Rust structs/enums with serialization support
[POS]:    Data layer - type definitions for sign-in communication
[UPDATE]: When message fields or endpoint schemas change
*/

pub mod enums;
pub mod message;
pub mod requests;
pub mod responses;

pub use enums::*;
pub use message::{MessageError, SIWE_VERSION, SiweMessage, SiweMessageBuilder, generate_nonce};
pub use requests::*;
pub use responses::*;
