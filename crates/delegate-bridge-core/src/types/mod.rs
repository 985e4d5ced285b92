/*
[INPUT]:  Wire and storage schema definitions and serde requirements
[OUTPUT]: Typed Rust structs/enums with serialization support
[POS]:    Data layer - type definitions for service and storage communication
[UPDATE]: When schemas change or new types added
*/

pub mod delegation;
pub mod encoding;
pub mod enums;
pub mod requests;
pub mod responses;

pub use delegation::*;
pub use enums::*;
pub use requests::*;
pub use responses::*;
