pub mod bridge;
pub mod model;
pub mod responder;
