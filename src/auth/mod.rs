pub mod extract;
pub mod password;
pub mod token;

pub use extract::AuthDriver;
pub use token::{Claims, TokenIssuer};
