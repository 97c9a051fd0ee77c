pub mod jwt;

pub use jwt::{mint_token, verify_token, Claims, TokenSubject};
