mod token_service_aes;
pub use token_service_aes::*;
