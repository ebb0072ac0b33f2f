pub mod credentials;
pub mod endpoints;
pub mod logger;
pub mod oura_client;
pub mod token_verifier;
pub mod tool_executor;
pub mod validation;
