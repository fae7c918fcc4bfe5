pub mod publish;
pub mod server;
