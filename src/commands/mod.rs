pub mod auth;
pub mod cluster;
pub mod env;
pub mod logs;
pub mod pod;
pub mod rails;
pub mod shell;
