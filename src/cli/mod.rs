pub mod example;
pub mod init;
pub mod list;
pub mod register;
pub mod serve;
