pub mod cleanup;
pub mod delete;
pub mod init;
pub mod lifecycle;
pub mod list;
pub mod record;
pub mod values;
