pub mod edit;
pub mod init;
pub mod list;
pub mod path;
pub mod view;
