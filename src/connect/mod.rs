//! Connector geometry between the selected items of adjacent columns.

pub mod connector;
pub mod measure;
pub mod route;
