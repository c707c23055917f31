//! File-format I/O: log line reading and the import metadata store

pub mod metastore;
pub mod reader;
