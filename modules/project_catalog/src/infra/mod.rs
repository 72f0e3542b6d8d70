//! Infrastructure layer - database storage and media files

pub mod media;
pub mod storage;
