pub mod dedup;
pub mod export;
pub mod extract;
pub mod io;
pub mod logline;
pub mod merge;
pub mod record;
pub mod report;
pub mod stats;
pub mod table;
pub mod timestamp;

