pub mod file;
pub mod prices;
pub mod stdin;
pub mod weights;
