mod read;

pub use read::read_wkt;
