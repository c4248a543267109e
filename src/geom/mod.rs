mod decode;
mod shape;

pub use decode::{DecodeError, decode};
pub use shape::{DecodedParcel, ParcelShape, Ring};
