mod decode;
pub mod nms;

pub use decode::{decode, decode_with_label};
pub use nms::{nms_indices, suppress, Nms};
