/// Encode/decode properties of the eight instruction formats.
pub mod codec_properties;
