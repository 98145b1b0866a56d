//! Color primitives: the perceptual DIN99-like space and its grayscale
//! counterpart, both inter-convertible with 8-bit RGB.

pub mod din99;
pub mod gray;

pub use din99::Color;
pub use gray::Gray;
