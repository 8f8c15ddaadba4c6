#![doc = env!("CARGO_PKG_DESCRIPTION")]

#[doc(inline)]
pub use roofsight_image as image;

#[doc(inline)]
pub use roofsight_imgproc as imgproc;

#[doc(inline)]
pub use roofsight_framing as framing;

#[doc(inline)]
pub use roofsight_pipeline as pipeline;
