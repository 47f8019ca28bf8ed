mod crop;
mod frame;
mod llm;
mod text;
mod upload;

pub use crop::{CropImageNode, CropRegion};
pub use frame::{ExtractFrameNode, FrameTimestamp};
pub use llm::LlmNode;
pub use text::TextNode;
pub use upload::UploadNode;
