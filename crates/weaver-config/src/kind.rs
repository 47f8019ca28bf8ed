use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The kind of processing step a node performs.
///
/// The set is closed: tags that don't name a known kind are kept verbatim in
/// [`NodeKind::Unknown`] so the graph still loads and the node reports an
/// error when it runs.
///
/// Parsing ignores case, `-` and `_`, so `crop-image`, `crop_image` and
/// `cropImage` are the same kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
  Text,
  UploadImage,
  UploadVideo,
  Llm,
  CropImage,
  ExtractFrame,
  Unknown(String),
}

impl NodeKind {
  /// Canonical tag used when serializing.
  pub fn as_str(&self) -> &str {
    match self {
      NodeKind::Text => "text",
      NodeKind::UploadImage => "upload-image",
      NodeKind::UploadVideo => "upload-video",
      NodeKind::Llm => "llm",
      NodeKind::CropImage => "crop-image",
      NodeKind::ExtractFrame => "extract-frame",
      NodeKind::Unknown(tag) => tag,
    }
  }

  pub fn is_known(&self) -> bool {
    !matches!(self, NodeKind::Unknown(_))
  }
}

impl FromStr for NodeKind {
  type Err = std::convert::Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalized: String = s
      .chars()
      .filter(|c| *c != '-' && *c != '_')
      .flat_map(char::to_lowercase)
      .collect();

    Ok(match normalized.as_str() {
      "text" => NodeKind::Text,
      "uploadimage" => NodeKind::UploadImage,
      "uploadvideo" => NodeKind::UploadVideo,
      "llm" => NodeKind::Llm,
      "cropimage" => NodeKind::CropImage,
      "extractframe" => NodeKind::ExtractFrame,
      _ => NodeKind::Unknown(s.to_string()),
    })
  }
}

impl fmt::Display for NodeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl Serialize for NodeKind {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_str(self.as_str())
  }
}

impl<'de> Deserialize<'de> for NodeKind {
  fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>,
  {
    let s = String::deserialize(deserializer)?;
    let Ok(kind) = s.parse::<NodeKind>();
    Ok(kind)
  }
}
