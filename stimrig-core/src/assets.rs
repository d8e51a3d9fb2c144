use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetKind {
    Image,
    Audio,
    Video,
}

/// Ordered name -> handle lookups for loaded media, supplied by the loading
/// collaborator. The handle is the row index; the engine never touches the
/// underlying decoded data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetTable {
    pub images: Vec<String>,
    pub audios: Vec<String>,
    pub videos: Vec<String>,
}

impl AssetTable {
    pub fn rows(&self, kind: AssetKind) -> &[String] {
        match kind {
            AssetKind::Image => &self.images,
            AssetKind::Audio => &self.audios,
            AssetKind::Video => &self.videos,
        }
    }

    pub fn index_of(&self, kind: AssetKind, name: &str) -> Option<usize> {
        self.rows(kind).iter().position(|n| n == name)
    }
}
