use serde::{Deserialize, Serialize};

/// What a list's entries refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListKind {
    Numbers,
    Vectors,
    Images,
    Audios,
    Videos,
    Texts,
}

/// One validated entry of a list of values.
///
/// Lists arrive pre-validated ("good values"): the authoring side has already
/// rejected malformed entries, so every entry here is usable as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListValue {
    pub scalars: [f32; 3],
    pub text: Option<String>,
    pub asset: Option<String>,
}

impl ListValue {
    pub fn scalar(v: f32) -> ListValue {
        ListValue {
            scalars: [v, 0.0, 0.0],
            text: None,
            asset: None,
        }
    }

    pub fn vector(v: [f32; 3]) -> ListValue {
        ListValue {
            scalars: v,
            text: None,
            asset: None,
        }
    }

    pub fn text(s: impl Into<String>) -> ListValue {
        ListValue {
            scalars: [0.0; 3],
            text: Some(s.into()),
            asset: None,
        }
    }

    pub fn asset(name: impl Into<String>) -> ListValue {
        ListValue {
            scalars: [0.0; 3],
            text: None,
            asset: Some(name.into()),
        }
    }
}

/// An ordered, validated sequence of candidate values a variable can resolve
/// to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListOfValues {
    pub id: String,
    pub name: String,
    pub kind: ListKind,
    /// Scalar components per entry (1 for plain numbers, up to 3).
    pub dimensions: usize,
    pub values: Vec<ListValue>,
}

impl ListOfValues {
    pub fn numbers(id: impl Into<String>, name: impl Into<String>, values: &[f32]) -> ListOfValues {
        ListOfValues {
            id: id.into(),
            name: name.into(),
            kind: ListKind::Numbers,
            dimensions: 1,
            values: values.iter().copied().map(ListValue::scalar).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
