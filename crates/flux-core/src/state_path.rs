//! Paths into the state tree accepted by `Flux::get_state`.

/// Where to read in the state tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatePath<'a> {
    /// The whole tree
    Root,
    /// One store's slice
    Key(&'a str),
    /// A store's slice, then nested keys (or array indices) inside it
    Keys(Vec<&'a str>),
}

impl<'a> From<&'a str> for StatePath<'a> {
    fn from(key: &'a str) -> Self {
        if key.is_empty() {
            StatePath::Root
        } else {
            StatePath::Key(key)
        }
    }
}

impl<'a> From<&'a String> for StatePath<'a> {
    fn from(key: &'a String) -> Self {
        StatePath::from(key.as_str())
    }
}

impl<'a> From<Option<&'a str>> for StatePath<'a> {
    fn from(key: Option<&'a str>) -> Self {
        key.map_or(StatePath::Root, StatePath::from)
    }
}

impl<'a> From<Vec<&'a str>> for StatePath<'a> {
    fn from(keys: Vec<&'a str>) -> Self {
        StatePath::Keys(keys)
    }
}

impl<'a> From<&[&'a str]> for StatePath<'a> {
    fn from(keys: &[&'a str]) -> Self {
        StatePath::Keys(keys.to_vec())
    }
}

impl<'a, const N: usize> From<[&'a str; N]> for StatePath<'a> {
    fn from(keys: [&'a str; N]) -> Self {
        StatePath::Keys(keys.to_vec())
    }
}
