use std::fmt;

/// A named unit of playable audio, resolved to a bundled resource at play time
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Track {
    name: String,
}

impl Track {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl PartialEq<str> for Track {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl PartialEq<&str> for Track {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}
