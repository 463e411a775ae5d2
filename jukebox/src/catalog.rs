use std::path::{Path, PathBuf};

use crate::model::Track;

/// Tracks shipped with the player
pub const DEFAULT_TRACKS: [&str; 5] = [
    "jay",
    "spacewalk",
    "takethejourney",
    "wildfire",
    "interstellarjourney",
];

/// File extensions tried, in order, when resolving a track to a bundled file
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["mp3", "ogg", "flac", "wav", "m4a"];

/// Fixed, in-memory list of tracks backed by an assets directory
#[derive(Debug, Clone)]
pub struct TrackCatalog {
    assets_dir: PathBuf,
    tracks: Vec<Track>,
}

impl TrackCatalog {
    pub fn new<I, S>(assets_dir: impl Into<PathBuf>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            assets_dir: assets_dir.into(),
            tracks: names.into_iter().map(Track::new).collect(),
        }
    }

    /// Catalog seeded with [`DEFAULT_TRACKS`]
    pub fn with_default_tracks(assets_dir: impl Into<PathBuf>) -> Self {
        Self::new(assets_dir, DEFAULT_TRACKS)
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn names(&self) -> Vec<String> {
        self.tracks.iter().map(|track| track.name().to_string()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Track> {
        self.tracks.iter().find(|track| *track == name)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Find the bundled file for a track, if one exists
    ///
    /// Names containing path separators never resolve, so a track name cannot
    /// escape the assets directory.
    pub fn resolve(&self, track: &Track) -> Option<PathBuf> {
        let name = track.name();
        if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
            return None;
        }

        SUPPORTED_EXTENSIONS
            .iter()
            .map(|ext| self.assets_dir.join(format!("{}.{}", name, ext)))
            .find(|path| path.is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_catalog() {
        let catalog = TrackCatalog::with_default_tracks("assets");
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.tracks()[0], "jay");
        assert_eq!(catalog.tracks()[4], "interstellarjourney");
        assert!(catalog.get("wildfire").is_some());
        assert!(catalog.get("thunderstruck").is_none());
    }

    #[test]
    fn test_resolve_finds_first_supported_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("jay.ogg"), b"").unwrap();
        fs::write(dir.path().join("jay.wav"), b"").unwrap();

        let catalog = TrackCatalog::new(dir.path(), ["jay"]);
        let resolved = catalog.resolve(&Track::new("jay")).unwrap();
        assert_eq!(resolved, dir.path().join("jay.ogg"));
    }

    #[test]
    fn test_resolve_missing_resource() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = TrackCatalog::new(dir.path(), ["jay"]);

        assert!(catalog.resolve(&Track::new("jay")).is_none());
        assert!(catalog.resolve(&Track::new("")).is_none());
    }

    #[test]
    fn test_resolve_rejects_path_components() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("jay.mp3"), b"").unwrap();

        let catalog = TrackCatalog::new(dir.path(), ["nested/jay"]);
        assert!(catalog.resolve(&Track::new("nested/jay")).is_none());
    }

    #[test]
    fn test_names() {
        let catalog = TrackCatalog::new("assets", ["trackA", "trackB"]);
        assert_eq!(catalog.names(), vec!["trackA".to_string(), "trackB".to_string()]);
        assert!(!catalog.is_empty());
    }
}
