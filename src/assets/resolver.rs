use std::path::{Path, PathBuf};

/// Maps a logical asset name to a filesystem path.
///
/// Names carrying an extension pass through relative to the asset root;
/// bare names get the legacy `fbx/<name>.fbx` layout. Applications whose
/// assets live elsewhere inject their own resolver.
pub struct AssetResolver {
    root: PathBuf,
    resolve: Box<dyn Fn(&Path, &str) -> PathBuf + Send + Sync>,
}

impl AssetResolver {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            resolve: Box::new(default_resolve),
        }
    }

    #[must_use]
    pub fn with_resolve(
        root: impl Into<PathBuf>,
        resolve: impl Fn(&Path, &str) -> PathBuf + Send + Sync + 'static,
    ) -> Self {
        Self {
            root: root.into(),
            resolve: Box::new(resolve),
        }
    }

    #[must_use]
    pub fn resolve(&self, name: &str) -> PathBuf {
        (self.resolve)(&self.root, name)
    }
}

impl Default for AssetResolver {
    fn default() -> Self {
        Self::new("assets")
    }
}

fn default_resolve(root: &Path, name: &str) -> PathBuf {
    if Path::new(name).extension().is_some() {
        root.join(name)
    } else {
        root.join("fbx").join(format!("{name}.fbx"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_maps_to_fbx_layout() {
        let resolver = AssetResolver::new("assets");
        assert_eq!(
            resolver.resolve("Samba Dancing"),
            PathBuf::from("assets/fbx/Samba Dancing.fbx")
        );
    }

    #[test]
    fn explicit_extension_passes_through() {
        let resolver = AssetResolver::new("assets");
        assert_eq!(
            resolver.resolve("models/Soldier.glb"),
            PathBuf::from("assets/models/Soldier.glb")
        );
    }

    #[test]
    fn custom_resolve_overrides_layout() {
        let resolver =
            AssetResolver::with_resolve("data", |root, name| root.join(format!("{name}.gltf")));
        assert_eq!(resolver.resolve("robot"), PathBuf::from("data/robot.gltf"));
    }
}
