//! Static Asset Store
//!
//! The web UI compiled into flash as a table of files. Mounting checks the
//! table once at boot; a bad bundle disables the asset routes while the API
//! keeps working.

use core::fmt;

/// Path the root URL resolves to
pub const INDEX_PATH: &str = "/index.html";

/// One file of the web UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Asset {
    pub path: &'static str,
    pub content_type: &'static str,
    pub body: &'static [u8],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// The bundle has no index page
    MissingIndex,
    /// An asset in the bundle has no content
    EmptyAsset(&'static str),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::MissingIndex => write!(f, "asset bundle has no {INDEX_PATH}"),
            StorageError::EmptyAsset(path) => write!(f, "asset {path} is empty"),
        }
    }
}

/// Validated asset bundle
#[derive(Debug, Clone, Copy)]
pub struct AssetStore {
    assets: &'static [Asset],
}

impl AssetStore {
    pub fn mount(assets: &'static [Asset]) -> Result<Self, StorageError> {
        if let Some(empty) = assets.iter().find(|a| a.body.is_empty()) {
            return Err(StorageError::EmptyAsset(empty.path));
        }
        if !assets.iter().any(|a| a.path == INDEX_PATH) {
            return Err(StorageError::MissingIndex);
        }
        info!("mounted {} web assets", assets.len());
        Ok(Self { assets })
    }

    /// Finds the asset for a request path, `/` meaning the index page
    pub fn lookup(&self, path: &str) -> Option<&'static Asset> {
        let path = if path == "/" { INDEX_PATH } else { path };
        self.assets.iter().find(|a| a.path == path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static BUNDLE: [Asset; 2] = [
        Asset {
            path: "/index.html",
            content_type: "text/html",
            body: b"<html></html>",
        },
        Asset {
            path: "/style.css",
            content_type: "text/css",
            body: b"body{}",
        },
    ];

    static NO_INDEX: [Asset; 1] = [Asset {
        path: "/style.css",
        content_type: "text/css",
        body: b"body{}",
    }];

    static EMPTY: [Asset; 2] = [
        Asset {
            path: "/index.html",
            content_type: "text/html",
            body: b"<html></html>",
        },
        Asset {
            path: "/script.js",
            content_type: "application/javascript",
            body: b"",
        },
    ];

    #[test]
    fn root_resolves_to_index() {
        let store = AssetStore::mount(&BUNDLE).unwrap();
        assert_eq!(store.lookup("/").map(|a| a.path), Some("/index.html"));
        assert_eq!(store.lookup("/style.css").map(|a| a.content_type), Some("text/css"));
        assert!(store.lookup("/missing.js").is_none());
    }

    #[test]
    fn bundle_without_index_is_rejected() {
        assert_eq!(
            AssetStore::mount(&NO_INDEX).unwrap_err(),
            StorageError::MissingIndex
        );
    }

    #[test]
    fn empty_asset_is_rejected() {
        assert_eq!(
            AssetStore::mount(&EMPTY).unwrap_err(),
            StorageError::EmptyAsset("/script.js")
        );
    }

    #[test]
    fn shipped_web_ui_mounts() {
        let store = AssetStore::mount(&crate::web::WEB_UI).unwrap();
        for path in ["/", "/style.css", "/script.js"] {
            assert!(store.lookup(path).is_some(), "{path} missing");
        }
    }
}
