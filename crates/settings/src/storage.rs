//! Media artifact directories
//!
//! Captured videos and images live in fixed subdirectories of a base data
//! directory (the platform documents dir unless configured otherwise):
//! `Config/`, `VideoData/`, `ImageData/`. Each is created on first access and
//! the resolved path is cached on the owning `MediaDirectories` value.

use std::fs;
use std::path::{Path, PathBuf};

use once_cell::unsync::OnceCell;

use crate::error::{Result, SettingsError};

/// Logical storage category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaCategory {
    Config,
    Video,
    Image,
}

impl MediaCategory {
    pub const ALL: [MediaCategory; 3] = [MediaCategory::Config, MediaCategory::Video, MediaCategory::Image];

    /// Subdirectory name under the base data directory
    pub fn dir_name(self) -> &'static str {
        match self {
            MediaCategory::Config => "Config",
            MediaCategory::Video => "VideoData",
            MediaCategory::Image => "ImageData",
        }
    }
}

/// Filesystem collaborator.
pub trait FileSystem {
    fn directory_exists(&self, path: &Path) -> bool;
    fn create_directory(&self, path: &Path) -> Result<()>;
    fn delete_directory_recursive(&self, path: &Path) -> Result<()>;
    /// Platform "documents" root all categories hang off
    fn base_data_directory(&self) -> PathBuf;
}

/// `FileSystem` over `std::fs`, rooted at a fixed base directory.
#[derive(Debug, Clone)]
pub struct LocalFileSystem {
    base: PathBuf,
}

impl LocalFileSystem {
    /// Root at `base`. Relative paths are resolved against the current directory.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        let base = if base.is_relative() {
            std::env::current_dir()
                .map(|cwd| cwd.join(&base))
                .unwrap_or(base)
        } else {
            base
        };
        Self { base }
    }

    /// Root at the user's documents directory
    pub fn documents() -> Self {
        Self::new(dirs::document_dir().unwrap_or_else(|| PathBuf::from(".")))
    }
}

impl FileSystem for LocalFileSystem {
    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_directory(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| {
            SettingsError::StorageUnavailable(format!("failed to create {}: {e}", path.display()))
        })
    }

    fn delete_directory_recursive(&self, path: &Path) -> Result<()> {
        fs::remove_dir_all(path).map_err(|e| {
            SettingsError::StorageUnavailable(format!("failed to delete {}: {e}", path.display()))
        })
    }

    fn base_data_directory(&self) -> PathBuf {
        self.base.clone()
    }
}

/// Lazily created, cached artifact directories.
pub struct MediaDirectories<F: FileSystem> {
    fs: F,
    config: OnceCell<PathBuf>,
    video: OnceCell<PathBuf>,
    image: OnceCell<PathBuf>,
}

impl<F: FileSystem> MediaDirectories<F> {
    pub fn new(fs: F) -> Self {
        Self {
            fs,
            config: OnceCell::new(),
            video: OnceCell::new(),
            image: OnceCell::new(),
        }
    }

    pub fn filesystem(&self) -> &F {
        &self.fs
    }

    fn cell(&self, category: MediaCategory) -> &OnceCell<PathBuf> {
        match category {
            MediaCategory::Config => &self.config,
            MediaCategory::Video => &self.video,
            MediaCategory::Image => &self.image,
        }
    }

    fn cell_mut(&mut self, category: MediaCategory) -> &mut OnceCell<PathBuf> {
        match category {
            MediaCategory::Config => &mut self.config,
            MediaCategory::Video => &mut self.video,
            MediaCategory::Image => &mut self.image,
        }
    }

    /// Where `category` lives, without touching the filesystem
    pub fn path_for(&self, category: MediaCategory) -> PathBuf {
        self.fs.base_data_directory().join(category.dir_name())
    }

    /// Path for `category`, creating the directory on first access.
    pub fn directory(&self, category: MediaCategory) -> Result<PathBuf> {
        self.cell(category)
            .get_or_try_init(|| {
                let path = self.path_for(category);
                if !self.fs.directory_exists(&path) {
                    self.fs.create_directory(&path)?;
                    log::info!("created {} directory at {}", category.dir_name(), path.display());
                }
                Ok(path)
            })
            .cloned()
    }

    pub fn config_directory(&self) -> Result<PathBuf> {
        self.directory(MediaCategory::Config)
    }

    pub fn video_directory(&self) -> Result<PathBuf> {
        self.directory(MediaCategory::Video)
    }

    pub fn image_directory(&self) -> Result<PathBuf> {
        self.directory(MediaCategory::Image)
    }

    /// Recursively remove everything under `category`.
    ///
    /// A missing directory is an error, not a no-op. The cached path is
    /// dropped so the next access recreates the directory.
    pub fn delete_all(&mut self, category: MediaCategory) -> Result<()> {
        let path = self.path_for(category);
        if !self.fs.directory_exists(&path) {
            return Err(SettingsError::StorageUnavailable(format!(
                "{} directory does not exist: {}",
                category.dir_name(),
                path.display()
            )));
        }
        self.fs.delete_directory_recursive(&path)?;
        self.cell_mut(category).take();
        log::info!("deleted {} directory at {}", category.dir_name(), path.display());
        Ok(())
    }
}
