//! Font registry — name → loaded font handle.
//!
//! Fonts are registered under caller-chosen names (exact, case-sensitive)
//! and looked up by the ordered family lists in render requests. Files
//! are parsed with `ttf-parser`; system fonts are located with
//! `font-kit`'s `SystemSource`.
//!
//! ## Architecture
//!
//! ```text
//! FontRegistry
//!   └── fonts: RwLock<HashMap<String, Arc<FontHandle>>>
//!                                   │
//!                                   ▼
//!                        FontHandle { faces: [Arc<dyn FontFace>] }
//! ```
//!
//! A handle is fully built before the write lock is taken, so a failed
//! registration never leaves a partial entry behind. Re-registering a
//! name replaces the previous handle (last write wins).

use font_kit::family_name::FamilyName;
use font_kit::handle::Handle;
use font_kit::properties::Properties;
use font_kit::source::SystemSource;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use thiserror::Error;
use ttf_parser::FaceParsingError;

use crate::face::{FontFace, TtfFace};

#[derive(Error, Debug)]
pub enum FontError {
    #[error("Failed to read font {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse font {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: FaceParsingError,
    },
    #[error("Font not registered: {0}")]
    NotRegistered(String),
    #[error("System font {family} unavailable: {reason}")]
    SystemFont { family: String, reason: String },
}

// ── Font handle ─────────────────────────────────────────────────────

/// A loaded font resource: one face, or the ordered faces of a collection.
#[derive(Clone, Debug)]
pub struct FontHandle {
    faces: Vec<Arc<dyn FontFace>>,
    collection: bool,
}

impl FontHandle {
    /// Wrap a single face.
    pub fn single(face: Arc<dyn FontFace>) -> Self {
        Self {
            faces: vec![face],
            collection: false,
        }
    }

    /// Wrap the faces of a collection, in declared order.
    pub fn collection(faces: Vec<Arc<dyn FontFace>>) -> Self {
        Self {
            faces,
            collection: true,
        }
    }

    /// Read and parse a font file (`.ttf`, `.otf`, `.ttc`, `.otc`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, FontError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(data, &path.display().to_string())
    }

    /// Parse in-memory font data.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, FontError> {
        Self::parse(data, "<memory>")
    }

    fn parse(data: Vec<u8>, origin: &str) -> Result<Self, FontError> {
        let parse_err = |source| FontError::Parse {
            origin: origin.to_string(),
            source,
        };
        let data = Arc::new(data);

        match ttf_parser::fonts_in_collection(&data) {
            Some(0) => Err(parse_err(FaceParsingError::FaceIndexOutOfBounds)),
            Some(count) => {
                let faces = (0..count)
                    .map(|index| {
                        TtfFace::from_data(Arc::clone(&data), index)
                            .map(|face| Arc::new(face) as Arc<dyn FontFace>)
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(parse_err)?;
                Ok(Self::collection(faces))
            }
            None => {
                let face = TtfFace::from_data(data, 0).map_err(parse_err)?;
                Ok(Self::single(Arc::new(face)))
            }
        }
    }

    /// Faces in lookup order.
    pub fn faces(&self) -> &[Arc<dyn FontFace>] {
        &self.faces
    }

    pub fn is_collection(&self) -> bool {
        self.collection
    }
}

// ── Font registry ───────────────────────────────────────────────────

/// Registry of named fonts, shared by reference between renderers.
///
/// Lookups take a read lock; registration takes the write lock only for
/// the final insert.
#[derive(Default)]
pub struct FontRegistry {
    fonts: RwLock<HashMap<String, Arc<FontHandle>>>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the font file at `path` and register it as `name`.
    pub fn register_font(&self, path: impl AsRef<Path>, name: &str) -> Result<(), FontError> {
        let start = Instant::now();
        let handle = FontHandle::load(path.as_ref())?;
        log::info!(
            "FontRegistry: loaded {} as '{}' ({} face(s), {:.1}ms)",
            path.as_ref().display(),
            name,
            handle.faces().len(),
            start.elapsed().as_secs_f64() * 1000.0,
        );
        self.register_handle(name, handle);
        Ok(())
    }

    /// Parse in-memory font data and register it as `name`.
    pub fn register_bytes(&self, data: Vec<u8>, name: &str) -> Result<(), FontError> {
        let handle = FontHandle::from_bytes(data)?;
        self.register_handle(name, handle);
        Ok(())
    }

    /// Locate an installed font by family and register it as `name`.
    ///
    /// Accepts concrete family names as well as the generic keywords
    /// `serif`, `sans-serif`, `monospace`, `cursive` and `fantasy`.
    pub fn register_system_font(&self, family: &str, name: &str) -> Result<(), FontError> {
        let unavailable = |reason: String| FontError::SystemFont {
            family: family.to_string(),
            reason,
        };

        let handle = SystemSource::new()
            .select_best_match(&[parse_family(family)], &Properties::new())
            .map_err(|err| unavailable(format!("{err:?}")))?;

        let (data, index, origin) = match handle {
            Handle::Path { path, font_index } => {
                let data = std::fs::read(&path).map_err(|source| FontError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                (data, font_index, path.display().to_string())
            }
            Handle::Memory { bytes, font_index } => {
                (bytes.as_ref().clone(), font_index, format!("<system:{family}>"))
            }
        };

        let face = TtfFace::from_data(Arc::new(data), index).map_err(|source| {
            FontError::Parse {
                origin: origin.clone(),
                source,
            }
        })?;
        log::info!(
            "FontRegistry: resolved system family '{}' to {} (face {}) as '{}'",
            family,
            origin,
            index,
            name,
        );
        self.register_handle(name, FontHandle::single(Arc::new(face)));
        Ok(())
    }

    /// Register an already-built handle as `name`, replacing any previous one.
    pub fn register_handle(&self, name: &str, handle: FontHandle) {
        let previous = self
            .fonts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), Arc::new(handle));
        if previous.is_some() {
            log::warn!("FontRegistry: replaced existing font '{name}'");
        }
    }

    /// Remove `name`. Returns whether it was registered.
    pub fn unregister(&self, name: &str) -> bool {
        self.fonts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name)
            .is_some()
    }

    pub fn get(&self, name: &str) -> Option<Arc<FontHandle>> {
        self.fonts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Look up `name`, failing with [`FontError::NotRegistered`].
    pub fn lookup(&self, name: &str) -> Result<Arc<FontHandle>, FontError> {
        self.get(name)
            .ok_or_else(|| FontError::NotRegistered(name.to_string()))
    }

    /// Look up every name of a fallback chain, in order.
    pub fn lookup_chain<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Arc<FontHandle>>, FontError> {
        let fonts = self.fonts.read().unwrap_or_else(PoisonError::into_inner);
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                fonts
                    .get(name)
                    .cloned()
                    .ok_or_else(|| FontError::NotRegistered(name.to_string()))
            })
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fonts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .fonts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.fonts.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of faces across all registered handles.
    pub fn face_count(&self) -> usize {
        self.fonts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|handle| handle.faces().len())
            .sum()
    }
}

impl fmt::Display for FontRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FontRegistry({} fonts, {} faces)",
            self.len(),
            self.face_count(),
        )
    }
}

/// Map a family string onto font-kit's family name, honouring generics.
fn parse_family(name: &str) -> FamilyName {
    match name.trim().to_lowercase().as_str() {
        "serif" => FamilyName::Serif,
        "sans-serif" => FamilyName::SansSerif,
        "monospace" => FamilyName::Monospace,
        "cursive" => FamilyName::Cursive,
        "fantasy" => FamilyName::Fantasy,
        _ => FamilyName::Title(name.trim().to_string()),
    }
}

// ===================================================================
// Tests
// ===================================================================
