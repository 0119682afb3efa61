//! Entity catalog
//!
//! A catalog file is a RON list of [`EntityTemplate`]s:
//!
//! ```ron
//! [
//!     (name: "player", physics: Some((width: 1, height: 2)), player: true),
//!     (name: "crate", physics: Some((width: 2, height: 2, mass: 4.0))),
//! ]
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use log::info;
use tilerun_math::Vec2;

use crate::entity::EntityTemplate;
use crate::world::{EntityKey, World};

/// Error loading or using an entity catalog
#[derive(Debug)]
pub enum CatalogError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid RON syntax)
    Parse(ron::error::SpannedError),
    /// Two templates share a name
    DuplicateTemplate(String),
    /// No template with this name
    UnknownTemplate(String),
}

impl From<io::Error> for CatalogError {
    fn from(e: io::Error) -> Self {
        CatalogError::Io(e)
    }
}

impl From<ron::error::SpannedError> for CatalogError {
    fn from(e: ron::error::SpannedError) -> Self {
        CatalogError::Parse(e)
    }
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "IO error: {}", e),
            CatalogError::Parse(e) => write!(f, "Parse error: {}", e),
            CatalogError::DuplicateTemplate(name) => {
                write!(f, "Duplicate entity template: {}", name)
            }
            CatalogError::UnknownTemplate(name) => write!(f, "Unknown entity template: {}", name),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Named entity templates
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    templates: BTreeMap<String, EntityTemplate>,
}

impl EntityCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from RON text
    pub fn from_ron_str(text: &str) -> Result<Self, CatalogError> {
        let templates: Vec<EntityTemplate> = ron::from_str(text)?;
        let mut catalog = Self::new();
        for template in templates {
            catalog.insert(template)?;
        }
        Ok(catalog)
    }

    /// Load a catalog from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let catalog = Self::from_ron_str(&contents)?;
        info!("Loaded {} entity templates from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Add a template; names must be unique
    pub fn insert(&mut self, template: EntityTemplate) -> Result<(), CatalogError> {
        if self.templates.contains_key(&template.name) {
            return Err(CatalogError::DuplicateTemplate(template.name));
        }
        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&EntityTemplate> {
        self.templates.get(name)
    }

    /// Template names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Spawn the named template with its feet at `feet`
    pub fn spawn(&self, world: &mut World, name: &str, feet: Vec2) -> Result<EntityKey, CatalogError> {
        let template = self
            .get(name)
            .ok_or_else(|| CatalogError::UnknownTemplate(name.to_string()))?;
        Ok(world.spawn_template(template, feet))
    }
}
