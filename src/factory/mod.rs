//! Named shape graphs built from configuration.
//!
//! The [`ShapeFactory`] owns every shape it builds. Composites receive clones
//! of the shapes they reference, so a stored shape never borrows another.

mod registry;
mod resolve;

pub use registry::{ShapeConstructor, ShapeRegistry};

use std::collections::{HashMap, HashSet};
use std::path::Path;

use slotmap::SlotMap;

use crate::config::{parse_definitions, Properties};
use crate::error::{ConfigError, FactoryError, GeosolidError, Result};
use crate::shapes::{Shape, ShapeLookup};

slotmap::new_key_type! {
    /// Handle of a shape stored in a [`ShapeFactory`].
    pub struct ShapeKey;
}

fn build_error(name: &str, type_id: &str, source: GeosolidError) -> GeosolidError {
    FactoryError::Build {
        name: name.to_string(),
        type_id: type_id.to_string(),
        source: Box::new(source),
    }
    .into()
}

/// Shapes staged by a load, in front of the committed ones.
struct StagedLookup<'a> {
    staged: &'a HashMap<String, Shape>,
    committed: &'a ShapeFactory,
}

impl ShapeLookup for StagedLookup<'_> {
    fn find_shape(&self, name: &str) -> Option<&Shape> {
        self.staged
            .get(name)
            .or_else(|| self.committed.find_shape(name))
    }
}

/// Builds shapes through a [`ShapeRegistry`] and stores them by name.
#[derive(Debug, Default)]
pub struct ShapeFactory {
    registry: ShapeRegistry,
    shapes: SlotMap<ShapeKey, Shape>,
    names: HashMap<String, ShapeKey>,
}

impl ShapeFactory {
    #[must_use]
    pub fn new(registry: ShapeRegistry) -> Self {
        Self {
            registry,
            shapes: SlotMap::with_key(),
            names: HashMap::new(),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    /// A fresh shape of `type_id`; failures name the declaration.
    fn create(&self, name: &str, type_id: &str) -> Result<Shape> {
        self.registry
            .create(type_id)
            .map_err(|e| build_error(name, type_id, e))
    }

    /// Builds one configured shape without storing it.
    fn build(&self, name: &str, type_id: &str, config: &Properties, lookup: &dyn ShapeLookup) -> Result<Shape> {
        let mut shape = self.create(name, type_id)?;
        shape
            .configure(config, lookup)
            .map_err(|e| build_error(name, type_id, e))?;
        tracing::trace!(name, type_id, "built shape");
        Ok(shape)
    }

    /// Names `shape` would reference when configured from `config`.
    fn references(&self, name: &str, type_id: &str, config: &Properties) -> Result<Vec<String>> {
        self.create(name, type_id)?
            .referenced_names(config)
            .map_err(|e| build_error(name, type_id, e))
    }

    /// Builds a shape of type `type_id` from `config` and stores it as
    /// `name`. Composites may only refer to shapes already stored.
    ///
    /// # Errors
    ///
    /// [`FactoryError::DuplicateName`], [`FactoryError::UnresolvedReference`],
    /// or [`FactoryError::Build`] wrapping the registry or configuration
    /// error, an unregistered type included.
    pub fn create_reference(&mut self, name: &str, type_id: &str, config: &Properties) -> Result<&Shape> {
        if self.has(name) {
            return Err(FactoryError::DuplicateName(name.to_string()).into());
        }
        for reference in self.references(name, type_id, config)? {
            if !self.has(&reference) {
                return Err(FactoryError::UnresolvedReference {
                    name: name.to_string(),
                    type_id: type_id.to_string(),
                    reference,
                }
                .into());
            }
        }
        let shape = self.build(name, type_id, config, &*self)?;
        let key = self.shapes.insert(shape);
        self.names.insert(name.to_string(), key);
        Ok(&self.shapes[key])
    }

    /// Loads every declaration of a definition text and returns the new
    /// names in order of appearance.
    ///
    /// Declarations may refer to each other in any order, and to shapes
    /// already stored. Nothing is stored unless every declaration builds.
    ///
    /// # Errors
    ///
    /// Propagates parse errors, and the errors of
    /// [`create_reference`](Self::create_reference) plus
    /// [`FactoryError::CyclicReference`].
    pub fn load(&mut self, text: &str) -> Result<Vec<String>> {
        let declarations = parse_definitions(text)?;
        tracing::debug!(declarations = declarations.len(), "loading shape definitions");

        let names: Vec<&str> = declarations.iter().map(|d| d.name.as_str()).collect();
        let index = resolve::index_of(&names);
        if index.len() != names.len() {
            let mut seen = HashSet::new();
            if let Some(name) = names.iter().find(|n| !seen.insert(**n)) {
                return Err(FactoryError::DuplicateName((*name).to_string()).into());
            }
        }

        let mut deps = Vec::with_capacity(declarations.len());
        for decl in &declarations {
            if self.has(&decl.name) {
                return Err(FactoryError::DuplicateName(decl.name.clone()).into());
            }
            let mut refs = Vec::new();
            for reference in self.references(&decl.name, &decl.type_id, &decl.properties)? {
                match index.get(reference.as_str()) {
                    Some(&i) => refs.push(i),
                    None if self.has(&reference) => {}
                    None => {
                        return Err(FactoryError::UnresolvedReference {
                            name: decl.name.clone(),
                            type_id: decl.type_id.clone(),
                            reference,
                        }
                        .into())
                    }
                }
            }
            deps.push(refs);
        }
        let order = resolve::dependency_order(&names, &deps)?;

        let mut staged: HashMap<String, Shape> = HashMap::with_capacity(declarations.len());
        for i in order {
            let decl = &declarations[i];
            let lookup = StagedLookup {
                staged: &staged,
                committed: self,
            };
            let shape = self.build(&decl.name, &decl.type_id, &decl.properties, &lookup)?;
            staged.insert(decl.name.clone(), shape);
        }

        let mut loaded = Vec::with_capacity(declarations.len());
        for decl in declarations {
            if let Some(shape) = staged.remove(&decl.name) {
                let key = self.shapes.insert(shape);
                self.names.insert(decl.name.clone(), key);
                loaded.push(decl.name);
            }
        }
        tracing::debug!(count = loaded.len(), total = self.len(), "committed shapes");
        Ok(loaded)
    }

    /// Reads a definition file and [`load`](Self::load)s it.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`load`](Self::load).
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<Vec<String>> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        self.load(&text)
    }

    /// # Errors
    ///
    /// [`FactoryError::UnknownShape`] when no shape has that name.
    pub fn get(&self, name: &str) -> Result<&Shape> {
        self.find_shape(name)
            .ok_or_else(|| FactoryError::UnknownShape(name.to_string()).into())
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Stored names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.names.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Drops every stored shape; the registry is kept.
    pub fn clear(&mut self) {
        tracing::debug!(count = self.len(), "clearing shape factory");
        self.shapes.clear();
        self.names.clear();
    }
}

impl ShapeLookup for ShapeFactory {
    fn find_shape(&self, name: &str) -> Option<&Shape> {
        self.names.get(name).and_then(|key| self.shapes.get(*key))
    }
}
