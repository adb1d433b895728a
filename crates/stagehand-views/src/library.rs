//! View templates, libraries and the registry keyed by concrete type.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::view::View;

/// Stable tag for a concrete view type.
#[derive(Clone, Copy)]
pub struct ViewType {
    id: TypeId,
    name: &'static str,
}

impl ViewType {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ViewType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ViewType {}

impl Hash for ViewType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A prototype instance the pool clones new views from.
#[derive(Clone)]
pub struct Template {
    ty: ViewType,
    prototype: Rc<dyn Any>,
}

impl Template {
    pub fn new<T: View + Clone>(prototype: T) -> Self {
        Self {
            ty: ViewType::of::<T>(),
            prototype: Rc::new(prototype),
        }
    }

    pub fn ty(&self) -> ViewType {
        self.ty
    }

    /// The prototype, if it is a `T`.
    pub fn prototype<T: View>(&self) -> Option<&T> {
        self.prototype.downcast_ref::<T>()
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template").field("type", &self.ty).finish()
    }
}

/// A named, ordered collection of view templates.
///
/// ```
/// use stagehand_views::{View, ViewCore, ViewLibrary};
///
/// #[derive(Clone, Default)]
/// struct Hud {
///     core: ViewCore,
/// }
///
/// impl View for Hud {
///     fn core(&self) -> &ViewCore { &self.core }
///     fn core_mut(&mut self) -> &mut ViewCore { &mut self.core }
/// }
///
/// let library = ViewLibrary::new("gameplay").with(Hud::default());
/// assert!(library.contains::<Hud>());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ViewLibrary {
    name: String,
    templates: Vec<Template>,
}

impl ViewLibrary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            templates: Vec::new(),
        }
    }

    /// Builder-style [`add`](Self::add).
    pub fn with<T: View + Clone>(mut self, prototype: T) -> Self {
        self.add(prototype);
        self
    }

    pub fn add<T: View + Clone>(&mut self, prototype: T) {
        self.templates.push(Template::new(prototype));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn contains<T: View>(&self) -> bool {
        let ty = ViewType::of::<T>();
        self.templates.iter().any(|t| t.ty == ty)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Maps each known view type to exactly one template.
#[derive(Debug, Default)]
pub struct Registry {
    templates: IndexMap<TypeId, Template>,
    libraries: Vec<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every template whose type is not known yet. Returns how many were
    /// added.
    pub fn register(&mut self, library: &ViewLibrary) -> usize {
        let mut added = 0;
        for template in library.templates() {
            let ty = template.ty();
            if self.templates.contains_key(&ty.id()) {
                tracing::debug!(
                    "Ignoring duplicate template for {} from library '{}'",
                    ty.name(),
                    library.name()
                );
                continue;
            }
            self.templates.insert(ty.id(), template.clone());
            added += 1;
        }

        if !self.libraries.iter().any(|name| name == library.name()) {
            self.libraries.push(library.name().to_string());
        }
        added
    }

    /// Forget every type in `library` and the library itself. Returns the
    /// types that were removed.
    pub fn unregister(&mut self, library: &ViewLibrary) -> Vec<ViewType> {
        let removed = library
            .templates()
            .iter()
            .filter_map(|t| self.templates.shift_remove(&t.ty().id()))
            .map(|t| t.ty())
            .collect();
        self.libraries.retain(|name| name != library.name());
        removed
    }

    pub fn get(&self, ty: TypeId) -> Option<&Template> {
        self.templates.get(&ty)
    }

    pub fn contains(&self, ty: TypeId) -> bool {
        self.templates.contains_key(&ty)
    }

    /// Registered types in registration order.
    pub fn types(&self) -> impl Iterator<Item = ViewType> + '_ {
        self.templates.values().map(Template::ty)
    }

    pub fn loaded_libraries(&self) -> &[String] {
        &self.libraries
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
