//! Construction of constraint builders from process settings.
use crate::builders::{
    ConstraintBuilder, DistributingLinkBuilder, MultifreedomBuilder, NodeLinkBuilder, RigidLinkBuilder,
    SurfaceSlidingBuilder,
};
use crate::model::Model;
use crate::settings::ProcessSettings;
use crate::{ConstraintId, Error};
use log::{info, warn};
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::fmt;
use std::ops::Range;

/// Constructs a builder from the `Parameters` object of a process entry and the model it will
/// act on.
pub type BuilderConstructor =
    Box<dyn Fn(&Value, &Model) -> Result<Box<dyn ConstraintBuilder>, Error> + Send + Sync>;

/// Maps `process_name` tags to builder constructors.
#[derive(Default)]
pub struct BuilderRegistry {
    constructors: FxHashMap<String, BuilderConstructor>,
}

impl fmt::Debug for BuilderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

fn boxed<B: ConstraintBuilder + 'static>(builder: B) -> Box<dyn ConstraintBuilder> {
    Box::new(builder)
}

impl BuilderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry knowing every builder shipped with this crate.
    pub fn with_builtin_builders() -> Self {
        let mut registry = Self::new();
        registry.register(RigidLinkBuilder::PROCESS_NAME, |parameters, model| {
            RigidLinkBuilder::from_parameters(parameters, model).map(boxed)
        });
        registry.register(DistributingLinkBuilder::PROCESS_NAME, |parameters, model| {
            DistributingLinkBuilder::from_parameters(parameters, model).map(boxed)
        });
        registry.register(MultifreedomBuilder::PROCESS_NAME, |parameters, model| {
            MultifreedomBuilder::from_parameters(parameters, model).map(boxed)
        });
        registry.register(MultifreedomBuilder::LEGACY_PROCESS_NAME, |parameters, model| {
            MultifreedomBuilder::from_parameters(parameters, model).map(boxed)
        });
        registry.register(SurfaceSlidingBuilder::PROCESS_NAME, |parameters, model| {
            SurfaceSlidingBuilder::from_parameters(parameters, model).map(boxed)
        });
        registry.register(NodeLinkBuilder::PROCESS_NAME, |parameters, model| {
            NodeLinkBuilder::from_parameters(parameters, model).map(boxed)
        });
        registry
    }

    /// Registers a constructor under the given tag, replacing any previous registration.
    ///
    /// Returns `true` if a constructor was replaced.
    pub fn register<F>(&mut self, tag: impl Into<String>, constructor: F) -> bool
    where
        F: Fn(&Value, &Model) -> Result<Box<dyn ConstraintBuilder>, Error> + Send + Sync + 'static,
    {
        let tag = tag.into();
        let replaced = self.constructors.insert(tag.clone(), Box::new(constructor)).is_some();
        if replaced {
            warn!("Builder registered under '{}' was replaced", tag);
        }
        replaced
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<_> = self.constructors.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Creates the builder selected by `settings.process_name`.
    pub fn create(&self, settings: &ProcessSettings, model: &Model) -> Result<Box<dyn ConstraintBuilder>, Error> {
        let constructor = self
            .constructors
            .get(&settings.process_name)
            .ok_or_else(|| Error::UnknownFactoryTag(settings.process_name.clone()))?;
        constructor(&settings.parameters, model)
    }

    /// Creates all builders of a process list and applies them to the model in order.
    ///
    /// Every builder is constructed before the first one runs, and the builders run against a
    /// copy of the model that only replaces `model` once all of them succeeded. An error anywhere
    /// in the list therefore leaves `model` without any of the new constraints. Returns the id
    /// range of each builder's constraints.
    pub fn apply_all(
        &self,
        processes: &[ProcessSettings],
        model: &mut Model,
    ) -> Result<Vec<Range<ConstraintId>>, Error> {
        let builders = processes
            .iter()
            .map(|settings| self.create(settings, model))
            .collect::<Result<Vec<_>, _>>()?;

        let mut staged = model.clone();
        let mut ranges = Vec::with_capacity(builders.len());
        for builder in &builders {
            ranges.push(staged.apply(builder)?);
        }
        *model = staged;
        info!(
            "Applied {} constraint builders, model now holds {} constraints",
            builders.len(),
            model.constraints().len()
        );
        Ok(ranges)
    }
}
