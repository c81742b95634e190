//! Type-indexed arena of shape parameters
//!
//! Particles refer to their geometry by [`ShapeTypeId`]. Parameters are added or
//! replaced through `&mut self` during setup, so no overlap check can observe a
//! half-updated registry.

use super::instance::{ShapeInstance, ShapeSpheropolyhedron, ShapeTypeId};
use super::params::{ShapeError, ShapeParams};
use crate::foundation::math::{Real, Vec3};
use std::collections::HashMap;

/// Registry of shape types sharing one vertex limit
#[derive(Debug, Clone)]
pub struct ShapeRegistry {
    max_verts: usize,
    params: Vec<ShapeParams>,
    names: Vec<String>,
    by_name: HashMap<String, ShapeTypeId>,
}

impl ShapeRegistry {
    /// Create an empty registry for shapes of at most `max_verts` vertices
    pub fn new(max_verts: usize) -> Self {
        Self {
            max_verts,
            params: Vec::new(),
            names: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Vertex limit enforced on every registered type
    pub fn max_verts(&self) -> usize {
        self.max_verts
    }

    /// Register prebuilt parameters under a new name
    pub fn register(&mut self, name: impl Into<String>, params: ShapeParams) -> Result<ShapeTypeId, ShapeError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(ShapeError::DuplicateType(name));
        }
        if params.vertex_count() > self.max_verts {
            return Err(ShapeError::TooManyVertices {
                count: params.vertex_count(),
                max: self.max_verts,
            });
        }

        let id = ShapeTypeId(self.params.len() as u32);
        log::info!(
            "Registered shape type '{}' as {}: {} vertices, sweep radius {}, diameter {}",
            name,
            id,
            params.vertex_count(),
            params.sweep_radius(),
            params.circumsphere_diameter()
        );
        self.params.push(params);
        self.names.push(name.clone());
        self.by_name.insert(name, id);
        Ok(id)
    }

    /// Build and register a spheropolyhedron
    pub fn add_spheropolyhedron(
        &mut self,
        name: impl Into<String>,
        vertices: Vec<Vec3>,
        sweep_radius: Real,
    ) -> Result<ShapeTypeId, ShapeError> {
        let params = ShapeParams::new(vertices, sweep_radius, self.max_verts)?;
        self.register(name, params)
    }

    /// Replace the parameters of an existing type
    pub fn set_params(&mut self, id: ShapeTypeId, params: ShapeParams) -> Result<(), ShapeError> {
        if params.vertex_count() > self.max_verts {
            return Err(ShapeError::TooManyVertices {
                count: params.vertex_count(),
                max: self.max_verts,
            });
        }
        let slot = self
            .params
            .get_mut(id.index())
            .ok_or_else(|| ShapeError::UnknownType(id.to_string()))?;
        log::debug!("Updated parameters of shape type {}", id);
        *slot = params;
        Ok(())
    }

    /// Parameters of a type, if registered
    pub fn get(&self, id: ShapeTypeId) -> Option<&ShapeParams> {
        self.params.get(id.index())
    }

    /// Parameters of a type, or an error naming the missing id
    pub fn params(&self, id: ShapeTypeId) -> Result<&ShapeParams, ShapeError> {
        self.get(id).ok_or_else(|| ShapeError::UnknownType(id.to_string()))
    }

    /// Look a type up by name
    pub fn type_id(&self, name: &str) -> Result<ShapeTypeId, ShapeError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| ShapeError::UnknownType(name.to_string()))
    }

    /// Name a type was registered under
    pub fn name(&self, id: ShapeTypeId) -> Option<&str> {
        self.names.get(id.index()).map(String::as_str)
    }

    /// Resolve an instance into a placed shape
    pub fn resolve(&self, instance: &ShapeInstance) -> Result<ShapeSpheropolyhedron<'_>, ShapeError> {
        let params = self.params(instance.type_id)?;
        Ok(ShapeSpheropolyhedron::new(instance.orientation, params))
    }

    /// Largest circumsphere diameter over all types (0 when empty)
    pub fn max_circumsphere_diameter(&self) -> Real {
        self.params
            .iter()
            .map(ShapeParams::circumsphere_diameter)
            .fold(0.0, Real::max)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether no types are registered
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
