//! Scene files: shape types, a periodic box and placed particles
//!
//! ```toml
//! max_verts = 8
//!
//! [box]
//! lengths = [10.0, 10.0, 10.0]
//!
//! [[shapes]]
//! name = "cube"
//! sweep_radius = 0.1
//! vertices = [[0.5, 0.5, 0.5], [-0.5, -0.5, -0.5]]
//!
//! [[particles]]
//! type = "cube"
//! position = [0.0, 0.0, 0.0]
//! orientation = [1.0, 0.0, 0.0, 0.0]
//! ```

use super::{Config, ConfigError};
use crate::foundation::math::{quat_from_wxyz, Real, Vec3};
use crate::overlap::OverlapTolerances;
use crate::overlap_system::OverlapSystem;
use crate::shape::{max_verts, IgnoreFlags, ShapeError, ShapeInstance, ShapeParams, ShapeRegistry};
use crate::spatial::{BoxDim, ImageFlags};
use serde::{Deserialize, Serialize};

/// One shape type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeTypeConfig {
    /// Name particles refer to
    pub name: String,
    /// Rounding radius
    #[serde(default)]
    pub sweep_radius: Real,
    /// Fast-rejection diameter override; must not be below the computed one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter: Option<Real>,
    /// Participation flags
    #[serde(default, skip_serializing_if = "IgnoreFlags::is_empty")]
    pub ignore: IgnoreFlags,
    /// Hull vertices in the body frame
    #[serde(default)]
    pub vertices: Vec<[Real; 3]>,
}

impl ShapeTypeConfig {
    /// Validate into shape parameters
    pub fn build(&self, max_verts: usize) -> Result<ShapeParams, ShapeError> {
        let params = ShapeParams::from_points(&self.vertices, self.sweep_radius, max_verts)?.with_ignore(self.ignore);
        match self.diameter {
            Some(d) => params.with_circumsphere_diameter(d),
            None => Ok(params),
        }
    }
}

/// Periodic box section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxConfig {
    /// Edge lengths `[Lx, Ly, Lz]`
    pub lengths: [Real; 3],
}

impl Default for BoxConfig {
    fn default() -> Self {
        Self { lengths: [10.0; 3] }
    }
}

impl BoxConfig {
    /// Validate into a box
    pub fn build(&self) -> Result<BoxDim, ConfigError> {
        Ok(BoxDim::try_from(self.lengths)?)
    }
}

fn identity_wxyz() -> [Real; 4] {
    [1.0, 0.0, 0.0, 0.0]
}

/// One placed particle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleConfig {
    /// Shape type name
    #[serde(rename = "type")]
    pub shape: String,
    /// Center position
    pub position: [Real; 3],
    /// Orientation `[w, x, y, z]`, normalized on load
    #[serde(default = "identity_wxyz")]
    pub orientation: [Real; 4],
    /// Lattice site for drift removal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<[Real; 3]>,
    /// Periodic images crossed since the particle was placed
    #[serde(default, skip_serializing_if = "is_home_image")]
    pub image: ImageFlags,
}

fn is_home_image(image: &ImageFlags) -> bool {
    *image == [0; 3]
}

impl ParticleConfig {
    /// Unrotated particle
    pub fn new(shape: impl Into<String>, position: [Real; 3]) -> Self {
        Self {
            shape: shape.into(),
            position,
            orientation: identity_wxyz(),
            reference: None,
            image: [0; 3],
        }
    }
}

/// Complete scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Vertex limit of the shape family
    pub max_verts: usize,
    /// Periodic box
    #[serde(rename = "box")]
    pub box_config: BoxConfig,
    /// Overlap test tolerances
    pub overlap: OverlapTolerances,
    /// Shape types, registered in file order
    pub shapes: Vec<ShapeTypeConfig>,
    /// Particles
    pub particles: Vec<ParticleConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            max_verts: max_verts::HUGE,
            box_config: BoxConfig::default(),
            overlap: OverlapTolerances::default(),
            shapes: Vec::new(),
            particles: Vec::new(),
        }
    }
}

impl Config for SceneConfig {}

impl SceneConfig {
    /// Validate the file and build the runtime scene
    pub fn build(&self) -> Result<Scene, ConfigError> {
        let box_dim = self.box_config.build()?;

        let mut registry = ShapeRegistry::new(self.max_verts);
        for shape in &self.shapes {
            registry.register(shape.name.clone(), shape.build(self.max_verts)?)?;
        }

        let mut positions = Vec::with_capacity(self.particles.len());
        let mut images = Vec::with_capacity(self.particles.len());
        let mut instances = Vec::with_capacity(self.particles.len());
        for (index, particle) in self.particles.iter().enumerate() {
            let type_id = registry.type_id(&particle.shape)?;
            let orientation =
                quat_from_wxyz(particle.orientation).ok_or(ConfigError::InvalidOrientation { index })?;
            positions.push(Vec3::from(particle.position));
            images.push(particle.image);
            instances.push(ShapeInstance::new(type_id, orientation));
        }

        let references = self
            .particles
            .iter()
            .map(|p| p.reference.map(Vec3::from))
            .collect::<Option<Vec<_>>>()
            .filter(|r| !r.is_empty());

        log::info!(
            "Loaded scene: {} shape types, {} particles, box {:?}",
            registry.len(),
            positions.len(),
            box_dim.lengths().as_slice()
        );

        Ok(Scene {
            images,
            registry,
            box_dim,
            positions,
            instances,
            references,
            tolerances: self.overlap,
        })
    }

    /// Copy particle positions and image flags back from a built scene
    pub fn store_particle_state(&mut self, scene: &Scene) {
        for ((particle, position), image) in self.particles.iter_mut().zip(&scene.positions).zip(&scene.images) {
            particle.position = [position.x, position.y, position.z];
            particle.image = *image;
        }
    }
}

/// Runtime scene built from a [`SceneConfig`]
#[derive(Debug, Clone)]
pub struct Scene {
    /// Registered shape types
    pub registry: ShapeRegistry,
    /// Periodic box
    pub box_dim: BoxDim,
    /// Particle centers
    pub positions: Vec<Vec3>,
    /// Particle image flags, from each particle's `image` entry
    pub images: Vec<ImageFlags>,
    /// Particle shapes and orientations
    pub instances: Vec<ShapeInstance>,
    /// Lattice sites, present only when every particle has one
    pub references: Option<Vec<Vec3>>,
    /// Overlap test tolerances
    pub tolerances: OverlapTolerances,
}

impl Scene {
    /// Overlap checker over this scene's registry and box
    pub fn overlap_system(&self) -> OverlapSystem<'_> {
        OverlapSystem::new(&self.registry, self.box_dim).with_tolerances(self.tolerances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Format;
    use crate::drift::remove_drift;
    use crate::overlap_system::OverlapPair;

    fn two_cubes() -> SceneConfig {
        let cube = ShapeTypeConfig {
            name: "cube".to_string(),
            sweep_radius: 0.0,
            diameter: None,
            ignore: IgnoreFlags::empty(),
            vertices: vec![
                [-0.5, -0.5, -0.5],
                [-0.5, -0.5, 0.5],
                [-0.5, 0.5, -0.5],
                [-0.5, 0.5, 0.5],
                [0.5, -0.5, -0.5],
                [0.5, -0.5, 0.5],
                [0.5, 0.5, -0.5],
                [0.5, 0.5, 0.5],
            ],
        };
        let ghost = ShapeTypeConfig {
            name: "ghost".to_string(),
            sweep_radius: 0.5,
            diameter: Some(1.5),
            ignore: IgnoreFlags::OVERLAPS | IgnoreFlags::STATISTICS,
            vertices: Vec::new(),
        };
        SceneConfig {
            max_verts: max_verts::SMALL,
            box_config: BoxConfig { lengths: [5.0, 6.0, 7.0] },
            overlap: OverlapTolerances::default(),
            shapes: vec![cube, ghost],
            particles: vec![
                ParticleConfig::new("cube", [0.0, 0.0, 0.0]),
                ParticleConfig::new("cube", [1.0, 0.2, 0.0]),
                ParticleConfig {
                    orientation: [0.5, 0.5, 0.5, 0.5],
                    reference: Some([0.0, 2.0, 0.0]),
                    ..ParticleConfig::new("ghost", [0.0, 2.0, 0.0])
                },
            ],
        }
    }

    #[test]
    fn test_toml_round_trip() {
        let scene = two_cubes();
        let text = scene.to_string_with_format(Format::Toml).unwrap();
        assert!(text.contains("[[particles]]"));
        let parsed = SceneConfig::from_str_with_format(&text, Format::Toml).unwrap();
        assert_eq!(parsed, scene);
    }

    #[test]
    fn test_ron_round_trip() {
        let scene = two_cubes();
        let text = scene.to_string_with_format(Format::Ron).unwrap();
        let parsed = SceneConfig::from_str_with_format(&text, Format::Ron).unwrap();
        assert_eq!(parsed, scene);
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let text = r#"
            [[shapes]]
            name = "ball"
            sweep_radius = 0.5

            [[particles]]
            type = "ball"
            position = [0.0, 0.0, 0.0]

            [[particles]]
            type = "ball"
            position = [0.0, 0.9, 0.0]
        "#;
        let config = SceneConfig::from_str_with_format(text, Format::Toml).unwrap();
        assert_eq!(config.max_verts, max_verts::HUGE);
        assert_eq!(config.box_config, BoxConfig::default());
        assert_eq!(config.particles[0].orientation, [1.0, 0.0, 0.0, 0.0]);

        let scene = config.build().unwrap();
        assert!(scene.references.is_none());
        let report = scene.overlap_system().find_overlaps(&scene.positions, &scene.instances).unwrap();
        assert_eq!(report.pairs, vec![OverlapPair::new(0, 1)]);
    }

    #[test]
    fn test_build_scene() {
        let scene = two_cubes().build().unwrap();
        assert_eq!(scene.registry.len(), 2);
        assert_eq!(scene.positions.len(), 3);
        assert!(scene.registry.params(scene.instances[2].type_id).unwrap().ignores_overlaps());
        // Only one particle has a lattice site
        assert!(scene.references.is_none());

        let report = scene.overlap_system().find_overlaps(&scene.positions, &scene.instances).unwrap();
        assert_eq!(report.pairs, vec![OverlapPair::new(0, 1)]);
    }

    #[test]
    fn test_build_errors() {
        let mut config = two_cubes();
        config.particles.push(ParticleConfig::new("cylinder", [0.0; 3]));
        assert!(matches!(config.build(), Err(ConfigError::Shape(ShapeError::UnknownType(_)))));

        let mut config = two_cubes();
        config.particles[1].orientation = [0.0; 4];
        assert!(matches!(config.build(), Err(ConfigError::InvalidOrientation { index: 1 })));

        let mut config = two_cubes();
        config.box_config.lengths[2] = 0.0;
        assert!(matches!(config.build(), Err(ConfigError::Box(_))));

        let mut config = two_cubes();
        config.max_verts = 4;
        assert!(matches!(
            config.build(),
            Err(ConfigError::Shape(ShapeError::TooManyVertices { count: 8, max: 4 }))
        ));
    }

    #[test]
    fn test_bundled_scene_file() {
        let path = concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../tools/overlap_check/scenes/rounded_cubes.toml"
        );
        let mut scene = SceneConfig::load_from_file(path).unwrap().build().unwrap();
        assert_eq!(scene.registry.max_verts(), max_verts::SMALL);
        assert!(scene.registry.params(scene.instances[4].type_id).unwrap().ignores_overlaps());

        let report = scene.overlap_system().find_overlaps(&scene.positions, &scene.instances).unwrap();
        assert_eq!(report.pairs, vec![OverlapPair::new(0, 1)]);

        let references = scene.references.clone().unwrap();
        let shift = remove_drift(&mut scene.positions, &mut scene.images, &references, &scene.box_dim).unwrap();
        assert!((shift.x + 0.300001 / 5.0).abs() < 1e-12);
        assert!(shift.y.abs() < 1e-12);
    }

    #[test]
    fn test_drift_removal_keeps_image_flags() {
        let mut config = SceneConfig {
            box_config: BoxConfig { lengths: [4.0, 4.0, 4.0] },
            shapes: vec![ShapeTypeConfig {
                name: "ball".into(),
                sweep_radius: 0.25,
                diameter: None,
                ignore: IgnoreFlags::empty(),
                vertices: Vec::new(),
            }],
            particles: vec![
                ParticleConfig {
                    reference: Some([1.5, 0.0, 0.0]),
                    image: [1, 0, 0],
                    ..ParticleConfig::new("ball", [-1.9, 0.0, 0.0])
                },
                ParticleConfig {
                    reference: Some([-1.5, 0.0, 0.0]),
                    ..ParticleConfig::new("ball", [-0.9, 0.0, 0.0])
                },
            ],
            ..SceneConfig::default()
        };
        let mut scene = config.build().unwrap();
        assert_eq!(scene.images, vec![[1, 0, 0], [0, 0, 0]]);

        let references = scene.references.clone().unwrap();
        let shift = remove_drift(&mut scene.positions, &mut scene.images, &references, &scene.box_dim).unwrap();
        assert!((shift.x - 0.6).abs() < 1e-12);
        // Particle 0 is pushed back across the lower face
        assert_eq!(scene.images, vec![[0, 0, 0], [0, 0, 0]]);

        config.store_particle_state(&scene);
        assert!((config.particles[0].position[0] - 1.5).abs() < 1e-12);
        assert!((config.particles[1].position[0] + 1.5).abs() < 1e-12);
        assert_eq!(config.particles[0].image, [0, 0, 0]);

        let text = config.to_string_with_format(Format::Toml).unwrap();
        assert!(!text.contains("image"));

        scene.images[1] = [0, -2, 1];
        config.store_particle_state(&scene);
        let text = config.to_string_with_format(Format::Toml).unwrap();
        let reloaded = SceneConfig::from_str_with_format(&text, Format::Toml).unwrap().build().unwrap();
        assert_eq!(reloaded.images, scene.images);
    }

    #[test]
    fn test_file_round_trip_and_extension() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("hpmc_overlap_scene_{}.ron", std::process::id()));
        let scene = two_cubes();
        scene.save_to_file(&path).unwrap();
        let loaded = SceneConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, scene);

        assert!(matches!(
            scene.save_to_file(dir.join("scene.json")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
