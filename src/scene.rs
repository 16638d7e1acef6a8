// scene.rs — the single geometry node the panorama is projected onto

use crate::image_source::PanoramaImage;
use crate::mesh::{build_sphere, build_tube, Mesh};
use crate::panorama::ProjectionType;

/// Radius of the sphere or tube, in world units.
pub const RADIUS: f32 = 10.0;
pub const SPHERE_SEGMENTS: usize = 300;
pub const TUBE_HEIGHT_SEGMENTS: usize = 50;
pub const TUBE_RADIAL_SEGMENTS: usize = 300;

/// How the panorama texture is applied to the surface.
#[derive(Debug, Clone)]
pub struct Material {
    pub image: PanoramaImage,
    /// Multiplies the texture coordinates; `x = -1` mirrors horizontally.
    pub uv_scale: [f32; 2],
    pub wrap_u: wgpu::AddressMode,
    pub filter: wgpu::FilterMode,
    pub cull: wgpu::Face,
}

impl Material {
    /// Mirrored, repeating, nearest-filtered, seen from inside.
    pub fn interior(image: PanoramaImage) -> Self {
        Self {
            image,
            uv_scale: [-1.0, 1.0],
            wrap_u: wgpu::AddressMode::Repeat,
            filter: wgpu::FilterMode::Nearest,
            cull: wgpu::Face::Front,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeometryNode {
    pub projection: ProjectionType,
    pub mesh: Mesh,
    pub material: Material,
}

impl GeometryNode {
    pub fn build(
        projection: ProjectionType,
        image: &PanoramaImage,
        fov_height: f32,
        radius: f32,
    ) -> Self {
        let mesh = match projection {
            ProjectionType::Spherical => build_sphere(radius, SPHERE_SEGMENTS),
            ProjectionType::Cylindrical => build_tube(
                radius,
                fov_height,
                TUBE_HEIGHT_SEGMENTS,
                TUBE_RADIAL_SEGMENTS,
            ),
        };

        Self {
            projection,
            mesh,
            material: Material::interior(image.clone()),
        }
    }
}

/// Owns zero or one geometry node. `revision` changes on every swap so the
/// renderer knows when to re-upload.
#[derive(Debug, Default)]
pub struct Scene {
    geometry: Option<GeometryNode>,
    revision: u64,
}

impl Scene {
    pub fn geometry(&self) -> Option<&GeometryNode> {
        self.geometry.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Builds the replacement node first, then swaps it in. No image means no change.
    pub fn rebuild_geometry(
        &mut self,
        projection: ProjectionType,
        image: Option<&PanoramaImage>,
        fov_height: f32,
        radius: f32,
    ) -> bool {
        let Some(image) = image else {
            return false;
        };

        let node = GeometryNode::build(projection, image, fov_height, radius);
        log::debug!(
            "geometry rebuilt as {:?}: {} vertices, {} indices",
            projection,
            node.mesh.vertices.len(),
            node.mesh.indices.len()
        );

        // old node dropped here
        self.geometry = Some(node);
        self.revision += 1;
        true
    }
}
