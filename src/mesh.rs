// mesh.rs — sphere and open tube meshes for the panorama surface
//
// Triangles are wound CCW as seen from outside, so a camera at the centre
// sees back faces; the pipeline culls front faces. U decreases with phi, so
// the texture reads correctly from outside and the material mirrors it.

use std::f32::consts::PI;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Grid of `rows x cols` quads; `(rows+1)*(cols+1)` vertices in row-major order.
fn grid_indices(rows: usize, cols: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(rows * cols * 6);
    for i in 0..rows {
        for j in 0..cols {
            let a = (i * (cols + 1) + j) as u32;
            let b = a + (cols + 1) as u32;

            // outward CCW
            indices.extend_from_slice(&[a, a + 1, b, b, a + 1, b + 1]);
        }
    }
    indices
}

pub fn build_sphere(radius: f32, segments: usize) -> Mesh {
    let lat = segments.max(2);
    let lon = segments.max(3);
    let mut vertices = Vec::with_capacity((lat + 1) * (lon + 1));

    for i in 0..=lat {
        let theta = PI * (i as f32) / (lat as f32);
        let y = radius * theta.cos();
        let sin_t = theta.sin();

        for j in 0..=lon {
            let phi = 2.0 * PI * (j as f32) / (lon as f32);
            vertices.push(Vertex {
                position: [radius * phi.cos() * sin_t, y, radius * phi.sin() * sin_t],
                uv: [1.0 - (j as f32) / (lon as f32), (i as f32) / (lat as f32)],
            });
        }
    }

    Mesh {
        vertices,
        indices: grid_indices(lat, lon),
    }
}

/// Zero-thickness cylinder wall around the Y axis, centred on the origin.
pub fn build_tube(radius: f32, height: f32, height_segments: usize, radial_segments: usize) -> Mesh {
    let rows = height_segments.max(1);
    let cols = radial_segments.max(3);
    let mut vertices = Vec::with_capacity((rows + 1) * (cols + 1));

    for i in 0..=rows {
        let v = (i as f32) / (rows as f32);
        let y = height * (0.5 - v);

        for j in 0..=cols {
            let phi = 2.0 * PI * (j as f32) / (cols as f32);
            vertices.push(Vertex {
                position: [radius * phi.cos(), y, radius * phi.sin()],
                uv: [1.0 - (j as f32) / (cols as f32), v],
            });
        }
    }

    Mesh {
        vertices,
        indices: grid_indices(rows, cols),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn length(p: [f32; 3]) -> f32 {
        Vec3::from_array(p).length()
    }

    /// Normal of the first non-degenerate triangle against the outward direction.
    fn outward_dot(mesh: &Mesh, around_axis: bool) -> f32 {
        for tri in mesh.indices.chunks(3) {
            let a = Vec3::from_array(mesh.vertices[tri[0] as usize].position);
            let b = Vec3::from_array(mesh.vertices[tri[1] as usize].position);
            let c = Vec3::from_array(mesh.vertices[tri[2] as usize].position);
            let n = (b - a).cross(c - a);
            if n.length() > 1e-6 {
                let centroid = (a + b + c) / 3.0;
                let radial = if around_axis {
                    Vec3::new(centroid.x, 0.0, centroid.z)
                } else {
                    centroid
                };
                return n.normalize().dot(radial.normalize());
            }
        }
        panic!("no non-degenerate triangle");
    }

    #[test]
    fn test_sphere_counts() {
        let mesh = build_sphere(10.0, 16);
        assert_eq!(mesh.vertices.len(), 17 * 17);
        assert_eq!(mesh.indices.len(), 6 * 16 * 16);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn test_sphere_vertices_on_radius() {
        let mesh = build_sphere(10.0, 24);
        for v in &mesh.vertices {
            assert!((length(v.position) - 10.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_tube_extent() {
        let mesh = build_tube(10.0, 6.0, 4, 12);
        assert_eq!(mesh.vertices.len(), 5 * 13);
        assert_eq!(mesh.indices.len(), 6 * 4 * 12);

        let top = mesh.vertices.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max);
        let bottom = mesh.vertices.iter().map(|v| v.position[1]).fold(f32::MAX, f32::min);
        assert!((top - 3.0).abs() < 1e-5);
        assert!((bottom + 3.0).abs() < 1e-5);

        for v in &mesh.vertices {
            let r = (v.position[0] * v.position[0] + v.position[2] * v.position[2]).sqrt();
            assert!((r - 10.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_winding_faces_outward() {
        assert!(outward_dot(&build_sphere(10.0, 32), false) > 0.9);
        assert!(outward_dot(&build_tube(10.0, 5.0, 2, 32), true) > 0.9);
    }

    #[test]
    fn test_uv_ranges() {
        let mesh = build_tube(10.0, 5.0, 3, 8);
        assert_eq!(mesh.vertices.first().unwrap().uv, [1.0, 0.0]);
        assert_eq!(mesh.vertices.last().unwrap().uv, [0.0, 1.0]);
        // top row has v = 0
        assert!(mesh.vertices[0].position[1] > 0.0);
    }
}
