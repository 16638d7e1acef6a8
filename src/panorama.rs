// panorama.rs — projection type and the sphere/tube selection rule

use crate::image_source::PanoramaImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionType {
    /// Wide-angle strip wrapped on a tube; no vertical look.
    #[default]
    Cylindrical,
    /// Full 2:1 equirectangular image wrapped on a sphere.
    Spherical,
}

impl ProjectionType {
    /// Absent image falls back to cylindrical.
    pub fn for_image(image: Option<&PanoramaImage>) -> Self {
        match image {
            Some(img) => select_type(img.width(), img.height()),
            None => ProjectionType::Cylindrical,
        }
    }

    pub fn i18n_key(self) -> &'static str {
        match self {
            ProjectionType::Cylindrical => "projection.cylindrical",
            ProjectionType::Spherical => "projection.spherical",
        }
    }
}

/// Spherical only for an exact 2:1 ratio; anything else is a tube.
pub fn select_type(width: u32, height: u32) -> ProjectionType {
    if height == 0 {
        return ProjectionType::Cylindrical;
    }
    if width as f64 / height as f64 == 2.0 {
        ProjectionType::Spherical
    } else {
        ProjectionType::Cylindrical
    }
}
