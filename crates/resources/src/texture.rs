//! Texture tables and asynchronous texture loading.
//!
//! A [`TextureSet`] names the images the editor samples from: six cubemap
//! faces for reflections and the skybox, plus flat textures addressed by
//! layer index. A [`TextureLoader`] turns load requests into
//! [`TextureEvent`]s that arrive later, one per image and in any order.
//! Nothing waits on a load: until an image's event has been consumed the
//! renderer simply samples an empty texture.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::error::ResourceResult;

/// Face of a cubemap, in upload order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    /// All faces in upload order: +X, -X, +Y, -Y, +Z, -Z.
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];

    /// File stem used by the bundled texture directories.
    pub const fn file_stem(self) -> &'static str {
        match self {
            CubeFace::PositiveX => "positive-x",
            CubeFace::NegativeX => "negative-x",
            CubeFace::PositiveY => "positive-y",
            CubeFace::NegativeY => "negative-y",
            CubeFace::PositiveZ => "positive-z",
            CubeFace::NegativeZ => "negative-z",
        }
    }
}

/// Where a decoded image goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    CubemapFace(CubeFace),
    Layer(u32),
}

/// Six cubemap face images ordered as [`CubeFace::ALL`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CubemapFaces {
    pub faces: [PathBuf; 6],
    /// Expected edge length of every face, in pixels.
    pub face_size: u32,
}

impl CubemapFaces {
    /// Faces named `<stem>.<extension>` inside `dir`.
    pub fn in_directory(dir: impl AsRef<Path>, extension: &str, face_size: u32) -> Self {
        let dir = dir.as_ref();
        Self {
            faces: CubeFace::ALL.map(|face| dir.join(format!("{}.{extension}", face.file_stem()))),
            face_size,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (CubeFace, &Path)> {
        CubeFace::ALL
            .into_iter()
            .zip(self.faces.iter().map(PathBuf::as_path))
    }
}

/// A flat texture bound to a layer index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayerTexture {
    pub path: PathBuf,
    pub layer: u32,
}

/// Flat-texture layers 0..=5 hold the cubemap faces in this order, matching
/// the per-face layer the cube generator writes.
const FACE_LAYER_ORDER: [CubeFace; 6] = [
    CubeFace::NegativeX,
    CubeFace::PositiveX,
    CubeFace::NegativeZ,
    CubeFace::PositiveZ,
    CubeFace::NegativeY,
    CubeFace::PositiveY,
];

/// Layer of the sphere texture.
pub const SPHERE_LAYER: u32 = 6;
/// Layer of the default surface texture.
pub const SURFACE_LAYER: u32 = 7;
/// Layer of the default bump map.
pub const BUMP_LAYER: u32 = 8;

/// A named table of textures.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureSet {
    pub name: &'static str,
    pub cubemap: CubemapFaces,
    pub layers: Vec<LayerTexture>,
}

impl TextureSet {
    /// Names of the bundled tables.
    pub const BUILTIN: [&'static str; 4] = ["sky", "mountain", "debug", "dreese"];

    /// Looks up a bundled table relative to `root`.
    pub fn builtin(name: &str, root: impl AsRef<Path>) -> Option<Self> {
        let (name, sphere, face_size) = match name {
            "sky" => ("sky", "sphere-dreese.jpg", 512),
            "mountain" => ("mountain", "sphere-dreese.jpg", 512),
            "debug" => ("debug", "sphere-debug.jpg", 512),
            "dreese" => ("dreese", "sphere-dreese.jpg", 1024),
            _ => return None,
        };
        Some(Self::with_layout(name, root.as_ref(), sphere, face_size))
    }

    fn with_layout(name: &'static str, root: &Path, sphere: &str, face_size: u32) -> Self {
        let cubemap_dir = root.join(format!("cubemap-{name}"));
        let cubemap = CubemapFaces::in_directory(&cubemap_dir, "jpg", face_size);

        let mut layers: Vec<LayerTexture> = FACE_LAYER_ORDER
            .iter()
            .zip(0..)
            .map(|(face, layer)| LayerTexture {
                path: cubemap_dir.join(format!("{}.jpg", face.file_stem())),
                layer,
            })
            .collect();
        layers.extend([
            LayerTexture {
                path: root.join(sphere),
                layer: SPHERE_LAYER,
            },
            LayerTexture {
                path: root.join("texture-1.jpg"),
                layer: SURFACE_LAYER,
            },
            LayerTexture {
                path: root.join("texture-1-bump.jpg"),
                layer: BUMP_LAYER,
            },
        ]);

        Self {
            name,
            cubemap,
            layers,
        }
    }
}

/// Decoded RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Completion of one image request.
#[derive(Debug)]
pub enum TextureEvent {
    Loaded {
        target: TextureTarget,
        image: TextureImage,
    },
    Failed {
        target: TextureTarget,
        error: String,
    },
}

impl TextureEvent {
    pub fn target(&self) -> TextureTarget {
        match self {
            TextureEvent::Loaded { target, .. } | TextureEvent::Failed { target, .. } => *target,
        }
    }
}

/// Loads texture images without blocking the caller.
pub trait TextureLoader {
    /// Requests a single image for `target`.
    fn request(&mut self, target: TextureTarget, path: &Path);

    /// Drains the events of requests that have completed since the last
    /// call. Never blocks.
    fn poll(&mut self) -> Vec<TextureEvent>;

    /// Requests all six faces of a cubemap.
    fn request_cubemap(&mut self, faces: &CubemapFaces) {
        for (face, path) in faces.iter() {
            self.request(TextureTarget::CubemapFace(face), path);
        }
    }

    /// Requests a flat texture for `layer`.
    fn request_layer(&mut self, path: &Path, layer: u32) {
        self.request(TextureTarget::Layer(layer), path);
    }

    /// Requests a whole table.
    fn request_set(&mut self, set: &TextureSet) {
        self.request_cubemap(&set.cubemap);
        for layer in &set.layers {
            self.request_layer(&layer.path, layer.layer);
        }
    }
}

/// Decodes images with the `image` crate on worker threads.
#[derive(Debug)]
pub struct ImageTextureLoader {
    sender: Sender<TextureEvent>,
    receiver: Receiver<TextureEvent>,
}

impl Default for ImageTextureLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageTextureLoader {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }
}

/// Reads and decodes an image file into RGBA8.
pub fn decode_image(path: &Path) -> ResourceResult<TextureImage> {
    let image = image::open(path)?.into_rgba8();
    Ok(TextureImage {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

impl TextureLoader for ImageTextureLoader {
    fn request(&mut self, target: TextureTarget, path: &Path) {
        let sender = self.sender.clone();
        let path = path.to_path_buf();
        thread::spawn(move || {
            let event = match decode_image(&path) {
                Ok(image) => TextureEvent::Loaded { target, image },
                Err(err) => TextureEvent::Failed {
                    target,
                    error: format!("{}: {err}", path.display()),
                },
            };
            // The loader may have been dropped; nobody is left to care.
            let _ = sender.send(event);
        });
    }

    fn poll(&mut self) -> Vec<TextureEvent> {
        self.receiver.try_iter().collect()
    }
}

/// Tracks which texture targets have been populated.
#[derive(Debug, Default)]
pub struct TextureRegistry {
    resident: HashSet<TextureTarget>,
    failed: HashSet<TextureTarget>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed request.
    pub fn record(&mut self, event: &TextureEvent) {
        match event {
            TextureEvent::Loaded { target, image } => {
                tracing::debug!(
                    "Texture {:?} resident ({}x{})",
                    target,
                    image.width,
                    image.height
                );
                self.failed.remove(target);
                self.resident.insert(*target);
            }
            TextureEvent::Failed { target, error } => {
                tracing::warn!("Texture {:?} failed to load: {}", target, error);
                self.failed.insert(*target);
            }
        }
    }

    pub fn is_resident(&self, target: TextureTarget) -> bool {
        self.resident.contains(&target)
    }

    pub fn has_failed(&self, target: TextureTarget) -> bool {
        self.failed.contains(&target)
    }

    /// Whether all six cubemap faces are resident.
    pub fn cubemap_complete(&self) -> bool {
        CubeFace::ALL
            .iter()
            .all(|face| self.is_resident(TextureTarget::CubemapFace(*face)))
    }
}
