//! The satellite model that rides along with the camera.
//!
//! It's only needed once the user first flies to the satellite moon, so it's
//! loaded lazily, off the frame loop, and at most once.

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{Receiver, TryRecvError};
use log::{error, info};
use nalgebra::{Matrix3, Matrix4, Point2, Point3, Vector3};

/// Plain triangle soup, ready to be turned into an engine mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropGeometry {
    pub coords: Vec<Point3<f32>>,
    pub normals: Option<Vec<Vector3<f32>>>,
    pub uvs: Option<Vec<Point2<f32>>>,
    pub faces: Vec<Point3<u16>>,
}

#[derive(Debug)]
pub enum PropLoadError {
    Gltf(gltf::Error),
    NoScene,
    NoGeometry,
    MissingPositions,
    TooManyVertices(usize),
    RequiredExtensions(Vec<String>),
    WorkerLost,
}

impl fmt::Display for PropLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropLoadError::Gltf(e) => write!(f, "could not read model: {}", e),
            PropLoadError::NoScene => write!(f, "model has no scenes"),
            PropLoadError::NoGeometry => write!(f, "model has no triangles"),
            PropLoadError::MissingPositions => write!(f, "model has a primitive without positions"),
            PropLoadError::TooManyVertices(n) => {
                write!(f, "model has {} vertices, at most {} are supported", n, MAX_VERTICES)
            }
            PropLoadError::RequiredExtensions(names) => write!(
                f,
                "model requires glTF extensions that can't be decoded here: {}",
                names.join(", ")
            ),
            PropLoadError::WorkerLost => write!(f, "loader thread exited without a result"),
        }
    }
}

impl Error for PropLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PropLoadError::Gltf(e) => Some(e),
            _ => None,
        }
    }
}

impl From<gltf::Error> for PropLoadError {
    fn from(e: gltf::Error) -> Self {
        PropLoadError::Gltf(e)
    }
}

pub type LoadResult = Result<PropGeometry, PropLoadError>;

/// Something that can fetch the prop without blocking the caller.
pub trait PropLoader {
    /// Kicks off one load. Exactly one result is sent on the returned channel,
    /// unless the worker dies, in which case the channel just disconnects.
    fn start(&mut self) -> Receiver<LoadResult>;
}

/// Reads a glTF / GLB file on a background thread.
#[derive(Debug, Clone)]
pub struct GltfLoader {
    path: PathBuf,
}

impl GltfLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        GltfLoader { path: path.into() }
    }
}

impl PropLoader for GltfLoader {
    fn start(&mut self) -> Receiver<LoadResult> {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        let path = self.path.clone();
        info!("Loading prop model from {}", path.display());

        let spawned = thread::Builder::new()
            .name(String::from("prop-loader"))
            .spawn(move || {
                // The receiver may be gone if the scene shut down first
                let _ = sender.send(read_gltf(&path));
            });
        if let Err(e) = spawned {
            // The sender went down with the closure, so the poll will see a
            // disconnected channel and reset.
            error!("Could not start prop loader: {}", e);
        }

        receiver
    }
}

const MAX_VERTICES: usize = u16::MAX as usize + 1;

/// Flattens every triangle primitive in the model's default scene into one
/// mesh, with node transforms baked in.
///
/// Compressed meshes (Draco, meshopt) can't be read. When a model fails to load
/// and declares required extensions, those are reported instead, since they
/// are almost certainly the cause.
pub fn read_gltf(path: &Path) -> LoadResult {
    read_plain_gltf(path).map_err(|e| match required_extensions(path) {
        Some(names) if !names.is_empty() => PropLoadError::RequiredExtensions(names),
        _ => e,
    })
}

fn required_extensions(path: &Path) -> Option<Vec<String>> {
    let bytes = fs::read(path).ok()?;
    let gltf = gltf::Gltf::from_slice_without_validation(&bytes).ok()?;
    Some(gltf.extensions_required().map(String::from).collect())
}

fn read_plain_gltf(path: &Path) -> LoadResult {
    let (document, buffers, _) = gltf::import(path)?;
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(PropLoadError::NoScene)?;

    let mut builder = GeometryBuilder::default();
    for node in scene.nodes() {
        builder.add_node(&node, &buffers, &Matrix4::identity())?;
    }
    builder.finish()
}

#[derive(Default)]
struct GeometryBuilder {
    coords: Vec<Point3<f32>>,
    normals: Vec<Vector3<f32>>,
    uvs: Vec<Point2<f32>>,
    indices: Vec<u32>,
    // Only kept if every primitive has them
    all_have_normals: bool,
    all_have_uvs: bool,
    num_primitives: usize,
}

impl GeometryBuilder {
    fn add_node(
        &mut self,
        node: &gltf::Node,
        buffers: &[gltf::buffer::Data],
        parent: &Matrix4<f32>,
    ) -> Result<(), PropLoadError> {
        let transform = parent * Matrix4::from(node.transform().matrix());

        if let Some(mesh) = node.mesh() {
            let normal_matrix = transform
                .fixed_slice::<3, 3>(0, 0)
                .into_owned()
                .try_inverse()
                .map(|m| m.transpose())
                .unwrap_or_else(Matrix3::identity);

            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    continue;
                }
                let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

                let base = self.coords.len() as u32;
                let positions = reader
                    .read_positions()
                    .ok_or(PropLoadError::MissingPositions)?;
                self.coords.extend(
                    positions.map(|p| transform.transform_point(&Point3::from(p))),
                );
                let count = self.coords.len() - base as usize;

                let first = self.num_primitives == 0;
                self.num_primitives += 1;

                match reader.read_normals() {
                    Some(normals) => {
                        self.all_have_normals = self.all_have_normals || first;
                        self.normals.extend(
                            normals.map(|n| (normal_matrix * Vector3::from(n)).normalize()),
                        );
                    }
                    None => self.all_have_normals = false,
                }

                match reader.read_tex_coords(0) {
                    Some(uvs) => {
                        self.all_have_uvs = self.all_have_uvs || first;
                        self.uvs.extend(uvs.into_f32().map(Point2::from));
                    }
                    None => self.all_have_uvs = false,
                }

                match reader.read_indices() {
                    Some(indices) => self.indices.extend(indices.into_u32().map(|i| base + i)),
                    None => self.indices.extend(base..base + count as u32),
                }
            }
        }

        for child in node.children() {
            self.add_node(&child, buffers, &transform)?;
        }
        Ok(())
    }

    fn finish(self) -> LoadResult {
        if self.indices.len() < 3 {
            return Err(PropLoadError::NoGeometry);
        }
        if self.coords.len() > MAX_VERTICES {
            return Err(PropLoadError::TooManyVertices(self.coords.len()));
        }

        let faces = self
            .indices
            .chunks_exact(3)
            .map(|t| Point3::new(t[0] as u16, t[1] as u16, t[2] as u16))
            .collect();

        Ok(PropGeometry {
            normals: self.all_have_normals.then(|| self.normals),
            uvs: self.all_have_uvs.then(|| self.uvs),
            coords: self.coords,
            faces,
        })
    }
}

enum PropState {
    NotLoaded,
    Loading {
        receiver: Receiver<LoadResult>,
        visible: bool,
    },
    Loaded {
        visible: bool,
    },
}

/// Lazily-loaded prop, in one of three states:
/// - not loaded: the next `activate` starts a load
/// - loading: further activations only change whether it'll be shown
/// - loaded: activations just show it again
pub struct AttachedProp {
    state: PropState,
    loader: Box<dyn PropLoader>,
}

impl AttachedProp {
    pub fn new(loader: Box<dyn PropLoader>) -> Self {
        AttachedProp {
            state: PropState::NotLoaded,
            loader,
        }
    }

    pub fn activate(&mut self) {
        match &mut self.state {
            PropState::NotLoaded => {}
            PropState::Loading { visible, .. } | PropState::Loaded { visible } => {
                *visible = true;
                return;
            }
        }

        self.state = PropState::Loading {
            receiver: self.loader.start(),
            visible: true,
        };
    }

    pub fn hide(&mut self) {
        match &mut self.state {
            PropState::NotLoaded => {}
            PropState::Loading { visible, .. } | PropState::Loaded { visible } => {
                *visible = false;
            }
        }
    }

    /// Checks on an in-flight load without blocking. Hands back the geometry
    /// exactly once, on the call that sees the load finish.
    pub fn poll(&mut self) -> Option<PropGeometry> {
        let (result, visible) = match &self.state {
            PropState::Loading { receiver, visible } => match receiver.try_recv() {
                Ok(result) => (result, *visible),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => (Err(PropLoadError::WorkerLost), *visible),
            },
            _ => return None,
        };

        match result {
            Ok(geometry) => {
                info!(
                    "Prop loaded: {} vertices, {} triangles",
                    geometry.coords.len(),
                    geometry.faces.len()
                );
                self.state = PropState::Loaded { visible };
                Some(geometry)
            }
            Err(e) => {
                error!("Failed to load prop: {}", e);
                self.state = PropState::NotLoaded;
                None
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, PropState::Loading { .. })
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, PropState::Loaded { .. })
    }

    /// Whether the prop is (or will be, once loaded) on screen.
    pub fn is_visible(&self) -> bool {
        match self.state {
            PropState::NotLoaded => false,
            PropState::Loading { visible, .. } | PropState::Loaded { visible } => visible,
        }
    }
}
