//! Binary glTF (GLB) output and input.
//!
//! Written files hold one mesh with one triangle primitive: `POSITION`,
//! optional `COLOR_0` (normalized RGBA8), and `u32` indices, bound to a
//! double-sided material so interior surfaces of holes stay visible.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;

use gltf::json;
use json::validation::{Checked::Valid, USize64};

use crate::error::{MeshError, Result};
use crate::geometry::{LoadedGeometry, SceneGeometry};
use crate::mesh::Mesh;

/// Encode a mesh as GLB bytes, tinting every vertex with `tint` if given.
pub fn to_glb_bytes(mesh: &Mesh, tint: Option<[u8; 4]>) -> Result<Vec<u8>> {
    if mesh.face_count() == 0 {
        return Err(MeshError::EmptyGeometry);
    }
    let vertex_count = mesh.vertex_count();

    let mut bin: Vec<u8> = Vec::new();
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for v in mesh.vertices() {
        for i in 0..3 {
            let c = v[i] as f32;
            min[i] = min[i].min(c);
            max[i] = max[i].max(c);
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    let positions_len = bin.len();

    let colors_offset = bin.len();
    if let Some(rgba) = tint {
        for _ in 0..vertex_count {
            bin.extend_from_slice(&rgba);
        }
    }
    let colors_len = bin.len() - colors_offset;

    let indices_offset = bin.len();
    for f in mesh.faces() {
        for i in f {
            bin.extend_from_slice(&i.to_le_bytes());
        }
    }
    let indices_len = bin.len() - indices_offset;
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let mut root = json::Root::default();
    let buffer = root.push(json::Buffer {
        byte_length: USize64::from(bin.len()),
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        uri: None,
    });

    let view = |offset: usize, length: usize, target: json::buffer::Target| json::buffer::View {
        buffer,
        byte_length: USize64::from(length),
        byte_offset: Some(USize64::from(offset)),
        byte_stride: None,
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        target: Some(Valid(target)),
    };
    let positions_view = view(0, positions_len, json::buffer::Target::ArrayBuffer);
    let colors_view = view(colors_offset, colors_len, json::buffer::Target::ArrayBuffer);
    let indices_view = view(indices_offset, indices_len, json::buffer::Target::ElementArrayBuffer);

    let positions_view = root.push(positions_view);
    let positions = root.push(accessor(
        positions_view,
        vertex_count,
        json::accessor::ComponentType::F32,
        json::accessor::Type::Vec3,
        false,
        Some((min, max)),
    ));

    let mut attributes = BTreeMap::new();
    attributes.insert(Valid(json::mesh::Semantic::Positions), positions);
    if tint.is_some() {
        let colors_view = root.push(colors_view);
        let colors = root.push(accessor(
            colors_view,
            vertex_count,
            json::accessor::ComponentType::U8,
            json::accessor::Type::Vec4,
            true,
            None,
        ));
        attributes.insert(Valid(json::mesh::Semantic::Colors(0)), colors);
    }

    let indices_view = root.push(indices_view);
    let indices = root.push(accessor(
        indices_view,
        mesh.face_count() * 3,
        json::accessor::ComponentType::U32,
        json::accessor::Type::Scalar,
        false,
        None,
    ));

    let material = root.push(json::Material {
        double_sided: true,
        ..Default::default()
    });

    let primitive = json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(indices),
        material: Some(material),
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    };
    let gltf_mesh = root.push(json::Mesh {
        extensions: Default::default(),
        extras: Default::default(),
        name: Some("part".to_string()),
        primitives: vec![primitive],
        weights: None,
    });
    let node = root.push(json::Node {
        mesh: Some(gltf_mesh),
        ..Default::default()
    });
    let scene = root.push(json::Scene {
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        nodes: vec![node],
    });
    root.scene = Some(scene);

    let json_string = json::serialize::to_string(&root).map_err(|e| MeshError::Encode {
        format: "glTF JSON",
        reason: e.to_string(),
    })?;
    let total = 12 + 8 + json_string.len().next_multiple_of(4) + 8 + bin.len();
    let glb = gltf::binary::Glb {
        header: gltf::binary::Header {
            magic: *b"glTF",
            version: 2,
            length: u32::try_from(total).map_err(|_| MeshError::Encode {
                format: "GLB",
                reason: format!("{total} bytes exceeds the 4 GiB binary glTF limit"),
            })?,
        },
        json: Cow::Owned(json_string.into_bytes()),
        bin: Some(Cow::Owned(bin)),
    };
    let mut out = Vec::with_capacity(total);
    glb.to_writer(&mut out)?;
    Ok(out)
}

fn accessor(
    view: json::Index<json::buffer::View>,
    count: usize,
    component: json::accessor::ComponentType,
    type_: json::accessor::Type,
    normalized: bool,
    bounds: Option<([f32; 3], [f32; 3])>,
) -> json::Accessor {
    let (min, max) = match bounds {
        Some((min, max)) => (
            Some(json::Value::from(min.to_vec())),
            Some(json::Value::from(max.to_vec())),
        ),
        None => (None, None),
    };
    json::Accessor {
        buffer_view: Some(view),
        byte_offset: Some(USize64(0)),
        count: USize64::from(count),
        component_type: Valid(json::accessor::GenericComponentType(component)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min,
        max,
        name: None,
        normalized,
        sparse: None,
    }
}

/// Write a GLB file.
pub fn write_glb(mesh: &Mesh, tint: Option<[u8; 4]>, path: &Path) -> Result<()> {
    let bytes = to_glb_bytes(mesh, tint)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// Read a glTF/GLB file as a scene with one entry per glTF mesh.
///
/// Only triangle primitives are kept; node transforms are not applied.
pub fn read_glb(path: &Path) -> Result<LoadedGeometry> {
    let (document, buffers, _images) = gltf::import(path)?;

    let mut geometries = Vec::new();
    for gltf_mesh in document.meshes() {
        let mut parts = Vec::new();
        for primitive in gltf_mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                continue;
            }
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let vertices: Vec<[f64; 3]> = positions
                .map(|p| [p[0] as f64, p[1] as f64, p[2] as f64])
                .collect();
            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..vertices.len() as u32).collect(),
            };
            let faces = indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect();
            parts.push(Mesh::new(vertices, faces)?);
        }
        let name = gltf_mesh
            .name()
            .map(str::to_owned)
            .unwrap_or_else(|| format!("mesh_{}", gltf_mesh.index()));
        geometries.push(SceneGeometry::new(name, Mesh::concatenate(&parts)?));
    }
    Ok(LoadedGeometry::Scene(geometries))
}
