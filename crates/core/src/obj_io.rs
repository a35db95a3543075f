use std::io::{BufReader, Cursor};
use std::path::Path;

use crate::assets::{read_bytes, LoadError};
use crate::mesh::Mesh;

pub fn load_obj_surface(path: &Path) -> Result<Mesh, LoadError> {
    let data = read_bytes(path)?;
    let mesh = load_obj_surface_bytes(&data)?;
    tracing::debug!(
        "loaded surface {} ({} triangles)",
        path.display(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

pub fn load_obj_surface_bytes(data: &[u8]) -> Result<Mesh, LoadError> {
    let options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };
    let mut reader = BufReader::new(Cursor::new(data));
    let (models, _) = tobj::load_obj_buf(&mut reader, &options, |_path| {
        Ok((Vec::new(), Default::default()))
    })
    .map_err(|err| LoadError::Parse {
        what: "OBJ",
        message: err.to_string(),
    })?;
    build_mesh_from_models(models)
}

fn build_mesh_from_models(models: Vec<tobj::Model>) -> Result<Mesh, LoadError> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();
    let mut vertex_offset = 0u32;

    for model in models {
        let mesh = &model.mesh;
        if mesh.positions.len() % 3 != 0 {
            return Err(LoadError::Parse {
                what: "OBJ",
                message: "malformed positions".to_string(),
            });
        }
        let vertex_count = mesh.positions.len() / 3;

        positions.extend(mesh.positions.chunks_exact(3).map(|v| [v[0], v[1], v[2]]));
        indices.extend(mesh.indices.iter().map(|i| i + vertex_offset));
        vertex_offset += vertex_count as u32;
    }

    if indices.len() < 3 {
        return Err(LoadError::Empty { what: "OBJ" });
    }

    Ok(Mesh::with_positions_indices(positions, indices))
}
