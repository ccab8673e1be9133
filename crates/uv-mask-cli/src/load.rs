//! OBJ loading into [`UvMesh`].

use std::path::Path;

use anyhow::{Context, Result, bail};
use nalgebra::{Point2, Point3};
use tracing::{debug, info};
use uv_mask::UvMesh;

/// Load an OBJ file as a single UV mesh.
///
/// Faces are triangulated and indexed so that each vertex carries exactly one
/// UV; seams therefore show up as duplicated positions. Every OBJ object
/// becomes one submesh, in file order.
pub fn load_obj(path: &Path) -> Result<UvMesh> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .with_context(|| format!("Failed to parse OBJ file {:?}", path))?;

    let mut mesh = UvMesh::new();

    for model in &models {
        let m = &model.mesh;
        let vertex_count = m.positions.len() / 3;
        if vertex_count == 0 {
            continue;
        }
        if m.texcoords.len() / 2 != vertex_count {
            bail!(
                "Object '{}' in {:?} has no texture coordinates",
                model.name,
                path
            );
        }

        let offset = mesh.uvs.len() as u32;
        let face_start = mesh.faces.len();

        mesh.positions.extend(m.positions.chunks_exact(3).map(|p| {
            Point3::new(p[0] as f64, p[1] as f64, p[2] as f64)
        }));
        mesh.uvs.extend(
            m.texcoords
                .chunks_exact(2)
                .map(|t| Point2::new(t[0] as f64, t[1] as f64)),
        );
        mesh.faces.extend(
            m.indices
                .chunks_exact(3)
                .map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]),
        );

        let face_count = mesh.faces.len() - face_start;
        debug!(object = %model.name, vertices = vertex_count, faces = face_count, "Loaded OBJ object");
        mesh = mesh.with_submesh(face_start, face_count);
    }

    if mesh.faces.is_empty() {
        bail!("No triangles found in {:?}", path);
    }

    info!(
        path = ?path,
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        objects = mesh.submeshes.len(),
        "Loaded mesh"
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_obj(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".obj").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_quad_with_seam() {
        // Two triangles sharing an edge in 3D but not in UV
        let file = write_obj(
            "o quad\n\
             v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\n\
             vt 0 0\nvt 0.4 0\nvt 0.4 0.4\nvt 0.6 0.6\nvt 0.6 1\n\
             f 1/1 2/2 3/3\nf 1/4 3/5 4/3\n",
        );
        let mesh = load_obj(file.path()).unwrap();
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.uvs.len(), mesh.positions.len());
        assert_eq!(mesh.submeshes.len(), 1);
        // Vertex 1 appears with two different UVs
        assert!(mesh.vertex_count() > 4);
    }

    #[test]
    fn test_objects_become_submeshes() {
        let file = write_obj(
            "o a\n\
             v 0 0 0\nv 1 0 0\nv 0 1 0\n\
             vt 0 0\nvt 0.4 0\nvt 0 0.4\n\
             f 1/1 2/2 3/3\n\
             o b\n\
             v 5 0 0\nv 6 0 0\nv 5 1 0\n\
             vt 0.6 0.6\nvt 1 0.6\nvt 0.6 1\n\
             f 4/4 5/5 6/6\n",
        );
        let mesh = load_obj(file.path()).unwrap();
        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.submeshes.len(), 2);
        assert_eq!(mesh.submeshes[1].start, 1);
        let analysis = uv_mask::partition_islands(&mesh, &Default::default()).unwrap();
        assert_eq!(analysis.island_count(), 2);
    }

    #[test]
    fn test_missing_texcoords_is_error() {
        let file = write_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        let err = load_obj(file.path()).unwrap_err();
        assert!(err.to_string().contains("texture coordinates"));
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_obj(Path::new("/nonexistent/mesh.obj")).is_err());
    }
}
