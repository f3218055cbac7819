use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec3;
use log::{error, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_COLOR: Vec3 = Vec3::new(0.8, 0.8, 0.8);

/// A single tokenized line of an OBJ file.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjRecord {
    /// `v x y z`
    Vertex(Vec3),
    /// `f a b c ...` with the raw (1-based or negative) position indices.
    Face(Vec<i64>),
    /// Comments, blank lines and every tag this loader does not use.
    Other,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("vertex is missing its {0} component")]
    MissingComponent(&'static str),
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
    #[error("invalid vertex index `{0}`")]
    InvalidIndex(String),
    #[error("faces must reference at least 3 vertices, found {0}")]
    TooFewIndices(usize),
}

/// Splits one line into a tagged record without touching any mesh storage.
pub fn parse_record(line: &str) -> Result<ObjRecord, RecordError> {
    let mut parts = line.split_whitespace();
    match parts.next() {
        Some("v") => parse_vertex(parts).map(ObjRecord::Vertex),
        Some("f") => parse_face(parts).map(ObjRecord::Face),
        _ => Ok(ObjRecord::Other),
    }
}

fn parse_vertex<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Vec3, RecordError> {
    let mut component = |name: &'static str| -> Result<f32, RecordError> {
        let token = parts.next().ok_or(RecordError::MissingComponent(name))?;
        token
            .parse::<f32>()
            .map_err(|_| RecordError::InvalidNumber(token.to_string()))
    };
    let x = component("x")?;
    let y = component("y")?;
    let z = component("z")?;
    Ok(Vec3::new(x, y, z))
}

fn parse_face<'a>(parts: impl Iterator<Item = &'a str>) -> Result<Vec<i64>, RecordError> {
    let indices = parts
        .map(|part| {
            // `v`, `v/vt`, `v//vn` and `v/vt/vn` all lead with the position index.
            let position = part.split('/').next().unwrap_or_default();
            position
                .parse::<i64>()
                .map_err(|_| RecordError::InvalidIndex(part.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if indices.len() < 3 {
        return Err(RecordError::TooFewIndices(indices.len()));
    }
    Ok(indices)
}

/// Resolves a raw OBJ index against the `count` vertices defined so far.
fn resolve_index(index: i64, count: usize) -> Option<u32> {
    let resolved = if index > 0 {
        let zero_based = (index - 1) as usize;
        (zero_based < count).then_some(zero_based)
    } else if index < 0 {
        let back = index.unsigned_abs() as usize;
        (back <= count).then(|| count - back)
    } else {
        None
    };
    resolved.and_then(|i| u32::try_from(i).ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Vec3,
    /// Normalized sum of the normals of every face touching this vertex.
    pub normal: Vec3,
}

/// Triangle as three 0-based vertex indices.
pub type Face = [u32; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NormalMode {
    /// Smooth shading from the accumulated per-vertex normals.
    #[default]
    Vertex,
    /// Flat shading from the per-face normals.
    Face,
}

impl NormalMode {
    pub fn label(self) -> &'static str {
        match self {
            NormalMode::Vertex => "vertex",
            NormalMode::Face => "face",
        }
    }
}

/// Triangle mesh loaded from an OBJ file together with its normals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    faces: Vec<Face>,
    face_normals: Vec<Vec3>,
    indices: Vec<u32>,
    normal_mode: NormalMode,
    color: Vec3,
}

impl Default for Mesh {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            face_normals: Vec::new(),
            indices: Vec::new(),
            normal_mode: NormalMode::Vertex,
            color: DEFAULT_COLOR,
        }
    }
}

impl Mesh {
    /// Loads a mesh from disk, logging and returning an empty mesh on failure.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(mesh) => {
                info!(
                    "loaded mesh {} ({} vertices, {} faces)",
                    path.display(),
                    mesh.vertex_count(),
                    mesh.face_count()
                );
                mesh
            }
            Err(err) => {
                error!("failed to load mesh {}: {err:?}", path.display());
                Self::default()
            }
        }
    }

    /// Loads a mesh from disk, reporting I/O failures to the caller.
    pub fn try_load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("unable to read {}", path.display()))?;
        // Invalid UTF-8 becomes U+FFFD so only the affected records are dropped.
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }

    /// Builds a mesh from OBJ text. Malformed records are logged and tolerated.
    pub fn parse(data: &str) -> Self {
        let mut mesh = Self::default();

        for (line_no, line) in data.lines().enumerate() {
            match parse_record(line) {
                Ok(ObjRecord::Vertex(position)) => mesh.push_vertex(position),
                Ok(ObjRecord::Face(raw)) => mesh.push_polygon(&raw, line_no + 1),
                Ok(ObjRecord::Other) => {}
                Err(err) if line.split_whitespace().next() == Some("v") => {
                    // Keep the slot so later face indices still line up.
                    warn!("line {}: {err}; using the origin", line_no + 1);
                    mesh.push_vertex(Vec3::ZERO);
                }
                Err(err) => warn!("line {}: {err}; skipping face", line_no + 1),
            }
        }

        mesh.compute_normals();
        mesh
    }

    fn push_vertex(&mut self, position: Vec3) {
        self.vertices.push(Vertex {
            position,
            normal: Vec3::ZERO,
        });
    }

    fn push_polygon(&mut self, raw: &[i64], line_no: usize) {
        let count = self.vertices.len();
        let Some(resolved) = raw
            .iter()
            .map(|&index| resolve_index(index, count))
            .collect::<Option<Vec<u32>>>()
        else {
            warn!("line {line_no}: face references an undefined vertex; skipping face");
            return;
        };
        for i in 1..resolved.len() - 1 {
            let face = [resolved[0], resolved[i], resolved[i + 1]];
            self.faces.push(face);
            self.indices.extend_from_slice(&face);
        }
    }

    fn compute_normals(&mut self) {
        self.face_normals = Vec::with_capacity(self.faces.len());
        for face in &self.faces {
            let [p1, p2, p3] = face.map(|i| self.vertices[i as usize].position);
            let normal = (p2 - p1).cross(p3 - p1).normalize_or_zero();
            self.face_normals.push(normal);
            for &i in face {
                self.vertices[i as usize].normal += normal;
            }
        }
        for vertex in &mut self.vertices {
            if vertex.normal.length() > 0.0 {
                vertex.normal = vertex.normal.normalize();
            }
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Per-face normals, parallel to [`Mesh::faces`].
    pub fn face_normals(&self) -> &[Vec3] {
        &self.face_normals
    }

    /// Flattened face list for indexed draws.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn normal_mode(&self) -> NormalMode {
        self.normal_mode
    }

    pub fn color(&self) -> Vec3 {
        self.color
    }

    pub fn set_color(&mut self, color: Vec3) {
        self.color = color;
    }

    /// Switches between smooth and flat normals and returns the new mode.
    ///
    /// Callers must re-upload [`Mesh::interleaved_vertices`] afterwards.
    pub fn toggle_normal_mode(&mut self) -> NormalMode {
        self.normal_mode = match self.normal_mode {
            NormalMode::Vertex => NormalMode::Face,
            NormalMode::Face => NormalMode::Vertex,
        };
        self.normal_mode
    }

    /// Normals to shade with in the current mode, one per vertex.
    ///
    /// In face mode every face overwrites its three slots in face order, so a
    /// shared vertex keeps the normal of the last face that references it.
    pub fn shading_normals(&self) -> Vec<Vec3> {
        match self.normal_mode {
            NormalMode::Vertex => self.vertices.iter().map(|v| v.normal).collect(),
            NormalMode::Face => {
                let mut normals = vec![Vec3::ZERO; self.vertices.len()];
                for (face, normal) in self.faces.iter().zip(&self.face_normals) {
                    for &i in face {
                        normals[i as usize] = *normal;
                    }
                }
                normals
            }
        }
    }

    /// Interleaved `position.xyz, normal.xyz` array for the current mode.
    pub fn interleaved_vertices(&self) -> Vec<f32> {
        let mut data = Vec::with_capacity(self.vertices.len() * 6);
        for (vertex, normal) in self.vertices.iter().zip(self.shading_normals()) {
            data.extend_from_slice(&vertex.position.to_array());
            data.extend_from_slice(&normal.to_array());
        }
        data
    }

    pub fn randomize_color(&mut self) {
        self.randomize_color_with(&mut rand::thread_rng());
    }

    pub fn randomize_color_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.color = Vec3::new(rng.gen(), rng.gen(), rng.gen());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use once_cell::sync::Lazy;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;
    use tempfile::NamedTempFile;

    // Two triangles sharing the edge between vertices 1 and 2.
    static HINGE_OBJ: Lazy<String> = Lazy::new(|| {
        "# hinge\nv 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\nf 1 2 3\nf 1 4 2\n".to_string()
    });

    fn assert_vec_close(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-5, "{a:?} != {b:?}");
    }

    #[test]
    fn tokenizes_records() {
        assert_eq!(
            parse_record("v 1 2.5 -3"),
            Ok(ObjRecord::Vertex(Vec3::new(1.0, 2.5, -3.0)))
        );
        assert_eq!(parse_record("f 1 2 3"), Ok(ObjRecord::Face(vec![1, 2, 3])));
        assert_eq!(
            parse_record("f 1/4/7 2//8 3/6"),
            Ok(ObjRecord::Face(vec![1, 2, 3]))
        );
        assert_eq!(parse_record("vn 0 1 0"), Ok(ObjRecord::Other));
        assert_eq!(parse_record("# comment"), Ok(ObjRecord::Other));
        assert_eq!(parse_record(""), Ok(ObjRecord::Other));
    }

    #[test]
    fn tokenizer_reports_malformed_fields() {
        assert_eq!(
            parse_record("v 1 2"),
            Err(RecordError::MissingComponent("z"))
        );
        assert_eq!(
            parse_record("v 1 nope 2"),
            Err(RecordError::InvalidNumber("nope".to_string()))
        );
        assert_eq!(parse_record("f 1 2"), Err(RecordError::TooFewIndices(2)));
        assert!(matches!(
            parse_record("f 1 x 3"),
            Err(RecordError::InvalidIndex(_))
        ));
    }

    #[test]
    fn single_triangle_produces_face_normal_and_zero_based_indices() {
        let mesh = Mesh::parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n");
        assert_eq!(mesh.faces(), &[[0, 1, 2]]);
        assert_eq!(mesh.indices(), &[0, 1, 2]);
        assert_vec_close(mesh.face_normals()[0], Vec3::Z);
        for vertex in mesh.vertices() {
            assert_vec_close(vertex.normal, Vec3::Z);
        }
    }

    #[test]
    fn index_buffer_flattens_faces_in_order() {
        let mesh = Mesh::parse(&HINGE_OBJ);
        assert_eq!(mesh.indices().len(), 3 * mesh.face_count());
        let flattened: Vec<u32> = mesh.faces().iter().flatten().copied().collect();
        assert_eq!(mesh.indices(), flattened.as_slice());
    }

    #[test]
    fn shared_vertex_normals_depend_on_mode() {
        let mut mesh = Mesh::parse(&HINGE_OBJ);
        assert_vec_close(mesh.face_normals()[0], Vec3::Z);
        assert_vec_close(mesh.face_normals()[1], Vec3::Y);

        let smooth = mesh.shading_normals();
        let blended = (Vec3::Z + Vec3::Y).normalize();
        assert_vec_close(smooth[0], blended);
        assert_vec_close(smooth[1], blended);
        assert_vec_close(smooth[2], Vec3::Z);
        assert_vec_close(smooth[3], Vec3::Y);

        assert_eq!(mesh.toggle_normal_mode(), NormalMode::Face);
        let flat = mesh.shading_normals();
        assert_vec_close(flat[0], Vec3::Y);
        assert_vec_close(flat[1], Vec3::Y);
        assert_vec_close(flat[2], Vec3::Z);
        assert_vec_close(flat[3], Vec3::Y);
    }

    #[test]
    fn toggling_twice_restores_vertex_normals_exactly() {
        let mut mesh = Mesh::parse(&HINGE_OBJ);
        let before = mesh.interleaved_vertices();
        mesh.toggle_normal_mode();
        assert_ne!(mesh.interleaved_vertices(), before);
        mesh.toggle_normal_mode();
        let after = mesh.interleaved_vertices();
        let bits = |data: &[f32]| data.iter().map(|f| f.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&after), bits(&before));
    }

    #[test]
    fn toggling_keeps_positions_and_indices() {
        let mut mesh = Mesh::parse(&HINGE_OBJ);
        let indices = mesh.indices().to_vec();
        let faces = mesh.faces().to_vec();
        mesh.toggle_normal_mode();
        assert_eq!(mesh.indices(), indices.as_slice());
        assert_eq!(mesh.faces(), faces.as_slice());
        for (chunk, vertex) in mesh
            .interleaved_vertices()
            .chunks_exact(6)
            .zip(mesh.vertices())
        {
            assert_eq!(Vec3::from_slice(&chunk[..3]), vertex.position);
        }
    }

    #[test]
    fn isolated_vertices_keep_zero_normals() {
        let mesh = Mesh::parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nv 5 5 5\nf 1 2 3\n");
        assert_eq!(mesh.vertices()[3].normal, Vec3::ZERO);
    }

    #[test]
    fn degenerate_face_has_zero_normal() {
        let mesh = Mesh::parse("v 0 0 0\nv 1 0 0\nv 2 0 0\nf 1 2 3\n");
        assert_eq!(mesh.face_normals()[0], Vec3::ZERO);
        assert!(mesh.vertices().iter().all(|v| v.normal == Vec3::ZERO));
    }

    #[test]
    fn polygons_are_fan_triangulated() {
        let mesh = Mesh::parse("v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n");
        assert_eq!(mesh.faces(), &[[0, 1, 2], [0, 2, 3]]);
        assert_eq!(mesh.indices().len(), 6);
    }

    #[test]
    fn negative_indices_count_back_from_latest_vertex() {
        let mesh = Mesh::parse("v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n");
        assert_eq!(mesh.faces(), &[[0, 1, 2]]);
    }

    #[test]
    fn malformed_records_are_tolerated() {
        let obj = "v 0 0 0\nv 1 oops 0\nv 0 1 0\nf 1 2 9\nf 0 1 2\nf 1 2\nf 1 2 3\n";
        let mesh = Mesh::parse(obj);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.vertices()[1].position, Vec3::ZERO);
        assert_eq!(mesh.faces(), &[[0, 1, 2]]);
    }

    #[test]
    fn faces_cannot_reference_later_vertices() {
        let mesh = Mesh::parse("v 0 0 0\nv 1 0 0\nf 1 2 3\nv 0 1 0\n");
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn missing_file_yields_empty_mesh() {
        let mesh = Mesh::load("definitely/not/here.obj");
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.face_count(), 0);
        assert!(mesh.is_empty());
        assert!(Mesh::try_load("definitely/not/here.obj").is_err());
    }

    #[test]
    fn loads_mesh_from_disk() {
        let mut file = NamedTempFile::new().expect("temp obj");
        file.write_all(HINGE_OBJ.as_bytes()).expect("write obj");
        let mesh = Mesh::load(file.path());
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
    }

    #[test]
    fn loads_mesh_with_latin1_comment() {
        let mut file = NamedTempFile::new().expect("temp obj");
        file.write_all(b"# caf\xe9 model\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")
            .expect("write obj");
        let mesh = Mesh::load(file.path());
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
    }

    #[test]
    fn random_color_stays_in_unit_cube() {
        let mut mesh = Mesh::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..32 {
            mesh.randomize_color_with(&mut rng);
            let color = mesh.color();
            assert!(color.cmpge(Vec3::ZERO).all() && color.cmplt(Vec3::ONE).all());
        }
    }
}
