//! Shader program compilation and uniforms.

use crate::{math::Mat4, Error, Gl, Result};
use anyhow::Context as _;
use fnv::FnvHashMap;
use std::{fmt, fs, path::Path};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[must_use]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    #[inline]
    #[must_use]
    pub const fn gl_type(self) -> u32 {
        match self {
            Self::Vertex => glow::VERTEX_SHADER,
            Self::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// GLSL source for both stages of a program.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ShaderProgramSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderProgramSource {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Read each stage from its own file.
    pub fn from_paths(vertex: impl AsRef<Path>, fragment: impl AsRef<Path>) -> Result<Self> {
        let read = |path: &Path| {
            fs::read_to_string(path).with_context(|| format!("failed to read shader: {path:?}"))
        };
        Ok(Self {
            vertex: read(vertex.as_ref())?,
            fragment: read(fragment.as_ref())?,
        })
    }

    /// Split a single file into stages on `#shader vertex` and `#shader fragment` lines.
    ///
    /// Lines before the first marker are ignored.
    pub fn parse(source: &str) -> Result<Self> {
        let mut vertex: Option<String> = None;
        let mut fragment: Option<String> = None;
        let mut current = None;
        for line in source.lines() {
            if let Some(stage) = line.trim().strip_prefix("#shader") {
                current = match stage.trim() {
                    "vertex" => Some(ShaderStage::Vertex),
                    "fragment" => Some(ShaderStage::Fragment),
                    other => {
                        tracing::warn!("ignoring unknown shader section: `{other}`");
                        None
                    }
                };
                continue;
            }
            let target = match current {
                Some(ShaderStage::Vertex) => vertex.get_or_insert_with(String::new),
                Some(ShaderStage::Fragment) => fragment.get_or_insert_with(String::new),
                None => continue,
            };
            target.push_str(line);
            target.push('\n');
        }
        Ok(Self {
            vertex: vertex.ok_or(Error::MissingShaderStage(ShaderStage::Vertex))?,
            fragment: fragment.ok_or(Error::MissingShaderStage(ShaderStage::Fragment))?,
        })
    }

    /// Read and [parse](ShaderProgramSource::parse) a combined shader file.
    pub fn from_combined_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source =
            fs::read_to_string(path).with_context(|| format!("failed to read shader: {path:?}"))?;
        Self::parse(&source)
    }
}

/// Memoizes uniform locations by name, including the ones that don't exist.
#[derive(Debug, Clone)]
#[must_use]
pub struct UniformCache<L = glow::UniformLocation> {
    locations: FnvHashMap<String, Option<L>>,
}

impl<L> Default for UniformCache<L> {
    fn default() -> Self {
        Self {
            locations: FnvHashMap::default(),
        }
    }
}

impl<L: Clone> UniformCache<L> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached location for `name`, running `query` only on the first lookup.
    ///
    /// A uniform that is misspelled, or unused and stripped by the compiler, is reported once and
    /// then resolves to `None`.
    pub fn get_or_query(
        &mut self,
        name: &str,
        query: impl FnOnce(&str) -> Result<Option<L>>,
    ) -> Result<Option<L>> {
        if let Some(location) = self.locations.get(name) {
            return Ok(location.clone());
        }
        let location = query(name)?;
        if location.is_none() {
            tracing::warn!("uniform `{name}` doesn't exist");
        }
        self.locations.insert(name.to_owned(), location.clone());
        Ok(location)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// A linked shader program.
#[must_use]
pub struct Shader {
    gl: Gl,
    id: glow::Program,
    uniforms: UniformCache,
}

impl fmt::Debug for Shader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader")
            .field("id", &self.id)
            .field("uniforms", &self.uniforms.len())
            .finish_non_exhaustive()
    }
}

impl Shader {
    /// Compile and link a program from separate vertex and fragment files.
    pub fn from_paths(
        gl: &Gl,
        vertex: impl AsRef<Path>,
        fragment: impl AsRef<Path>,
    ) -> Result<Self> {
        Self::from_source(gl, &ShaderProgramSource::from_paths(vertex, fragment)?)
    }

    /// Compile and link a program from in-memory sources.
    pub fn from_source(gl: &Gl, source: &ShaderProgramSource) -> Result<Self> {
        let id = gl_call!(gl, create_program())?.map_err(Error::Create)?;
        // Owned before linking so a failure below deletes the program on drop.
        let shader = Self {
            gl: Gl::clone(gl),
            id,
            uniforms: UniformCache::new(),
        };
        link_program(gl, id, &source.vertex, &source.fragment)?;
        tracing::debug!("linked shader program {id:?}");
        Ok(shader)
    }

    #[inline]
    pub fn bind(&self) -> Result<()> {
        gl_call!(self.gl, use_program(Some(self.id)))
    }

    #[inline]
    pub fn unbind(&self) -> Result<()> {
        gl_call!(self.gl, use_program(None))
    }

    pub fn set_uniform_1i(&mut self, name: &str, value: i32) -> Result<()> {
        let location = self.uniform_location(name)?;
        gl_call!(self.gl, uniform_1_i32(location.as_ref(), value))
    }

    pub fn set_uniform_1f(&mut self, name: &str, value: f32) -> Result<()> {
        let location = self.uniform_location(name)?;
        gl_call!(self.gl, uniform_1_f32(location.as_ref(), value))
    }

    pub fn set_uniform_4f(&mut self, name: &str, v0: f32, v1: f32, v2: f32, v3: f32) -> Result<()> {
        let location = self.uniform_location(name)?;
        gl_call!(self.gl, uniform_4_f32(location.as_ref(), v0, v1, v2, v3))
    }

    pub fn set_uniform_mat4(&mut self, name: &str, matrix: &Mat4) -> Result<()> {
        let location = self.uniform_location(name)?;
        gl_call!(
            self.gl,
            uniform_matrix_4_f32_slice(location.as_ref(), false, matrix.as_slice())
        )
    }

    fn uniform_location(&mut self, name: &str) -> Result<Option<glow::UniformLocation>> {
        let (gl, program) = (&self.gl, self.id);
        self.uniforms
            .get_or_query(name, |name| gl_call!(gl, get_uniform_location(program, name)))
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        let _ = gl_call!(self.gl, delete_program(self.id));
    }
}

/// Deletes a GL object when dropped, so early returns through `?` don't leak it.
struct DeleteOnDrop<T: Copy, F: FnMut(T)> {
    id: T,
    delete: F,
}

impl<T: Copy, F: FnMut(T)> DeleteOnDrop<T, F> {
    fn new(id: T, delete: F) -> Self {
        Self { id, delete }
    }
}

impl<T: Copy, F: FnMut(T)> Drop for DeleteOnDrop<T, F> {
    fn drop(&mut self) {
        (self.delete)(self.id);
    }
}

fn compile_shader<'gl>(
    gl: &'gl Gl,
    stage: ShaderStage,
    source: &str,
) -> Result<DeleteOnDrop<glow::Shader, impl FnMut(glow::Shader) + 'gl>> {
    let id = gl_call!(gl, create_shader(stage.gl_type()))?.map_err(Error::Create)?;
    let shader = DeleteOnDrop::new(id, move |id| {
        let _ = gl_call!(gl, delete_shader(id));
    });
    gl_call!(gl, shader_source(id, source))?;
    gl_call!(gl, compile_shader(id))?;

    if !gl_call!(gl, get_shader_compile_status(id))? {
        let log = gl_call!(gl, get_shader_info_log(id))?;
        tracing::error!("failed to compile {stage} shader:\n{log}");
        return Err(Error::ShaderCompile { stage, log });
    }
    Ok(shader)
}

/// Compile both stages and link them into `program`. Stage objects are deleted on every path;
/// the caller owns `program`.
fn link_program(gl: &Gl, program: glow::Program, vertex: &str, fragment: &str) -> Result<()> {
    let vs = compile_shader(gl, ShaderStage::Vertex, vertex)?;
    let fs = compile_shader(gl, ShaderStage::Fragment, fragment)?;

    for shader in [vs.id, fs.id] {
        gl_call!(gl, attach_shader(program, shader))?;
    }
    gl_call!(gl, link_program(program))?;
    let linked = gl_call!(gl, get_program_link_status(program))?;
    for shader in [vs.id, fs.id] {
        gl_call!(gl, detach_shader(program, shader))?;
    }

    if !linked {
        let log = gl_call!(gl, get_program_info_log(program))?;
        tracing::error!("failed to link shader program:\n{log}");
        return Err(Error::ShaderLink(log));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const COMBINED: &str = "\
// leading comment
#shader vertex
#version 330 core
void main() {}
#shader fragment
#version 330 core
out vec4 color;
void main() { color = vec4(1.0); }
";

    #[test]
    fn parse_combined_source() {
        let source = ShaderProgramSource::parse(COMBINED).expect("valid source");
        assert_eq!(source.vertex, "#version 330 core\nvoid main() {}\n");
        assert!(source.fragment.starts_with("#version 330 core\nout vec4 color;\n"));
        assert!(!source.vertex.contains("leading comment"));
    }

    #[test]
    fn parse_missing_stage() {
        let err = ShaderProgramSource::parse("#shader vertex\nvoid main() {}\n")
            .expect_err("missing fragment");
        assert!(matches!(
            err,
            Error::MissingShaderStage(ShaderStage::Fragment)
        ));
        assert_eq!(
            err.to_string(),
            "shader source is missing a `#shader fragment` section"
        );
    }

    #[test]
    fn parse_ignores_unknown_sections() {
        let source = ShaderProgramSource::parse(
            "#shader vertex\nv\n#shader geometry\ng\n#shader fragment\nf\n",
        )
        .expect("valid source");
        assert_eq!(source, ShaderProgramSource::new("v\n", "f\n"));
    }

    #[test]
    fn read_missing_file() {
        let err = ShaderProgramSource::from_paths("does/not/exist.vert", "nope.frag")
            .expect_err("missing file");
        assert!(err.to_string().contains("does/not/exist.vert"));
    }

    #[test]
    fn read_separate_files() {
        let dir = std::env::temp_dir().join(format!("quad-engine-shader-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("temp dir");
        let vert = dir.join("basic.vert");
        let frag = dir.join("basic.frag");
        fs::write(&vert, "vertex source").expect("write vertex");
        fs::write(&frag, "fragment source").expect("write fragment");

        let source = ShaderProgramSource::from_paths(&vert, &frag).expect("readable files");
        assert_eq!(source.vertex, "vertex source");
        assert_eq!(source.fragment, "fragment source");

        fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn read_combined_file() {
        let path = std::env::temp_dir().join(format!(
            "quad-engine-combined-{}.shader",
            std::process::id()
        ));
        fs::write(&path, COMBINED).expect("write shader");
        let source = ShaderProgramSource::from_combined_path(&path).expect("readable file");
        fs::remove_file(&path).expect("cleanup");
        assert_eq!(source, ShaderProgramSource::parse(COMBINED).expect("valid source"));

        let err = ShaderProgramSource::from_combined_path("does/not/exist.shader")
            .expect_err("missing file");
        assert!(err.to_string().contains("does/not/exist.shader"));
    }

    #[test]
    fn stage_objects_are_deleted_on_early_return() {
        let deleted = Cell::new(Vec::new());
        let delete = |id: u32| {
            let mut ids = deleted.take();
            ids.push(id);
            deleted.set(ids);
        };
        let attach_both = |fail: bool| -> Result<()> {
            let _vs = DeleteOnDrop::new(1, delete);
            let _fs = DeleteOnDrop::new(2, delete);
            if fail {
                return Err(Error::ShaderLink("attach failed".into()));
            }
            Ok(())
        };

        assert!(attach_both(true).is_err());
        assert_eq!(deleted.take(), [2, 1]);
    }

    #[test]
    fn stage_objects_are_deleted_after_success() {
        let deleted = Cell::new(0);
        {
            let _vs = DeleteOnDrop::new(7_u32, |_| deleted.set(deleted.get() + 1));
            assert_eq!(deleted.get(), 0);
        }
        assert_eq!(deleted.get(), 1);
    }

    #[test]
    fn uniform_cache_queries_once() {
        let queries = Cell::new(0);
        let mut cache = UniformCache::<i32>::new();
        let query = |name: &str| {
            queries.set(queries.get() + 1);
            Ok((name == "u_Color").then_some(3))
        };

        assert_eq!(cache.get_or_query("u_Color", query).ok(), Some(Some(3)));
        assert_eq!(cache.get_or_query("u_Color", query).ok(), Some(Some(3)));
        assert_eq!(queries.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn uniform_cache_remembers_missing() {
        let queries = Cell::new(0);
        let mut cache = UniformCache::<i32>::new();
        let query = |_: &str| {
            queries.set(queries.get() + 1);
            Ok(None)
        };

        assert_eq!(cache.get_or_query("u_Colour", query).ok(), Some(None));
        assert_eq!(cache.get_or_query("u_Colour", query).ok(), Some(None));
        assert_eq!(queries.get(), 1);
        assert!(!cache.is_empty());
    }

    #[test]
    fn uniform_cache_does_not_store_failures() {
        let mut cache = UniformCache::<i32>::new();
        let result = cache.get_or_query("u_MVP", |_| Err(Error::Create("lost context".into())));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
