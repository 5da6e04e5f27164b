//! Shader programs and name-addressed uniform binding
//!
//! A [`ShaderProgram`] is built from a vertex and a fragment GLSL source
//! file. Instead of driving a graphics API here, the program *reflects* its
//! uniform interface out of the source text: struct definitions are
//! expanded, arrays are unrolled, and every leaf uniform gets a location in
//! a name-addressed table (`pointLights[2].diffuse` style, matching GL
//! semantics where array/struct uniforms are addressed per element).
//!
//! Uniform values set through the program are recorded against that table.
//! A real backend consumes the recorded values; tests assert on them
//! directly. Setting a name the program does not declare is a logged,
//! non-fatal no-op — a missing visual effect beats aborting an interactive
//! session.

use crate::assets::ImageData;
use crate::foundation::math::{Mat4, Vec3};
use crate::render::backend::{RenderDevice, TextureHandle};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Shader loading and reflection errors
#[derive(Error, Debug)]
pub enum ShaderError {
    /// Shader source file missing or unreadable
    #[error("failed to read shader source {path}: {source}")]
    Io {
        /// Path that failed to read
        path: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Shader source could not be reflected
    #[error("shader reflection error: {0}")]
    Reflection(String),
}

/// A uniform value in one of the types the shader interface supports
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    /// Scalar int (also used for sampler units)
    Int(i32),
    /// Scalar float
    Float(f32),
    /// 3-component vector
    Vec3(Vec3),
    /// 4x4 matrix
    Mat4(Mat4),
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(v: Mat4) -> Self {
        Self::Mat4(v)
    }
}

/// Capability to upload uniforms by exact name
///
/// This is the seam between scene code (lights, matrices, materials) and
/// whatever owns the actual GPU program. Implementations must treat an
/// unknown name as non-fatal: log it and skip the write.
pub trait UniformBinder {
    /// Set the uniform `name` to `value`, or log and skip if unknown
    fn set_uniform(&mut self, name: &str, value: UniformValue);
}

/// A linked shader program with a reflected, name-addressed uniform table
#[derive(Debug)]
pub struct ShaderProgram {
    label: String,
    locations: HashMap<String, i32>,
    values: HashMap<String, UniformValue>,
    destroyed: bool,
}

impl ShaderProgram {
    /// Build a program from vertex and fragment shader source files
    ///
    /// Loading either file is the "compile" step; merging their reflected
    /// uniform tables is the "link" step (names shared between stages share
    /// a location, as in GL).
    pub fn from_files<P: AsRef<Path>>(vertex_path: P, fragment_path: P) -> Result<Self, ShaderError> {
        let vertex_src = read_source(vertex_path.as_ref())?;
        let fragment_src = read_source(fragment_path.as_ref())?;
        let label = vertex_path
            .as_ref()
            .file_stem()
            .map_or_else(|| "shader".to_string(), |s| s.to_string_lossy().into_owned());
        Self::from_sources_labeled(&vertex_src, &fragment_src, label)
    }

    /// Build a program from in-memory GLSL sources
    pub fn from_sources(vertex_src: &str, fragment_src: &str) -> Result<Self, ShaderError> {
        Self::from_sources_labeled(vertex_src, fragment_src, "shader".to_string())
    }

    fn from_sources_labeled(
        vertex_src: &str,
        fragment_src: &str,
        label: String,
    ) -> Result<Self, ShaderError> {
        let mut names = reflect_uniforms(vertex_src)?;
        for name in reflect_uniforms(fragment_src)? {
            if !names.contains(&name) {
                names.push(name);
            }
        }

        let locations = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| (name, i as i32))
            .collect::<HashMap<_, _>>();

        log::debug!("linked program '{label}' with {} uniforms", locations.len());
        Ok(Self {
            label,
            locations,
            values: HashMap::new(),
            destroyed: false,
        })
    }

    /// Location of a uniform, if the program declares it
    pub fn uniform_location(&self, name: &str) -> Option<i32> {
        self.locations.get(name).copied()
    }

    /// The last value applied to a uniform, if any
    pub fn uniform_value(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    /// Number of reflected uniform leaves
    pub fn uniform_count(&self) -> usize {
        self.locations.len()
    }

    /// Set a uniform, accepting any supported value type
    pub fn set_uniform<V: Into<UniformValue>>(&mut self, name: &str, value: V) {
        self.apply_uniform(name, value.into());
    }

    fn apply_uniform(&mut self, name: &str, value: UniformValue) {
        if self.destroyed {
            log::warn!("set_uniform('{name}') on destroyed program '{}'", self.label);
            return;
        }
        if !self.locations.contains_key(name) {
            log::warn!("uniform '{name}' not found in shader program '{}'", self.label);
            return;
        }
        self.values.insert(name.to_string(), value);
    }

    /// Load an image, create a 2D texture for it, and point `sampler` at `unit`
    ///
    /// On decode failure the error is logged and [`TextureHandle::NULL`] is
    /// returned; deciding whether that is fatal is up to the caller.
    pub fn bind_texture_2d<P: AsRef<Path>>(
        &mut self,
        device: &mut dyn RenderDevice,
        sampler: &str,
        path: P,
        unit: i32,
    ) -> TextureHandle {
        let image = match ImageData::from_file(&path) {
            Ok(image) => image,
            Err(e) => {
                log::error!("failed to load texture: {e}");
                return TextureHandle::NULL;
            }
        };

        let handle = device.create_texture_2d(&image);
        self.set_uniform(sampler, unit);
        handle
    }

    /// Load six face images, create a cubemap, and point `sampler` at `unit`
    ///
    /// Face order follows the +X, -X, +Y, -Y, +Z, -Z convention. Any face
    /// failing to decode aborts the cubemap: the failure is logged and
    /// [`TextureHandle::NULL`] is returned.
    pub fn bind_cubemap<P: AsRef<Path>>(
        &mut self,
        device: &mut dyn RenderDevice,
        sampler: &str,
        faces: &[P; 6],
        unit: i32,
    ) -> TextureHandle {
        let mut images = Vec::with_capacity(6);
        for face in faces {
            match ImageData::from_file(face) {
                Ok(image) => images.push(image),
                Err(e) => {
                    log::error!("failed to load cubemap face: {e}");
                    return TextureHandle::NULL;
                }
            }
        }
        let images: [ImageData; 6] = match images.try_into() {
            Ok(images) => images,
            Err(_) => return TextureHandle::NULL,
        };

        let handle = device.create_cubemap(&images);
        self.set_uniform(sampler, unit);
        handle
    }

    /// Release the program
    ///
    /// Guarded by an internal flag so repeated calls are no-ops, mirroring
    /// the usual delete-once contract of GPU program objects.
    pub fn destroy(&mut self) {
        if !self.destroyed {
            self.values.clear();
            self.destroyed = true;
            log::debug!("destroyed shader program '{}'", self.label);
        }
    }

    /// Whether [`ShaderProgram::destroy`] has been called
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl UniformBinder for ShaderProgram {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.apply_uniform(name, value);
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    fs::read_to_string(path).map_err(|source| ShaderError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// One parsed declaration: a type, a name, and an optional array size
#[derive(Debug, Clone)]
struct Declaration {
    type_name: String,
    name: String,
    array_len: Option<usize>,
}

/// Reflect the leaf uniform names out of one GLSL source, in declaration order
fn reflect_uniforms(source: &str) -> Result<Vec<String>, ShaderError> {
    let tokens = tokenize(&strip_comments(source));
    let mut structs: HashMap<String, Vec<Declaration>> = HashMap::new();
    let mut names = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i].as_str() {
            "struct" => {
                let (name, members, next) = parse_struct(&tokens, i)?;
                structs.insert(name, members);
                i = next;
            }
            "uniform" => {
                let (decls, next) = parse_declaration_list(&tokens, i + 1)?;
                for decl in decls {
                    expand_declaration(&decl, &structs, &mut names);
                }
                i = next;
            }
            _ => i += 1,
        }
    }

    Ok(names)
}

/// Remove `//` line comments and `/* */` block comments
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '/' {
            match chars.peek() {
                Some('/') => {
                    for c in chars.by_ref() {
                        if c == '\n' {
                            out.push('\n');
                            break;
                        }
                    }
                }
                Some('*') => {
                    chars.next();
                    let mut prev = ' ';
                    for c in chars.by_ref() {
                        if prev == '*' && c == '/' {
                            break;
                        }
                        prev = c;
                    }
                    out.push(' ');
                }
                _ => out.push(c),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Split GLSL into identifier/number words and single-character punctuation
fn tokenize(source: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    for c in source.chars() {
        if c.is_alphanumeric() || c == '_' || c == '.' {
            word.push(c);
        } else {
            if !word.is_empty() {
                tokens.push(std::mem::take(&mut word));
            }
            if !c.is_whitespace() {
                tokens.push(c.to_string());
            }
        }
    }
    if !word.is_empty() {
        tokens.push(word);
    }
    tokens
}

/// Parse `struct Name { member declarations };` starting at the `struct` token
///
/// Returns the struct name, its members, and the index just past the block.
fn parse_struct(
    tokens: &[String],
    start: usize,
) -> Result<(String, Vec<Declaration>, usize), ShaderError> {
    let name = tokens
        .get(start + 1)
        .filter(|t| is_identifier(t))
        .ok_or_else(|| ShaderError::Reflection("struct missing a name".to_string()))?
        .clone();
    if tokens.get(start + 2).map(String::as_str) != Some("{") {
        return Err(ShaderError::Reflection(format!("struct {name} missing '{{'")));
    }

    let mut members = Vec::new();
    let mut i = start + 3;
    while tokens.get(i).map(String::as_str) != Some("}") {
        if i >= tokens.len() {
            return Err(ShaderError::Reflection(format!("struct {name} missing '}}'")));
        }
        let (decls, next) = parse_declaration_list(tokens, i)?;
        members.extend(decls);
        i = next;
    }

    // Skip '}' and an optional trailing ';'
    i += 1;
    if tokens.get(i).map(String::as_str) == Some(";") {
        i += 1;
    }
    Ok((name, members, i))
}

/// Parse `type name[N], other[M], ... ;` starting at the type token
///
/// Returns the declarations and the index just past the ';'. Precision
/// qualifiers are skipped; declarations of unsized arrays are rejected.
fn parse_declaration_list(
    tokens: &[String],
    start: usize,
) -> Result<(Vec<Declaration>, usize), ShaderError> {
    let mut i = start;
    while matches!(tokens.get(i).map(String::as_str), Some("lowp" | "mediump" | "highp")) {
        i += 1;
    }

    let type_name = tokens
        .get(i)
        .filter(|t| is_identifier(t))
        .ok_or_else(|| ShaderError::Reflection("expected a type name".to_string()))?
        .clone();
    i += 1;

    let mut decls = Vec::new();
    loop {
        let name = tokens
            .get(i)
            .filter(|t| is_identifier(t))
            .ok_or_else(|| {
                ShaderError::Reflection(format!("expected a name after type '{type_name}'"))
            })?
            .clone();
        i += 1;

        let mut array_len = None;
        if tokens.get(i).map(String::as_str) == Some("[") {
            let len_token = tokens.get(i + 1).ok_or_else(|| {
                ShaderError::Reflection(format!("unterminated array on '{name}'"))
            })?;
            let len = len_token.parse::<usize>().map_err(|_| {
                ShaderError::Reflection(format!(
                    "array size of '{name}' must be an integer literal, got '{len_token}'"
                ))
            })?;
            if tokens.get(i + 2).map(String::as_str) != Some("]") {
                return Err(ShaderError::Reflection(format!("unterminated array on '{name}'")));
            }
            array_len = Some(len);
            i += 3;
        }

        decls.push(Declaration {
            type_name: type_name.clone(),
            name,
            array_len,
        });

        match tokens.get(i).map(String::as_str) {
            Some(",") => i += 1,
            Some(";") => {
                i += 1;
                break;
            }
            other => {
                return Err(ShaderError::Reflection(format!(
                    "expected ',' or ';' after declaration, got {other:?}"
                )));
            }
        }
    }

    Ok((decls, i))
}

fn is_identifier(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
}

/// Expand a declaration into leaf uniform names, unrolling arrays and structs
fn expand_declaration(
    decl: &Declaration,
    structs: &HashMap<String, Vec<Declaration>>,
    out: &mut Vec<String>,
) {
    match decl.array_len {
        Some(len) => {
            for index in 0..len {
                expand_leaf(&decl.type_name, &format!("{}[{index}]", decl.name), structs, out);
            }
        }
        None => expand_leaf(&decl.type_name, &decl.name, structs, out),
    }
}

fn expand_leaf(
    type_name: &str,
    name: &str,
    structs: &HashMap<String, Vec<Declaration>>,
    out: &mut Vec<String>,
) {
    if let Some(members) = structs.get(type_name) {
        for member in members {
            let nested = Declaration {
                type_name: member.type_name.clone(),
                name: format!("{name}.{}", member.name),
                array_len: member.array_len,
            };
            expand_declaration(&nested, structs, out);
        }
    } else {
        out.push(name.to_string());
    }
}
