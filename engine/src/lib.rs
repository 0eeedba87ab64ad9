#![doc = include_str!("../README.md")]
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    clippy::branches_sharing_code,
    clippy::map_unwrap_or,
    clippy::match_wildcard_for_single_variants,
    // clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::needless_for_each,
    clippy::redundant_closure_for_method_calls,
    clippy::semicolon_if_nothing_returned,
    clippy::unreadable_literal,
    clippy::unwrap_used,
    clippy::expect_used,
    deprecated_in_future,
    ellipsis_inclusive_range_patterns,
    future_incompatible,
    missing_copy_implementations,
    missing_debug_implementations,
    // missing_docs,
    nonstandard_style,
    rust_2018_compatibility,
    rust_2018_idioms,
    rust_2021_compatibility,
    rustdoc::bare_urls,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_html_tags,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::private_intra_doc_links,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused,
    variant_size_differences
)]

use std::{io, path::PathBuf, rc::Rc};

pub use glow;

#[macro_use]
pub mod gl_call;
pub mod buffer;
pub mod config;
pub mod context;
pub mod core;
pub mod display;
pub mod imgui;
pub mod layout;
pub mod math;
pub mod renderer;
pub mod shader;
pub mod texture;
pub mod vertex_array;

/// Shared handle to the loaded OpenGL function table.
///
/// Every GPU object keeps a clone so it can delete itself on drop.
pub type Gl = Rc<glow::Context>;

/// Results that can be returned from this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can be returned from this crate.
#[allow(variant_size_differences)]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{code}: {call} at {file}:{line}")]
    OpenGl {
        code: gl_call::GlErrorCode,
        call: &'static str,
        file: &'static str,
        line: u32,
    },
    #[error("failed to create OpenGL object: {0}")]
    Create(String),
    #[error("failed to compile {stage} shader: {log}")]
    ShaderCompile {
        stage: shader::ShaderStage,
        log: String,
    },
    #[error("failed to link shader program: {0}")]
    ShaderLink(String),
    #[error("shader source is missing a `#shader {0}` section")]
    MissingShaderStage(shader::ShaderStage),
    #[error("texture slot {0} is out of range (max {max})", max = texture::MAX_TEXTURE_SLOT)]
    InvalidTextureSlot(u32),
    #[error("invalid image {width}x{height}: expected {expected} bytes, got {actual}")]
    InvalidImage {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("failed to decode image {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },
    #[error("display error: {0}")]
    Context(String),
    #[error(transparent)]
    Builder(#[from] derive_builder::UninitializedFieldError),
    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub mod prelude {
    //! Most commonly used exports for setting up an application.

    pub use crate::{
        buffer::{IndexBuffer, VertexBuffer},
        config::Config,
        context::Context,
        core::{Application, Engine},
        layout::{AttributeType, VertexBufferAttribute, VertexBufferLayout},
        math::{Mat4, Vec3, Vec4},
        renderer::{ClearFlags, Renderer},
        shader::{Shader, ShaderProgramSource, ShaderStage},
        texture::{Texture, TextureImage},
        vertex_array::VertexArray,
        Error, Gl, Result,
    };
}
