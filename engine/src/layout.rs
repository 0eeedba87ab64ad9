//! Vertex attribute metadata.
//!
//! A [`VertexBufferLayout`] describes how one interleaved vertex is laid out in a
//! [`VertexBuffer`](crate::buffer::VertexBuffer). Attributes are numbered in push order, which
//! must match the `layout(location = N)` qualifiers in the vertex shader.

use std::mem;

/// The component type of a vertex attribute.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[must_use]
pub enum AttributeType {
    Float,
    UnsignedInt,
    UnsignedByte,
}

impl AttributeType {
    /// Size of one component in bytes.
    #[inline]
    #[must_use]
    pub const fn size(self) -> u32 {
        match self {
            Self::Float => mem::size_of::<f32>() as u32,
            Self::UnsignedInt => mem::size_of::<u32>() as u32,
            Self::UnsignedByte => mem::size_of::<u8>() as u32,
        }
    }

    /// The matching OpenGL type enum.
    #[inline]
    #[must_use]
    pub const fn gl_type(self) -> u32 {
        match self {
            Self::Float => glow::FLOAT,
            Self::UnsignedInt => glow::UNSIGNED_INT,
            Self::UnsignedByte => glow::UNSIGNED_BYTE,
        }
    }

    /// Whether the attribute is fed to the shader as an integer rather than a float.
    #[inline]
    #[must_use]
    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::Float)
    }
}

/// Rust types which can be pushed onto a [`VertexBufferLayout`].
pub trait LayoutElement {
    const TYPE: AttributeType;
    /// Byte-sized color channels are mapped to `[0, 1]` in the shader.
    const NORMALIZED: bool = false;
}

impl LayoutElement for f32 {
    const TYPE: AttributeType = AttributeType::Float;
}

impl LayoutElement for u32 {
    const TYPE: AttributeType = AttributeType::UnsignedInt;
}

impl LayoutElement for u8 {
    const TYPE: AttributeType = AttributeType::UnsignedByte;
    const NORMALIZED: bool = true;
}

/// A single attribute of a vertex, e.g. a 2-component position.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[must_use]
pub struct VertexBufferAttribute {
    pub ty: AttributeType,
    pub count: u32,
    pub normalized: bool,
}

impl VertexBufferAttribute {
    /// Size of the whole attribute in bytes.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.count * self.ty.size()
    }
}

#[derive(Default, Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct VertexBufferLayout {
    attributes: Vec<VertexBufferAttribute>,
    stride: u32,
}

impl VertexBufferLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attribute of `count` components of type `T`.
    pub fn push<T: LayoutElement>(&mut self, count: u32) -> &mut Self {
        let attribute = VertexBufferAttribute {
            ty: T::TYPE,
            count,
            normalized: T::NORMALIZED,
        };
        self.stride += attribute.size();
        self.attributes.push(attribute);
        self
    }

    /// Builder-style [`VertexBufferLayout::push`].
    pub fn with<T: LayoutElement>(mut self, count: u32) -> Self {
        self.push::<T>(count);
        self
    }

    #[inline]
    pub fn attributes(&self) -> &[VertexBufferAttribute] {
        &self.attributes
    }

    /// Size of one vertex in bytes.
    #[inline]
    #[must_use]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Iterate attributes as `(location, attribute, byte offset within the vertex)`.
    pub fn offsets(&self) -> impl Iterator<Item = (u32, &VertexBufferAttribute, u32)> + '_ {
        self.attributes
            .iter()
            .zip(0..)
            .scan(0, |offset, (attribute, index)| {
                let current = *offset;
                *offset += attribute.size();
                Some((index, attribute, current))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_sizes() {
        assert_eq!(AttributeType::Float.size(), 4);
        assert_eq!(AttributeType::UnsignedInt.size(), 4);
        assert_eq!(AttributeType::UnsignedByte.size(), 1);
        assert_eq!(AttributeType::Float.gl_type(), glow::FLOAT);
        assert!(AttributeType::UnsignedByte.is_integer());
        assert!(!AttributeType::Float.is_integer());
    }

    #[test]
    fn position_and_tex_coords() {
        let layout = VertexBufferLayout::new().with::<f32>(2).with::<f32>(2);
        assert_eq!(layout.stride(), 16);
        let offsets: Vec<_> = layout
            .offsets()
            .map(|(index, attribute, offset)| (index, attribute.count, offset))
            .collect();
        assert_eq!(offsets, vec![(0, 2, 0), (1, 2, 8)]);
    }

    #[test]
    fn mixed_types_accumulate_stride() {
        let mut layout = VertexBufferLayout::new();
        layout.push::<f32>(3).push::<u8>(4).push::<u32>(1);
        assert_eq!(layout.stride(), 12 + 4 + 4);

        let attributes = layout.attributes();
        assert_eq!(attributes.len(), 3);
        assert!(attributes[1].normalized);
        assert!(!attributes[2].normalized);

        let offsets: Vec<_> = layout.offsets().map(|(_, _, offset)| offset).collect();
        assert_eq!(offsets, vec![0, 12, 16]);
    }

    #[test]
    fn empty_layout() {
        let layout = VertexBufferLayout::new();
        assert_eq!(layout.stride(), 0);
        assert_eq!(layout.offsets().count(), 0);
    }
}
