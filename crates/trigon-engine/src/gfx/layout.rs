/// Storage hint for uploaded vertex data.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferUsage {
    /// Written once, drawn many times.
    Static,
    /// Rewritten between draws.
    Dynamic,
}

/// How a draw call assembles vertices into primitives.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Primitive {
    TriangleList,
    TriangleStrip,
    LineList,
    PointList,
}

impl Primitive {
    pub(crate) fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            Primitive::TriangleList => wgpu::PrimitiveTopology::TriangleList,
            Primitive::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
            Primitive::LineList => wgpu::PrimitiveTopology::LineList,
            Primitive::PointList => wgpu::PrimitiveTopology::PointList,
        }
    }
}

/// Component type of a vertex attribute.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ComponentType {
    Float32,
}

impl ComponentType {
    #[inline]
    pub const fn size(self) -> u64 {
        match self {
            ComponentType::Float32 => 4,
        }
    }
}

/// Describes how raw buffer bytes map onto one shader input location.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttribute {
    pub location: u32,
    /// Components per vertex, 1..=4.
    pub components: u8,
    pub component_type: ComponentType,
    pub normalized: bool,
    /// Distance in bytes between consecutive vertices.
    pub stride: u64,
    /// Byte offset of the first component inside a vertex.
    pub offset: u64,
}

impl VertexAttribute {
    /// Tightly packed float attribute: `stride = components * 4`, no offset.
    pub const fn packed_f32(location: u32, components: u8) -> Self {
        Self {
            location,
            components,
            component_type: ComponentType::Float32,
            normalized: false,
            stride: components as u64 * ComponentType::Float32.size(),
            offset: 0,
        }
    }

    /// Size in bytes of the attribute inside one vertex.
    #[inline]
    pub const fn byte_size(&self) -> u64 {
        self.components as u64 * self.component_type.size()
    }

    /// Checks the attribute against a flat vertex stream of `float_count`
    /// floats.
    ///
    /// The stream has to hold a whole number of vertices, and the attribute
    /// has to fit inside a vertex.
    pub fn check_stream(&self, float_count: usize) -> Result<u32, String> {
        if !(1..=4).contains(&self.components) {
            return Err(format!("{} components per attribute (expected 1..=4)", self.components));
        }
        if self.normalized {
            return Err("float attributes cannot be normalized".to_string());
        }
        if self.stride == 0 || self.offset + self.byte_size() > self.stride {
            return Err(format!(
                "attribute of {} bytes at offset {} does not fit a stride of {}",
                self.byte_size(),
                self.offset,
                self.stride
            ));
        }

        let bytes = float_count as u64 * ComponentType::Float32.size();
        if bytes % self.stride != 0 {
            return Err(format!(
                "{float_count} floats do not split into whole {}-byte vertices",
                self.stride
            ));
        }

        u32::try_from(bytes / self.stride).map_err(|_| "vertex count overflows u32".to_string())
    }

    pub(crate) fn to_wgpu_format(&self) -> Option<wgpu::VertexFormat> {
        if self.normalized {
            return None;
        }
        match (self.component_type, self.components) {
            (ComponentType::Float32, 1) => Some(wgpu::VertexFormat::Float32),
            (ComponentType::Float32, 2) => Some(wgpu::VertexFormat::Float32x2),
            (ComponentType::Float32, 3) => Some(wgpu::VertexFormat::Float32x3),
            (ComponentType::Float32, 4) => Some(wgpu::VertexFormat::Float32x4),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_vec3_has_12_byte_stride() {
        let a = VertexAttribute::packed_f32(0, 3);
        assert_eq!(a.stride, 12);
        assert_eq!(a.offset, 0);
        assert!(!a.normalized);
        assert_eq!(a.to_wgpu_format(), Some(wgpu::VertexFormat::Float32x3));
    }

    #[test]
    fn nine_floats_are_three_vec3_vertices() {
        assert_eq!(VertexAttribute::packed_f32(0, 3).check_stream(9), Ok(3));
    }

    #[test]
    fn partial_vertex_is_rejected() {
        assert!(VertexAttribute::packed_f32(0, 3).check_stream(8).is_err());
    }

    #[test]
    fn stride_smaller_than_attribute_is_rejected() {
        let mut a = VertexAttribute::packed_f32(0, 3);
        a.stride = 8;
        assert!(a.check_stream(6).is_err());
    }

    #[test]
    fn normalized_float_is_rejected() {
        let mut a = VertexAttribute::packed_f32(0, 2);
        a.normalized = true;
        assert!(a.check_stream(4).is_err());
        assert_eq!(a.to_wgpu_format(), None);
    }

    #[test]
    fn five_components_is_rejected() {
        let a = VertexAttribute::packed_f32(0, 5);
        assert!(a.check_stream(10).is_err());
        assert_eq!(a.to_wgpu_format(), None);
    }
}
