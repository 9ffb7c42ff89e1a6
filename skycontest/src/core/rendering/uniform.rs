//! Uniform payloads accepted by a shader program.
//!
//! The set of scalar kinds (f32, i32, u32) and arities (1 to 4) is closed, every
//! backend matches on these enums exhaustively.

/// A single uniform value of 1 to 4 components
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Float2(f32, f32),
    Float3(f32, f32, f32),
    Float4(f32, f32, f32, f32),
    Int(i32),
    Int2(i32, i32),
    Int3(i32, i32, i32),
    Int4(i32, i32, i32, i32),
    Uint(u32),
    Uint2(u32, u32),
    Uint3(u32, u32, u32),
    Uint4(u32, u32, u32, u32),
}

impl UniformValue {
    /// Number of components in this value
    pub fn arity(&self) -> usize {
        match self {
            UniformValue::Float(..) | UniformValue::Int(..) | UniformValue::Uint(..) => 1,
            UniformValue::Float2(..) | UniformValue::Int2(..) | UniformValue::Uint2(..) => 2,
            UniformValue::Float3(..) | UniformValue::Int3(..) | UniformValue::Uint3(..) => 3,
            UniformValue::Float4(..) | UniformValue::Int4(..) | UniformValue::Uint4(..) => 4,
        }
    }
}

macro_rules! impl_uniform_value_from {
    ($scalar:ty, $one:ident, $two:ident, $three:ident, $four:ident, $vec2:ty, $vec3:ty, $vec4:ty) => {
        impl From<$scalar> for UniformValue {
            fn from(v: $scalar) -> Self {
                UniformValue::$one(v)
            }
        }

        impl From<($scalar, $scalar)> for UniformValue {
            fn from((x, y): ($scalar, $scalar)) -> Self {
                UniformValue::$two(x, y)
            }
        }

        impl From<($scalar, $scalar, $scalar)> for UniformValue {
            fn from((x, y, z): ($scalar, $scalar, $scalar)) -> Self {
                UniformValue::$three(x, y, z)
            }
        }

        impl From<($scalar, $scalar, $scalar, $scalar)> for UniformValue {
            fn from((x, y, z, w): ($scalar, $scalar, $scalar, $scalar)) -> Self {
                UniformValue::$four(x, y, z, w)
            }
        }

        impl From<[$scalar; 2]> for UniformValue {
            fn from([x, y]: [$scalar; 2]) -> Self {
                UniformValue::$two(x, y)
            }
        }

        impl From<[$scalar; 3]> for UniformValue {
            fn from([x, y, z]: [$scalar; 3]) -> Self {
                UniformValue::$three(x, y, z)
            }
        }

        impl From<[$scalar; 4]> for UniformValue {
            fn from([x, y, z, w]: [$scalar; 4]) -> Self {
                UniformValue::$four(x, y, z, w)
            }
        }

        impl From<$vec2> for UniformValue {
            fn from(v: $vec2) -> Self {
                UniformValue::$two(v.x, v.y)
            }
        }

        impl From<$vec3> for UniformValue {
            fn from(v: $vec3) -> Self {
                UniformValue::$three(v.x, v.y, v.z)
            }
        }

        impl From<$vec4> for UniformValue {
            fn from(v: $vec4) -> Self {
                UniformValue::$four(v.x, v.y, v.z, v.w)
            }
        }
    };
}

impl_uniform_value_from!(f32, Float, Float2, Float3, Float4, glam::Vec2, glam::Vec3, glam::Vec4);
impl_uniform_value_from!(i32, Int, Int2, Int3, Int4, glam::IVec2, glam::IVec3, glam::IVec4);
impl_uniform_value_from!(u32, Uint, Uint2, Uint3, Uint4, glam::UVec2, glam::UVec3, glam::UVec4);

/// Bulk upload of an array of vectors. Slices hold tightly packed components,
/// `Float3(&[..])` with 6 floats uploads two `vec3`s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformArray<'a> {
    Float(&'a [f32]),
    Float2(&'a [f32]),
    Float3(&'a [f32]),
    Float4(&'a [f32]),
    Int(&'a [i32]),
    Int2(&'a [i32]),
    Int3(&'a [i32]),
    Int4(&'a [i32]),
    Uint(&'a [u32]),
    Uint2(&'a [u32]),
    Uint3(&'a [u32]),
    Uint4(&'a [u32]),
}

impl<'a> UniformArray<'a> {
    pub fn arity(&self) -> usize {
        match self {
            UniformArray::Float(_) | UniformArray::Int(_) | UniformArray::Uint(_) => 1,
            UniformArray::Float2(_) | UniformArray::Int2(_) | UniformArray::Uint2(_) => 2,
            UniformArray::Float3(_) | UniformArray::Int3(_) | UniformArray::Uint3(_) => 3,
            UniformArray::Float4(_) | UniformArray::Int4(_) | UniformArray::Uint4(_) => 4,
        }
    }

    fn component_count(&self) -> usize {
        match self {
            UniformArray::Float(s)
            | UniformArray::Float2(s)
            | UniformArray::Float3(s)
            | UniformArray::Float4(s) => s.len(),
            UniformArray::Int(s)
            | UniformArray::Int2(s)
            | UniformArray::Int3(s)
            | UniformArray::Int4(s) => s.len(),
            UniformArray::Uint(s)
            | UniformArray::Uint2(s)
            | UniformArray::Uint3(s)
            | UniformArray::Uint4(s) => s.len(),
        }
    }

    /// Number of whole elements in the array. Trailing components that do not
    /// fill a whole element are not uploaded.
    pub fn count(&self) -> usize {
        self.component_count() / self.arity()
    }
}

impl<'a> From<&'a [f32]> for UniformArray<'a> {
    fn from(values: &'a [f32]) -> Self {
        UniformArray::Float(values)
    }
}

impl<'a> From<&'a [i32]> for UniformArray<'a> {
    fn from(values: &'a [i32]) -> Self {
        UniformArray::Int(values)
    }
}

impl<'a> From<&'a [u32]> for UniformArray<'a> {
    fn from(values: &'a [u32]) -> Self {
        UniformArray::Uint(values)
    }
}

/// Float matrices, column-major unless uploaded with `transpose`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformMatrix<'a> {
    Mat2(&'a [f32]),
    Mat3(&'a [f32]),
    Mat4(&'a [f32]),
    Mat2x3(&'a [f32]),
    Mat3x2(&'a [f32]),
    Mat2x4(&'a [f32]),
    Mat4x2(&'a [f32]),
    Mat3x4(&'a [f32]),
    Mat4x3(&'a [f32]),
}

impl<'a> UniformMatrix<'a> {
    /// Columns and rows of a single matrix
    pub fn dimensions(&self) -> (usize, usize) {
        match self {
            UniformMatrix::Mat2(_) => (2, 2),
            UniformMatrix::Mat3(_) => (3, 3),
            UniformMatrix::Mat4(_) => (4, 4),
            UniformMatrix::Mat2x3(_) => (2, 3),
            UniformMatrix::Mat3x2(_) => (3, 2),
            UniformMatrix::Mat2x4(_) => (2, 4),
            UniformMatrix::Mat4x2(_) => (4, 2),
            UniformMatrix::Mat3x4(_) => (3, 4),
            UniformMatrix::Mat4x3(_) => (4, 3),
        }
    }

    pub fn as_slice(&self) -> &'a [f32] {
        match *self {
            UniformMatrix::Mat2(s)
            | UniformMatrix::Mat3(s)
            | UniformMatrix::Mat4(s)
            | UniformMatrix::Mat2x3(s)
            | UniformMatrix::Mat3x2(s)
            | UniformMatrix::Mat2x4(s)
            | UniformMatrix::Mat4x2(s)
            | UniformMatrix::Mat3x4(s)
            | UniformMatrix::Mat4x3(s) => s,
        }
    }

    /// Number of whole matrices in the slice
    pub fn count(&self) -> usize {
        let (columns, rows) = self.dimensions();
        self.as_slice().len() / (columns * rows)
    }
}

impl<'a> From<&'a glam::Mat2> for UniformMatrix<'a> {
    fn from(m: &'a glam::Mat2) -> Self {
        let columns: &'a [f32; 4] = m.as_ref();
        UniformMatrix::Mat2(columns)
    }
}

impl<'a> From<&'a glam::Mat3> for UniformMatrix<'a> {
    fn from(m: &'a glam::Mat3) -> Self {
        let columns: &'a [f32; 9] = m.as_ref();
        UniformMatrix::Mat3(columns)
    }
}

impl<'a> From<&'a glam::Mat4> for UniformMatrix<'a> {
    fn from(m: &'a glam::Mat4) -> Self {
        let columns: &'a [f32; 16] = m.as_ref();
        UniformMatrix::Mat4(columns)
    }
}

/// What happened to a uniform write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformUpload {
    /// The name resolved and the data was sent to the GPU
    Uploaded,
    /// The name is not an active uniform of the program, nothing was sent
    Skipped,
}
