//! Skinning palette handed to the renderer

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// GPU-side bone transform (column-major mat4 for the skinning uniform/storage buffer)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuBoneTransform {
    pub matrix: [[f32; 4]; 4],
}

impl GpuBoneTransform {
    /// Create from a glam Mat4
    pub fn from_mat4(matrix: Mat4) -> Self {
        Self {
            matrix: matrix.to_cols_array_2d(),
        }
    }

    /// Create identity transform
    pub fn identity() -> Self {
        Self::from_mat4(Mat4::IDENTITY)
    }
}

/// Final bone transforms indexed by bone index
///
/// Every evaluation starts with [`SkinningPalette::reset`], so the palette is
/// always rewritten in full and never carries entries from a previous frame.
#[derive(Clone, Debug, Default)]
pub struct SkinningPalette {
    matrices: Vec<Mat4>,
}

impl SkinningPalette {
    pub fn new(bone_count: usize) -> Self {
        Self {
            matrices: vec![Mat4::IDENTITY; bone_count],
        }
    }

    /// Resize to `bone_count` entries, all identity
    pub fn reset(&mut self, bone_count: usize) {
        self.matrices.clear();
        self.matrices.resize(bone_count, Mat4::IDENTITY);
    }

    /// Write one slot. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, matrix: Mat4) {
        if let Some(slot) = self.matrices.get_mut(index) {
            *slot = matrix;
        }
    }

    pub fn get(&self, index: usize) -> Option<&Mat4> {
        self.matrices.get(index)
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    pub fn as_slice(&self) -> &[Mat4] {
        &self.matrices
    }

    /// Raw bytes for a verbatim buffer upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.matrices)
    }

    /// Convert to the GPU layout
    pub fn to_gpu(&self) -> Vec<GpuBoneTransform> {
        self.matrices.iter().map(|m| GpuBoneTransform::from_mat4(*m)).collect()
    }
}
