//! GPU compute pass that applies a [`ColorMatrix`] to packed RGBA8 pixels.

use std::num::NonZeroU64;

use bytemuck::{Pod, Zeroable};
use tintbox_core::ColorMatrix;

use crate::GpuError;
use crate::buffers::GpuImageHandle;

const WORKGROUP_SIZE: u32 = 256;

/// Uniform block matching `MatrixParams` in `apply_color_matrix.wgsl`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MatrixUniform {
    pub rows: [[f32; 4]; 4],
    pub offset: [f32; 4],
    pub pixel_count: u32,
    pub _pad: [u32; 3],
}

impl MatrixUniform {
    /// Split the 4x5 matrix into four coefficient rows and an offset column.
    pub fn new(matrix: &ColorMatrix, pixel_count: u32) -> Self {
        let m = matrix.to_f32_array();
        let mut rows = [[0.0f32; 4]; 4];
        let mut offset = [0.0f32; 4];
        for (r, row) in rows.iter_mut().enumerate() {
            row.copy_from_slice(&m[r * 5..r * 5 + 4]);
            offset[r] = m[r * 5 + 4];
        }
        Self {
            rows,
            offset,
            pixel_count,
            _pad: [0; 3],
        }
    }
}

/// Manages the `apply_color_matrix.wgsl` pipeline and its output buffer.
pub struct MatrixApplicator {
    pipeline: wgpu::ComputePipeline,
    layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    max_workgroups: u32,
    /// Cached output buffer (reallocated on dimension change).
    output: Option<GpuImageHandle>,
}

impl MatrixApplicator {
    pub fn new(device: &wgpu::Device) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("tintbox_apply_color_matrix_shader"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../shaders/apply_color_matrix.wgsl").into(),
            ),
        });

        let uniform_size = std::mem::size_of::<MatrixUniform>() as u64;
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("tintbox_apply_color_matrix_layout"),
            entries: &[
                storage_entry(0, true),
                storage_entry(1, false),
                uniform_entry(2, uniform_size),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("tintbox_apply_color_matrix_pipeline_layout"),
            bind_group_layouts: &[&layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("tintbox_apply_color_matrix_pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: Some("apply_color_matrix"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("tintbox_color_matrix_uniform"),
            size: uniform_size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            layout,
            uniform_buffer,
            max_workgroups: device.limits().max_compute_workgroups_per_dimension,
            output: None,
        }
    }

    /// Record the matrix pass on `encoder`.
    ///
    /// Returns the output image for staging copy.
    pub fn apply(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        source: &GpuImageHandle,
        matrix: &ColorMatrix,
        encoder: &mut wgpu::CommandEncoder,
    ) -> Result<&GpuImageHandle, GpuError> {
        let pixel_count = source.pixel_count();
        let (groups_x, groups_y) = self.workgroup_grid(pixel_count)?;

        if self
            .output
            .as_ref()
            .is_some_and(|out| out.dimensions() != source.dimensions())
        {
            self.output = None;
        }
        let output = self.output.get_or_insert_with(|| {
            GpuImageHandle::create_output(device, source.width, source.height)
        });

        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&MatrixUniform::new(matrix, pixel_count)),
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tintbox_apply_color_matrix_bg"),
            layout: &self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: source.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: output.buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
            ],
        });

        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("tintbox_apply_color_matrix_pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }

        Ok(output)
    }

    /// Spread workgroups over x and y once x hits the per-dimension limit.
    fn workgroup_grid(&self, pixel_count: u32) -> Result<(u32, u32), GpuError> {
        let groups = pixel_count.div_ceil(WORKGROUP_SIZE).max(1);
        let groups_x = groups.min(self.max_workgroups);
        let groups_y = groups.div_ceil(groups_x);
        if groups_y > self.max_workgroups {
            let per_axis = self.max_workgroups as u64;
            return Err(GpuError::TooLarge {
                pixels: pixel_count as u64,
                limit: per_axis * per_axis * WORKGROUP_SIZE as u64,
            });
        }
        Ok((groups_x, groups_y))
    }
}

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(4),
        },
        count: None,
    }
}

fn uniform_entry(binding: u32, min_size: u64) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: NonZeroU64::new(min_size),
        },
        count: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tintbox_core::matrix_for_brightness;

    #[test]
    fn test_uniform_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<MatrixUniform>(), 96);
    }

    #[test]
    fn test_uniform_splits_offset_column() {
        let u = MatrixUniform::new(&matrix_for_brightness(0.5), 7);
        assert_eq!(u.rows[0], [1.0, 0.0, 0.0, 0.0]);
        assert_eq!(u.rows[3], [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(u.offset, [0.25, 0.25, 0.25, 0.0]);
        assert_eq!(u.pixel_count, 7);
    }
}
