use std::num::NonZeroU64;
use std::sync::mpsc;

use cellgrid_grid::Grid;

use crate::bridge::ComputeLease;
use crate::device::SharedContext;
use crate::error::{PipelineError, Result};

use super::Kernel;

/// Work-groups to dispatch over the whole canvas: `(width / E, height / E, 1)`.
pub fn dispatch_extent(grid: &Grid) -> (u32, u32, u32) {
    let (x, y) = grid.workgroup_count();
    (x, y, 1)
}

/// Rejects work-group edges and output sizes the device cannot run.
fn check_limits(grid: &Grid, limits: &wgpu::Limits) -> Result<()> {
    let edge = grid.workgroup_edge();
    let invocations = u64::from(edge) * u64::from(edge);

    if invocations > u64::from(limits.max_compute_invocations_per_workgroup) {
        return Err(PipelineError::KernelBuild(format!(
            "work-group of {edge}x{edge} = {invocations} invocations exceeds the device limit of {}",
            limits.max_compute_invocations_per_workgroup
        )));
    }
    if edge > limits.max_compute_workgroup_size_x || edge > limits.max_compute_workgroup_size_y {
        return Err(PipelineError::KernelBuild(format!(
            "work-group edge {edge} exceeds the device limit of {}x{}",
            limits.max_compute_workgroup_size_x, limits.max_compute_workgroup_size_y
        )));
    }

    let (gx, gy, _) = dispatch_extent(grid);
    let max_groups = limits.max_compute_workgroups_per_dimension;
    if gx > max_groups || gy > max_groups {
        return Err(PipelineError::KernelBuild(format!(
            "dispatch of {gx}x{gy} work-groups exceeds the device limit of {max_groups} per dimension"
        )));
    }

    let bytes = output_size(grid);
    if bytes > u64::from(limits.max_storage_buffer_binding_size) {
        return Err(PipelineError::KernelBuild(format!(
            "output buffer of {bytes} bytes exceeds the storage binding limit of {}",
            limits.max_storage_buffer_binding_size
        )));
    }
    Ok(())
}

fn output_size(grid: &Grid) -> u64 {
    grid.canvas_len() as u64 * std::mem::size_of::<u32>() as u64
}

/// Compiled kernel plus the buffers of one canvas-sized reduction.
///
/// Field order is teardown order.
pub struct Reducer {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    output: wgpu::Buffer,
    readback: wgpu::Buffer,
    extent: (u32, u32, u32),
}

impl Reducer {
    pub fn build(ctx: &SharedContext, grid: &Grid, kernel: &Kernel) -> Result<Self> {
        if kernel.edge() != grid.workgroup_edge() {
            return Err(PipelineError::KernelBuild(format!(
                "kernel validated for work-group edge {}, grid uses {}",
                kernel.edge(),
                grid.workgroup_edge()
            )));
        }
        check_limits(grid, &ctx.limits())?;

        let device = ctx.device();
        let origin = kernel.source().origin();

        // Validation errors from here to the pipeline surface as `KernelBuild`.
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(origin),
            source: wgpu::ShaderSource::Wgsl(kernel.source().code().into()),
        });

        let info = pollster::block_on(module.get_compilation_info());
        let errors: Vec<String> = info
            .messages
            .iter()
            .filter(|m| m.message_type == wgpu::CompilationMessageType::Error)
            .map(|m| m.message.clone())
            .collect();
        if !errors.is_empty() {
            return Err(PipelineError::KernelBuild(format!("{origin}: {}", errors.join("; "))));
        }
        for m in info.messages.iter().filter(|m| m.message_type == wgpu::CompilationMessageType::Warning) {
            log::warn!("{origin}: {}", m.message);
        }

        let size = output_size(grid);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("cellgrid reducer bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(size),
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cellgrid reducer layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let constants = kernel.pipeline_constants();
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("cellgrid reducer pipeline"),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: Some(kernel.entry_point()),
            compilation_options: wgpu::PipelineCompilationOptions {
                constants: &constants,
                ..Default::default()
            },
            cache: None,
        });

        if let Some(e) = pollster::block_on(scope.pop()) {
            return Err(PipelineError::KernelBuild(format!("{origin}: {e}")));
        }

        let output = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cellgrid reducer output"),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cellgrid reducer readback"),
            size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let extent = dispatch_extent(grid);
        log::debug!("reducer built: {origin}, dispatch {extent:?}");

        Ok(Self {
            pipeline,
            bind_group_layout,
            output,
            readback,
            extent,
        })
    }

    #[inline]
    pub fn extent(&self) -> (u32, u32, u32) {
        self.extent
    }

    /// Runs the kernel over the leased canvas and reads back one `u32` per pixel.
    ///
    /// Blocks until the results are host-visible.
    pub fn run(&self, ctx: &SharedContext, lease: &ComputeLease<'_>) -> Result<Vec<u32>> {
        let device = ctx.device();

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("cellgrid reducer bind group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(lease.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: self.output.as_entire_binding(),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("cellgrid reducer encoder"),
        });
        {
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("cellgrid reducer pass"),
                timestamp_writes: None,
            });
            cpass.set_pipeline(&self.pipeline);
            cpass.set_bind_group(0, &bind_group, &[]);
            let (x, y, z) = self.extent;
            cpass.dispatch_workgroups(x, y, z);
        }
        encoder.copy_buffer_to_buffer(&self.output, 0, &self.readback, 0, self.output.size());
        ctx.queue().submit(Some(encoder.finish()));

        let slice = self.readback.slice(..);
        let (tx, rx) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        ctx.finish()?;
        rx.recv()
            .map_err(|e| PipelineError::Readback(e.to_string()))?
            .map_err(|e| PipelineError::Readback(e.to_string()))?;

        let values = {
            let bytes = slice.get_mapped_range();
            bytemuck::cast_slice::<u8, u32>(&bytes).to_vec()
        };
        self.readback.unmap();

        log::debug!("read back {} values", values.len());
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use cellgrid_grid::{GridConfig, WorkgroupShape};

    use super::*;

    fn grid(rows: u32, cols: u32, cell_size: u32, workgroup: WorkgroupShape) -> Grid {
        GridConfig {
            rows,
            cols,
            cell_size,
            workgroup,
        }
        .build()
        .unwrap()
    }

    #[test]
    fn default_grid_dispatches_over_the_whole_canvas() {
        let g = GridConfig::default().build().unwrap();
        // 30 cols x 60 rows of 32 px, 8 px tiles.
        assert_eq!(dispatch_extent(&g), (120, 240, 1));
    }

    #[test]
    fn per_cell_workgroup_dispatches_one_group_per_cell() {
        let g = grid(2, 3, 16, WorkgroupShape::PerCell);
        assert_eq!(dispatch_extent(&g), (3, 2, 1));
    }

    #[test]
    fn oversized_workgroup_is_a_build_error() {
        let limits = wgpu::Limits::downlevel_defaults();

        let ok = grid(2, 2, 16, WorkgroupShape::PerCell);
        assert!(check_limits(&ok, &limits).is_ok());

        let too_big = grid(2, 2, 32, WorkgroupShape::PerCell);
        let err = check_limits(&too_big, &limits).unwrap_err();
        assert!(matches!(err, PipelineError::KernelBuild(_)));
        assert!(err.to_string().contains("1024 invocations"), "{err}");
    }

    #[test]
    fn oversized_output_is_a_build_error() {
        let limits = wgpu::Limits {
            max_storage_buffer_binding_size: 1024,
            ..wgpu::Limits::downlevel_defaults()
        };
        let g = grid(2, 2, 16, WorkgroupShape::Tile { edge: 8 });
        // 32 x 32 px x 4 bytes = 4096.
        assert_eq!(output_size(&g), 4096);
        assert!(check_limits(&g, &limits).is_err());
    }
}
