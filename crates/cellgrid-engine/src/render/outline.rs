use cellgrid_grid::{PackedShape, VERTEX_STRIDE};
use wgpu::util::DeviceExt;

use super::{Orientation, RenderCtx, RenderTarget};

/// GPU buffers of one sub-path: the vertex-array analogue.
struct SubPathMesh {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    vertex_count: u32,
    index_count: u32,
}

/// Outline renderer: one closed line loop per packed sub-path, flat color, no fill.
///
/// Vertices are canvas NDC `(x, y, z)` with a stride of three floats. Loops are
/// drawn as `LineStrip` over indices `0..n` followed by `0`.
#[derive(Default)]
pub struct OutlineRenderer {
    pipeline_key: Option<(wgpu::TextureFormat, Orientation)>,
    pipeline: Option<wgpu::RenderPipeline>,

    meshes: Vec<SubPathMesh>,
}

impl OutlineRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the uploaded geometry with `shapes`.
    ///
    /// Allocates one vertex buffer and one loop index buffer per sub-path.
    pub fn upload(&mut self, ctx: &RenderCtx<'_>, shapes: &[PackedShape]) {
        self.meshes.clear();

        for (i, shape) in shapes.iter().enumerate() {
            for (j, coords) in shape.sub_paths.iter().enumerate() {
                let vertex_count = (coords.len() / VERTEX_STRIDE) as u32;
                let indices = loop_indices(vertex_count);

                let vbo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("cellgrid outline vbo {i}.{j}")),
                    contents: bytemuck::cast_slice(coords),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let ibo = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("cellgrid outline ibo {i}.{j}")),
                    contents: bytemuck::cast_slice(&indices),
                    usage: wgpu::BufferUsages::INDEX,
                });

                self.meshes.push(SubPathMesh {
                    vbo,
                    ibo,
                    vertex_count,
                    index_count: indices.len() as u32,
                });
            }
        }

        log::debug!("uploaded {} sub-path meshes", self.meshes.len());
    }

    /// Number of uploaded sub-paths (= draw calls per frame).
    #[inline]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Vertex count of each uploaded sub-path, in draw order.
    pub fn vertex_counts(&self) -> impl Iterator<Item = u32> + '_ {
        self.meshes.iter().map(|m| m.vertex_count)
    }

    /// Clears `target` to `clear` and draws every uploaded outline.
    pub fn render(&mut self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>, clear: wgpu::Color) {
        self.ensure_pipeline(ctx);
        let Some(pipeline) = self.pipeline.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("cellgrid outline pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        if let Some([x, y, w, h]) = target.viewport {
            rpass.set_viewport(x, y, w, h, 0.0, 1.0);
        }

        rpass.set_pipeline(pipeline);
        for mesh in &self.meshes {
            rpass.set_vertex_buffer(0, mesh.vbo.slice(..));
            rpass.set_index_buffer(mesh.ibo.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        let key = (ctx.target_format, ctx.orientation);
        if self.pipeline_key == Some(key) && self.pipeline.is_some() {
            return;
        }

        let shader = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("cellgrid outline shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/outline.wgsl").into()),
        });

        let pipeline_layout = ctx
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("cellgrid outline pipeline layout"),
                bind_group_layouts: &[],
                immediate_size: 0,
            });

        let vs_entry = match ctx.orientation {
            Orientation::Canvas => "vs_canvas",
            Orientation::Screen => "vs_screen",
        };

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cellgrid outline pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(vs_entry),
                compilation_options: Default::default(),
                buffers: &[vertex_layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineStrip,
                strip_index_format: Some(wgpu::IndexFormat::Uint32),
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        self.pipeline_key = Some(key);
        self.pipeline = Some(pipeline);
    }
}

const VERTEX_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: (VERTEX_STRIDE * std::mem::size_of::<f32>()) as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRS,
    }
}

/// Indices that close a line strip into a loop: `0, 1, .., n-1, 0`.
pub(crate) fn loop_indices(vertex_count: u32) -> Vec<u32> {
    (0..vertex_count).chain(std::iter::once(0)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_closes_on_first_vertex() {
        assert_eq!(loop_indices(4), vec![0, 1, 2, 3, 0]);
    }

    #[test]
    fn loop_of_two_is_a_round_trip() {
        assert_eq!(loop_indices(2), vec![0, 1, 0]);
    }

    #[test]
    fn vertex_stride_is_three_floats() {
        assert_eq!(vertex_layout().array_stride, 12);
    }
}
