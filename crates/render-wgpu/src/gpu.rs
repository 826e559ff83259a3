use crate::camera::FirstPersonCamera;
use crate::shaders;
use buildspace_common::srgb_to_linear;
use buildspace_kernel::GroundPlane;
use buildspace_render::SceneFrame;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use wgpu::util::DeviceExt;

const SKY: wgpu::Color = wgpu::Color {
    r: 0.62,
    g: 0.78,
    b: 0.92,
    a: 1.0,
};
/// sRGB-encoded; decoded with `srgb_to_linear` before upload.
const GROUND_COLOR: [f32; 3] = [0.227, 0.353, 0.251];
const HOVER_COLOR: [f32; 3] = [0.867, 0.867, 0.867];
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct BlockInstance {
    center: [f32; 3],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct GroundVertex {
    position: [f32; 3],
    color: [f32; 4],
}

/// Unit cube centred on the origin, one quad per face.
fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    // (normal, tangent u, tangent v) with u x v == normal, so quads wind CCW.
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let base = vertices.len() as u16;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let p = (normal + u * su + v * sv) * 0.5;
            vertices.push(Vertex {
                position: p.to_array(),
                normal: normal.to_array(),
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    (vertices, indices)
}

/// Two triangles covering the ground plane.
fn linear([r, g, b]: [f32; 3], alpha: f32) -> [f32; 4] {
    [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b), alpha]
}

fn ground_mesh(ground: GroundPlane) -> Vec<GroundVertex> {
    let e = ground.half_extent;
    let y = ground.height;
    [
        [-e, y, -e],
        [-e, y, e],
        [e, y, e],
        [e, y, e],
        [e, y, -e],
        [-e, y, -e],
    ]
    .into_iter()
    .map(|position| GroundVertex {
        position,
        color: linear(GROUND_COLOR, 1.0),
    })
    .collect()
}

/// Per-block instance data. Opaque blocks come first in insertion order, then
/// translucent blocks sorted far to near. Returns the instances and the number
/// of opaque ones.
fn build_instances(frame: &SceneFrame) -> (Vec<BlockInstance>, usize) {
    let instance = |block: &buildspace_kernel::Block| {
        let mut color = block.material.linear_color();
        if frame.highlighted == Some(block.position) {
            color = linear(HOVER_COLOR, color[3]);
        }
        BlockInstance {
            center: block.position.center().to_array(),
            color,
        }
    };

    let mut instances: Vec<BlockInstance> = frame.opaque().map(instance).collect();
    let opaque = instances.len();

    let eye = frame.camera.position;
    let mut translucent: Vec<_> = frame.translucent().collect();
    translucent.sort_by(|a, b| {
        let da = a.position.center().distance_squared(eye);
        let db = b.position.center().distance_squared(eye);
        db.total_cmp(&da)
    });
    instances.extend(translucent.into_iter().map(instance));
    (instances, opaque)
}

/// wgpu renderer for a [`SceneFrame`]: sky clear, ground plane, block cubes.
pub struct WgpuRenderer {
    opaque_pipeline: wgpu::RenderPipeline,
    translucent_pipeline: wgpu::RenderPipeline,
    ground_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    cube_vertex_buffer: wgpu::Buffer,
    cube_index_buffer: wgpu::Buffer,
    cube_index_count: u32,
    ground_vertex_buffer: wgpu::Buffer,
    ground_vertex_count: u32,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    depth_texture: wgpu::TextureView,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        ground: GroundPlane,
    ) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_buffer"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let block_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("block_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BLOCK_SHADER.into()),
        });
        let opaque_pipeline =
            block_pipeline(device, &layout, &block_shader, surface_format, false);
        let translucent_pipeline =
            block_pipeline(device, &layout, &block_shader, surface_format, true);

        let ground_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("ground_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::GROUND_SHADER.into()),
        });
        let ground_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("ground_pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &ground_shader,
                entry_point: Some("vs_ground"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<GroundVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x4],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &ground_shader,
                entry_point: Some("fs_ground"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_state(true)),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let (cube_verts, cube_indices) = cube_mesh();
        let cube_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertex_buffer"),
            contents: bytemuck::cast_slice(&cube_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_index_buffer"),
            contents: bytemuck::cast_slice(&cube_indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let ground_verts = ground_mesh(ground);
        let ground_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("ground_vertex_buffer"),
            contents: bytemuck::cast_slice(&ground_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let instance_capacity = 1024;
        let instance_buffer = create_instance_buffer(device, instance_capacity);

        Self {
            opaque_pipeline,
            translucent_pipeline,
            ground_pipeline,
            uniform_buffer,
            uniform_bind_group,
            cube_vertex_buffer,
            cube_index_buffer,
            cube_index_count: cube_indices.len() as u32,
            ground_vertex_buffer,
            ground_vertex_count: ground_verts.len() as u32,
            instance_buffer,
            instance_capacity,
            depth_texture: create_depth_texture(device, width, height),
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = create_depth_texture(device, width, height);
    }

    /// Draw one frame into `view`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &FirstPersonCamera,
        frame: &SceneFrame,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: camera.view_projection(&frame.camera).to_cols_array_2d(),
                eye: frame.camera.position.extend(1.0).to_array(),
            }),
        );

        let (instances, opaque) = build_instances(frame);
        if instances.len() > self.instance_capacity {
            self.instance_capacity = instances.len().next_power_of_two();
            self.instance_buffer = create_instance_buffer(device, self.instance_capacity);
            tracing::debug!(capacity = self.instance_capacity, "instance buffer grown");
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(SKY),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            pass.set_pipeline(&self.ground_pipeline);
            pass.set_vertex_buffer(0, self.ground_vertex_buffer.slice(..));
            pass.draw(0..self.ground_vertex_count, 0..1);

            if !instances.is_empty() {
                pass.set_vertex_buffer(0, self.cube_vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                pass.set_index_buffer(self.cube_index_buffer.slice(..), wgpu::IndexFormat::Uint16);

                // Translucent cubes go last so they blend over what is behind them.
                let opaque = opaque as u32;
                let total = instances.len() as u32;
                if opaque > 0 {
                    pass.set_pipeline(&self.opaque_pipeline);
                    pass.draw_indexed(0..self.cube_index_count, 0, 0..opaque);
                }
                if total > opaque {
                    pass.set_pipeline(&self.translucent_pipeline);
                    pass.draw_indexed(0..self.cube_index_count, 0, opaque..total);
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}

fn depth_state(write: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: Default::default(),
        bias: Default::default(),
    }
}

fn block_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    translucent: bool,
) -> wgpu::RenderPipeline {
    let (label, blend) = if translucent {
        ("translucent_block_pipeline", wgpu::BlendState::ALPHA_BLENDING)
    } else {
        ("opaque_block_pipeline", wgpu::BlendState::REPLACE)
    };
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_block"),
            compilation_options: Default::default(),
            buffers: &[
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
                },
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<BlockInstance>() as u64,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &wgpu::vertex_attr_array![2 => Float32x3, 3 => Float32x4],
                },
            ],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_block"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            ..Default::default()
        },
        depth_stencil: Some(depth_state(!translucent)),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

fn create_instance_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("instance_buffer"),
        size: (capacity * std::mem::size_of::<BlockInstance>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildspace_common::{BlockPos, CameraPose, Material};
    use buildspace_kernel::World;

    #[test]
    fn cube_faces_wind_outward() {
        let (verts, indices) = cube_mesh();
        assert_eq!(verts.len(), 24);
        assert_eq!(indices.len(), 36);
        for tri in indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| Vec3::from(verts[tri[i] as usize].position));
            let n = Vec3::from(verts[tri[0] as usize].normal);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
    }

    #[test]
    fn ground_spans_plane() {
        let verts = ground_mesh(GroundPlane {
            height: -0.5,
            half_extent: 50.0,
        });
        assert_eq!(verts.len(), 6);
        assert!(verts.iter().all(|v| v.position[1] == -0.5));
        assert!(verts.iter().all(|v| v.position[0].abs() == 50.0));
    }

    #[test]
    fn translucent_blocks_sorted_after_opaque() {
        let world = World::with_blocks([
            (BlockPos::new(0, 0, -1), Material::Glass),
            (BlockPos::new(0, 0, -5), Material::Glass),
            (BlockPos::new(3, 0, 0), Material::Dirt),
        ]);
        let frame = SceneFrame::capture(&world, CameraPose::default(), None);
        let (instances, opaque) = build_instances(&frame);
        assert_eq!(opaque, 1);
        assert_eq!(instances[0].center, [3.0, 0.0, 0.0]);
        // Far glass before near glass.
        assert_eq!(instances[1].center, [0.0, 0.0, -5.0]);
        assert_eq!(instances[2].center, [0.0, 0.0, -1.0]);
        assert_eq!(instances[1].color, Material::Glass.linear_color());
    }

    #[test]
    fn highlighted_block_is_lightened() {
        let world = World::with_blocks([(BlockPos::new(1, 0, 0), Material::Log)]);
        let frame = SceneFrame::capture(&world, CameraPose::default(), Some(BlockPos::new(1, 0, 0)));
        let (instances, _) = build_instances(&frame);
        assert_eq!(instances[0].color, linear(HOVER_COLOR, 1.0));
        assert!((instances[0].color[0] - 0.723).abs() < 1e-3);
    }
}
