//! First-person road render pipeline
//!
//! Uploads post-tick simulation state into a globals uniform plus obstacle
//! and stripe storage buffers, then draws one fullscreen triangle whose
//! fragment shader raycasts the scene.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::consts::*;
use crate::settings::Settings;
use crate::sim::GameState;

/// Maximum number of obstacles uploaded per frame
const MAX_OBSTACLES: usize = 64;
/// Stripe slots match the fixed simulation population
const MAX_STRIPES: usize = STRIPE_COUNT;

// ============================================================================
// GPU DATA STRUCTURES (must match shader)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    resolution: [f32; 2],   // offset 0
    time: f32,              // offset 8
    speed: f32,             // offset 12
    camera_pos: [f32; 2],   // offset 16 (8-byte aligned for WGSL vec2)
    obstacle_count: u32,    // offset 24
    stripe_count: u32,      // offset 28
    vignette_offset: f32,   // offset 32
    vignette_darkness: f32, // offset 36
    star_count: u32,        // offset 40 - 0 disables the star field
    march_steps: u32,       // offset 44
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ObstacleData {
    lane_x: f32,
    height: f32,
    distance: f32,
    tilt: f32,
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct StripeData {
    distance: f32,
    _pad: [f32; 3],
}

// ============================================================================
// RENDER STATE
// ============================================================================

pub struct RoadRenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub pipeline: wgpu::RenderPipeline,

    globals_buffer: wgpu::Buffer,
    obstacles_buffer: wgpu::Buffer,
    stripes_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,

    pub size: (u32, u32),
}

impl RoadRenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Self {
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("road-rush-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .expect("Failed to create device");

        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("road_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("road_shader.wgsl").into()),
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals"),
            contents: bytemuck::bytes_of(&Globals {
                resolution: [width as f32, height as f32],
                time: 0.0,
                speed: INITIAL_SPEED,
                camera_pos: [0.0, REST_HEIGHT],
                obstacle_count: 0,
                stripe_count: 0,
                vignette_offset: VIGNETTE_OFFSET,
                vignette_darkness: VIGNETTE_DARKNESS,
                star_count: STAR_COUNT,
                march_steps: 48,
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let obstacles_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("obstacles"),
            size: (std::mem::size_of::<ObstacleData>() * MAX_OBSTACLES) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let stripes_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("stripes"),
            size: (std::mem::size_of::<StripeData>() * MAX_STRIPES) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("road_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("road_bind_group"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: obstacles_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: stripes_buffer.as_entire_binding(),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("road_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("road_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[], // No vertex buffers - fullscreen triangle
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            globals_buffer,
            obstacles_buffer,
            stripes_buffer,
            bind_group,
            size: (width, height),
        }
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Upload the post-tick state and draw one frame
    pub fn render(
        &mut self,
        state: &GameState,
        settings: &Settings,
        time: f64,
    ) -> Result<(), wgpu::SurfaceError> {
        // time is ms since page load from requestAnimationFrame
        let elapsed = (time / 1000.0) as f32;

        // Shake perturbs only the rendered camera, never the sim position
        let shake = if settings.effective_screen_shake() {
            state.shake_offset
        } else {
            glam::Vec2::ZERO
        };
        let camera_pos = [
            state.player.lateral + shake.x,
            state.player.height + shake.y,
        ];

        let obstacle_count = state.obstacles.len().min(MAX_OBSTACLES) as u32;
        let stripe_count = state.stripes.len().min(MAX_STRIPES) as u32;

        let globals = Globals {
            resolution: [self.size.0 as f32, self.size.1 as f32],
            time: elapsed,
            speed: state.speed,
            camera_pos,
            obstacle_count,
            stripe_count,
            vignette_offset: if settings.vignette { VIGNETTE_OFFSET } else { 0.0 },
            vignette_darkness: if settings.vignette { VIGNETTE_DARKNESS } else { 0.0 },
            star_count: if settings.quality.starfield_enabled() {
                STAR_COUNT
            } else {
                0
            },
            march_steps: settings.quality.march_steps(),
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let mut obstacles_data = [ObstacleData {
            lane_x: 0.0,
            height: 0.0,
            distance: 0.0,
            tilt: 0.0,
        }; MAX_OBSTACLES];
        for (i, obstacle) in state.obstacles.iter().take(MAX_OBSTACLES).enumerate() {
            obstacles_data[i] = ObstacleData {
                lane_x: obstacle.lane_x,
                height: obstacle.height,
                distance: obstacle.distance,
                tilt: obstacle.tilt,
            };
        }
        self.queue.write_buffer(
            &self.obstacles_buffer,
            0,
            bytemuck::cast_slice(&obstacles_data),
        );

        let mut stripes_data = [StripeData {
            distance: 0.0,
            _pad: [0.0; 3],
        }; MAX_STRIPES];
        for (i, stripe) in state.stripes.iter().take(MAX_STRIPES).enumerate() {
            stripes_data[i].distance = stripe.distance;
        }
        self.queue
            .write_buffer(&self.stripes_buffer, 0, bytemuck::cast_slice(&stripes_data));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("road_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("road_render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.draw(0..3, 0..1); // Fullscreen triangle
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}
