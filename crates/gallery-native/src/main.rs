use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;
use std::thread;
use std::time::Instant;

use glam::{Mat4, Vec2};
use winit::event::{ElementState, Event, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use gallery_core::{
    bob_offset, CardEntity, CoverError, CoverHandle, CoverImage, CoverSource, Gallery, MediaItem,
    PlaybackSnapshot,
};

// Wheel line scrolls map to this many raw zoom units per notch.
const WHEEL_LINE_STEP: f32 = 30.0;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    mvp: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    pos: [f32; 2],
    uv: [f32; 2],
}

// Unit quad; the model matrix scales it to billboard/overlay size.
const QUAD_VERTICES: [Vertex; 6] = [
    Vertex { pos: [-0.5, -0.5], uv: [0.0, 1.0] },
    Vertex { pos: [0.5, -0.5], uv: [1.0, 1.0] },
    Vertex { pos: [0.5, 0.5], uv: [1.0, 0.0] },
    Vertex { pos: [-0.5, -0.5], uv: [0.0, 1.0] },
    Vertex { pos: [0.5, 0.5], uv: [1.0, 0.0] },
    Vertex { pos: [-0.5, 0.5], uv: [0.0, 0.0] },
];

struct Quad {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct CardGpu {
    texture: wgpu::Texture,
    texture_version: u64,
    quad: Quad,
    overlay: Option<Quad>,
}

struct GpuState<'w> {
    window: &'w winit::window::Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    quad_vb: wgpu::Buffer,
    depth_view: wgpu::TextureView,
    cards: Vec<CardGpu>,
    scene_generation: u64,
    width: u32,
    height: u32,
}

impl<'w> GpuState<'w> {
    async fn new(window: &'w winit::window::Window) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps.formats[0];
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("card shader"),
            source: wgpu::ShaderSource::Wgsl(gallery_core::CARD_WGSL.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("card bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
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
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("card pl"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let vertex_buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x2,
                    offset: 8,
                    shader_location: 1,
                },
            ],
        }];

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("card pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &vertex_buffers,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("card sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        use wgpu::util::DeviceExt;
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vb"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let depth_view = create_depth_view(&device, config.width, config.height);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            pipeline,
            bind_group_layout,
            sampler,
            quad_vb,
            depth_view,
            cards: Vec::new(),
            scene_generation: 0,
            width: size.width.max(1),
            height: size.height.max(1),
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.width = new_size.width;
        self.height = new_size.height;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, self.width, self.height);
    }

    fn make_quad(&self, view: &wgpu::TextureView) -> Quad {
        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("quad uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quad bg"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });
        Quad {
            uniform_buffer,
            bind_group,
        }
    }

    fn make_texture(&self, width: u32, height: u32) -> wgpu::Texture {
        self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("card texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        })
    }

    fn upload_rgba(&self, texture: &wgpu::Texture, width: u32, height: u32, data: &[u8]) {
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Mirror the scene into GPU resources: rebuild on generation change,
    /// re-upload card faces whose texture version moved, attach overlays as
    /// their covers resolve.
    fn sync_scene(&mut self, entities: &[CardEntity], generation: u64) {
        if generation != self.scene_generation {
            self.cards.clear();
            self.scene_generation = generation;
        }
        while self.cards.len() < entities.len() {
            let entity = &entities[self.cards.len()];
            let texture = self.make_texture(entity.texture.width(), entity.texture.height());
            self.upload_rgba(
                &texture,
                entity.texture.width(),
                entity.texture.height(),
                entity.texture.data(),
            );
            let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
            let quad = self.make_quad(&view);
            self.cards.push(CardGpu {
                texture,
                texture_version: entity.texture_version,
                quad,
                overlay: None,
            });
        }
        for (card, entity) in self.cards.iter_mut().zip(entities) {
            if card.texture_version != entity.texture_version {
                self.queue.write_texture(
                    wgpu::TexelCopyTextureInfo {
                        texture: &card.texture,
                        mip_level: 0,
                        origin: wgpu::Origin3d::ZERO,
                        aspect: wgpu::TextureAspect::All,
                    },
                    entity.texture.data(),
                    wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(4 * entity.texture.width()),
                        rows_per_image: Some(entity.texture.height()),
                    },
                    wgpu::Extent3d {
                        width: entity.texture.width(),
                        height: entity.texture.height(),
                        depth_or_array_layers: 1,
                    },
                );
                card.texture_version = entity.texture_version;
            }
        }
        // Overlays attach at most once per entity per scene generation.
        for i in 0..self.cards.len() {
            if self.cards[i].overlay.is_none() {
                if let Some(cover) = &entities[i].cover {
                    let texture = self.make_texture(cover.image.width, cover.image.height);
                    self.upload_rgba(
                        &texture,
                        cover.image.width,
                        cover.image.height,
                        &cover.image.rgba,
                    );
                    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                    self.cards[i].overlay = Some(self.make_quad(&view));
                }
            }
        }
    }

    fn render(&mut self, gallery: &Gallery) -> Result<(), wgpu::SurfaceError> {
        let entities = gallery.scene().entities();
        self.sync_scene(entities, gallery.scene().generation());

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let view_proj = gallery.camera.projection_matrix() * gallery.camera.view_matrix();
        let phase = gallery.bob_phase();
        for (card, entity) in self.cards.iter().zip(entities) {
            let bob = bob_offset(phase, entity.item_index);
            let mvp = view_proj * entity.model_matrix(bob);
            self.write_mvp(&card.quad, mvp);
            if let (Some(overlay), Some(model)) =
                (&card.overlay, entity.overlay_model_matrix(bob))
            {
                self.write_mvp(overlay, view_proj * model);
            }
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("gallery pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.015,
                            g: 0.015,
                            b: 0.03,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.pipeline);
            rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
            for card in &self.cards {
                rpass.set_bind_group(0, &card.quad.bind_group, &[]);
                rpass.draw(0..6, 0..1);
            }
            for card in &self.cards {
                if let Some(overlay) = &card.overlay {
                    rpass.set_bind_group(0, &overlay.bind_group, &[]);
                    rpass.draw(0..6, 0..1);
                }
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    fn write_mvp(&self, quad: &Quad, mvp: Mat4) {
        self.queue.write_buffer(
            &quad.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                mvp: mvp.to_cols_array_2d(),
            }),
        );
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("depth"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

// ---------------- filesystem cover source ----------------

struct FetchJob {
    path: String,
    reply: mpsc::Sender<Result<CoverImage, CoverError>>,
}

/// Decodes cover files on a worker thread; the core polls the reply channel.
struct FileCoverSource {
    jobs: mpsc::Sender<FetchJob>,
}

impl FileCoverSource {
    fn new() -> Self {
        let (jobs, rx) = mpsc::channel::<FetchJob>();
        thread::Builder::new()
            .name("cover-decoder".into())
            .spawn(move || {
                while let Ok(job) = rx.recv() {
                    let result = decode_cover(&job.path);
                    // Receiver may be gone after a scene teardown; fine.
                    _ = job.reply.send(result);
                }
            })
            .expect("cover decoder thread");
        Self { jobs }
    }
}

fn decode_cover(path: &str) -> Result<CoverImage, CoverError> {
    let decoded = image::open(path)
        .map_err(|e| CoverError::Fetch(format!("{path}: {e}")))?
        .to_rgba8();
    let (width, height) = decoded.dimensions();
    let mut rgba = decoded.into_raw();
    // Premultiply so covers composite like the tiny-skia card faces.
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        px[0] = ((px[0] as u16 * a) / 255) as u8;
        px[1] = ((px[1] as u16 * a) / 255) as u8;
        px[2] = ((px[2] as u16 * a) / 255) as u8;
    }
    Ok(CoverImage {
        width,
        height,
        rgba,
    })
}

struct PendingFetch {
    rx: mpsc::Receiver<Result<CoverImage, CoverError>>,
}

impl CoverHandle for PendingFetch {
    fn poll(&mut self) -> Option<Result<CoverImage, CoverError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                Some(Err(CoverError::Fetch("decoder worker gone".into())))
            }
        }
    }
}

impl CoverSource for FileCoverSource {
    fn request(&self, reference: &str) -> Box<dyn CoverHandle> {
        let (reply, rx) = mpsc::channel();
        let job = FetchJob {
            path: reference.to_string(),
            reply,
        };
        if self.jobs.send(job).is_err() {
            log::warn!("cover decoder is not running");
        }
        Box::new(PendingFetch { rx })
    }
}

// ---------------- demo item set ----------------

fn demo_items() -> Vec<MediaItem> {
    let covers: Vec<String> = std::env::args().skip(1).collect();
    let tracks = [
        ("Glass Harbor", "Marlowe Finch", "Driftworks"),
        ("Second Orbit", "Marlowe Finch", "Driftworks"),
        ("Paper Lanterns", "The Quiet Divide", "Night Signals"),
        ("Tidal Memory", "The Quiet Divide", "Night Signals"),
        ("Cobalt Hours", "Ivy Reiner", "Cobalt Hours"),
        ("Afterglow Arcade", "Ivy Reiner", "Cobalt Hours"),
        ("North of Nowhere", "Slow Cartography", "Atlas EP"),
        ("Meridian Lines", "Slow Cartography", "Atlas EP"),
        ("Last Transmission", "Ultramarine Echo", "Signal Lost"),
    ];
    tracks
        .iter()
        .enumerate()
        .map(|(i, (title, artist, album))| MediaItem {
            id: i as u64 + 1,
            title: title.to_string(),
            artist: artist.to_string(),
            album: album.to_string(),
            cover: (!covers.is_empty()).then(|| covers[i % covers.len()].clone()),
            duration_sec: 180.0 + (i as f64) * 17.0,
            media_ref: format!("demo://track/{i}"),
        })
        .collect()
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let items = demo_items();
    let mut gallery = Gallery::new(Box::new(FileCoverSource::new()));

    // Selection is drained on the loop thread each frame.
    let selected: Rc<RefCell<Option<u64>>> = Rc::new(RefCell::new(None));
    let selected_sink = selected.clone();
    gallery.set_on_select(move |item_id| {
        log::info!("selected item {item_id}");
        *selected_sink.borrow_mut() = Some(item_id);
    });
    gallery.set_items(&items);

    let event_loop = EventLoop::new().expect("event loop");
    let window = WindowBuilder::new()
        .with_title("Card Gallery (native)")
        .build(&event_loop)
        .expect("window");

    let size = window.inner_size();
    gallery.set_viewport(size.width as f32, size.height as f32);

    let mut state = pollster::block_on(GpuState::new(&window)).expect("gpu");

    // Demo playback simulation: selecting a card starts it "playing".
    let mut current: Option<u64> = None;
    let mut playing = false;
    let mut play_time = 0.0_f64;
    let mut cursor = Vec2::ZERO;
    let mut last_frame = Instant::now();

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent {
                event: WindowEvent::Resized(size),
                ..
            } => {
                state.resize(size);
                gallery.set_viewport(size.width as f32, size.height as f32);
            }
            Event::WindowEvent {
                event: WindowEvent::CloseRequested,
                ..
            } => elwt.exit(),
            Event::WindowEvent {
                event: WindowEvent::CursorMoved { position, .. },
                ..
            } => {
                cursor = Vec2::new(position.x as f32, position.y as f32);
                gallery.pointer_move(cursor);
            }
            Event::WindowEvent {
                event: WindowEvent::MouseInput { state: button_state, button, .. },
                ..
            } => {
                if matches!(button, MouseButton::Left | MouseButton::Right) {
                    match button_state {
                        ElementState::Pressed => gallery.pointer_down(cursor),
                        ElementState::Released => gallery.pointer_up(cursor),
                    }
                }
            }
            Event::WindowEvent {
                event: WindowEvent::MouseWheel { delta, .. },
                ..
            } => {
                let raw = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * WHEEL_LINE_STEP,
                    MouseScrollDelta::PixelDelta(p) => -p.y as f32,
                };
                gallery.wheel(raw);
            }
            Event::WindowEvent {
                event: WindowEvent::Touch(touch),
                ..
            } => {
                let pos = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                match touch.phase {
                    TouchPhase::Started => gallery.touch_start(touch.id, pos),
                    TouchPhase::Moved => gallery.touch_move(touch.id, pos),
                    TouchPhase::Ended => gallery.touch_end(touch.id, pos),
                    TouchPhase::Cancelled => gallery.cancel_input(),
                }
            }
            Event::WindowEvent {
                event: WindowEvent::KeyboardInput { event: key, .. },
                ..
            } => {
                if key.state == ElementState::Pressed
                    && key.logical_key == Key::Named(NamedKey::Space)
                {
                    playing = !playing && current.is_some();
                }
            }
            Event::WindowEvent {
                event: WindowEvent::Focused(false),
                ..
            } => gallery.cancel_input(),
            Event::AboutToWait => {
                let now = Instant::now();
                let dt = now - last_frame;
                last_frame = now;

                if let Some(item_id) = selected.borrow_mut().take() {
                    current = Some(item_id);
                    playing = true;
                    play_time = 0.0;
                }
                if playing {
                    play_time += dt.as_secs_f64();
                    let duration = current
                        .and_then(|id| gallery.items().iter().find(|i| i.id == id))
                        .map(|i| i.duration_sec)
                        .unwrap_or(0.0);
                    if duration > 0.0 && play_time >= duration {
                        play_time = 0.0;
                    }
                }
                gallery.set_playback(PlaybackSnapshot {
                    current_item_id: current,
                    is_playing: playing,
                    current_time_sec: play_time,
                });
                gallery.advance(instant::Instant::now(), dt);

                match state.render(&gallery) {
                    Ok(_) => state.window.request_redraw(),
                    Err(wgpu::SurfaceError::Lost) => state.resize(state.window.inner_size()),
                    Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                    Err(_) => {}
                }
            }
            _ => {}
        })
        .unwrap();
}
