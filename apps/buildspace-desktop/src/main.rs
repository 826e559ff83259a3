use anyhow::{Context, Result};
use buildspace_advice::{AdviceService, GeminiClient};
use buildspace_common::{GameConfig, Material};
use buildspace_kernel::{GroundPlane, InteractionKind};
use buildspace_render_wgpu::{FirstPersonCamera, WgpuRenderer};
use buildspace_session::{GameEvent, Session, demo_world};
use buildspace_tools::WorldInspector;
use clap::Parser;
use egui::{Color32, Context as EguiContext};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "buildspace-desktop", about = "First-person block building sandbox")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start with a small starter structure next to spawn
    #[arg(long)]
    demo_blocks: bool,
}

/// Game state that lives independently of the GPU.
struct AppState {
    session: Session,
    advice: AdviceService,
    camera: FirstPersonCamera,
    pointer_locked: bool,
    ctrl_held: bool,
    show_inspector: bool,
    last_frame: Instant,
}

impl AppState {
    fn new(config: GameConfig, demo_blocks: bool) -> Self {
        let client = GeminiClient::from_env(&config.advice);
        if !client.has_credentials() {
            tracing::warn!(
                "{} is not set; the architect will only offer its fallback idea",
                config.advice.api_key_env
            );
        }
        let mut advice = AdviceService::new(Arc::new(client));
        advice.request_next();

        let world = if demo_blocks {
            demo_world()
        } else {
            Default::default()
        };

        Self {
            session: Session::with_world(config, world),
            advice,
            camera: FirstPersonCamera::default(),
            pointer_locked: false,
            ctrl_held: false,
            show_inspector: false,
            last_frame: Instant::now(),
        }
    }

    fn update(&mut self, dt: f32) {
        self.advice.poll();
        self.session.update(dt);
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if matches!(key, KeyCode::ControlLeft | KeyCode::ControlRight) {
            self.ctrl_held = pressed;
        }
        if pressed && self.ctrl_held {
            match key {
                KeyCode::KeyZ => return self.session.push(GameEvent::Undo),
                KeyCode::KeyY => return self.session.push(GameEvent::Redo),
                _ => {}
            }
        }
        if pressed && key == KeyCode::F1 {
            self.show_inspector = !self.show_inspector;
            return;
        }
        // Bindings use the same spelling as winit's key codes.
        self.session.push(GameEvent::key(format!("{key:?}"), pressed));
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        self.draw_instructions(ctx);
        self.draw_architect(ctx);
        self.draw_hotbar(ctx);
        if self.pointer_locked {
            draw_crosshair(ctx);
        }
        if self.show_inspector {
            self.draw_inspector(ctx);
        }
    }

    fn draw_instructions(&self, ctx: &EguiContext) {
        egui::Window::new("Controls")
            .anchor(egui::Align2::LEFT_TOP, [10.0, 10.0])
            .resizable(false)
            .collapsible(true)
            .show(ctx, |ui| {
                ui.label("WASD: move   Space: jump");
                ui.label("Left click: break   Right click: place");
                ui.label("1-5: pick material   Ctrl+Z / Ctrl+Y: undo / redo");
                ui.label("Esc: release mouse   F1: inspector");
                if !self.pointer_locked {
                    ui.separator();
                    ui.strong("Click the world to start playing");
                }
            });
    }

    fn draw_architect(&mut self, ctx: &EguiContext) {
        egui::Window::new("AI Architect")
            .anchor(egui::Align2::RIGHT_TOP, [-10.0, 10.0])
            .resizable(false)
            .collapsible(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                if self.advice.is_loading() {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Dreaming up an idea...");
                    });
                }
                let mut pick = None;
                if let Some(hint) = self.advice.current() {
                    ui.heading(&hint.title);
                    ui.label(&hint.description);
                    ui.horizontal_wrapped(|ui| {
                        for name in &hint.suggested_materials {
                            match name.parse::<Material>() {
                                Ok(material) => {
                                    if ui.add(material_button(material, false)).clicked() {
                                        pick = Some(material);
                                    }
                                }
                                Err(_) => {
                                    ui.label(name);
                                }
                            }
                        }
                    });
                }
                if let Some(material) = pick {
                    self.session.push(GameEvent::SelectMaterial(material));
                }
                ui.separator();
                let button = egui::Button::new("Generate New Idea");
                if ui.add_enabled(!self.advice.is_loading(), button).clicked() {
                    self.advice.request_next();
                }
            });
    }

    fn draw_hotbar(&mut self, ctx: &EguiContext) {
        let current = self.session.selected_material();
        egui::Area::new(egui::Id::new("hotbar"))
            .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -16.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    for (slot, material) in Material::HOTBAR.into_iter().enumerate() {
                        let button = material_button(material, material == current)
                            .min_size(egui::vec2(72.0, 40.0));
                        let response = ui.add(button).on_hover_text(format!("key {}", slot + 1));
                        if response.clicked() {
                            self.session.push(GameEvent::SelectMaterial(material));
                        }
                    }
                });
            });
    }

    fn draw_inspector(&mut self, ctx: &EguiContext) {
        let summary = WorldInspector::summary(self.session.world());
        egui::SidePanel::left("inspector")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Inspector");
                ui.separator();
                ui.label(format!("Blocks: {}", summary.block_count));
                for (material, n) in &summary.per_material {
                    ui.label(format!("  {material}: {n}"));
                }
                if let Some((lo, hi)) = summary.bounds {
                    ui.label(format!("Bounds: {lo} .. {hi}"));
                }
                let p = self.session.player_position();
                ui.label(format!("Player: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                ui.label(format!("Ticks: {}", self.session.ticks()));
                match self.session.highlighted() {
                    Some(target) => ui.label(format!("Target: {target}")),
                    None => ui.label("Target: none"),
                };
                ui.separator();
                let editor = self.session.editor();
                ui.label(format!(
                    "Undo: {} / Redo: {}",
                    editor.undo_count(),
                    editor.redo_count()
                ));
                ui.horizontal(|ui| {
                    if ui.button("Undo").clicked() {
                        self.session.push(GameEvent::Undo);
                    }
                    if ui.button("Redo").clicked() {
                        self.session.push(GameEvent::Redo);
                    }
                });
            });
    }
}

fn material_button(material: Material, selected: bool) -> egui::Button<'static> {
    let [r, g, b, _] = material.color();
    let fill = Color32::from_rgb((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8);
    let stroke = if selected {
        egui::Stroke::new(3.0, Color32::WHITE)
    } else {
        egui::Stroke::new(1.0, Color32::from_black_alpha(120))
    };
    egui::Button::new(egui::RichText::new(material.name()).color(Color32::WHITE).strong())
        .fill(fill)
        .stroke(stroke)
}

fn draw_crosshair(ctx: &EguiContext) {
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("crosshair"),
    ));
    let c = ctx.screen_rect().center();
    let stroke = egui::Stroke::new(2.0, Color32::from_white_alpha(200));
    painter.line_segment([c - egui::vec2(8.0, 0.0), c + egui::vec2(8.0, 0.0)], stroke);
    painter.line_segment([c - egui::vec2(0.0, 8.0), c + egui::vec2(0.0, 8.0)], stroke);
}

/// Window and GPU resources, created on resume.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn set_pointer_lock(&mut self, locked: bool) {
        let Some(gpu) = &self.gpu else {
            return;
        };
        let grab = if locked {
            gpu.window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| gpu.window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            gpu.window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(e) = grab {
            tracing::warn!("cursor grab failed: {e}");
            return;
        }
        gpu.window.set_cursor_visible(!locked);
        self.state.pointer_locked = locked;
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f32();
        self.state.last_frame = now;
        self.state.update(dt);

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let frame = self.state.session.frame();
        gpu.renderer
            .render(&gpu.device, &gpu.queue, &view, &self.state.camera, &frame);

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Buildspace")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("find adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("buildspace_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .expect("create device");

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        self.state.camera.set_viewport(config.width, config.height);

        let physics = &self.state.session.config().physics;
        let ground = GroundPlane {
            height: physics.ground_height,
            half_extent: physics.ground_half_extent,
        };
        let renderer = WgpuRenderer::new(&device, format, config.width, config.height, ground);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        self.gpu = Some(Gpu {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        });
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            // While playing, the hidden cursor never interacts with panels.
            if response.consumed && !self.state.pointer_locked {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.config.width = new_size.width.max(1);
                    gpu.config.height = new_size.height.max(1);
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    gpu.renderer
                        .resize(&gpu.device, gpu.config.width, gpu.config.height);
                    self.state
                        .camera
                        .set_viewport(gpu.config.width, gpu.config.height);
                }
            }
            WindowEvent::Focused(false) => {
                self.state.session.push(GameEvent::FocusLost);
                self.set_pointer_lock(false);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                let pressed = key_state == ElementState::Pressed;
                if pressed && key == KeyCode::Escape {
                    self.state.session.push(GameEvent::FocusLost);
                    self.set_pointer_lock(false);
                } else {
                    self.state.handle_key(key, pressed);
                }
            }
            WindowEvent::MouseInput {
                button,
                state: ElementState::Pressed,
                ..
            } => {
                if !self.state.pointer_locked {
                    if button == MouseButton::Left {
                        self.set_pointer_lock(true);
                    }
                    return;
                }
                let kind = match button {
                    MouseButton::Left => InteractionKind::Primary,
                    MouseButton::Right => InteractionKind::Secondary,
                    _ => return,
                };
                self.state.session.push(GameEvent::Click(kind));
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.pointer_locked {
                self.state.session.push(GameEvent::Look {
                    dx: delta.0 as f32,
                    dy: delta.1 as f32,
                });
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GameConfig::default(),
    };

    tracing::info!("buildspace-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(AppState::new(config, cli.demo_blocks));
    event_loop.run_app(&mut app)?;

    Ok(())
}
