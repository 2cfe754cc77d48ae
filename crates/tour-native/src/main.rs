use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::Context;
use clap::Parser;
use winit::{
    dpi::PhysicalPosition,
    event::*,
    event_loop::EventLoop,
    keyboard::{Key, NamedKey},
    window::{Fullscreen, WindowBuilder},
};

use tour_core::{
    Camera, Catalogue, OverlapPolicy, SessionConfig, TourEvent,
    surface_view_format, TourRenderer, TourSession, CAMERA_FOVY_DEGREES, DEFAULT_FACE_LEVEL, SELECT_DRAG_THRESHOLD_PX,
};

mod loader;

use loader::Completion;

#[derive(Parser)]
#[command(name = "panotour")]
#[command(about = "Walk through a panoramic tour on the desktop", long_about = None)]
#[command(version)]
struct Cli {
    /// Catalogue JSON exported for the companion viewer
    #[arg(long, default_value = "assets/tour.json")]
    catalogue: PathBuf,

    /// Directory face paths are resolved against (defaults to the catalogue's directory)
    #[arg(long)]
    tiles: Option<PathBuf>,

    /// Scene to open first (defaults to the first scene in the catalogue)
    #[arg(long)]
    start: Option<String>,

    /// How overlapping scene switches resolve: latest-wins, queue or race
    #[arg(long, default_value_t = OverlapPolicy::LatestWins)]
    policy: OverlapPolicy,

    /// Resolution level to load faces from
    #[arg(long, default_value_t = DEFAULT_FACE_LEVEL)]
    level: u32,
}

struct GpuState<'w> {
    window: &'w winit::window::Window,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    view_format: wgpu::TextureFormat,
    renderer: TourRenderer,
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
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let view_format = surface_view_format(format);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: if view_format != format {
                vec![view_format]
            } else {
                vec![]
            },
        };
        surface.configure(&device, &config);
        let renderer = TourRenderer::new(&device, &queue, view_format);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            view_format,
            renderer,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    fn render(&mut self, camera: &Camera) -> Result<(), wgpu::SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor {
                format: Some(self.view_format),
                ..Default::default()
            });
        self.renderer
            .render(&self.device, &self.queue, &view, camera);
        frame.present();
        Ok(())
    }
}

/// Mouse stands in for a controller: drag to look, click to select.
#[derive(Default)]
struct Pointer {
    position: Option<PhysicalPosition<f64>>,
    pressed_at: Option<PhysicalPosition<f64>>,
    dragged: bool,
}

struct App<'w> {
    gpu: GpuState<'w>,
    session: TourSession,
    camera: Camera,
    pointer: Pointer,
    tiles_root: PathBuf,
    done_tx: Sender<Completion>,
    done_rx: Receiver<Completion>,
    companion_rx: Receiver<String>,
}

impl<'w> App<'w> {
    fn pump(&mut self) {
        for id in self.companion_rx.try_iter().collect::<Vec<_>>() {
            log::info!("[companion] switch request '{}'", id);
            self.session.switch_to(&id);
        }
        for (seq, result) in self.done_rx.try_iter().collect::<Vec<_>>() {
            self.session.complete_load(seq, result);
        }
        for req in self.session.drain_load_requests() {
            loader::spawn_load(&self.tiles_root, req, self.done_tx.clone());
        }
        for event in self.session.drain_events() {
            self.handle_event(event);
        }
        if let Some(images) = self.session.take_background_upload() {
            self.gpu
                .renderer
                .upload_background(&self.gpu.device, &self.gpu.queue, &images);
        }

        let hover_ray = self.pointer.position.map(|p| self.pointer_ray(p));
        self.session.update_hover(hover_ray.as_ref());
        let instances = self.session.marker_instances();
        self.gpu
            .renderer
            .set_markers(&self.gpu.device, &self.gpu.queue, &instances);
    }

    fn handle_event(&mut self, event: TourEvent) {
        if let Some(id) = event.companion_scene() {
            log::info!("[companion] switchSceneById('{}')", id);
        }
        match event {
            TourEvent::SceneChanged { scene, .. } => {
                if let Some(s) = self.session.catalogue().get(&scene) {
                    self.camera.apply_view(&s.initial_view_parameters);
                    self.gpu.window.set_title(&format!("panotour - {}", s.name));
                }
            }
            TourEvent::SessionEnded { toast: Some(toast) } => {
                for line in toast.lines() {
                    log::warn!("[toast] {}", line);
                }
            }
            TourEvent::SessionEnded { toast: None } => {}
        }
    }

    fn pointer_ray(&self, p: PhysicalPosition<f64>) -> tour_core::Ray {
        self.camera.screen_ray(
            p.x as f32,
            p.y as f32,
            self.gpu.config.width as f32,
            self.gpu.config.height as f32,
        )
    }

    fn on_cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        if let (Some(last), Some(origin)) = (self.pointer.position, self.pointer.pressed_at) {
            let dx = (position.x - last.x) as f32;
            let dy = (position.y - last.y) as f32;
            self.camera.look_drag(dx, dy);
            let moved = ((position.x - origin.x).powi(2) + (position.y - origin.y).powi(2)).sqrt();
            if moved as f32 > SELECT_DRAG_THRESHOLD_PX {
                self.pointer.dragged = true;
            }
        }
        self.pointer.position = Some(position);
    }

    fn on_mouse_button(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.pointer.pressed_at = self.pointer.position;
                self.pointer.dragged = false;
                self.session.select_start(0);
            }
            ElementState::Released => {
                let clicked_at = self.pointer.pressed_at.take().and(self.pointer.position);
                match clicked_at {
                    Some(p) if !self.pointer.dragged => {
                        let ray = self.pointer_ray(p);
                        self.session.select_end(0, &ray);
                    }
                    _ => self.session.select_cancel(0),
                }
            }
        }
    }

    fn enter_immersive(&mut self) {
        self.session.enter_immersive();
        self.gpu
            .window
            .set_fullscreen(Some(Fullscreen::Borderless(None)));
    }

    fn end_immersive(&mut self) {
        self.session.end_immersive();
        self.gpu.window.set_fullscreen(None);
        for event in self.session.drain_events() {
            self.handle_event(event);
        }
    }
}

fn load_catalogue(path: &Path) -> anyhow::Result<Catalogue> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading catalogue {}", path.display()))?;
    Catalogue::from_json(&text).map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let catalogue = load_catalogue(&cli.catalogue)?;
    let tiles_root = cli.tiles.clone().unwrap_or_else(|| {
        cli.catalogue
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    });
    let config = SessionConfig {
        overlap_policy: cli.policy,
        face_level: cli.level,
        ..SessionConfig::default()
    };
    let mut session = TourSession::new(catalogue, config);

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("panotour")
        .build(&event_loop)?;

    let gpu = pollster::block_on(GpuState::new(&window)).context("initialising GPU")?;

    let (done_tx, done_rx) = mpsc::channel();
    let (companion_tx, companion_rx) = mpsc::channel();
    loader::spawn_companion_reader(companion_tx);

    session.start(cli.start.as_deref());
    let camera = Camera::new(gpu.aspect(), CAMERA_FOVY_DEGREES.to_radians());
    let mut app = App {
        gpu,
        session,
        camera,
        pointer: Pointer::default(),
        tiles_root,
        done_tx,
        done_rx,
        companion_rx,
    };
    log::info!("[native] faces resolve under {}", app.tiles_root.display());

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::Resized(size) => {
                app.gpu.resize(size);
                app.camera.aspect = app.gpu.aspect();
            }
            WindowEvent::CloseRequested => {
                app.end_immersive();
                elwt.exit();
            }
            WindowEvent::CursorMoved { position, .. } => app.on_cursor_moved(position),
            WindowEvent::CursorLeft { .. } => app.pointer.position = None,
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => app.on_mouse_button(state),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match key {
                NamedKey::Enter => app.enter_immersive(),
                NamedKey::Escape => app.end_immersive(),
                _ => {}
            },
            _ => {}
        },
        Event::AboutToWait => {
            app.pump();
            match app.gpu.render(&app.camera) {
                Ok(_) => app.gpu.window.request_redraw(),
                Err(wgpu::SurfaceError::Lost) => app.gpu.resize(app.gpu.window.inner_size()),
                Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
                Err(_) => {}
            }
        }
        _ => {}
    })?;
    Ok(())
}
