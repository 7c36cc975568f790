use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::window::{Fullscreen, Window, WindowId};

use crate::config::{VisualizerConfig, WindowConfig};
use crate::font::FontSet;
use crate::graphics::Graphics;
use crate::input::{PointerEvent, PointerTracker};
use crate::scene::Scene;
use crate::scheduler::TimerQueue;
use crate::text::GlyphRasterizer;
use crate::visualizer::{Context, TapVisualizer};
use crate::{Pt, platform};

/// Everything that exists once the window is up.
///
/// Field order matters: the surface must drop before the window it draws to.
struct Running {
    graphics: Graphics,
    surface: wgpu::Surface<'static>,
    window: Arc<Window>,
    scale_factor: f64,
    scene: Scene,
    timers: TimerQueue,
    text: GlyphRasterizer,
    pointer: PointerTracker,
    visualizer: TapVisualizer,
}

impl Running {
    fn with_context<R>(&mut self, f: impl FnOnce(&mut TapVisualizer, &mut Context<'_>) -> R) -> R {
        let mut ctx = Context {
            canvas: &mut self.scene,
            text: &mut self.text,
            timers: &mut self.timers,
        };
        f(&mut self.visualizer, &mut ctx)
    }

    fn logical(&self, position: PhysicalPosition<f64>) -> [Pt; 2] {
        [
            Pt::from_physical_px(position.x, self.scale_factor),
            Pt::from_physical_px(position.y, self.scale_factor),
        ]
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.graphics.resize(&self.surface, size.width, size.height);
        self.scene.resize(
            Pt::from_physical_px(size.width as f64, self.scale_factor),
            Pt::from_physical_px(size.height as f64, self.scale_factor),
        );
        self.with_context(|vis, ctx| vis.layout(ctx));
        self.window.request_redraw();
    }

    fn dispatch_pointer(&mut self, event: Option<PointerEvent>) {
        match event {
            Some(PointerEvent::Down { position }) => {
                let now = Instant::now();
                self.with_context(|vis, ctx| vis.on_pointer_down(ctx, position, now));
            }
            Some(PointerEvent::Up) => {
                let cancelled = self.with_context(|vis, ctx| vis.on_pointer_up(ctx));
                tracing::trace!(cancelled, "pointer up");
            }
            None => {}
        }
    }

    /// Runs every task that is due. Returns the next deadline, if any.
    fn run_due_tasks(&mut self) -> Option<Instant> {
        loop {
            let now = Instant::now();
            let Some(due) = self.timers.pop_due(now) else {
                break;
            };
            self.with_context(|vis, ctx| vis.handle_task(ctx, due, now));
        }
        self.timers.next_deadline()
    }

    fn redraw(&mut self) {
        match self
            .graphics
            .draw_scene(&self.surface, &self.scene, self.scale_factor)
        {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::warn!("surface lost or outdated, reconfiguring");
                self.graphics.reconfigure(&self.surface);
                self.window.request_redraw();
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::debug!("surface acquire timed out");
            }
            Err(err) => tracing::warn!(%err, "frame dropped"),
        }
    }
}

pub(crate) struct App {
    window_config: WindowConfig,
    visualizer_config: VisualizerConfig,
    instance: wgpu::Instance,
    running: Option<Running>,
    error: Option<anyhow::Error>,
}

impl App {
    pub(crate) fn new(window_config: WindowConfig, visualizer_config: VisualizerConfig) -> Self {
        Self {
            window_config,
            visualizer_config,
            instance: platform::create_wgpu_instance(),
            running: None,
            error: None,
        }
    }

    /// The startup failure that ended the loop, if any.
    pub(crate) fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> anyhow::Result<Running> {
        let cfg = &self.window_config;
        let mut attributes = Window::default_attributes()
            .with_title(cfg.title.clone())
            .with_inner_size(LogicalSize::new(
                cfg.width.as_f32() as f64,
                cfg.height.as_f32() as f64,
            ));
        if cfg.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(crate::Error::Window)?,
        );
        let size = window.inner_size();
        let scale_factor = window.scale_factor();
        tracing::info!(
            width = size.width,
            height = size.height,
            scale_factor,
            fullscreen = cfg.fullscreen,
            "window created"
        );

        let surface = self
            .instance
            .create_surface(window.clone())
            .map_err(crate::Error::Surface)?;
        let graphics = platform::block_on(Graphics::new(
            &self.instance,
            &surface,
            size.width,
            size.height,
        ))?;

        let mut scene = Scene::new(
            Pt::from_physical_px(size.width as f64, scale_factor),
            Pt::from_physical_px(size.height as f64, scale_factor),
        );
        let mut timers = TimerQueue::new();
        let mut text = GlyphRasterizer::new(FontSet::discover());
        text.set_scale_factor(scale_factor);
        let visualizer = {
            let mut ctx = Context {
                canvas: &mut scene,
                text: &mut text,
                timers: &mut timers,
            };
            TapVisualizer::new(&mut ctx, self.visualizer_config.clone())
        };

        Ok(Running {
            graphics,
            surface,
            window,
            scale_factor,
            scene,
            timers,
            text,
            pointer: PointerTracker::new(),
            visualizer,
        })
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => {
                running.window.request_redraw();
                self.running = Some(running);
            }
            Err(err) => {
                tracing::error!(%err, "startup failed");
                self.error = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(new_size) => running.resize(new_size),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                running.scale_factor = scale_factor;
                running.text.set_scale_factor(scale_factor);
                running.with_context(|vis, ctx| vis.refresh_text(ctx));
                let size = running.window.inner_size();
                running.resize(size);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let [x, y] = running.logical(position);
                running.pointer.handle_cursor_moved(x, y);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let event = running.pointer.handle_mouse_input(state, button);
                running.dispatch_pointer(event);
            }
            WindowEvent::Touch(touch) => {
                let position = running.logical(touch.location);
                let event = running
                    .pointer
                    .handle_touch(touch.id, touch.phase.into(), position);
                running.dispatch_pointer(event);
            }
            WindowEvent::Focused(focused) => {
                let event = running.pointer.handle_focus(focused);
                running.dispatch_pointer(event);
            }
            WindowEvent::RedrawRequested => running.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        let next = running.run_due_tasks();
        if running.scene.take_dirty() {
            running.window.request_redraw();
        }
        event_loop.set_control_flow(match next {
            Some(deadline) => ControlFlow::WaitUntil(deadline),
            None => ControlFlow::Wait,
        });
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if self.running.take().is_some() {
            tracing::info!("shutting down");
        }
    }
}
