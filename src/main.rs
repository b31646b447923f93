use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use scroll_showcase::cli::Cli;
use scroll_showcase::core::{ReducedMotion, ScrollKey, Showcase, Viewport};
use scroll_showcase::gpu::{GpuContext, PageHost, StageImage, WgpuFactory};
use scroll_showcase::loaders::AssetLoader;
use scroll_showcase::overlay::{self, DebugInfo, OverlayFrame};
use scroll_showcase::traits::{EnvPreference, MotionPreference};
use scroll_showcase::ShowcaseConfig;

const INITIAL_WINDOW_WIDTH: u32 = 1280;
const INITIAL_WINDOW_HEIGHT: u32 = 720;

struct App {
    config: ShowcaseConfig,
    page: Option<PageHost>,
    showcase: Option<Showcase<WgpuFactory>>,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(config: ShowcaseConfig) -> Self {
        Self {
            config,
            page: None,
            showcase: None,
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = event_loop
            .create_window(
                Window::default_attributes()
                    .with_title("Scroll Showcase")
                    .with_inner_size(winit::dpi::PhysicalSize::new(
                        INITIAL_WINDOW_WIDTH,
                        INITIAL_WINDOW_HEIGHT,
                    )),
            )
            .context("Failed to create window")?;
        let window = Arc::new(window);

        let (gpu, surface) = pollster::block_on(GpuContext::for_window(window.clone()))?;
        let gpu = Arc::new(gpu);
        let page = PageHost::new(window.clone(), gpu.clone(), surface)?;

        let config_pref = self.config.motion_preference();
        let env_pref = EnvPreference::default();
        let sources: [&dyn MotionPreference; 2] = [&config_pref, &env_pref];
        let motion = ReducedMotion::from_sources(&sources);

        let now = Instant::now();
        let mut showcase = Showcase::new(
            self.config.clone(),
            WgpuFactory::new(gpu),
            AssetLoader::new(self.config.load_timeout()),
            motion,
            Viewport::from(window.inner_size()),
            now,
        );
        showcase.subscribe_motion(|reduced| {
            log::info!("Motion preference changed: {}", if reduced { "reduced" } else { "full" });
        });
        showcase.mount(now)?;

        window.request_redraw();
        self.page = Some(page);
        self.showcase = Some(showcase);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn request_redraw(&self) {
        if let Some(page) = &self.page {
            page.window().request_redraw();
        }
    }

    /// The environment may have changed while the window was in the background
    fn refresh_motion(&mut self) {
        let Some(showcase) = &mut self.showcase else {
            return;
        };
        let config_pref = self.config.motion_preference();
        let env_pref = EnvPreference::default();
        let sources: [&dyn MotionPreference; 2] = [&config_pref, &env_pref];
        match showcase.refresh_motion(&sources, Instant::now()) {
            Ok(true) => self.request_redraw(),
            Ok(false) => {}
            Err(e) => log::error!("Failed to switch motion mode: {:#}", e),
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) {
        let Some(showcase) = &mut self.showcase else {
            return;
        };
        let key = match code {
            KeyCode::Escape => {
                showcase.unmount();
                event_loop.exit();
                return;
            }
            KeyCode::KeyM => {
                if let Err(e) = showcase.toggle_reduced_motion(Instant::now()) {
                    log::error!("Failed to switch motion mode: {:#}", e);
                }
                self.request_redraw();
                return;
            }
            KeyCode::ArrowUp => ScrollKey::LineUp,
            KeyCode::ArrowDown => ScrollKey::LineDown,
            KeyCode::PageUp => ScrollKey::PageUp,
            KeyCode::PageDown | KeyCode::Space => ScrollKey::PageDown,
            KeyCode::Home => ScrollKey::Home,
            KeyCode::End => ScrollKey::End,
            _ => return,
        };
        showcase.apply_key(key);
        self.request_redraw();
    }

    fn redraw(&mut self) {
        let (Some(page), Some(showcase)) = (&mut self.page, &mut self.showcase) else {
            return;
        };

        if let Err(e) = showcase.frame(Instant::now()) {
            log::error!("Frame error: {:#}", e);
        }

        let reduced = showcase.motion().is_reduced();
        let scroll = showcase.scroll_watch().get();
        let debug = self.config.overlay.show_debug.then(|| DebugInfo {
            model: showcase
                .stage()
                .and_then(|s| s.attached_origin())
                .map_or_else(|| self.config.asset.display().to_string(), |o| o.label()),
            status: showcase.load_state().label(),
            progress: scroll.progress,
            offset: scroll.offset,
            fps: showcase.fps(),
            reduced_motion: reduced,
        });
        let stage = showcase.stage().and_then(|s| {
            let device = s.device();
            Some(StageImage {
                view: device.color_view()?,
                id: device.target_id()?,
            })
        });

        let overlay_config = &self.config.overlay;
        let result = page.render(stage, self.config.clear_color, |ctx| {
            if reduced {
                overlay::draw_poster(ctx, &overlay_config.poster_title, &overlay_config.poster_subtitle);
            } else {
                overlay::draw(
                    ctx,
                    &OverlayFrame {
                        config: overlay_config,
                        scroll,
                        debug: debug.clone(),
                    },
                );
            }
        });
        if let Err(e) = result {
            log::error!("Render error: {:#}", e);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.page.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.fail(event_loop, e);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        // Let egui handle the event first
        if let Some(page) = &mut self.page {
            if page.handle_event(&event) {
                self.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                if let Some(showcase) = &mut self.showcase {
                    showcase.unmount();
                }
                event_loop.exit();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => self.handle_key(event_loop, code),
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(showcase) = &mut self.showcase {
                    match delta {
                        MouseScrollDelta::LineDelta(_, y) => showcase.scroll_lines(-y),
                        MouseScrollDelta::PixelDelta(pos) => showcase.scroll_by(-pos.y as f32),
                    }
                }
                self.request_redraw();
            }
            WindowEvent::Resized(size) => {
                if let Some(page) = &mut self.page {
                    page.resize(size.width, size.height);
                }
                if let Some(showcase) = &mut self.showcase {
                    showcase.resize(Viewport::from(size));
                }
                self.request_redraw();
            }
            WindowEvent::Focused(true) => self.refresh_motion(),
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        // Continuous redraw only while the stage is mounted
        let animating = self.showcase.as_ref().is_some_and(|s| s.wants_frame());
        if animating {
            self.request_redraw();
        }
        event_loop.set_control_flow(ControlFlow::Wait);
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = ShowcaseConfig::resolve(&cli)?;
    log::info!("Scroll Showcase - wheel/arrows/PageUp/PageDown scroll, M toggles motion, Escape quits");

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
