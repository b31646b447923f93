#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::Path;
use std::rc::Rc;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use scroll_showcase::core::{ReducedMotion, ResourceId, Showcase, Transform, Viewport};
use scroll_showcase::error::LoadError;
use scroll_showcase::loaders::{AssetLoader, Fetcher};
use scroll_showcase::scenes::ModelAsset;
use scroll_showcase::traits::{DeviceFactory, DrawList, GraphicsDevice};
use scroll_showcase::types::{MaterialData, MeshData};
use scroll_showcase::ShowcaseConfig;

/// What every device built by a [`RecordingFactory`] has done
#[derive(Debug, Default)]
pub struct DeviceLog {
    pub devices: usize,
    pub live: HashSet<ResourceId>,
    pub released: Vec<ResourceId>,
    pub draws: usize,
    pub last_draw_items: usize,
    pub resizes: Vec<Viewport>,
}

pub struct RecordingDevice {
    log: Rc<RefCell<DeviceLog>>,
}

impl GraphicsDevice for RecordingDevice {
    fn create_context(&mut self, id: ResourceId, _viewport: Viewport) -> anyhow::Result<()> {
        self.log.borrow_mut().live.insert(id);
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) {
        self.log.borrow_mut().resizes.push(viewport);
    }

    fn upload_geometry(&mut self, id: ResourceId, _mesh: &MeshData) -> anyhow::Result<()> {
        self.log.borrow_mut().live.insert(id);
        Ok(())
    }

    fn upload_material(&mut self, id: ResourceId, _material: &MaterialData) -> anyhow::Result<()> {
        self.log.borrow_mut().live.insert(id);
        Ok(())
    }

    fn release(&mut self, id: ResourceId) {
        let mut log = self.log.borrow_mut();
        assert!(log.live.remove(&id), "{} released twice or never created", id);
        log.released.push(id);
    }

    fn draw(&mut self, list: &DrawList) -> anyhow::Result<()> {
        let mut log = self.log.borrow_mut();
        log.draws += 1;
        log.last_draw_items = list.items.len();
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct RecordingFactory {
    pub log: Rc<RefCell<DeviceLog>>,
}

impl DeviceFactory for RecordingFactory {
    type Device = RecordingDevice;

    fn create_device(&mut self) -> anyhow::Result<RecordingDevice> {
        self.log.borrow_mut().devices += 1;
        Ok(RecordingDevice { log: self.log.clone() })
    }
}

pub fn fetcher(f: impl Fn(&Path) -> Result<ModelAsset, LoadError> + Send + Sync + 'static) -> Fetcher {
    Arc::new(move |path: &Path, _base: &Transform| f(path))
}

/// Fetcher that blocks until the returned sender fires (or is dropped)
pub fn gated(
    f: impl Fn(&Path) -> Result<ModelAsset, LoadError> + Send + Sync + 'static,
) -> (Fetcher, mpsc::Sender<()>) {
    let (tx, rx) = mpsc::channel::<()>();
    let rx = Mutex::new(rx);
    let fetch = fetcher(move |path| {
        let _ = rx.lock().unwrap().recv();
        f(path)
    });
    (fetch, tx)
}

pub fn showcase(
    fetch: Fetcher,
    reduced: bool,
    timeout: Duration,
) -> (Showcase<RecordingFactory>, Rc<RefCell<DeviceLog>>) {
    let factory = RecordingFactory::default();
    let log = factory.log.clone();
    let showcase = Showcase::new(
        ShowcaseConfig::default(),
        factory,
        AssetLoader::with_fetcher(fetch, timeout),
        ReducedMotion::new(reduced),
        Viewport::new(800, 600),
        Instant::now(),
    );
    (showcase, log)
}

/// Run frames until `done` holds, with a wall-clock cap
pub fn run_until(showcase: &mut Showcase<RecordingFactory>, mut done: impl FnMut(&Showcase<RecordingFactory>) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done(showcase) {
        assert!(Instant::now() < deadline, "condition never reached");
        showcase.frame(Instant::now()).unwrap();
        std::thread::sleep(Duration::from_millis(2));
    }
}
