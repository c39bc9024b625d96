// MIT/Apache2 License

use easel::{
    BitmapStore, Canvas, Circle, Color, ImageCache, ImageDrawable, ImageFormat, ImageStore,
    LoadStatus, PixelBuffer, QueuedLoader, Rectangle, Result, SharedContext,
};
use parking_lot::Mutex;
use std::sync::Arc;

const WIDTH: u32 = 64;
const HEIGHT: u32 = 48;

/// Make a small checkerboard so the scaled image is easy to pick out.
fn checkerboard(size: u32, a: [u8; 3], b: [u8; 3]) -> Vec<u8> {
    (0..size * size)
        .flat_map(|i| {
            let (x, y) = (i % size, i / size);
            if (x + y) % 2 == 0 {
                a
            } else {
                b
            }
        })
        .collect()
}

fn main() -> Result {
    env_logger::init();

    // both buffers draw from the same image memory
    let mut store = BitmapStore::new();
    let buffers: Vec<Arc<Mutex<PixelBuffer>>> = (0..2)
        .map(|_| Arc::new(Mutex::new(PixelBuffer::with_store(1, 1, store.clone()))))
        .collect();
    let canvases = buffers
        .iter()
        .enumerate()
        .map(|(i, buffer)| {
            let context: SharedContext = buffer.clone();
            Canvas::from_shared(format!("canvas-{}", i), HEIGHT, WIDTH, context)
        })
        .collect::<Result<Vec<_>>>()?;

    let loader = QueuedLoader::new();
    let cache = ImageCache::new(loader.clone());

    let mut backdrop = Rectangle::new(0.0, 0.0, HEIGHT as f32, WIDTH as f32, true);
    backdrop.set_color("#204060".parse()?);
    let mut sun = Circle::new(52.0, 10.0, 6.0, true);
    sun.set_color("#ffcc00".parse()?);
    let mut frame = Rectangle::new(2.0, 2.0, 44.0, 60.0, false);
    frame.set_color(Color::WHITE);

    let tile = ImageDrawable::new(&cache, "tiles/checker.png", 4.0, 20.0, 16.0, 16.0);
    let badge = ImageDrawable::new(&cache, "badge.png", 28.0, 20.0, 16.0, 16.0);
    // same source, so this shares the first resource
    let second_tile = ImageDrawable::new(&cache, "tiles/checker.png", 44.0, 28.0, 8.0, 8.0);
    let missing = ImageDrawable::new(&cache, "missing.png", 0.0, 0.0, 4.0, 4.0);

    for canvas in &canvases {
        canvas
            .draw(&backdrop)?
            .draw(&sun)?
            .draw(&frame)?
            .draw(&tile)?
            .draw(&badge)?
            .draw(&second_tile)?
            .draw(&missing)?;
    }

    // the tile moves before its image arrives; the replay uses the new spot
    tile.set_position(6.0, 22.0);

    println!(
        "{} resources for 4 image drawables, loads outstanding: {:?}",
        cache.len(),
        loader.sources()
    );

    while let Some(completion) = loader.pop() {
        match completion.source() {
            "tiles/checker.png" => {
                let bytes = checkerboard(4, [0, 0, 0], [255, 255, 255]);
                let image = store.create_image(&bytes, 4, 4, ImageFormat::Rgb)?;
                completion.complete(image)?;
            }
            "badge.png" => {
                let bytes = [200, 30, 30, 255, 30, 200, 30, 255, 30, 30, 200, 255, 0, 0, 0, 0];
                let image = store.create_image(&bytes, 2, 2, ImageFormat::Rgba)?;
                completion.complete(image)?;
            }
            source => {
                let reason = format!("no such file: {}", source);
                completion.fail(reason)?;
            }
        }
    }

    for drawable in &[&tile, &badge, &second_tile, &missing] {
        let status = cache.status(drawable.index())?;
        println!("{:<20} {:?}", cache.source(drawable.index())?, status);
        debug_assert_eq!(drawable.is_loaded(), status == LoadStatus::Loaded);
    }

    for (canvas, buffer) in canvases.iter().zip(&buffers) {
        canvas.flush()?;
        let buffer = buffer.lock();
        println!(
            "{}: {}x{}, tile corner {:?}, badge corner {:?}",
            canvas.id(),
            buffer.width(),
            buffer.height(),
            buffer.pixel(6, 22),
            buffer.pixel(28, 20)
        );
    }

    Ok(())
}
