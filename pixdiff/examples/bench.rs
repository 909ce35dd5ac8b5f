use pixdiff::{compare, ComparisonSession, DiffParams, RasterBuffer};
use std::time::Instant;

fn main() {
    let width = 1024;
    let height = 768;

    // Gradient target, candidate with a faint dither and a shifted block
    let mut target = vec![0u8; width * height * 4];
    let mut candidate = vec![0u8; width * height * 4];

    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) * 4;
            let val = ((x as f32 / width as f32) * 200.0) as u8;
            target[idx..idx + 4].copy_from_slice(&[val, val, 255 - val, 255]);

            let val2 = if (300..340).contains(&x) && (200..260).contains(&y) {
                0
            } else {
                val.saturating_add(((x * y) % 3) as u8)
            };
            candidate[idx..idx + 4].copy_from_slice(&[val2, val2, 255 - val2, 255]);
        }
    }

    let target = RasterBuffer::new(width, height, target).expect("valid target");
    let candidate = RasterBuffer::new(width, height, candidate).expect("valid candidate");

    // Warmup
    let result = compare(&candidate, &target);

    let iterations = 20;
    let start = Instant::now();
    for _ in 0..iterations {
        let _ = compare(&candidate, &target);
    }
    let elapsed = start.elapsed();

    println!(
        "{width}x{height} image: {:.2}ms per iteration ({} iterations, total {:.2}s)",
        elapsed.as_secs_f64() * 1000.0 / iterations as f64,
        iterations,
        elapsed.as_secs_f64()
    );
    println!(
        "score {:.3} ({}), {} visible pixels",
        result.score,
        result.tier(),
        result.visible_pixels
    );

    // Guarded path, as a periodic scorer would call it
    let session = ComparisonSession::new(target, DiffParams::default()).expect("valid params");
    let start = Instant::now();
    let completed = (0..iterations)
        .filter(|_| session.try_compare(&candidate).is_some())
        .count();
    println!(
        "session: {completed}/{iterations} passes in {:.2}s",
        start.elapsed().as_secs_f64()
    );
}
