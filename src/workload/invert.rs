//! Row-parallel image inversion, reporting one unit per row.

use std::path::Path;

use image::RgbaImage;
use rayon::prelude::*;

use crate::error::{ProgressError, Result};
use crate::progress::ProgressTracker;

use super::scheduler::WorkScheduler;

/// Invert the color channels of `image` in place, one row per work unit.
///
/// Alpha is left untouched. Does not finish the tracker.
pub fn invert_rows<T>(image: &mut RgbaImage, tracker: &T)
where
    T: ProgressTracker + ?Sized,
{
    let row_len = image.width() as usize * 4;
    if row_len == 0 {
        return;
    }

    image.par_chunks_mut(row_len).for_each(|row| {
        for pixel in row.chunks_exact_mut(4) {
            pixel[0] = 255 - pixel[0];
            pixel[1] = 255 - pixel[1];
            pixel[2] = 255 - pixel[2];
        }
        tracker.unit_done();
    });
}

/// Summary of an inverted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvertSummary {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels (= work units reported).
    pub height: u32,
}

/// Read `input`, invert it on the scheduler's pool and write `output`.
///
/// `make_tracker` receives the row count once the image is decoded. The
/// tracker is finished whether or not writing succeeds.
pub fn invert_file<T, M>(
    input: &Path,
    output: &Path,
    scheduler: &WorkScheduler,
    make_tracker: M,
) -> Result<InvertSummary>
where
    T: ProgressTracker,
    M: FnOnce(i64) -> T,
{
    log::info!("Inverting: {}", input.display());

    let mut image = image::open(input)?.to_rgba8();
    let summary = InvertSummary {
        width: image.width(),
        height: image.height(),
    };

    let tracker = make_tracker(i64::from(summary.height));
    let pool = scheduler.build_pool()?;
    pool.install(|| invert_rows(&mut image, &tracker));
    tracker.finished();

    image.save(output).map_err(|e| match e {
        image::ImageError::IoError(io) => ProgressError::Io(io),
        other => ProgressError::Image(other),
    })?;

    log::debug!("Wrote {}", output.display());
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{tracker_with_sink, ChannelSink, NullTracker};
    use image::Rgba;

    fn gradient(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 10) as u8, (y * 10) as u8, 100, 200])
        })
    }

    #[test]
    fn test_invert_rows() {
        let mut image = gradient(4, 3);
        let (sink, receiver) = ChannelSink::new("Invert");
        let tracker = tracker_with_sink(3, sink);

        invert_rows(&mut image, &tracker);

        assert_eq!(image.get_pixel(2, 1), &Rgba([235, 245, 155, 200]));
        assert_eq!(tracker.engine().map(|e| e.completed()), Some(3));
        assert_eq!(receiver.drain_percents().last(), Some(&100));
    }

    #[test]
    fn test_invert_twice_is_identity() {
        let original = gradient(8, 8);
        let mut image = original.clone();

        invert_rows(&mut image, &NullTracker);
        invert_rows(&mut image, &NullTracker);

        assert_eq!(image, original);
    }

    #[test]
    fn test_invert_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");
        gradient(5, 6).save(&input).unwrap();

        let (sink, receiver) = ChannelSink::new("Invert");
        let summary = invert_file(&input, &output, &WorkScheduler::new(2), move |rows| {
            assert_eq!(rows, 6);
            tracker_with_sink(rows, sink)
        })
        .unwrap();

        assert_eq!(summary, InvertSummary { width: 5, height: 6 });
        let written = image::open(&output).unwrap().to_rgba8();
        assert_eq!(written.get_pixel(0, 0), &Rgba([255, 255, 155, 200]));
        assert!(receiver.collect_until_complete().last().unwrap().is_terminal());
    }

    #[test]
    fn test_invert_missing_input() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = invert_file(
            &dir.path().join("missing.png"),
            &dir.path().join("out.png"),
            &WorkScheduler::new(1),
            |_| NullTracker,
        );
        assert!(result.is_err());
    }
}
