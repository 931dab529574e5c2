use crate::solver::{Snapshot, SnapshotObserver};
use ndarray::ArrayView2;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Writes each snapshot as a PNG heat map, `x` to the right and depth down.
pub struct FrameWriter {
    output_dir: PathBuf,
    width: u32,
    height: u32,
    clip: f64,
    gradient: Box<dyn colorgrad::Gradient>,
    frames_written: usize,
}

impl FrameWriter {
    /// `clip` fixes the symmetric colour range `[-clip, clip]`; pass 0 to
    /// scale each frame to its own peak.
    pub fn new(
        output_dir: impl AsRef<Path>,
        width: u32,
        height: u32,
        clip: f64,
    ) -> std::io::Result<Self> {
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)?;

        Ok(Self {
            output_dir,
            width,
            height,
            clip,
            gradient: Box::new(colorgrad::preset::rd_yl_bu()),
            frames_written: 0,
        })
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    pub fn frame_path(&self, step: usize) -> PathBuf {
        self.output_dir.join(format!("pressure_{:06}.png", step))
    }

    pub fn write_pressure(
        &mut self,
        data: ArrayView2<'_, f64>,
        step: usize,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let range = if self.clip > 0.0 {
            self.clip
        } else {
            data.iter().fold(0.0_f64, |acc, &v| acc.max(v.abs()))
        };
        let path = self.frame_path(step);
        render(
            &path,
            data,
            (self.width, self.height),
            (-range, range),
            self.gradient.as_ref(),
        )?;
        self.frames_written += 1;
        debug!("Saved frame: {}", path.display());
        Ok(path)
    }

    /// Background image of the speed model.
    pub fn write_velocity(
        &self,
        vp: ArrayView2<'_, f64>,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let min = vp.iter().copied().fold(f64::INFINITY, f64::min);
        let max = vp.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let path = self.output_dir.join("velocity.png");
        let gradient = colorgrad::preset::viridis();
        render(&path, vp, (self.width, self.height), (min, max), &gradient)?;
        Ok(path)
    }
}

impl SnapshotObserver for FrameWriter {
    fn on_snapshot(&mut self, snapshot: &Snapshot<'_>) {
        if let Err(e) = self.write_pressure(snapshot.pressure, snapshot.step) {
            warn!("Failed to write frame for step {}: {}", snapshot.step, e);
        }
    }
}

fn render(
    path: &Path,
    data: ArrayView2<'_, f64>,
    (width, height): (u32, u32),
    (min_val, max_val): (f64, f64),
    gradient: &dyn colorgrad::Gradient,
) -> Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let (nx, nz) = data.dim();
    for px in 0..width {
        let i = (px as usize * nx / width as usize).min(nx - 1);
        for py in 0..height {
            let k = (py as usize * nz / height as usize).min(nz - 1);
            let color = value_to_color(gradient, data[[i, k]], min_val, max_val);
            root.draw_pixel((px as i32, py as i32), &color)?;
        }
    }

    root.present()?;
    Ok(())
}

fn value_to_color(
    gradient: &dyn colorgrad::Gradient,
    value: f64,
    min_val: f64,
    max_val: f64,
) -> RGBColor {
    let normalized = if max_val > min_val {
        (value - min_val) / (max_val - min_val)
    } else {
        0.5
    };
    let normalized = normalized.clamp(0.0, 1.0);
    let rgba = gradient.at(normalized as f32).to_rgba8();
    RGBColor(rgba[0], rgba[1], rgba[2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use colorgrad::Gradient as _;
    use ndarray::Array2;

    #[test]
    fn test_writes_numbered_frames() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = FrameWriter::new(dir.path().join("frames"), 40, 30, 0.0).unwrap();

        let mut p = Array2::zeros((20, 15));
        p[[10, 7]] = 1.0;
        p[[3, 3]] = -0.5;
        let path = writer.write_pressure(p.view(), 12).unwrap();

        assert_eq!(path, dir.path().join("frames").join("pressure_000012.png"));
        assert!(path.exists());
        assert_eq!(writer.frames_written(), 1);
    }

    #[test]
    fn test_observer_writes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = FrameWriter::new(dir.path(), 16, 16, 1e-3).unwrap();
        let p = Array2::from_elem((8, 8), 5e-4);
        writer.on_snapshot(&Snapshot {
            step: 3,
            time: 0.004,
            pressure: p.view(),
        });
        assert!(writer.frame_path(3).exists());
    }

    #[test]
    fn test_velocity_background() {
        let dir = tempfile::tempdir().unwrap();
        let writer = FrameWriter::new(dir.path(), 16, 16, 0.0).unwrap();
        let vp = Array2::from_shape_fn((8, 8), |(_, k)| 1500.0 + 100.0 * k as f64);
        let path = writer.write_velocity(vp.view()).unwrap();
        assert!(path.ends_with("velocity.png"));
        assert!(path.exists());
    }

    #[test]
    fn test_color_midpoint_for_flat_range() {
        let gradient = colorgrad::preset::rd_yl_bu();
        let mid = value_to_color(&gradient, 3.0, 1.0, 1.0);
        let expected = gradient.at(0.5).to_rgba8();
        assert_eq!(mid, RGBColor(expected[0], expected[1], expected[2]));
    }
}
