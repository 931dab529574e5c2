use ndarray::{Array2, ArrayView2};

/// Pressure at `t−dt`, `t` and `t+dt`.
///
/// The three arrays always share one shape. `rotate` relabels them instead of
/// copying, so a run allocates exactly three fields.
#[derive(Debug, Clone)]
pub struct PressureBuffers {
    pub past: Array2<f64>,
    pub now: Array2<f64>,
    pub next: Array2<f64>,
}

impl PressureBuffers {
    pub fn new(nx: usize, nz: usize) -> Self {
        PressureBuffers {
            past: Array2::zeros((nx, nz)),
            now: Array2::zeros((nx, nz)),
            next: Array2::zeros((nx, nz)),
        }
    }

    /// `past ← now`, `now ← next`; the old `past` becomes scratch for `next`.
    pub fn rotate(&mut self) {
        std::mem::swap(&mut self.past, &mut self.now);
        std::mem::swap(&mut self.now, &mut self.next);
    }

    pub fn now(&self) -> ArrayView2<'_, f64> {
        self.now.view()
    }

    pub fn past(&self) -> ArrayView2<'_, f64> {
        self.past.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zero() {
        let buffers = PressureBuffers::new(4, 3);
        assert_eq!(buffers.now.dim(), (4, 3));
        assert!(buffers.now.iter().all(|&p| p == 0.0));
        assert_eq!(buffers.past.dim(), (4, 3));
        assert_eq!(buffers.next.dim(), (4, 3));
    }

    #[test]
    fn test_rotate_relabels_without_copy() {
        let mut buffers = PressureBuffers::new(3, 3);
        buffers.past.fill(1.0);
        buffers.now.fill(2.0);
        buffers.next.fill(3.0);
        let next_ptr = buffers.next.as_ptr();
        let past_ptr = buffers.past.as_ptr();

        buffers.rotate();

        assert!(buffers.past.iter().all(|&p| p == 2.0));
        assert!(buffers.now.iter().all(|&p| p == 3.0));
        assert!(buffers.next.iter().all(|&p| p == 1.0));
        assert_eq!(buffers.now.as_ptr(), next_ptr);
        assert_eq!(buffers.next.as_ptr(), past_ptr);
    }
}
