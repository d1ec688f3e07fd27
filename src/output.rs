// ABOUTME: Scoped progress reporting for multi-stage operations.
// ABOUTME: Step counter with a dynamic total, closed exactly once on drop.

/// A scoped progress indicator for long-running multi-stage operations.
///
/// The total step count can be set (or corrected) once the operation knows
/// how many phases it has. The closing line is printed exactly once, either
/// through an explicit `finish` or on drop, so failure paths that unwind
/// early still close the scope.
pub struct Progress {
    label: String,
    total: usize,
    current: usize,
    closed: bool,
}

impl Progress {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            total: 0,
            current: 0,
            closed: false,
        }
    }

    /// Set or correct the total step count.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Advance one step and report its status.
    pub fn step(&mut self, status: &str) {
        self.current += 1;
        if self.total > 0 {
            println!("[{}/{}] {}: {}", self.current, self.total, self.label, status);
        } else {
            println!("[{}] {}: {}", self.current, self.label, status);
        }
    }

    /// Close the scope, advancing to the full step count. Idempotent.
    pub fn finish(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if self.current < self.total {
            self.current = self.total;
        }
        println!("{}: done ({}/{} steps)", self.label, self.current, self.total);
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        self.finish();
    }
}
